use crate::{BookingWindow, Error, Result};
use url::Url;

const LOGIN_PATH: &[&str] = &["login", "check-in"];
const VIEW_TYPE: &str = "card";
const AREA_TYPE: &str = "all";

/// Office and floor on a Deskbird instance, and the URLs derived from them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingTarget {
    base_url: Url,
    office_id: String,
    floor_id: String,
}

impl BookingTarget {
    pub fn new(base_url: Url, office_id: impl Into<String>, floor_id: impl Into<String>) -> Self {
        Self {
            base_url,
            office_id: office_id.into(),
            floor_id: floor_id.into(),
        }
    }

    pub fn office_id(&self) -> &str {
        &self.office_id
    }

    pub fn floor_id(&self) -> &str {
        &self.floor_id
    }

    /// Host of the web app, used to recognise a completed login
    pub fn host(&self) -> &str {
        self.base_url.host_str().unwrap_or_default()
    }

    /// Page where the login flow starts
    pub fn login_url(&self) -> Result<Url> {
        self.with_path(LOGIN_PATH)
    }

    /// Booking dashboard for the given window.
    ///
    /// Query parameters: `floorId`, `viewType`, `areaType`, `startTime`,
    /// `endTime`, `isFullDay`, each exactly once and always in that order.
    pub fn dashboard_url(&self, window: &BookingWindow) -> Result<Url> {
        let mut url = self.with_path(&["office", self.office_id.as_str(), "bookings", "dashboard"])?;

        url.query_pairs_mut()
            .clear()
            .append_pair("floorId", &self.floor_id)
            .append_pair("viewType", VIEW_TYPE)
            .append_pair("areaType", AREA_TYPE)
            .append_pair("startTime", &window.start_ms.to_string())
            .append_pair("endTime", &window.end_ms.to_string())
            .append_pair("isFullDay", "true");

        Ok(url)
    }

    fn with_path(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| Error::Configuration(format!("{} cannot be a base URL", self.base_url)))?
            .clear()
            .extend(segments);
        Ok(url)
    }
}
