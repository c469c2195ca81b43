use crate::{BookingTarget, DeskDescriptor, Error, Result, env};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://app.deskbird.com";
pub const DEFAULT_OP_ITEM: &str = "Deskbird";

/// Settings as they arrive from flags or the environment, before validation
#[derive(Debug, Clone, Default)]
pub struct RawSettings {
    pub op_item: Option<String>,
    pub op_vault: Option<String>,
    pub office_id: Option<String>,
    pub floor_id: Option<String>,
    pub preferred_desk: Option<String>,
    pub base_url: Option<String>,
}

/// Validated configuration for one booking run
#[derive(Debug, Clone)]
pub struct BookingConfig {
    pub op_item: String,
    pub op_vault: Option<String>,
    pub target: BookingTarget,
    /// The preferred desk as configured, kept for logging
    pub preferred_desk_spec: Option<String>,
    /// Parsed preferred desk; `None` when unset or unparseable
    pub preferred_desk: Option<DeskDescriptor>,
}

impl BookingConfig {
    /// Validate raw settings. Fails when office or floor is missing.
    pub fn from_raw(raw: RawSettings) -> Result<Self> {
        let office_id = required(raw.office_id, env::OFFICE_ID)?;
        let floor_id = required(raw.floor_id, env::FLOOR_ID)?;

        let base_url = non_blank(raw.base_url).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&base_url).map_err(|e| {
            Error::Configuration(format!("{} is not a valid URL: {}", env::DESKBIRD_URL, e))
        })?;
        if base_url.host_str().is_none() {
            return Err(Error::Configuration(format!(
                "{} must include a host: {}",
                env::DESKBIRD_URL,
                base_url
            )));
        }

        let preferred_desk_spec = non_blank(raw.preferred_desk);
        let preferred_desk = preferred_desk_spec.as_deref().and_then(|spec| {
            let parsed = DeskDescriptor::parse(spec);
            if parsed.is_none() {
                tracing::warn!(
                    "Ignoring unparseable preferred desk '{}', any free desk will be booked",
                    spec
                );
            }
            parsed
        });

        Ok(Self {
            op_item: non_blank(raw.op_item).unwrap_or_else(|| DEFAULT_OP_ITEM.to_string()),
            op_vault: non_blank(raw.op_vault),
            target: BookingTarget::new(base_url, office_id, floor_id),
            preferred_desk_spec,
            preferred_desk,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    non_blank(value).ok_or_else(|| {
        let description = env::lookup(name).map(|v| v.description).unwrap_or("setting");
        Error::Configuration(format!("{} is not set ({})", name, description))
    })
}
