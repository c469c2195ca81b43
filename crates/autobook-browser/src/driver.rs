use crate::{Locator, Result};
use async_trait::async_trait;
use std::fmt;
use std::path::Path;

/// Identifies a top-level browsing context (tab or popup)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WindowHandle(String);

impl WindowHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Operations the booking flow needs from a browser.
///
/// Element lookups never fail because nothing matched; they return an empty
/// list. Errors are reserved for a broken browser connection or a stale
/// element.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    type Element: Send + Sync;

    /// Navigate the current window
    async fn goto(&self, url: &str) -> Result<()>;

    /// URL of the current window
    async fn current_url(&self) -> Result<String>;

    /// All elements matching `locator`, in document order, optionally
    /// restricted to descendants of `scope`
    async fn find_all(
        &self,
        scope: Option<&Self::Element>,
        locator: &Locator,
    ) -> Result<Vec<Self::Element>>;

    /// Visible and enabled, i.e. a click would land on it
    async fn is_clickable(&self, element: &Self::Element) -> Result<bool>;

    async fn click(&self, element: &Self::Element) -> Result<()>;

    /// Empty a text input
    async fn clear(&self, element: &Self::Element) -> Result<()>;

    /// Focus the element and type into it
    async fn type_text(&self, element: &Self::Element, text: &str) -> Result<()>;

    async fn is_checked(&self, element: &Self::Element) -> Result<bool>;

    /// Rendered text of the element
    async fn inner_text(&self, element: &Self::Element) -> Result<String>;

    /// Rendered text of the closest ancestor matching the CSS `container`
    /// selector, or of the parent when no ancestor matches
    async fn container_text(&self, element: &Self::Element, container: &str)
    -> Result<Option<String>>;

    async fn scroll_into_view(&self, element: &Self::Element) -> Result<()>;

    /// Open top-level windows, in no particular order
    async fn window_handles(&self) -> Result<Vec<WindowHandle>>;

    async fn current_window(&self) -> Result<WindowHandle>;

    /// Direct subsequent commands at another window
    async fn switch_to_window(&self, handle: &WindowHandle) -> Result<()>;

    /// Save a PNG of the current window
    async fn screenshot(&self, path: &Path) -> Result<()>;

    /// Serialized DOM of the current window
    async fn page_source(&self) -> Result<String>;

    /// Close the browser and release its resources
    async fn quit(&self) -> Result<()>;
}
