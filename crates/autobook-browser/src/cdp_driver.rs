use crate::{BrowserDriver, Error, LaunchOptions, Locator, ProfileManager, Result, WindowHandle};
use async_trait::async_trait;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, Element, Page};
use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Attribute used to tag XPath results so they can be fetched by CSS
const MARK_ATTR: &str = "data-autobook-mark";

const CLICKABLE_JS: &str = "function() {
    const rect = this.getBoundingClientRect();
    const style = window.getComputedStyle(this);
    return !this.disabled
        && rect.width > 0
        && rect.height > 0
        && style.visibility !== 'hidden'
        && style.display !== 'none';
}";

const CLEAR_JS: &str = "function() {
    this.value = '';
    this.dispatchEvent(new Event('input', { bubbles: true }));
}";

/// Element handle shared between lookups
#[derive(Clone)]
pub struct CdpElement(Arc<Element>);

/// [`BrowserDriver`] backed by Chrome over the DevTools Protocol
pub struct CdpDriver {
    browser: Mutex<Browser>,
    page: Mutex<Page>,
    handler: JoinHandle<()>,
    marks: AtomicU64,
    _profile: ProfileManager,
}

impl CdpDriver {
    /// Start Chrome with `profile` as its user-data dir and open a blank page
    pub async fn launch(options: &LaunchOptions, profile: ProfileManager) -> Result<Self> {
        let config = options.browser_config(profile.path())?;

        tracing::info!(
            "Launching {} ({}, profile {})",
            options.chrome_path.display(),
            if options.headless { "headless" } else { "headed" },
            profile.path().display()
        );

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::Browser(format!("Failed to launch Chrome: {}", e)))?;

        // The handler stream must be polled for any command to complete
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        tracing::debug!("Browser ready");

        Ok(Self {
            browser: Mutex::new(browser),
            page: Mutex::new(page),
            handler,
            marks: AtomicU64::new(0),
            _profile: profile,
        })
    }

    async fn page(&self) -> Page {
        self.page.lock().await.clone()
    }

    /// Evaluate an XPath, tag every hit, then fetch the hits by attribute
    async fn find_xpath(&self, page: &Page, scope: Option<&CdpElement>, locator: &Locator) -> Result<Vec<Element>> {
        let xpath = match scope {
            Some(_) => locator.scoped_xpath(),
            None => match locator {
                Locator::XPath(path) => Some((*path).to_string()),
                _ => None,
            },
        }
        .ok_or_else(|| Error::Browser(format!("{} is not an XPath locator", locator)))?;

        let token = self.marks.fetch_add(1, Ordering::Relaxed);
        let literal = serde_json::to_string(&xpath)
            .map_err(|e| Error::Browser(format!("Cannot encode XPath {}: {}", xpath, e)))?;
        let tagger = format!(
            "function(root) {{
                const hits = document.evaluate({literal}, root, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
                for (let i = 0; i < hits.snapshotLength; i++) {{
                    const node = hits.snapshotItem(i);
                    if (node.setAttribute) node.setAttribute('{MARK_ATTR}', '{token}');
                }}
                return hits.snapshotLength;
            }}"
        );

        match scope {
            Some(element) => {
                element
                    .0
                    .call_js_fn(format!("function() {{ return ({tagger})(this); }}"), false)
                    .await?;
            }
            None => {
                page.evaluate_expression(EvaluateParams::new(format!("({tagger})(document)")))
                    .await?;
            }
        }

        Ok(page
            .find_elements(format!("[{MARK_ATTR}='{token}']"))
            .await?)
    }

    async fn call_bool(&self, element: &CdpElement, function: &str) -> Result<bool> {
        let returns = element.0.call_js_fn(function, false).await?;
        Ok(returns
            .result
            .value
            .and_then(|value| value.as_bool())
            .unwrap_or(false))
    }
}

#[async_trait]
impl BrowserDriver for CdpDriver {
    type Element = CdpElement;

    async fn goto(&self, url: &str) -> Result<()> {
        tracing::debug!("Navigating to {}", url);
        self.page().await.goto(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.page().await.url().await?.unwrap_or_default())
    }

    async fn find_all(&self, scope: Option<&CdpElement>, locator: &Locator) -> Result<Vec<CdpElement>> {
        let page = self.page().await;

        let elements = match (locator.to_css(), scope) {
            (Some(css), Some(scope)) => scope.0.find_elements(css).await?,
            (Some(css), None) => page.find_elements(css).await?,
            (None, scope) => self.find_xpath(&page, scope, locator).await?,
        };

        Ok(elements.into_iter().map(|e| CdpElement(Arc::new(e))).collect())
    }

    async fn is_clickable(&self, element: &CdpElement) -> Result<bool> {
        self.call_bool(element, CLICKABLE_JS).await
    }

    async fn click(&self, element: &CdpElement) -> Result<()> {
        element.0.click().await?;
        Ok(())
    }

    async fn clear(&self, element: &CdpElement) -> Result<()> {
        element.0.call_js_fn(CLEAR_JS, false).await?;
        Ok(())
    }

    async fn type_text(&self, element: &CdpElement, text: &str) -> Result<()> {
        element.0.focus().await?;
        element.0.type_str(text).await?;
        Ok(())
    }

    async fn is_checked(&self, element: &CdpElement) -> Result<bool> {
        Ok(element
            .0
            .property("checked")
            .await?
            .and_then(|value| value.as_bool())
            .unwrap_or(false))
    }

    async fn inner_text(&self, element: &CdpElement) -> Result<String> {
        Ok(element.0.inner_text().await?.unwrap_or_default())
    }

    async fn container_text(&self, element: &CdpElement, container: &str) -> Result<Option<String>> {
        let selector = serde_json::to_string(container)
            .map_err(|e| Error::Browser(format!("Cannot encode selector {}: {}", container, e)))?;
        let function = format!(
            "function() {{
                const card = this.closest({selector}) || this.parentElement;
                return card ? card.innerText : null;
            }}"
        );

        let returns = element.0.call_js_fn(function, false).await?;
        Ok(returns
            .result
            .value
            .and_then(|value| value.as_str().map(str::to_string)))
    }

    async fn scroll_into_view(&self, element: &CdpElement) -> Result<()> {
        element.0.scroll_into_view().await?;
        Ok(())
    }

    async fn window_handles(&self) -> Result<Vec<WindowHandle>> {
        let pages = self.browser.lock().await.pages().await?;
        Ok(pages
            .iter()
            .map(|page| WindowHandle::new(page.target_id().inner().clone()))
            .collect())
    }

    async fn current_window(&self) -> Result<WindowHandle> {
        let page = self.page().await;
        Ok(WindowHandle::new(page.target_id().inner().clone()))
    }

    async fn switch_to_window(&self, handle: &WindowHandle) -> Result<()> {
        let pages = self.browser.lock().await.pages().await?;
        let page = pages
            .into_iter()
            .find(|page| page.target_id().inner() == handle.as_str())
            .ok_or_else(|| Error::NoSuchWindow(handle.to_string()))?;

        tracing::debug!("Switched to window {}", handle);
        *self.page.lock().await = page;
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        let params = ScreenshotParams::builder().full_page(true).build();
        self.page().await.save_screenshot(params, path).await?;
        Ok(())
    }

    async fn page_source(&self) -> Result<String> {
        Ok(self.page().await.content().await?)
    }

    async fn quit(&self) -> Result<()> {
        let mut browser = self.browser.lock().await;
        let closed = browser.close().await;

        if let Err(e) = browser.wait().await {
            tracing::debug!("Waiting for browser exit failed: {}", e);
        }
        self.handler.abort();

        closed?;
        tracing::info!("Browser closed");
        Ok(())
    }
}

impl Drop for CdpDriver {
    fn drop(&mut self) {
        self.handler.abort();
    }
}
