//! In-memory browser for exercising booking flows without Chrome.
//!
//! Pages are flat lists of elements keyed by a test-chosen name. An element
//! matches the locators it was declared with, may sit inside another element
//! (for scoped lookups) and can trigger effects when clicked, such as opening
//! a popup or revealing another element. Every driver call is recorded.

use crate::{BrowserDriver, Error, Locator, Result, WindowHandle};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Something that happens when an element is clicked
#[derive(Debug, Clone)]
pub enum FakeEffect {
    /// Open a new window with this content (focus stays where it was)
    OpenWindow(FakePage),
    /// Close the window containing the clicked element
    CloseWindow,
    /// Navigate the window containing the clicked element
    Navigate(String),
    /// Navigate the first window, e.g. an opener reacting to a popup
    NavigateMain(String),
    /// Make a hidden element visible
    Reveal(String),
}

/// Content of a window opened by [`FakeEffect::OpenWindow`]
#[derive(Debug, Clone)]
pub struct FakePage {
    url: String,
    elements: Vec<FakeElement>,
}

impl FakePage {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            elements: Vec::new(),
        }
    }

    pub fn with(mut self, element: FakeElement) -> Self {
        self.elements.push(element);
        self
    }
}

#[derive(Debug, Clone)]
pub struct FakeElement {
    key: String,
    locators: Vec<Locator>,
    parent: Option<String>,
    text: String,
    container_text: Option<String>,
    visible: bool,
    clickable: bool,
    checkbox: bool,
    checked: bool,
    value: String,
    on_click: Vec<FakeEffect>,
}

impl FakeElement {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            locators: Vec::new(),
            parent: None,
            text: String::new(),
            container_text: None,
            visible: true,
            clickable: true,
            checkbox: false,
            checked: false,
            value: String::new(),
            on_click: Vec::new(),
        }
    }

    pub fn matching(mut self, locator: Locator) -> Self {
        self.locators.push(locator);
        self
    }

    pub fn inside(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Text reported for the element's enclosing card
    pub fn in_card(mut self, text: impl Into<String>) -> Self {
        self.container_text = Some(text.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn clickable(mut self, clickable: bool) -> Self {
        self.clickable = clickable;
        self
    }

    pub fn checkbox(mut self, checked: bool) -> Self {
        self.checkbox = true;
        self.checked = checked;
        self
    }

    pub fn on_click(mut self, effect: FakeEffect) -> Self {
        self.on_click.push(effect);
        self
    }
}

/// Reference to an element in a fake window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeHandle {
    window: WindowHandle,
    key: String,
}

impl FakeHandle {
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// A recorded driver call
#[derive(Debug, Clone, PartialEq)]
pub enum FakeCall {
    Goto(String),
    Find(Locator),
    Click(String),
    Clear(String),
    Type(String, String),
    ScrollIntoView(String),
    SwitchTo(WindowHandle),
    Screenshot(PathBuf),
    PageSource,
    Quit,
}

struct FakeWindow {
    handle: WindowHandle,
    url: String,
    elements: Vec<FakeElement>,
}

struct FakeState {
    windows: Vec<FakeWindow>,
    current: WindowHandle,
    opened: usize,
    page_source: Option<String>,
    calls: Vec<FakeCall>,
    quit: bool,
}

impl FakeState {
    fn window(&self, handle: &WindowHandle) -> Result<&FakeWindow> {
        self.windows
            .iter()
            .find(|w| &w.handle == handle)
            .ok_or_else(|| Error::NoSuchWindow(handle.to_string()))
    }

    fn window_mut(&mut self, handle: &WindowHandle) -> Result<&mut FakeWindow> {
        self.windows
            .iter_mut()
            .find(|w| &w.handle == handle)
            .ok_or_else(|| Error::NoSuchWindow(handle.to_string()))
    }

    fn element(&self, handle: &FakeHandle) -> Result<&FakeElement> {
        let element = self
            .window(&handle.window)?
            .elements
            .iter()
            .find(|e| e.key == handle.key)
            .ok_or_else(|| Error::Browser(format!("stale element {}", handle.key)))?;
        if !element.visible {
            return Err(Error::Browser(format!("element {} is not displayed", handle.key)));
        }
        Ok(element)
    }

    fn element_mut(&mut self, handle: &FakeHandle) -> Result<&mut FakeElement> {
        self.window_mut(&handle.window)?
            .elements
            .iter_mut()
            .find(|e| e.key == handle.key)
            .ok_or_else(|| Error::Browser(format!("stale element {}", handle.key)))
    }

    fn open(&mut self, page: FakePage) {
        self.opened += 1;
        self.windows.push(FakeWindow {
            handle: WindowHandle::new(format!("window-{}", self.opened)),
            url: page.url,
            elements: page.elements,
        });
    }

    fn apply(&mut self, origin: &WindowHandle, effect: FakeEffect) {
        match effect {
            FakeEffect::OpenWindow(page) => self.open(page),
            FakeEffect::CloseWindow => self.windows.retain(|w| &w.handle != origin),
            FakeEffect::Navigate(url) => {
                if let Ok(window) = self.window_mut(origin) {
                    window.url = url;
                }
            }
            FakeEffect::NavigateMain(url) => {
                if let Some(window) = self.windows.first_mut() {
                    window.url = url;
                }
            }
            FakeEffect::Reveal(key) => {
                for element in self.windows.iter_mut().flat_map(|w| w.elements.iter_mut()) {
                    if element.key == key {
                        element.visible = true;
                    }
                }
            }
        }
    }
}

fn is_descendant(elements: &[FakeElement], element: &FakeElement, ancestor: &str) -> bool {
    let mut parent = element.parent.as_deref();
    while let Some(key) = parent {
        if key == ancestor {
            return true;
        }
        parent = elements
            .iter()
            .find(|e| e.key == key)
            .and_then(|e| e.parent.as_deref());
    }
    false
}

/// Scriptable in-memory [`BrowserDriver`]
pub struct FakeBrowser {
    state: Mutex<FakeState>,
}

impl FakeBrowser {
    /// A browser with one window showing `url`
    pub fn new(url: impl Into<String>) -> Self {
        let handle = WindowHandle::new("window-0");
        Self {
            state: Mutex::new(FakeState {
                windows: vec![FakeWindow {
                    handle: handle.clone(),
                    url: url.into(),
                    elements: Vec::new(),
                }],
                current: handle,
                opened: 0,
                page_source: None,
                calls: Vec::new(),
                quit: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add an element to the first window
    pub fn add(&self, element: FakeElement) {
        let mut state = self.lock();
        if let Some(window) = state.windows.first_mut() {
            window.elements.push(element);
        }
    }

    /// Handle for an element in any open window.
    ///
    /// # Panics
    ///
    /// Panics if no open window contains `key`.
    pub fn element(&self, key: &str) -> FakeHandle {
        let state = self.lock();
        state
            .windows
            .iter()
            .find(|w| w.elements.iter().any(|e| e.key == key))
            .map(|w| FakeHandle {
                window: w.handle.clone(),
                key: key.to_string(),
            })
            .unwrap_or_else(|| panic!("no element {}", key))
    }

    pub fn set_page_source(&self, source: impl Into<String>) {
        self.lock().page_source = Some(source.into());
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.lock().calls.clone()
    }

    /// Keys of clicked elements, in order
    pub fn clicks(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                FakeCall::Click(key) => Some(key),
                _ => None,
            })
            .collect()
    }

    /// Current value of a text input
    pub fn value(&self, key: &str) -> Option<String> {
        let state = self.lock();
        state
            .windows
            .iter()
            .flat_map(|w| w.elements.iter())
            .find(|e| e.key == key)
            .map(|e| e.value.clone())
    }

    pub fn checked(&self, key: &str) -> Option<bool> {
        let state = self.lock();
        state
            .windows
            .iter()
            .flat_map(|w| w.elements.iter())
            .find(|e| e.key == key)
            .map(|e| e.checked)
    }

    pub fn window_count(&self) -> usize {
        self.lock().windows.len()
    }

    pub fn is_quit(&self) -> bool {
        self.lock().quit
    }

    fn record(&self, call: FakeCall) -> MutexGuard<'_, FakeState> {
        let mut state = self.lock();
        state.calls.push(call);
        state
    }
}

#[async_trait]
impl BrowserDriver for FakeBrowser {
    type Element = FakeHandle;

    async fn goto(&self, url: &str) -> Result<()> {
        let mut state = self.record(FakeCall::Goto(url.to_string()));
        let current = state.current.clone();
        state.window_mut(&current)?.url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let state = self.lock();
        Ok(state.window(&state.current)?.url.clone())
    }

    async fn find_all(&self, scope: Option<&FakeHandle>, locator: &Locator) -> Result<Vec<FakeHandle>> {
        let state = self.record(FakeCall::Find(*locator));
        let window = state.window(&state.current)?;

        if let Some(scope) = scope {
            if scope.window != window.handle {
                return Ok(Vec::new());
            }
        }

        Ok(window
            .elements
            .iter()
            .filter(|e| e.visible && e.locators.contains(locator))
            .filter(|e| match scope {
                Some(scope) => is_descendant(&window.elements, e, &scope.key),
                None => true,
            })
            .map(|e| FakeHandle {
                window: window.handle.clone(),
                key: e.key.clone(),
            })
            .collect())
    }

    async fn is_clickable(&self, element: &FakeHandle) -> Result<bool> {
        let state = self.lock();
        Ok(state.element(element)?.clickable)
    }

    async fn click(&self, element: &FakeHandle) -> Result<()> {
        let mut state = self.record(FakeCall::Click(element.key.clone()));
        let effects = state.element(element)?.on_click.clone();

        let target = state.element_mut(element)?;
        if target.checkbox {
            target.checked = !target.checked;
        }

        for effect in effects {
            state.apply(&element.window, effect);
        }
        Ok(())
    }

    async fn clear(&self, element: &FakeHandle) -> Result<()> {
        let mut state = self.record(FakeCall::Clear(element.key.clone()));
        state.element(element)?;
        state.element_mut(element)?.value.clear();
        Ok(())
    }

    async fn type_text(&self, element: &FakeHandle, text: &str) -> Result<()> {
        let mut state = self.record(FakeCall::Type(element.key.clone(), text.to_string()));
        state.element(element)?;
        state.element_mut(element)?.value.push_str(text);
        Ok(())
    }

    async fn is_checked(&self, element: &FakeHandle) -> Result<bool> {
        let state = self.lock();
        Ok(state.element(element)?.checked)
    }

    async fn inner_text(&self, element: &FakeHandle) -> Result<String> {
        let state = self.lock();
        Ok(state.element(element)?.text.clone())
    }

    async fn container_text(&self, element: &FakeHandle, _container: &str) -> Result<Option<String>> {
        let state = self.lock();
        let found = state.element(element)?;
        if let Some(text) = &found.container_text {
            return Ok(Some(text.clone()));
        }

        let window = state.window(&element.window)?;
        Ok(found.parent.as_ref().and_then(|parent| {
            window
                .elements
                .iter()
                .find(|e| &e.key == parent)
                .map(|e| e.text.clone())
        }))
    }

    async fn scroll_into_view(&self, element: &FakeHandle) -> Result<()> {
        let state = self.record(FakeCall::ScrollIntoView(element.key.clone()));
        state.element(element)?;
        Ok(())
    }

    async fn window_handles(&self) -> Result<Vec<WindowHandle>> {
        Ok(self.lock().windows.iter().map(|w| w.handle.clone()).collect())
    }

    async fn current_window(&self) -> Result<WindowHandle> {
        let state = self.lock();
        Ok(state.window(&state.current)?.handle.clone())
    }

    async fn switch_to_window(&self, handle: &WindowHandle) -> Result<()> {
        let mut state = self.record(FakeCall::SwitchTo(handle.clone()));
        state.window(handle)?;
        state.current = handle.clone();
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        let _state = self.record(FakeCall::Screenshot(path.to_path_buf()));
        Ok(())
    }

    async fn page_source(&self) -> Result<String> {
        let state = self.record(FakeCall::PageSource);
        if let Some(source) = &state.page_source {
            return Ok(source.clone());
        }

        let window = state.window(&state.current)?;
        let body: Vec<&str> = window
            .elements
            .iter()
            .filter(|e| e.visible)
            .map(|e| e.text.as_str())
            .collect();
        Ok(format!("<html><body>{}</body></html>", body.join("\n")))
    }

    async fn quit(&self) -> Result<()> {
        let mut state = self.record(FakeCall::Quit);
        state.quit = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_popup_lifecycle() {
        let browser = FakeBrowser::new("https://app.example.com/login");
        browser.add(
            FakeElement::new("sso")
                .matching(Locator::Css("#sso"))
                .on_click(FakeEffect::OpenWindow(
                    FakePage::new("https://idp.example.com").with(
                        FakeElement::new("done")
                            .matching(Locator::Css("#done"))
                            .on_click(FakeEffect::NavigateMain("https://app.example.com/home".into()))
                            .on_click(FakeEffect::CloseWindow),
                    ),
                )),
        );

        let main = browser.current_window().await.unwrap();
        browser.click(&browser.element("sso")).await.unwrap();
        let handles = browser.window_handles().await.unwrap();
        assert_eq!(handles.len(), 2);

        browser.switch_to_window(&handles[1]).await.unwrap();
        let done = browser.find_all(None, &Locator::Css("#done")).await.unwrap();
        browser.click(&done[0]).await.unwrap();

        assert_eq!(browser.window_count(), 1);
        assert!(browser.current_url().await.is_err());

        browser.switch_to_window(&main).await.unwrap();
        assert_eq!(browser.current_url().await.unwrap(), "https://app.example.com/home");
    }

    #[tokio::test]
    async fn test_hidden_elements_are_not_found_until_revealed() {
        let browser = FakeBrowser::new("https://example.com");
        browser.add(FakeElement::new("later").matching(Locator::Css("#later")).hidden());
        browser.add(
            FakeElement::new("trigger")
                .matching(Locator::Css("#trigger"))
                .on_click(FakeEffect::Reveal("later".into())),
        );

        assert!(browser.find_all(None, &Locator::Css("#later")).await.unwrap().is_empty());
        browser.click(&browser.element("trigger")).await.unwrap();
        assert_eq!(browser.find_all(None, &Locator::Css("#later")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_checkbox_toggles_and_inputs_record_text() {
        let browser = FakeBrowser::new("https://example.com");
        browser.add(FakeElement::new("box").checkbox(false));
        browser.add(FakeElement::new("input"));

        let checkbox = browser.element("box");
        browser.click(&checkbox).await.unwrap();
        assert!(browser.is_checked(&checkbox).await.unwrap());

        let input = browser.element("input");
        browser.type_text(&input, "old").await.unwrap();
        browser.clear(&input).await.unwrap();
        browser.type_text(&input, "new").await.unwrap();
        assert_eq!(browser.value("input").as_deref(), Some("new"));
    }
}
