use crate::{BrowserDriver, ChainMatch, Requirement, Result, SelectorChain, WindowHandle};
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Bounded polling against a driver.
///
/// Every wait re-checks its condition each poll interval until it holds or
/// the timeout elapses. The condition is always checked at least once.
pub struct Waiter<'a, D: BrowserDriver + ?Sized> {
    driver: &'a D,
    poll: Duration,
}

impl<'a, D: BrowserDriver + ?Sized> Waiter<'a, D> {
    pub fn new(driver: &'a D) -> Self {
        Self {
            driver,
            poll: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }

    pub fn driver(&self) -> &'a D {
        self.driver
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll
    }

    /// Wait for any locator of the chain to yield a matching element
    pub async fn chain(
        &self,
        chain: &SelectorChain,
        requirement: Requirement,
        timeout: Duration,
    ) -> ChainMatch<D::Element> {
        self.chain_within(chain, None, requirement, timeout).await
    }

    /// Like [`Waiter::chain`], restricted to descendants of `scope`
    pub async fn chain_within(
        &self,
        chain: &SelectorChain,
        scope: Option<&D::Element>,
        requirement: Requirement,
        timeout: Duration,
    ) -> ChainMatch<D::Element> {
        let deadline = Instant::now() + timeout;

        loop {
            let result = chain.resolve(self.driver, scope, requirement).await;
            if result.is_found() {
                return result;
            }
            if Instant::now() >= deadline {
                tracing::debug!("{}: nothing matched within {:?}", chain.name(), timeout);
                return ChainMatch::NotFound;
            }
            tokio::time::sleep(self.poll).await;
        }
    }

    /// Wait until the current URL satisfies `predicate`; returns that URL
    pub async fn url<F>(&self, predicate: F, timeout: Duration) -> Result<Option<String>>
    where
        F: Fn(&str) -> bool,
    {
        let deadline = Instant::now() + timeout;

        loop {
            let url = self.driver.current_url().await?;
            if predicate(&url) {
                return Ok(Some(url));
            }
            if Instant::now() >= deadline {
                tracing::debug!("URL condition not met within {:?}, last URL {}", timeout, url);
                return Ok(None);
            }
            tokio::time::sleep(self.poll).await;
        }
    }

    /// Wait until the set of open windows satisfies `predicate`
    pub async fn windows<F>(&self, predicate: F, timeout: Duration) -> Result<Option<Vec<WindowHandle>>>
    where
        F: Fn(&[WindowHandle]) -> bool,
    {
        let deadline = Instant::now() + timeout;

        loop {
            let handles = self.driver.window_handles().await?;
            if predicate(&handles) {
                return Ok(Some(handles));
            }
            if Instant::now() >= deadline {
                tracing::debug!(
                    "Window condition not met within {:?} ({} open)",
                    timeout,
                    handles.len()
                );
                return Ok(None);
            }
            tokio::time::sleep(self.poll).await;
        }
    }
}
