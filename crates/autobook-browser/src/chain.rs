use crate::{BrowserDriver, Locator};

/// What an element must satisfy to count as a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Present in the DOM
    Present,
    /// Present, visible and enabled
    Clickable,
}

/// Outcome of resolving a selector chain
#[derive(Debug)]
pub enum ChainMatch<E> {
    Found {
        /// Position of the winning locator in the chain
        index: usize,
        locator: Locator,
        element: E,
    },
    NotFound,
}

impl<E> ChainMatch<E> {
    pub fn is_found(&self) -> bool {
        matches!(self, ChainMatch::Found { .. })
    }

    pub fn into_element(self) -> Option<E> {
        match self {
            ChainMatch::Found { element, .. } => Some(element),
            ChainMatch::NotFound => None,
        }
    }
}

/// Ordered fallback locators for one UI control.
///
/// Locators are tried in order and the first one yielding an element that
/// meets the requirement wins; later locators are not consulted.
#[derive(Debug, Clone, Copy)]
pub struct SelectorChain {
    name: &'static str,
    locators: &'static [Locator],
}

impl SelectorChain {
    pub const fn new(name: &'static str, locators: &'static [Locator]) -> Self {
        Self { name, locators }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn locators(&self) -> &'static [Locator] {
        self.locators
    }

    /// Single pass over the chain, without waiting.
    ///
    /// Lookup errors are treated as a miss for that locator.
    pub async fn resolve<D>(
        &self,
        driver: &D,
        scope: Option<&D::Element>,
        requirement: Requirement,
    ) -> ChainMatch<D::Element>
    where
        D: BrowserDriver + ?Sized,
    {
        for (index, locator) in self.locators.iter().enumerate() {
            let candidates = match driver.find_all(scope, locator).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    tracing::debug!("{}: lookup {} failed: {}", self.name, locator, e);
                    continue;
                }
            };

            for element in candidates {
                if Self::satisfies(driver, &element, requirement).await {
                    tracing::debug!("{}: matched {} (#{})", self.name, locator, index + 1);
                    return ChainMatch::Found {
                        index,
                        locator: *locator,
                        element,
                    };
                }
            }

            tracing::trace!("{}: no {:?} match for {}", self.name, requirement, locator);
        }

        ChainMatch::NotFound
    }

    async fn satisfies<D>(driver: &D, element: &D::Element, requirement: Requirement) -> bool
    where
        D: BrowserDriver + ?Sized,
    {
        match requirement {
            Requirement::Present => true,
            Requirement::Clickable => driver.is_clickable(element).await.unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeBrowser, FakeCall, FakeElement};

    static CHAIN: &[Locator] = &[
        Locator::Css("#first"),
        Locator::Name("second"),
        Locator::XPath("//third"),
        Locator::Css("#fourth"),
    ];

    fn lookups(browser: &FakeBrowser) -> Vec<Locator> {
        browser
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                FakeCall::Find(locator) => Some(locator),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_stops_at_first_matching_locator() {
        let browser = FakeBrowser::new("https://example.com");
        browser.add(FakeElement::new("third").matching(Locator::XPath("//third")));
        browser.add(FakeElement::new("fourth").matching(Locator::Css("#fourth")));

        let chain = SelectorChain::new("test", CHAIN);
        let result = chain.resolve(&browser, None, Requirement::Present).await;

        match result {
            ChainMatch::Found { index, locator, element } => {
                assert_eq!(index, 2);
                assert_eq!(locator, Locator::XPath("//third"));
                assert_eq!(element.key(), "third");
            }
            ChainMatch::NotFound => panic!("expected a match"),
        }
        assert_eq!(lookups(&browser), CHAIN[..3].to_vec());
    }

    #[tokio::test]
    async fn test_not_found_after_trying_every_locator() {
        let browser = FakeBrowser::new("https://example.com");

        let chain = SelectorChain::new("test", CHAIN);
        let result = chain.resolve(&browser, None, Requirement::Present).await;

        assert!(!result.is_found());
        assert_eq!(lookups(&browser), CHAIN.to_vec());
    }

    #[tokio::test]
    async fn test_clickable_skips_disabled_elements() {
        let browser = FakeBrowser::new("https://example.com");
        browser.add(
            FakeElement::new("disabled")
                .matching(Locator::Css("#first"))
                .clickable(false),
        );
        browser.add(FakeElement::new("enabled").matching(Locator::Name("second")));

        let chain = SelectorChain::new("test", CHAIN);

        let present = chain.resolve(&browser, None, Requirement::Present).await;
        assert_eq!(present.into_element().unwrap().key(), "disabled");

        let clickable = chain.resolve(&browser, None, Requirement::Clickable).await;
        assert_eq!(clickable.into_element().unwrap().key(), "enabled");
    }

    #[tokio::test]
    async fn test_scope_limits_candidates() {
        let browser = FakeBrowser::new("https://example.com");
        browser.add(FakeElement::new("widget").matching(Locator::Css("#widget")));
        browser.add(FakeElement::new("outside").matching(Locator::Css("#first")));
        browser.add(
            FakeElement::new("inside")
                .matching(Locator::Css("#fourth"))
                .inside("widget"),
        );

        let widget = browser.element("widget");
        let chain = SelectorChain::new("test", CHAIN);
        let result = chain.resolve(&browser, Some(&widget), Requirement::Present).await;

        assert_eq!(result.into_element().unwrap().key(), "inside");
    }
}
