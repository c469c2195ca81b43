use crate::{Result, Timeouts, selectors};
use autobook_browser::{BrowserDriver, ChainMatch, Requirement, Waiter};
use autobook_core::DeskDescriptor;
use std::fmt;
use tokio::time::Instant;

/// The desk whose quick-book action was invoked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeskSelection {
    /// The configured desk, found in "my spaces"
    Preferred { desk: DeskDescriptor, card: String },
    /// First bookable desk on the page
    AnyDesk { card: Option<String> },
}

impl fmt::Display for DeskSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeskSelection::Preferred { desk, .. } => write!(f, "desk {}", desk),
            DeskSelection::AnyDesk { card: Some(card) } => {
                write!(f, "first available desk ({})", first_line(card))
            }
            DeskSelection::AnyDesk { card: None } => write!(f, "first available desk"),
        }
    }
}

fn first_line(text: &str) -> &str {
    text.lines().map(str::trim).find(|line| !line.is_empty()).unwrap_or("")
}

enum Scan<E> {
    Matched(E, String),
    /// Cards were listed but none is the preferred desk
    NoMatch,
    /// The widget or its buttons have not rendered yet
    Empty,
}

/// Books the preferred desk if it is listed, otherwise the first bookable one
pub struct DeskMatcher<'w, 'a, D: BrowserDriver + ?Sized> {
    waiter: &'w Waiter<'a, D>,
    timeouts: &'w Timeouts,
}

impl<'w, 'a, D: BrowserDriver + ?Sized> DeskMatcher<'w, 'a, D> {
    pub fn new(waiter: &'w Waiter<'a, D>, timeouts: &'w Timeouts) -> Self {
        Self { waiter, timeouts }
    }

    /// Click a quick-book button. `None` when neither tier finds one.
    pub async fn select(&self, preferred: Option<&DeskDescriptor>) -> Result<Option<DeskSelection>> {
        if let Some(desk) = preferred {
            if let Some(selection) = self.book_preferred(desk).await? {
                return Ok(Some(selection));
            }
            tracing::info!("Desk {} is not available, booking any desk", desk);
        }

        self.book_any().await
    }

    /// Look for the desk among the "my spaces" cards only
    pub async fn book_preferred(&self, desk: &DeskDescriptor) -> Result<Option<DeskSelection>> {
        let driver = self.waiter.driver();
        let deadline = Instant::now() + self.timeouts.my_spaces;

        let (button, card) = loop {
            match self.scan_my_spaces(desk).await {
                Scan::Matched(button, card) => break (button, card),
                Scan::NoMatch => return Ok(None),
                Scan::Empty if Instant::now() >= deadline => {
                    tracing::warn!("No desks listed under my spaces");
                    return Ok(None);
                }
                Scan::Empty => tokio::time::sleep(self.waiter.poll_interval()).await,
            }
        };

        tracing::info!("Booking preferred desk {}", desk);
        driver.scroll_into_view(&button).await?;
        driver.click(&button).await?;

        Ok(Some(DeskSelection::Preferred {
            desk: desk.clone(),
            card,
        }))
    }

    async fn scan_my_spaces(&self, desk: &DeskDescriptor) -> Scan<D::Element> {
        let driver = self.waiter.driver();
        let widget = match selectors::MY_SPACES_WIDGET
            .resolve(driver, None, Requirement::Present)
            .await
        {
            ChainMatch::Found { element, .. } => element,
            ChainMatch::NotFound => return Scan::Empty,
        };

        let mut seen = 0;
        for locator in selectors::QUICK_BOOK.locators() {
            let buttons = match driver.find_all(Some(&widget), locator).await {
                Ok(buttons) => buttons,
                Err(e) => {
                    tracing::debug!("Quick book lookup {} failed: {}", locator, e);
                    continue;
                }
            };

            for button in buttons {
                seen += 1;
                let card = match driver.container_text(&button, selectors::DESK_CARD).await {
                    Ok(Some(card)) => card,
                    Ok(None) => continue,
                    Err(e) => {
                        tracing::debug!("Could not read desk card: {}", e);
                        continue;
                    }
                };

                if !desk.matches_card(&card) {
                    tracing::trace!("Skipping card {:?}", first_line(&card));
                    continue;
                }

                match driver.is_clickable(&button).await {
                    Ok(true) => return Scan::Matched(button, card),
                    Ok(false) => tracing::info!("Desk {} is listed but cannot be booked", desk),
                    Err(e) => tracing::debug!("Could not check quick book button: {}", e),
                }
            }
        }

        if seen == 0 {
            Scan::Empty
        } else {
            tracing::debug!("Checked {} cards under my spaces", seen);
            Scan::NoMatch
        }
    }

    /// First clickable quick-book button anywhere on the page
    pub async fn book_any(&self) -> Result<Option<DeskSelection>> {
        let driver = self.waiter.driver();
        let button = match self
            .waiter
            .chain(&selectors::QUICK_BOOK, Requirement::Clickable, self.timeouts.quick_book)
            .await
        {
            ChainMatch::Found { element, .. } => element,
            ChainMatch::NotFound => return Ok(None),
        };

        let card = driver
            .container_text(&button, selectors::DESK_CARD)
            .await
            .ok()
            .flatten();

        driver.scroll_into_view(&button).await?;
        driver.click(&button).await?;
        tracing::info!("Clicked quick book");

        Ok(Some(DeskSelection::AnyDesk { card }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autobook_browser::Locator;
    use autobook_browser::fake::{FakeBrowser, FakeElement};
    use std::time::Duration;

    const DASHBOARD: &str = "https://app.deskbird.com/office/1/bookings/dashboard";
    const QUICK_BOOK: Locator = Locator::XPath("//button[contains(., 'Quick book')]");

    fn browser_with_my_spaces(cards: &[(&str, &str)]) -> FakeBrowser {
        let browser = FakeBrowser::new(DASHBOARD);
        browser.add(FakeElement::new("my-spaces").matching(Locator::Css("[data-testid='my-spaces']")));
        for (key, card) in cards {
            browser.add(
                FakeElement::new(*key)
                    .matching(QUICK_BOOK)
                    .inside("my-spaces")
                    .in_card(*card),
            );
        }
        browser
    }

    #[tokio::test(start_paused = true)]
    async fn test_books_matching_card_in_my_spaces() {
        let browser = browser_with_my_spaces(&[
            ("desk-a", "A\nDesk 5.09\nQuick book"),
            ("desk-d", "D\nDesk 5.09\nQuick book"),
        ]);
        browser.add(FakeElement::new("elsewhere").matching(QUICK_BOOK).in_card("D\nDesk 5.09"));

        let waiter = Waiter::new(&browser);
        let timeouts = Timeouts::default();
        let desk = DeskDescriptor::parse("5.09 D").unwrap();

        let selection = DeskMatcher::new(&waiter, &timeouts)
            .select(Some(&desk))
            .await
            .unwrap()
            .unwrap();

        assert!(matches!(selection, DeskSelection::Preferred { .. }));
        assert_eq!(browser.clicks(), vec!["desk-d"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_falls_back_when_preferred_desk_missing() {
        let browser = browser_with_my_spaces(&[("desk-a", "A\nDesk 5.09")]);
        browser.add(FakeElement::new("other").matching(Locator::Css("button[data-testid='quick-book']")));

        let waiter = Waiter::new(&browser);
        let timeouts = Timeouts::default();
        let desk = DeskDescriptor::parse("B").unwrap();

        let selection = DeskMatcher::new(&waiter, &timeouts)
            .select(Some(&desk))
            .await
            .unwrap()
            .unwrap();

        assert!(matches!(selection, DeskSelection::AnyDesk { .. }));
        // The any-desk chain prefers the "Quick book" XPath, which also hits the card
        assert_eq!(browser.clicks(), vec!["desk-a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_preferred_desk_falls_back_to_free_desk() {
        let browser = FakeBrowser::new(DASHBOARD);
        browser.add(FakeElement::new("my-spaces").matching(Locator::Css("[data-testid='my-spaces']")));
        browser.add(
            FakeElement::new("desk-d")
                .matching(QUICK_BOOK)
                .inside("my-spaces")
                .in_card("D\nDesk 5.09")
                .clickable(false),
        );
        browser.add(FakeElement::new("free-desk").matching(QUICK_BOOK).in_card("B\nDesk 5.21"));

        let waiter = Waiter::new(&browser);
        let timeouts = Timeouts::default();
        let desk = DeskDescriptor::parse("5.09 D").unwrap();

        let started = Instant::now();
        let selection = DeskMatcher::new(&waiter, &timeouts)
            .select(Some(&desk))
            .await
            .unwrap()
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(
            selection,
            DeskSelection::AnyDesk {
                card: Some("B\nDesk 5.21".to_string())
            }
        );
        assert_eq!(browser.clicks(), vec!["free-desk"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrelated_book_buttons_are_ignored() {
        let browser = FakeBrowser::new(DASHBOARD);
        browser.add(FakeElement::new("room").matching(Locator::XPath("//button[contains(., 'Book')]")));
        browser.add(FakeElement::new("details").matching(Locator::XPath("//button[contains(., 'Booking details')]")));

        let waiter = Waiter::new(&browser);
        let timeouts = Timeouts::default();
        let selection = DeskMatcher::new(&waiter, &timeouts).select(None).await.unwrap();

        assert!(selection.is_none());
        assert!(browser.clicks().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_widget_falls_back_after_timeout() {
        let browser = FakeBrowser::new(DASHBOARD);
        browser.add(FakeElement::new("any").matching(QUICK_BOOK).in_card("C\nDesk 5.14"));

        let waiter = Waiter::new(&browser);
        let timeouts = Timeouts::default();
        let desk = DeskDescriptor::parse("D").unwrap();

        let started = Instant::now();
        let selection = DeskMatcher::new(&waiter, &timeouts)
            .select(Some(&desk))
            .await
            .unwrap()
            .unwrap();

        assert!(started.elapsed() >= Duration::from_secs(10));
        assert_eq!(selection.to_string(), "first available desk (C)");
        assert_eq!(browser.clicks(), vec!["any"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_preference_skips_my_spaces() {
        let browser = browser_with_my_spaces(&[("desk-d", "D\nDesk 5.09")]);

        let waiter = Waiter::new(&browser);
        let timeouts = Timeouts::default();
        let started = Instant::now();
        let selection = DeskMatcher::new(&waiter, &timeouts).select(None).await.unwrap();

        assert!(matches!(selection, Some(DeskSelection::AnyDesk { .. })));
        assert!(started.elapsed() < Duration::from_millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_bookable() {
        let browser = FakeBrowser::new(DASHBOARD);
        browser.add(FakeElement::new("disabled").matching(QUICK_BOOK).clickable(false));

        let waiter = Waiter::new(&browser);
        let timeouts = Timeouts::default();
        let selection = DeskMatcher::new(&waiter, &timeouts).select(None).await.unwrap();

        assert!(selection.is_none());
        assert!(browser.clicks().is_empty());
    }
}
