//! Locators for the Deskbird and Microsoft sign-in pages.
//!
//! Each chain lists the most specific locator first. Markup on both sites
//! changes without notice, so broader fallbacks follow.

use autobook_browser::{Locator, SelectorChain};

pub static LOGIN_EMAIL: SelectorChain = SelectorChain::new(
    "login email",
    &[Locator::Name("email"), Locator::Css("input[type='email']")],
);

pub static SIGN_IN_BUTTON: SelectorChain = SelectorChain::new(
    "sign-in button",
    &[
        Locator::XPath("//button[normalize-space(.)='Sign in']"),
        Locator::XPath("//button[normalize-space(.)='Continue']"),
    ],
);

pub static SSO_BUTTON: SelectorChain = SelectorChain::new(
    "Microsoft sign-in button",
    &[
        Locator::XPath("//button[contains(., 'Sign in with Microsoft')]"),
        Locator::XPath("//button[contains(., 'Microsoft')]"),
        Locator::Css("button[data-provider='microsoft']"),
    ],
);

pub static IDP_EMAIL: SelectorChain = SelectorChain::new(
    "Microsoft email",
    &[Locator::Name("loginfmt"), Locator::Css("input[type='email']")],
);

pub static IDP_NEXT: SelectorChain = SelectorChain::new(
    "Microsoft next button",
    &[
        Locator::XPath("//input[@type='submit' and @value='Next']"),
        Locator::Css("#idSIButton9"),
    ],
);

pub static IDP_PASSWORD: SelectorChain = SelectorChain::new(
    "Microsoft password",
    &[Locator::Name("passwd"), Locator::Css("input[type='password']")],
);

pub static IDP_SIGN_IN: SelectorChain = SelectorChain::new(
    "Microsoft sign-in button",
    &[
        Locator::XPath("//input[@type='submit' and @value='Sign in']"),
        Locator::Css("#idSIButton9"),
    ],
);

pub static OTP_INPUT: SelectorChain = SelectorChain::new(
    "one-time code",
    &[Locator::Name("otc"), Locator::Css("input[type='tel']")],
);

pub static OTP_VERIFY: SelectorChain = SelectorChain::new(
    "verify button",
    &[
        Locator::XPath("//input[@type='submit' and @value='Verify']"),
        Locator::Css("#idSubmit_SAOTCC_Continue"),
    ],
);

// No #idSIButton9 here: it is still on screen right after the password step
pub static STAY_SIGNED_IN: SelectorChain = SelectorChain::new(
    "stay signed in",
    &[
        Locator::XPath("//input[@type='submit' and @value='Yes']"),
        Locator::XPath("//button[normalize-space(.)='Yes']"),
        Locator::Css("#acceptButton"),
    ],
);

pub static NO_BOOKINGS_MARKER: SelectorChain = SelectorChain::new(
    "no bookings marker",
    &[
        Locator::XPath("//*[contains(text(), 'No bookings')]"),
        Locator::XPath("//*[contains(text(), 'no bookings')]"),
        Locator::Css("[data-testid='empty-bookings']"),
    ],
);

pub static BOOKING_CARD_MARKER: SelectorChain = SelectorChain::new(
    "booking card",
    &[
        Locator::Css("[data-testid='booking-card']"),
        Locator::XPath("//*[contains(@class, 'booking-card')]"),
        Locator::XPath("//button[contains(., 'Check in')]"),
    ],
);

pub static MY_SPACES_WIDGET: SelectorChain = SelectorChain::new(
    "my spaces widget",
    &[
        Locator::Css("[data-testid='my-spaces']"),
        Locator::XPath("//*[contains(@class, 'my-spaces')]"),
        Locator::XPath("//*[./*[self::h1 or self::h2 or self::h3][contains(., 'My spaces')]]"),
    ],
);

pub static QUICK_BOOK: SelectorChain = SelectorChain::new(
    "quick book button",
    &[
        Locator::XPath("//button[contains(., 'Quick book')]"),
        Locator::Css("button[data-testid='quick-book']"),
        Locator::XPath("//button[@aria-label='Quick book']"),
    ],
);

pub static FULL_DAY_TOGGLE: SelectorChain = SelectorChain::new(
    "full day toggle",
    &[
        Locator::Css("input[type='checkbox'][name='isFullDay']"),
        Locator::XPath("//label[contains(., 'Full day')]//input[@type='checkbox']"),
        Locator::XPath("//*[contains(text(), 'Full day')]/following::input[@type='checkbox'][1]"),
    ],
);

/// Closest ancestor of a quick-book button that holds one desk's details
pub const DESK_CARD: &str = "[class*='card']";
