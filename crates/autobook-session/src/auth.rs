use crate::diagnostics::{Diagnostics, Stage};
use crate::secrets::{Credentials, SecretStore, otp_hint};
use crate::{Error, Result, Timeouts, selectors};
use autobook_browser::{BrowserDriver, ChainMatch, Requirement, SelectorChain, Waiter, WindowHandle};
use autobook_core::BookingTarget;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Stages of the Microsoft single sign-on login, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    AwaitingEmailEntry,
    AwaitingSsoRedirect,
    AwaitingIdpEmail,
    AwaitingIdpPassword,
    AwaitingSecondFactorOrConsent,
    AwaitingPopupClose,
    Authenticated,
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            AuthState::AwaitingEmailEntry => "entering the login email",
            AuthState::AwaitingSsoRedirect => "redirecting to Microsoft sign-in",
            AuthState::AwaitingIdpEmail => "entering the Microsoft email",
            AuthState::AwaitingIdpPassword => "entering the Microsoft password",
            AuthState::AwaitingSecondFactorOrConsent => "completing the second factor",
            AuthState::AwaitingPopupClose => "waiting for the sign-in popup to close",
            AuthState::Authenticated => "authenticated",
        };
        f.write_str(description)
    }
}

/// What happened at the "stay signed in?" prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentOutcome {
    Accepted,
    Absent,
}

/// True once the browser is back on the app and off its login pages
pub fn is_authenticated_url(url: &str, app_host: &str) -> bool {
    let Ok(url) = Url::parse(url) else {
        return false;
    };

    let on_app = url
        .host_str()
        .is_some_and(|host| host.eq_ignore_ascii_case(app_host));
    let on_login = url
        .path_segments()
        .is_some_and(|mut segments| segments.any(|segment| segment == "login"));

    on_app && !on_login
}

/// Drives the browser through the login, one state per [`AuthMachine::step`].
///
/// Every transition waits for a page element with a bounded timeout. A
/// required element that never shows up aborts with
/// [`Error::AuthenticationTimeout`] naming the current state; optional ones
/// (the app's own sign-in button, the one-time code, the consent prompt) are
/// logged and skipped.
pub struct AuthMachine<'a, D: BrowserDriver + ?Sized, S: SecretStore + ?Sized> {
    waiter: Waiter<'a, D>,
    secrets: &'a S,
    op_item: &'a str,
    credentials: &'a Credentials,
    target: &'a BookingTarget,
    timeouts: Timeouts,
    diagnostics: Diagnostics,
    state: AuthState,
    origin: Option<WindowHandle>,
    popup: Option<WindowHandle>,
}

impl<'a, D: BrowserDriver + ?Sized, S: SecretStore + ?Sized> AuthMachine<'a, D, S> {
    pub fn new(
        driver: &'a D,
        secrets: &'a S,
        op_item: &'a str,
        credentials: &'a Credentials,
        target: &'a BookingTarget,
    ) -> Self {
        Self {
            waiter: Waiter::new(driver),
            secrets,
            op_item,
            credentials,
            target,
            timeouts: Timeouts::default(),
            diagnostics: Diagnostics::in_temp_dir(),
            state: AuthState::AwaitingEmailEntry,
            origin: None,
            popup: None,
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.waiter = Waiter::new(self.waiter.driver()).with_poll_interval(timeouts.poll);
        self.timeouts = timeouts;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Run until authenticated or a stage times out
    pub async fn run(&mut self) -> Result<()> {
        tracing::info!("Signing in as {}", self.credentials.email);
        while self.state != AuthState::Authenticated {
            self.step().await?;
        }
        Ok(())
    }

    /// Perform the current state's work and move to the next state
    pub async fn step(&mut self) -> Result<AuthState> {
        let next = match self.state {
            AuthState::AwaitingEmailEntry => self.enter_login_email().await?,
            AuthState::AwaitingSsoRedirect => self.open_identity_provider().await?,
            AuthState::AwaitingIdpEmail => self.enter_idp_email().await?,
            AuthState::AwaitingIdpPassword => self.enter_password().await?,
            AuthState::AwaitingSecondFactorOrConsent => self.complete_second_factor().await?,
            AuthState::AwaitingPopupClose => self.await_return_to_app().await?,
            AuthState::Authenticated => AuthState::Authenticated,
        };

        tracing::debug!("Auth {:?} -> {:?}", self.state, next);
        self.state = next;
        Ok(next)
    }

    async fn enter_login_email(&mut self) -> Result<AuthState> {
        let driver = self.waiter.driver();
        let login = self.target.login_url()?;

        tracing::info!("Opening {}", login);
        driver.goto(login.as_str()).await?;
        self.origin = Some(driver.current_window().await?);

        let email = self
            .require(&selectors::LOGIN_EMAIL, Requirement::Present, self.timeouts.login_page)
            .await?;
        self.diagnostics.screenshot(driver, Stage::Login).await;
        driver.type_text(&email, &self.credentials.email).await?;

        match self
            .waiter
            .chain(&selectors::SIGN_IN_BUTTON, Requirement::Clickable, self.timeouts.sign_in_button)
            .await
        {
            ChainMatch::Found { element, .. } => driver.click(&element).await?,
            ChainMatch::NotFound => tracing::debug!("No separate sign-in button"),
        }

        Ok(AuthState::AwaitingSsoRedirect)
    }

    async fn open_identity_provider(&mut self) -> Result<AuthState> {
        let driver = self.waiter.driver();
        let button = self
            .require(&selectors::SSO_BUTTON, Requirement::Clickable, self.timeouts.sso_button)
            .await?;

        let before = driver.window_handles().await?;
        driver.click(&button).await?;

        let opened = self
            .waiter
            .windows(|handles| handles.len() > before.len(), self.timeouts.popup_open)
            .await?
            .and_then(|handles| handles.into_iter().find(|h| !before.contains(h)));

        match opened {
            Some(popup) => {
                tracing::info!("Microsoft sign-in opened in a popup");
                driver.switch_to_window(&popup).await?;
                self.popup = Some(popup);
            }
            None => tracing::info!("No popup opened, continuing in the same window"),
        }

        self.diagnostics.screenshot(driver, Stage::IdentityProvider).await;
        Ok(AuthState::AwaitingIdpEmail)
    }

    async fn enter_idp_email(&mut self) -> Result<AuthState> {
        let driver = self.waiter.driver();
        let input = match self
            .waiter
            .chain(&selectors::IDP_EMAIL, Requirement::Present, self.timeouts.idp_email)
            .await
        {
            ChainMatch::Found { element, .. } => element,
            ChainMatch::NotFound => {
                // A remembered account can complete without any prompt
                if self.popup_closed().await? {
                    tracing::info!("Sign-in popup closed without prompting");
                    return Ok(AuthState::AwaitingPopupClose);
                }
                return Err(self.timed_out(self.timeouts.idp_email));
            }
        };

        driver.clear(&input).await?;
        driver.type_text(&input, &self.credentials.email).await?;

        let next = self
            .require(&selectors::IDP_NEXT, Requirement::Clickable, self.timeouts.idp_button)
            .await?;
        driver.click(&next).await?;

        Ok(AuthState::AwaitingIdpPassword)
    }

    async fn enter_password(&mut self) -> Result<AuthState> {
        let driver = self.waiter.driver();
        let input = self
            .require(&selectors::IDP_PASSWORD, Requirement::Present, self.timeouts.idp_password)
            .await?;
        driver.type_text(&input, &self.credentials.password).await?;

        let sign_in = self
            .require(&selectors::IDP_SIGN_IN, Requirement::Clickable, self.timeouts.idp_button)
            .await?;
        driver.click(&sign_in).await?;

        Ok(AuthState::AwaitingSecondFactorOrConsent)
    }

    async fn complete_second_factor(&mut self) -> Result<AuthState> {
        let driver = self.waiter.driver();

        match self
            .waiter
            .chain(&selectors::OTP_INPUT, Requirement::Present, self.timeouts.second_factor)
            .await
        {
            ChainMatch::Found { element: input, .. } => {
                let code = self.secrets.otp(self.op_item)?;
                tracing::info!("Entering one-time code {}", otp_hint(&code));

                driver.clear(&input).await?;
                driver.type_text(&input, &code).await?;

                let verify = self
                    .require(&selectors::OTP_VERIFY, Requirement::Clickable, self.timeouts.verify_button)
                    .await?;
                driver.click(&verify).await?;
            }
            ChainMatch::NotFound => {
                tracing::info!("No one-time code requested");
                if self.popup_closed().await? {
                    return Ok(AuthState::AwaitingPopupClose);
                }
            }
        }

        let consent = self.accept_consent().await?;
        tracing::debug!("Consent prompt: {:?}", consent);
        Ok(AuthState::AwaitingPopupClose)
    }

    async fn accept_consent(&self) -> Result<ConsentOutcome> {
        match self
            .waiter
            .chain(&selectors::STAY_SIGNED_IN, Requirement::Clickable, self.timeouts.consent)
            .await
        {
            ChainMatch::Found { element, .. } => {
                self.waiter.driver().click(&element).await?;
                tracing::info!("Accepted 'stay signed in'");
                Ok(ConsentOutcome::Accepted)
            }
            ChainMatch::NotFound => {
                tracing::info!("No 'stay signed in' prompt");
                Ok(ConsentOutcome::Absent)
            }
        }
    }

    async fn await_return_to_app(&mut self) -> Result<AuthState> {
        let driver = self.waiter.driver();

        if let Some(popup) = self.popup.take() {
            let closed = self
                .waiter
                .windows(|handles| !handles.contains(&popup), self.timeouts.popup_close)
                .await?;
            if closed.is_none() {
                self.popup = Some(popup);
                return Err(self.timed_out(self.timeouts.popup_close));
            }
            tracing::info!("Sign-in popup closed");

            if let Some(origin) = &self.origin {
                driver.switch_to_window(origin).await?;
            }
        }

        let host = self.target.host().to_string();
        let url = self
            .waiter
            .url(|url| is_authenticated_url(url, &host), self.timeouts.authenticated)
            .await?
            .ok_or_else(|| self.timed_out(self.timeouts.authenticated))?;

        tracing::info!("Authenticated, now at {}", url);
        self.diagnostics.screenshot(driver, Stage::Authenticated).await;
        Ok(AuthState::Authenticated)
    }

    /// Wait for a chain that must match for the login to continue
    async fn require(
        &self,
        chain: &SelectorChain,
        requirement: Requirement,
        timeout: Duration,
    ) -> Result<D::Element> {
        match self.waiter.chain(chain, requirement, timeout).await {
            ChainMatch::Found { element, .. } => Ok(element),
            ChainMatch::NotFound => {
                tracing::error!("{} not found while {}", chain.name(), self.state);
                Err(self.timed_out(timeout))
            }
        }
    }

    async fn popup_closed(&self) -> Result<bool> {
        match &self.popup {
            Some(popup) => Ok(!self.waiter.driver().window_handles().await?.contains(popup)),
            None => Ok(false),
        }
    }

    fn timed_out(&self, waited: Duration) -> Error {
        Error::AuthenticationTimeout {
            stage: self.state,
            waited,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::StaticSecrets;
    use autobook_browser::Locator;
    use autobook_browser::fake::{FakeBrowser, FakeEffect, FakeElement, FakePage};

    const APP: &str = "https://app.deskbird.com";
    const IDP: &str = "https://login.microsoftonline.com/common/oauth2";

    struct Fixture {
        secrets: StaticSecrets,
        credentials: Credentials,
        target: BookingTarget,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                secrets: StaticSecrets::new("user@example.com", "s3cret", "123456"),
                credentials: Credentials {
                    email: "user@example.com".to_string(),
                    password: "s3cret".to_string(),
                },
                target: BookingTarget::new(Url::parse(APP).unwrap(), "14205", "41424"),
            }
        }

        fn machine<'a>(&'a self, browser: &'a FakeBrowser, state: AuthState) -> AuthMachine<'a, FakeBrowser, StaticSecrets> {
            let mut machine = AuthMachine::new(
                browser,
                &self.secrets,
                "Deskbird",
                &self.credentials,
                &self.target,
            );
            machine.state = state;
            machine
        }
    }

    fn button(key: &str, locator: Locator) -> FakeElement {
        FakeElement::new(key).matching(locator)
    }

    #[test]
    fn test_authenticated_url() {
        assert!(is_authenticated_url("https://app.deskbird.com/home", "app.deskbird.com"));
        assert!(is_authenticated_url(
            "https://app.deskbird.com/office/1/bookings/dashboard",
            "app.deskbird.com"
        ));
        assert!(!is_authenticated_url(
            "https://app.deskbird.com/login/check-in",
            "app.deskbird.com"
        ));
        assert!(!is_authenticated_url(IDP, "app.deskbird.com"));
        assert!(!is_authenticated_url("about:blank", "app.deskbird.com"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_email_entered_and_sign_in_clicked() {
        let fixture = Fixture::new();
        let browser = FakeBrowser::new("about:blank");
        browser.add(button("email", Locator::Name("email")));
        browser.add(button(
            "continue",
            Locator::XPath("//button[normalize-space(.)='Continue']"),
        ));

        let mut machine = fixture.machine(&browser, AuthState::AwaitingEmailEntry);
        let next = machine.step().await.unwrap();

        assert_eq!(next, AuthState::AwaitingSsoRedirect);
        assert_eq!(browser.current_url().await.unwrap(), "https://app.deskbird.com/login/check-in");
        assert_eq!(browser.value("email").as_deref(), Some("user@example.com"));
        assert_eq!(browser.clicks(), vec!["continue"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_login_email_times_out() {
        let fixture = Fixture::new();
        let browser = FakeBrowser::new("about:blank");

        let mut machine = fixture.machine(&browser, AuthState::AwaitingEmailEntry);
        let err = machine.step().await.unwrap_err();

        match err {
            Error::AuthenticationTimeout { stage, waited } => {
                assert_eq!(stage, AuthState::AwaitingEmailEntry);
                assert_eq!(waited, Duration::from_secs(10));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(machine.state(), AuthState::AwaitingEmailEntry);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sso_switches_into_popup() {
        let fixture = Fixture::new();
        let browser = FakeBrowser::new(format!("{APP}/login/check-in"));
        browser.add(
            button("sso", Locator::XPath("//button[contains(., 'Sign in with Microsoft')]"))
                .on_click(FakeEffect::OpenWindow(FakePage::new(IDP))),
        );

        let mut machine = fixture.machine(&browser, AuthState::AwaitingSsoRedirect);
        let next = machine.step().await.unwrap();

        assert_eq!(next, AuthState::AwaitingIdpEmail);
        assert_eq!(browser.current_url().await.unwrap(), IDP);
        assert_eq!(machine.popup, Some(WindowHandle::new("window-1")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sso_without_popup_stays_in_window() {
        let fixture = Fixture::new();
        let browser = FakeBrowser::new(format!("{APP}/login/check-in"));
        browser.add(
            button("sso", Locator::Css("button[data-provider='microsoft']"))
                .on_click(FakeEffect::Navigate(IDP.to_string())),
        );

        let mut machine = fixture.machine(&browser, AuthState::AwaitingSsoRedirect);
        let next = machine.step().await.unwrap();

        assert_eq!(next, AuthState::AwaitingIdpEmail);
        assert!(machine.popup.is_none());
        assert_eq!(browser.current_window().await.unwrap(), WindowHandle::new("window-0"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idp_email_is_cleared_before_typing() {
        let fixture = Fixture::new();
        let browser = FakeBrowser::new(IDP);
        browser.add(button("loginfmt", Locator::Name("loginfmt")));
        browser.add(button("next", Locator::Css("#idSIButton9")));

        let input = browser.element("loginfmt");
        browser.type_text(&input, "stale@example.com").await.unwrap();

        let mut machine = fixture.machine(&browser, AuthState::AwaitingIdpEmail);
        let next = machine.step().await.unwrap();

        assert_eq!(next, AuthState::AwaitingIdpPassword);
        assert_eq!(browser.value("loginfmt").as_deref(), Some("user@example.com"));
        assert_eq!(browser.clicks(), vec!["next"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_password_entered() {
        let fixture = Fixture::new();
        let browser = FakeBrowser::new(IDP);
        browser.add(button("passwd", Locator::Name("passwd")));
        browser.add(button(
            "sign-in",
            Locator::XPath("//input[@type='submit' and @value='Sign in']"),
        ));

        let mut machine = fixture.machine(&browser, AuthState::AwaitingIdpPassword);
        let next = machine.step().await.unwrap();

        assert_eq!(next, AuthState::AwaitingSecondFactorOrConsent);
        assert_eq!(browser.value("passwd").as_deref(), Some("s3cret"));
        assert_eq!(browser.clicks(), vec!["sign-in"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_otp_then_consent() {
        let fixture = Fixture::new();
        let browser = FakeBrowser::new(IDP);
        browser.add(button("otc", Locator::Name("otc")));
        browser.add(button(
            "verify",
            Locator::XPath("//input[@type='submit' and @value='Verify']"),
        ));
        browser.add(button(
            "yes",
            Locator::XPath("//input[@type='submit' and @value='Yes']"),
        ));

        let mut machine = fixture.machine(&browser, AuthState::AwaitingSecondFactorOrConsent);
        let next = machine.step().await.unwrap();

        assert_eq!(next, AuthState::AwaitingPopupClose);
        assert_eq!(browser.value("otc").as_deref(), Some("123456"));
        assert_eq!(browser.clicks(), vec!["verify", "yes"]);
        assert_eq!(fixture.secrets.otp_requests(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_otp_and_no_consent_is_not_an_error() {
        let fixture = Fixture::new();
        let browser = FakeBrowser::new(IDP);

        let mut machine = fixture.machine(&browser, AuthState::AwaitingSecondFactorOrConsent);
        let next = machine.step().await.unwrap();

        assert_eq!(next, AuthState::AwaitingPopupClose);
        assert!(browser.clicks().is_empty());
        assert_eq!(fixture.secrets.otp_requests(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_consent_without_otp() {
        let fixture = Fixture::new();
        let browser = FakeBrowser::new(IDP);
        browser.add(button("yes", Locator::Css("#acceptButton")));

        let mut machine = fixture.machine(&browser, AuthState::AwaitingSecondFactorOrConsent);
        machine.step().await.unwrap();

        assert_eq!(browser.clicks(), vec!["yes"]);
        assert_eq!(fixture.secrets.otp_requests(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_otp_without_verify_button_times_out() {
        let fixture = Fixture::new();
        let browser = FakeBrowser::new(IDP);
        browser.add(button("otc", Locator::Css("input[type='tel']")));

        let mut machine = fixture.machine(&browser, AuthState::AwaitingSecondFactorOrConsent);
        let err = machine.step().await.unwrap_err();

        assert!(matches!(
            err,
            Error::AuthenticationTimeout {
                stage: AuthState::AwaitingSecondFactorOrConsent,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_to_origin_after_popup_closes() {
        let fixture = Fixture::new();
        let browser = FakeBrowser::new(format!("{APP}/login/check-in"));
        browser.add(
            button("sso", Locator::Css("#sso")).on_click(FakeEffect::OpenWindow(
                FakePage::new(IDP).with(
                    button("yes", Locator::Css("#acceptButton"))
                        .on_click(FakeEffect::NavigateMain(format!("{APP}/home")))
                        .on_click(FakeEffect::CloseWindow),
                ),
            )),
        );
        browser.click(&browser.element("sso")).await.unwrap();
        let popup = WindowHandle::new("window-1");
        browser.switch_to_window(&popup).await.unwrap();
        browser.click(&browser.element("yes")).await.unwrap();

        let mut machine = fixture.machine(&browser, AuthState::AwaitingPopupClose);
        machine.origin = Some(WindowHandle::new("window-0"));
        machine.popup = Some(popup);
        let next = machine.step().await.unwrap();

        assert_eq!(next, AuthState::Authenticated);
        assert_eq!(browser.current_window().await.unwrap(), WindowHandle::new("window-0"));
        assert_eq!(browser.current_url().await.unwrap(), format!("{APP}/home"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_popup_that_never_closes_times_out() {
        let fixture = Fixture::new();
        let browser = FakeBrowser::new(format!("{APP}/login/check-in"));
        browser.add(button("sso", Locator::Css("#sso")).on_click(FakeEffect::OpenWindow(FakePage::new(IDP))));
        browser.click(&browser.element("sso")).await.unwrap();

        let mut machine = fixture.machine(&browser, AuthState::AwaitingPopupClose);
        machine.origin = Some(WindowHandle::new("window-0"));
        machine.popup = Some(WindowHandle::new("window-1"));
        let err = machine.step().await.unwrap_err();

        match err {
            Error::AuthenticationTimeout { stage, waited } => {
                assert_eq!(stage, AuthState::AwaitingPopupClose);
                assert_eq!(waited, Duration::from_secs(30));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_still_on_login_page_times_out() {
        let fixture = Fixture::new();
        let browser = FakeBrowser::new(format!("{APP}/login/check-in"));

        let mut machine = fixture.machine(&browser, AuthState::AwaitingPopupClose);
        let err = machine.step().await.unwrap_err();

        assert!(matches!(
            err,
            Error::AuthenticationTimeout { waited, .. } if waited == Duration::from_secs(60)
        ));
    }
}
