use crate::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Mutex;

/// Field labels on the secret-store item
pub const USERNAME_FIELD: &str = "username";
pub const PASSWORD_FIELD: &str = "password";

/// Source of login credentials and one-time codes
pub trait SecretStore: Send + Sync {
    /// Value of a labelled field on `item`
    fn field(&self, item: &str, field: &str) -> Result<String>;

    /// A current time-based one-time code for `item`
    fn otp(&self, item: &str) -> Result<String>;
}

/// Login for the identity provider
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn fetch<S: SecretStore + ?Sized>(store: &S, item: &str) -> Result<Self> {
        let email = store.field(item, USERNAME_FIELD)?;
        let password = store.field(item, PASSWORD_FIELD)?;
        tracing::info!("Fetched credentials for {} from item {}", email, item);
        Ok(Self { email, password })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Prefix of a one-time code that is safe to log
pub fn otp_hint(code: &str) -> String {
    let prefix: String = code.chars().take(3).collect();
    format!("{}...", prefix)
}

/// 1Password via the `op` command-line tool
pub struct OnePasswordCli {
    binary: PathBuf,
    vault: Option<String>,
}

impl OnePasswordCli {
    /// Locate `op` on the PATH
    pub fn new(vault: Option<String>) -> Result<Self> {
        let binary = which::which("op").map_err(|e| {
            Error::Configuration(format!("1Password CLI `op` not found on PATH: {}", e))
        })?;
        tracing::debug!("Using 1Password CLI at {}", binary.display());
        Ok(Self { binary, vault })
    }

    fn item_get(&self, item: &str, args: &[&str]) -> Result<String> {
        let mut command = Command::new(&self.binary);
        command.args(["item", "get", item]).args(args);
        if let Some(vault) = &self.vault {
            command.args(["--vault", vault]);
        }

        let output = command
            .output()
            .map_err(|e| Error::Configuration(format!("Failed to run op: {}", e)))?;

        if !output.status.success() {
            return Err(Error::Configuration(format!(
                "op item get {} {} failed: {}",
                item,
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if value.is_empty() {
            return Err(Error::Configuration(format!(
                "op item get {} {} returned nothing",
                item,
                args.join(" ")
            )));
        }
        Ok(value)
    }
}

impl SecretStore for OnePasswordCli {
    fn field(&self, item: &str, field: &str) -> Result<String> {
        self.item_get(item, &["--fields", &format!("label={}", field)])
    }

    fn otp(&self, item: &str) -> Result<String> {
        self.item_get(item, &["--otp"])
    }
}

/// Fixed secrets, for tests and dry runs
pub struct StaticSecrets {
    email: String,
    password: String,
    otp: String,
    otp_requests: Mutex<usize>,
}

impl StaticSecrets {
    pub fn new(email: impl Into<String>, password: impl Into<String>, otp: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            otp: otp.into(),
            otp_requests: Mutex::new(0),
        }
    }

    /// How many one-time codes have been handed out
    pub fn otp_requests(&self) -> usize {
        *self.otp_requests.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SecretStore for StaticSecrets {
    fn field(&self, item: &str, field: &str) -> Result<String> {
        match field {
            USERNAME_FIELD => Ok(self.email.clone()),
            PASSWORD_FIELD => Ok(self.password.clone()),
            _ => Err(Error::Configuration(format!("Item {} has no field {}", item, field))),
        }
    }

    fn otp(&self, _item: &str) -> Result<String> {
        *self.otp_requests.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) += 1;
        Ok(self.otp.clone())
    }
}
