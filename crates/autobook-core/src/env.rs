//! Environment variables read by autobook.
//!
//! The CLI binds each of these to a flag, so a scheduler can configure a run
//! entirely through the environment.

pub const OP_ITEM_NAME: &str = "OP_ITEM_NAME";
pub const OP_VAULT: &str = "OP_VAULT";
pub const OFFICE_ID: &str = "OFFICE_ID";
pub const FLOOR_ID: &str = "FLOOR_ID";
pub const PREFERRED_DESK: &str = "PREFERRED_DESK";
pub const DESKBIRD_URL: &str = "DESKBIRD_URL";
pub const CHROME_PATH: &str = "CHROME_PATH";
pub const PROFILE_DIR: &str = "AUTOBOOK_PROFILE_DIR";
pub const SCREENSHOT_DIR: &str = "SCREENSHOT_DIR";
pub const LOG_LEVEL: &str = "LOG_LEVEL";

/// An environment variable definition
#[derive(Debug, Clone, Copy)]
pub struct EnvVar {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
    pub default: Option<&'static str>,
}

/// Every variable autobook understands, in the order they are documented
pub const ALL: &[EnvVar] = &[
    EnvVar {
        name: OP_ITEM_NAME,
        description: "1Password item holding the username, password and TOTP",
        required: false,
        default: Some("Deskbird"),
    },
    EnvVar {
        name: OP_VAULT,
        description: "1Password vault containing the item",
        required: false,
        default: None,
    },
    EnvVar {
        name: OFFICE_ID,
        description: "Deskbird office identifier",
        required: true,
        default: None,
    },
    EnvVar {
        name: FLOOR_ID,
        description: "Deskbird floor identifier",
        required: true,
        default: None,
    },
    EnvVar {
        name: PREFERRED_DESK,
        description: "Preferred desk, e.g. \"5.09 D\" or \"B\"",
        required: false,
        default: None,
    },
    EnvVar {
        name: DESKBIRD_URL,
        description: "Base URL of the Deskbird web app",
        required: false,
        default: Some(crate::config::DEFAULT_BASE_URL),
    },
    EnvVar {
        name: CHROME_PATH,
        description: "Chrome or Chromium binary to drive",
        required: false,
        default: None,
    },
    EnvVar {
        name: PROFILE_DIR,
        description: "Persistent browser profile directory",
        required: false,
        default: None,
    },
    EnvVar {
        name: SCREENSHOT_DIR,
        description: "Directory for diagnostic screenshots",
        required: false,
        default: None,
    },
    EnvVar {
        name: LOG_LEVEL,
        description: "Log verbosity (error, warn, info, debug, trace)",
        required: false,
        default: Some("info"),
    },
];

/// Look up a registered variable by name
pub fn lookup(name: &str) -> Option<&'static EnvVar> {
    ALL.iter().find(|var| var.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_vars_are_office_and_floor() {
        let required: Vec<_> = ALL.iter().filter(|v| v.required).map(|v| v.name).collect();
        assert_eq!(required, vec![OFFICE_ID, FLOOR_ID]);
    }

    #[test]
    fn test_lookup_finds_registered_var() {
        assert_eq!(lookup(OP_ITEM_NAME).unwrap().default, Some("Deskbird"));
        assert!(lookup("NOT_A_VAR").is_none());
    }
}
