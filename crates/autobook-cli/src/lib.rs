use autobook_core::RawSettings;
use autobook_core::env;
use clap::{Args, ValueEnum};

pub mod commands;
pub mod logging;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Pretty => "pretty",
            OutputFormat::Json => "json",
        }
    }
}

/// Where and what to book. Each flag falls back to an environment variable.
#[derive(Args, Debug, Clone, Default)]
pub struct BookingArgs {
    /// Deskbird office identifier
    #[arg(long, env = env::OFFICE_ID)]
    pub office_id: Option<String>,

    /// Deskbird floor identifier
    #[arg(long, env = env::FLOOR_ID)]
    pub floor_id: Option<String>,

    /// Preferred desk, e.g. "5.09 D"; any free desk is booked otherwise
    #[arg(long, env = env::PREFERRED_DESK)]
    pub desk: Option<String>,

    /// Base URL of the Deskbird web app
    #[arg(long, env = env::DESKBIRD_URL)]
    pub base_url: Option<String>,

    /// 1Password item with the login
    #[arg(long, env = env::OP_ITEM_NAME)]
    pub op_item: Option<String>,

    /// 1Password vault containing the item
    #[arg(long, env = env::OP_VAULT)]
    pub op_vault: Option<String>,
}

impl BookingArgs {
    pub fn raw_settings(&self) -> RawSettings {
        RawSettings {
            op_item: self.op_item.clone(),
            op_vault: self.op_vault.clone(),
            office_id: self.office_id.clone(),
            floor_id: self.floor_id.clone(),
            preferred_desk: self.desk.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

/// Environment variable reference appended to `--help`
pub fn env_help() -> String {
    let mut help = String::from("ENVIRONMENT:\n");
    for var in env::ALL {
        let mut line = format!("  {:<22} {}", var.name, var.description);
        if var.required {
            line.push_str(" (required)");
        }
        if let Some(default) = var.default {
            line.push_str(&format!(" [default: {}]", default));
        }
        help.push_str(&line);
        help.push('\n');
    }
    help
}
