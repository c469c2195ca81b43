use anyhow::Result;
use autobook_cli::commands::book::BookOptions;
use autobook_cli::{BookingArgs, OutputFormat, commands, env_help};
use autobook_core::env;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "autobook")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Book a Deskbird desk one week ahead, unattended",
    long_about = "Autobook signs in to Deskbird through Microsoft single sign-on, opens the \
                  booking dashboard seven days out and books your preferred desk, or any free desk."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = env::LOG_LEVEL, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and book a desk for the same weekday next week
    Book {
        #[command(flatten)]
        target: BookingArgs,

        /// Path to Chrome or Chromium
        #[arg(long, env = env::CHROME_PATH, value_name = "PATH")]
        chrome_path: Option<PathBuf>,

        /// Keep the browser profile here between runs
        #[arg(long, env = env::PROFILE_DIR, value_name = "DIR")]
        profile_dir: Option<PathBuf>,

        /// Where to write diagnostic screenshots
        #[arg(long, env = env::SCREENSHOT_DIR, value_name = "DIR")]
        screenshot_dir: Option<PathBuf>,

        /// Show the browser window
        #[arg(long)]
        headed: bool,
    },

    /// Show the booking window and dashboard URL without booking
    Plan {
        #[command(flatten)]
        target: BookingArgs,

        /// Output format
        #[arg(long, value_enum, default_value = "pretty")]
        format: OutputFormat,
    },

    /// Generate shell completion scripts
    #[command(long_about = "Generate shell completion scripts for autobook.\n\n\
                            SUPPORTED SHELLS: bash, zsh, fish, powershell, elvish")]
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let matches = Cli::command()
        .mut_subcommand("book", |cmd| cmd.after_long_help(env_help()))
        .get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    autobook_cli::logging::init_logging(cli.verbose, &cli.log_level);

    match cli.command {
        Commands::Book {
            target,
            chrome_path,
            profile_dir,
            screenshot_dir,
            headed,
        } => commands::book::execute(
            &target,
            BookOptions {
                chrome_path,
                profile_dir,
                screenshot_dir,
                headed,
            },
        ),
        Commands::Plan { target, format } => commands::plan::execute(&target, format),
        Commands::Completion { shell } => commands::completion::execute(shell, &mut Cli::command()),
    }
}
