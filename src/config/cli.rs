use crate::config::toml_config::DEFAULT_CONFIG_PATH;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "birthday-reminder")]
#[command(about = "Emails a reminder ahead of the birthdays you track")]
pub struct Cli {
    /// Path to TOML configuration file (falls back to MAIL_* environment variables)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the daily check once and exit
    Check {
        /// Pretend today is this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Log reminders instead of sending them
        #[arg(long)]
        dry_run: bool,
    },

    /// Run the daily check on schedule until interrupted
    Serve,

    /// Show upcoming birthdays
    List {
        /// Pretend today is this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Register a birthday
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// Birthday as MM-DD
        #[arg(long)]
        date: String,

        #[arg(long, default_value = "1")]
        notify_days_before: u32,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a birthday by id
    Remove { id: u64 },
}
