pub mod import;
pub mod init;
pub mod report;
pub mod rules;
pub mod status;
pub mod transactions;

use clap::{ArgAction, Parser, Subcommand};

use crate::categorizer::MatchPolicy;
use crate::session::UserRole;

#[derive(Parser)]
#[command(
    name = "hqledger",
    version,
    about = "Import bank transactions and tag them with your own rules."
)]
pub struct Cli {
    /// Act as this role instead of the one in settings
    #[arg(long, global = true, value_enum)]
    pub role: Option<UserRole>,
    /// Which rule wins when several match
    #[arg(long, global = true, value_enum)]
    pub policy: Option<MatchPolicy>,
    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for data (default: ~/Documents/hqledger)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Import a transactions CSV and tag it with the stored rules.
    Import {
        /// CSV with columns date, description, merchant_name, amount, type, category, tags, notes
        file: String,
    },
    /// Manage tagging rules.
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
    /// List transactions, newest first.
    Transactions {
        /// Only show this category
        #[arg(long)]
        category: Option<String>,
    },
    /// List categories in use.
    Categories,
    /// Generate reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Show the current database and summary counts.
    Status,
    /// Print shell completions.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum RulesCommands {
    /// Add a tagging rule. Every given field must match for the rule to apply.
    Add {
        /// Case-sensitive substring of the description
        #[arg(long)]
        keyword: Option<String>,
        /// Exact merchant name
        #[arg(long)]
        merchant: Option<String>,
        /// Lowest matching amount (inclusive)
        #[arg(long = "min", allow_negative_numbers = true)]
        min_amount: Option<f64>,
        /// Highest matching amount (inclusive)
        #[arg(long = "max", allow_negative_numbers = true)]
        max_amount: Option<f64>,
        /// Category to assign
        #[arg(long)]
        category: Option<String>,
        /// Tags to assign, pipe separated: 'online|q1'
        #[arg(long)]
        tags: Option<String>,
    },
    /// List rules in evaluation order.
    List,
    /// Delete a rule by ID. Unknown IDs are ignored.
    Delete {
        id: i64,
    },
    /// Re-run rules over stored transactions.
    Apply {
        /// Also re-tag transactions that already have a category or tags
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Monthly inflow and outflow.
    Cashflow {
        #[arg(long)]
        year: Option<i32>,
    },
}
