mod categorizer;
mod cli;
mod db;
mod error;
mod fmt;
mod importer;
mod models;
mod reports;
mod rules;
mod session;
mod settings;
mod transactions;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ReportCommands, RulesCommands};
use models::NewRule;
use session::Session;

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let session = Session::new(&settings::load_settings(), cli.role, cli.policy);

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Import { file } => cli::import::run(&session, &file),
        Commands::Rules { command } => match command {
            RulesCommands::Add {
                keyword,
                merchant,
                min_amount,
                max_amount,
                category,
                tags,
            } => cli::rules::add(
                &session,
                NewRule {
                    keyword,
                    merchant,
                    min_amount,
                    max_amount,
                    category,
                    tags: cli::rules::tags_arg(tags.as_deref()),
                },
            ),
            RulesCommands::List => cli::rules::list(&session),
            RulesCommands::Delete { id } => cli::rules::delete(&session, id),
            RulesCommands::Apply { all } => cli::rules::apply(&session, all),
        },
        Commands::Transactions { category } => {
            cli::transactions::list(&session, category.as_deref())
        }
        Commands::Categories => cli::transactions::categories(&session),
        Commands::Report { command } => match command {
            ReportCommands::Cashflow { year } => cli::report::cashflow(&session, year),
        },
        Commands::Status => cli::status::run(&session),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "hqledger", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
