use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use spendlog::{
    clock::SystemClock,
    config::{BackendKind, CliArgs, Command, Config},
    ledger::{LedgerError, LedgerService},
    report,
    sqlite_storage::SqliteStorage,
    storage::{InMemoryStorage, StorageBackend},
};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("failed to encode view: {0}")]
    Json(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();
    let config = Config::load(&cli);
    init_logging(&config);

    match run(&config, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Ledger(LedgerError::Validation(e))) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(config: &Config, command: Command) -> Result<(), CliError> {
    let storage: Arc<dyn StorageBackend> = match config.storage.backend {
        BackendKind::Sqlite => Arc::new(SqliteStorage::open(&config.storage.path).map_err(LedgerError::from)?),
        BackendKind::Memory => Arc::new(InMemoryStorage::new()),
    };
    tracing::info!(backend = ?config.storage.backend, path = %config.storage.path, "Opening ledger");

    let ledger = LedgerService::new(storage, Arc::new(SystemClock));
    ledger.initialize().await?;
    ledger.load().await?;

    match command {
        Command::Add { amount, category, note } => {
            let id = ledger.add_expense(amount, &category, note.as_deref()).await?;
            println!("Added expense {}", id);
        }
        Command::Edit { id, amount, category, note } => {
            ledger.update_expense(id, amount, &category, note.as_deref()).await?;
            println!("Updated expense {}", id);
        }
        Command::Rm { id } => {
            ledger.delete_expense(id).await?;
            println!("Deleted expense {}", id);
        }
        Command::List => {
            let records = ledger.records();
            if records.is_empty() {
                println!("No expenses recorded.");
            } else {
                println!("{}", report::records_table(&records));
            }
        }
        Command::View { window, json } => {
            let view = ledger.view(window);
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print!("{}", view);
            }
        }
    }

    ledger.close().await?;
    Ok(())
}
