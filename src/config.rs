use clap::{Parser, Subcommand};
use serde::Deserialize;
use spendlog_core::{ExpenseId, WindowSelector};

#[derive(Parser, Debug)]
#[command(name = "spendlog", about = "spendlog - personal expense ledger")]
pub struct CliArgs {
    /// Path to config file
    #[arg(short, long, default_value = "spendlog.toml")]
    pub config: String,

    /// Database path (overrides config file)
    #[arg(long)]
    pub db: Option<String>,

    /// Log level (overrides config file)
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Record a new expense dated today
    Add {
        amount: String,
        category: String,
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Change amount, category and note of an expense
    Edit {
        id: ExpenseId,
        amount: String,
        category: String,
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Delete an expense
    Rm { id: ExpenseId },
    /// List every expense, newest first
    List,
    /// Show expenses and totals for a window
    View {
        #[arg(short, long, default_value = "all")]
        window: WindowSelector,
        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Sqlite,
    Memory,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_storage")]
    pub storage: StorageConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: BackendKind,

    #[serde(default = "default_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

fn default_storage() -> StorageConfig {
    StorageConfig {
        backend: default_backend(),
        path: default_path(),
    }
}

fn default_logging() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        json: false,
    }
}

fn default_backend() -> BackendKind {
    BackendKind::Sqlite
}

fn default_path() -> String {
    "expenses.db".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage: default_storage(),
            logging: default_logging(),
        }
    }
}

impl Config {
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn load(cli: &CliArgs) -> Self {
        let mut config = match std::fs::read_to_string(&cli.config) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                eprintln!("Warning: Failed to parse config file: {}", e);
                Config::default()
            }),
            Err(_) => Config::default(),
        };

        // CLI overrides
        if let Some(ref path) = cli.db {
            config.storage.path = path.clone();
        }
        if let Some(ref level) = cli.log_level {
            config.logging.level = level.clone();
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.storage.backend, BackendKind::Sqlite);
        assert_eq!(config.storage.path, "expenses.db");
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
            [storage]
            backend = "memory"
            path = "/tmp/ledger.db"

            [logging]
            level = "debug"
            json = true
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.backend, BackendKind::Memory);
        assert_eq!(config.storage.path, "/tmp/ledger.db");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = CliArgs::parse_from([
            "spendlog",
            "--config",
            "/nonexistent/spendlog.toml",
            "--db",
            "other.db",
            "-l",
            "trace",
            "view",
            "--window",
            "month",
        ]);
        let config = Config::load(&cli);
        assert_eq!(config.storage.path, "other.db");
        assert_eq!(config.logging.level, "trace");
        assert_eq!(
            cli.command,
            Command::View {
                window: WindowSelector::ThisMonth,
                json: false
            }
        );
    }

    #[test]
    fn test_add_command_args() {
        let cli = CliArgs::parse_from(["spendlog", "add", "12.50", "Food", "--note", "lunch"]);
        assert_eq!(
            cli.command,
            Command::Add {
                amount: "12.50".to_string(),
                category: "Food".to_string(),
                note: Some("lunch".to_string())
            }
        );
    }
}
