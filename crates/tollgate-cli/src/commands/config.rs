//! Configuration inspection CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use tollgate_core::config::AppConfig;
use tollgate_core::error::AppError;
use tollgate_database::connection::mask_password;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration with secrets masked
    Show,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            output::print_item(&redacted(config), format);
        }
    }

    Ok(())
}

/// Copy of `config` safe to print.
fn redacted(config: &AppConfig) -> AppConfig {
    let mut shown = config.clone();
    shown.database.url = mask_password(&config.database.url);
    shown
}

#[cfg(test)]
mod tests {
    use super::*;
    use tollgate_core::config::{DatabaseConfig, LoggingConfig, SessionConfig};

    #[test]
    fn test_redacted_masks_database_password() {
        let config = AppConfig {
            database: DatabaseConfig {
                url: "postgres://tollgate:hunter2@db:5432/tollgate".to_string(),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_seconds: 5,
                idle_timeout_seconds: 300,
            },
            session: SessionConfig::default(),
            logging: LoggingConfig::default(),
        };

        let shown = redacted(&config);
        assert!(!shown.database.url.contains("hunter2"));
        assert_eq!(config.database.url, "postgres://tollgate:hunter2@db:5432/tollgate");
    }
}
