//! Application setting CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use tollgate_core::config::AppConfig;
use tollgate_core::error::AppError;
use tollgate_database::repositories::SettingRepository;

/// Arguments for setting commands
#[derive(Debug, Args)]
pub struct SettingArgs {
    /// Setting subcommand
    #[command(subcommand)]
    pub command: SettingCommand,
}

/// Setting subcommands
#[derive(Debug, Subcommand)]
pub enum SettingCommand {
    /// Show the value stored under a key
    Get {
        /// Setting key
        key: String,
    },
    /// Store a value under a key, replacing any previous value
    Set {
        /// Setting key
        key: String,
        /// New value
        value: String,
    },
}

/// Execute setting commands
pub async fn execute(
    args: &SettingArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let repo = SettingRepository::new(pool);

    match &args.command {
        SettingCommand::Get { key } => {
            let value = repo
                .get(key)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Setting '{key}' not found")))?;
            output::print_kv(key, &value, format);
        }
        SettingCommand::Set { key, value } => {
            repo.set(key, value).await?;
            output::print_success(&format!("Setting '{key}' updated"));
        }
    }

    Ok(())
}
