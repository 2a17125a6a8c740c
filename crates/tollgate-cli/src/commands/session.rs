//! Session maintenance CLI commands.

use clap::{Args, Subcommand};
use dialoguer::Confirm;

use super::TierArg;
use crate::output::{self, OutputFormat};
use tollgate_auth::{AuthenticationService, PgBackend};
use tollgate_core::config::AppConfig;
use tollgate_core::error::AppError;
use tollgate_entity::session::SessionTier;

/// Arguments for session commands
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Session subcommand
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Session subcommands
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// End every session a user holds in a tier
    Revoke {
        /// Session tier
        #[arg(value_enum)]
        tier: TierArg,
        /// Login name
        name: String,
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
    /// Count unexpired sessions in a tier
    Count {
        /// Session tier
        #[arg(value_enum)]
        tier: TierArg,
    },
    /// Delete expired session rows in a tier
    Purge {
        /// Session tier
        #[arg(value_enum)]
        tier: TierArg,
    },
}

/// Execute session commands
pub async fn execute(
    args: &SessionArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let service = AuthenticationService::from_backend(PgBackend::new(pool), config.session.clone());

    match &args.command {
        SessionCommand::Revoke { tier, name, force } => {
            let tier = SessionTier::from(*tier);

            if !force {
                let confirm = Confirm::new()
                    .with_prompt(format!("End all {tier} sessions of '{name}'?"))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let removed = service.revoke(tier, name).await?;
            if removed == 0 {
                output::print_warning(&format!("'{name}' held no {tier} sessions"));
            } else {
                output::print_success(&format!("Ended {removed} {tier} session(s) of '{name}'"));
            }
        }
        SessionCommand::Count { tier } => {
            let tier = SessionTier::from(*tier);
            let count = service.sessions().count_active(tier).await?;
            output::print_kv(&format!("{tier} sessions"), &count.to_string(), format);
        }
        SessionCommand::Purge { tier } => {
            let tier = SessionTier::from(*tier);
            let removed = service.sessions().purge_expired(tier).await?;
            output::print_success(&format!("Purged {removed} expired {tier} session(s)"));
        }
    }

    Ok(())
}
