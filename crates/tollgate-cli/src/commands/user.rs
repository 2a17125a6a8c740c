//! Account management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use tollgate_auth::{AuthenticationService, PasswordHasher, PgBackend};
use tollgate_core::config::AppConfig;
use tollgate_core::error::AppError;
use tollgate_database::repositories::UserRepository;
use tollgate_entity::session::SessionTier;
use tollgate_entity::user::{CreateUser, User};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create an account; the password is prompted for
    Create {
        /// Login name
        name: String,
        /// Grant administrator privileges
        #[arg(long)]
        admin: bool,
    },
    /// List all accounts
    List,
    /// Grant administrator privileges
    Promote {
        /// Login name
        name: String,
    },
    /// Withdraw administrator privileges and end admin sessions
    Demote {
        /// Login name
        name: String,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    /// User ID
    id: String,
    /// Login name
    name: String,
    /// Administrator flag
    admin: String,
    /// Created at
    created_at: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.to_string(),
            name: u.name.clone(),
            admin: if u.is_admin { "yes" } else { "no" }.to_string(),
            created_at: u.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let user_repo = UserRepository::new(pool.clone());

    match &args.command {
        UserCommand::Create { name, admin } => {
            if name.trim().is_empty() {
                return Err(AppError::validation("User name must not be empty"));
            }

            let password = dialoguer::Password::new()
                .with_prompt(format!("Password for '{name}'"))
                .with_confirmation("Repeat password", "Passwords do not match")
                .interact()
                .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

            if password.is_empty() {
                return Err(AppError::validation("Password must not be empty"));
            }

            let password_hash = PasswordHasher::new().hash_password(&password)?;
            let user = user_repo
                .create(&CreateUser {
                    name: name.clone(),
                    password_hash,
                    is_admin: *admin,
                })
                .await?;

            output::print_success(&format!(
                "User '{}' created{}",
                user.name,
                if user.is_admin { " as administrator" } else { "" }
            ));
        }
        UserCommand::List => {
            let users = user_repo.find_all().await?;
            let rows: Vec<UserRow> = users.iter().map(UserRow::from).collect();
            output::print_list(&rows, format);
        }
        UserCommand::Promote { name } => {
            user_repo.set_admin(name, true).await?;
            output::print_success(&format!("User '{name}' is now an administrator"));
        }
        UserCommand::Demote { name } => {
            user_repo.set_admin(name, false).await?;

            let service = AuthenticationService::from_backend(
                PgBackend::new(pool),
                config.session.clone(),
            );
            let removed = service.revoke(SessionTier::Admin, name).await?;

            output::print_success(&format!(
                "User '{name}' is no longer an administrator ({removed} admin session(s) ended)"
            ));
        }
    }

    Ok(())
}
