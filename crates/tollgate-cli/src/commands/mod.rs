//! CLI command definitions and dispatch.

pub mod config;
pub mod migrate;
pub mod session;
pub mod setting;
pub mod user;

use clap::{Parser, Subcommand, ValueEnum};

use crate::output::OutputFormat;
use tollgate_core::config::AppConfig;
use tollgate_core::error::AppError;
use tollgate_database::DatabasePool;
use tollgate_entity::session::SessionTier;

/// Tollgate: tiered session authentication administration
#[derive(Debug, Parser)]
#[command(name = "tollgate", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Load `config/default` plus the `config/<ENV>` overlay instead of `--config`
    #[arg(short, long)]
    pub env: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Account management
    User(user::UserArgs),
    /// Session maintenance
    Session(session::SessionArgs),
    /// Application settings
    Setting(setting::SettingArgs),
    /// Configuration inspection
    Config(config::ConfigArgs),
}

/// Session tier as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TierArg {
    /// Regular user sessions
    User,
    /// Administrator sessions
    Admin,
}

impl From<TierArg> for SessionTier {
    fn from(arg: TierArg) -> Self {
        match arg {
            TierArg::User => SessionTier::User,
            TierArg::Admin => SessionTier::Admin,
        }
    }
}

impl Cli {
    /// Load configuration from `--env` when given, otherwise from `--config`
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        match &self.env {
            Some(env) => AppConfig::load(env),
            None => AppConfig::load_file(&self.config),
        }
    }

    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, config).await,
            Commands::User(args) => user::execute(args, config, self.format).await,
            Commands::Session(args) => session::execute(args, config, self.format).await,
            Commands::Setting(args) => setting::execute(args, config, self.format).await,
            Commands::Config(args) => config::execute(args, config, self.format),
        }
    }
}

/// Helper: create database pool from config and confirm it answers
pub async fn create_db_pool(config: &AppConfig) -> Result<sqlx::PgPool, AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    if !pool.health_check().await? {
        return Err(AppError::store_unavailable("Database health check failed"));
    }
    Ok(pool.into_pool())
}
