//! # tollgate-database
//!
//! PostgreSQL connection management and concrete repository
//! implementations for users, sessions, and stored settings.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
