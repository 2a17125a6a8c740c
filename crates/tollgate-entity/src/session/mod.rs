//! Session domain entities.

pub mod model;
pub mod tier;

pub use model::Session;
pub use tier::SessionTier;
