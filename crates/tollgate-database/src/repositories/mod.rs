//! Repository implementations for Tollgate entities.

pub mod session;
pub mod setting;
pub mod user;

pub use session::SessionRepository;
pub use setting::SettingRepository;
pub use user::UserRepository;
