//! Accounts domain - registration, login and user profiles.

pub mod forms;
pub mod models;
pub mod password;

// Re-export commonly used types
pub use models::{Profile, User};
