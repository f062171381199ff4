//! Events domain - event records and their submission validation.

pub mod forms;
pub mod models;

// Re-export commonly used types
pub use forms::{EventSubmission, ValidatedEvent};
pub use models::{Event, EventChanges, EventKind};
