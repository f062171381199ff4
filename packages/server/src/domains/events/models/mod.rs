pub mod event;

pub use event::{Event, EventChanges, EventKind};
