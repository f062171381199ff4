//! Typed ID definitions for all domain entities.
//!
//! This module defines type aliases for each domain entity, providing
//! compile-time type safety for ID usage throughout the application.
//!
//! # Example
//!
//! ```rust
//! use eventwall_core::common::{CommunityId, UserId};
//!
//! // These are incompatible types - compiler prevents mixing them up
//! let user_id: UserId = UserId::new();
//! let community_id: CommunityId = CommunityId::new();
//!
//! // This would be a compile error:
//! // let wrong: CommunityId = user_id;
//! ```

// Re-export the core Id type and version markers
pub use super::id::{Id, V4, V7};

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for User entities.
pub struct User;

/// Marker type for Community entities.
pub struct Community;

/// Marker type for Event entities.
pub struct Event;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for User entities.
pub type UserId = Id<User>;

/// Typed ID for Community entities.
pub type CommunityId = Id<Community>;

/// Typed ID for Event entities.
pub type EventId = Id<Event>;
