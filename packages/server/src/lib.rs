// EventWall - Core
//
// This crate provides the backend for EventWall: users register, create
// communities, join and leave them, and post events scoped to a community.
// Architecture follows domain-driven design; request handlers are a thin
// orchestration layer over the domain models.

pub mod common;
pub mod config;
pub mod domains;
pub mod server;

pub use config::*;
