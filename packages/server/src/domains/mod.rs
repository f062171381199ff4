// Business domains
pub mod accounts;
pub mod communities;
pub mod events;
