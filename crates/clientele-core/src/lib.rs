//! Shared plumbing for Clientele services.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
