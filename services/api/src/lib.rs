pub mod authz;
pub mod config;
pub mod cookie;
pub mod credentials;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod infra;
pub mod middleware;
pub mod router;
pub mod state;
pub mod usecase;
