//! Sea-orm entities for the Clientele API database.

pub mod audit_logs;
pub mod clients;
pub mod organizations;
pub mod otp_attempts;
pub mod otp_sessions;
pub mod otp_tokens;
pub mod permissions;
pub mod role_permissions;
pub mod roles;
pub mod sessions;
pub mod user_roles;
pub mod users;
