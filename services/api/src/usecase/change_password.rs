use serde_json::json;

use crate::credentials::{hash_password, verify_password};
use crate::domain::repository::UserRepository;
use crate::domain::types::{AuditEntry, AuthContext, RequestContext};
use crate::error::ApiError;

pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug)]
pub struct ChangePasswordOutput {
    /// Sibling sessions revoked; the current one stays alive.
    pub revoked_sessions: u64,
}

/// Authenticated password change. Unlike reset, the requesting session
/// survives; only the user's other sessions are revoked.
pub struct ChangePasswordUseCase<U>
where
    U: UserRepository,
{
    pub users: U,
}

impl<U> ChangePasswordUseCase<U>
where
    U: UserRepository,
{
    pub async fn execute(
        &self,
        auth: &AuthContext,
        input: ChangePasswordInput,
        ctx: &RequestContext,
    ) -> Result<ChangePasswordOutput, ApiError> {
        let user = self
            .users
            .find_by_id(auth.user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("authenticated user {} not found", auth.user_id))?;

        if !verify_password(&input.current_password, &user.password_hash)? {
            return Err(ApiError::InvalidCurrentPassword);
        }

        let password_hash = hash_password(&input.new_password)?;
        let audit = AuditEntry::new("auth.change_password", ctx, json!({ "email": user.email }))
            .with_user(user.id, user.organization_id);

        let revoked_sessions = self
            .users
            .change_password(user.id, &password_hash, auth.session_id, &audit)
            .await?;

        tracing::info!(
            user_id = %user.id,
            revoked_sessions,
            "password changed"
        );
        Ok(ChangePasswordOutput { revoked_sessions })
    }
}
