//! Permission flattening and per-request scope computation.
//!
//! A user's effective permission set is the union across assigned roles of
//! `resource:action` strings; `resource:*` and `*:*` are wildcards. The
//! computed [`AccessScope`] is the sole mechanism by which business-data
//! queries restrict visibility.

use serde_json::json;
use uuid::Uuid;

use crate::domain::repository::{AuditLogRepository, UserRepository};
use crate::domain::types::{AuditEntry, AuthContext, RequestContext};
use crate::error::ApiError;

/// Visibility restriction for one resource, computed once per request and
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessScope {
    /// True when the user holds a wildcard for the resource — sees every
    /// record in the organization. False restricts to own records.
    pub can_access_all: bool,
    pub user_id: Uuid,
}

impl AccessScope {
    /// `created_by` filter for repository queries: `None` means no
    /// restriction beyond the tenant boundary.
    pub fn created_by_filter(&self) -> Option<Uuid> {
        if self.can_access_all {
            None
        } else {
            Some(self.user_id)
        }
    }
}

/// Exact match, resource wildcard, or super wildcard.
pub fn has_permission(permissions: &[String], required: &str) -> bool {
    if permissions.iter().any(|p| p == required || p == "*:*") {
        return true;
    }
    match required.split_once(':') {
        Some((resource, _)) => {
            let wildcard = format!("{resource}:*");
            permissions.iter().any(|p| *p == wildcard)
        }
        None => false,
    }
}

/// Scope for a resource: all-in-organization when the user holds
/// `resource:*` or `*:*`, else own records only.
pub fn scope_for(permissions: &[String], resource: &str, user_id: Uuid) -> AccessScope {
    let wildcard = format!("{resource}:*");
    let can_access_all = permissions.iter().any(|p| *p == wildcard || p == "*:*");
    AccessScope {
        can_access_all,
        user_id,
    }
}

pub struct AuthorizeUseCase<U, A>
where
    U: UserRepository,
    A: AuditLogRepository,
{
    pub users: U,
    pub audit: A,
}

impl<U, A> AuthorizeUseCase<U, A>
where
    U: UserRepository,
    A: AuditLogRepository,
{
    /// Load the user's flattened permission set, require `required`
    /// (`resource:action`), and compute the scope for its resource.
    ///
    /// Denials are audited at warning level with the attempted permission
    /// and the user's full permission set, for security review.
    pub async fn execute(
        &self,
        auth: &AuthContext,
        required: &str,
        ctx: &RequestContext,
    ) -> Result<AccessScope, ApiError> {
        let permissions = self.users.load_permissions(auth.user_id).await?;

        if !has_permission(&permissions, required) {
            tracing::warn!(
                user_id = %auth.user_id,
                required,
                granted = ?permissions,
                "permission denied"
            );
            let entry = AuditEntry::new(
                "authz.denied",
                ctx,
                json!({ "required": required, "granted": permissions }),
            )
            .with_user(auth.user_id, auth.organization_id);
            self.audit.append(&entry).await?;
            return Err(ApiError::Forbidden);
        }

        let resource = required.split_once(':').map(|(r, _)| r).unwrap_or(required);
        Ok(scope_for(&permissions, resource, auth.user_id))
    }
}
