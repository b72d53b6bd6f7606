use chrono::{DateTime, Utc};
use rand::RngExt;
use serde_json::json;
use uuid::Uuid;

use crate::credentials::{generate_otp, hash_otp, hash_password};
use crate::domain::repository::{NewRegistration, OrganizationRepository, UserRepository};
use crate::domain::types::{
    AuditEntry, OtpPurpose, OtpSession, OtpToken, Organization, RequestContext, SLUG_MAX_RETRIES,
    User,
};
use crate::error::ApiError;

/// Lowercase-alphanumeric-and-dash slug from an organization name.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("org");
    }
    slug
}

fn random_suffix() -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..4)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub organization_name: String,
}

#[derive(Debug)]
pub struct RegisterOutput {
    pub otp_expires_at: DateTime<Utc>,
}

pub struct RegisterUseCase<U, O>
where
    U: UserRepository,
    O: OrganizationRepository,
{
    pub users: U,
    pub organizations: O,
    /// Surface issued codes via logging outside production, for testability.
    pub log_otp_codes: bool,
}

impl<U, O> RegisterUseCase<U, O>
where
    U: UserRepository,
    O: OrganizationRepository,
{
    pub async fn execute(
        &self,
        input: RegisterInput,
        ctx: &RequestContext,
    ) -> Result<RegisterOutput, ApiError> {
        let email = input.email.trim().to_lowercase();

        // Pre-transaction checks; nothing written yet, nothing to roll back.
        if let Some(existing) = self.users.find_by_email(&email).await? {
            return Err(if existing.verified {
                ApiError::EmailAlreadyRegistered
            } else {
                // Distinct signal: resume verification instead of
                // re-registering.
                ApiError::EmailNotVerified
            });
        }

        // Slow hash happens before the transaction so no DB lock is held.
        let password_hash = hash_password(&input.password)?;

        let slug = self.unique_slug(&input.organization_name).await?;

        let owner_role_id = self
            .users
            .find_role_id("OWNER")
            .await?
            .ok_or_else(|| anyhow::anyhow!("OWNER seed role missing — broken deployment"))?;

        let now = Utc::now();
        let organization = Organization {
            id: Uuid::now_v7(),
            name: input.organization_name.clone(),
            slug,
            deleted_at: None,
            created_at: now,
        };
        let user = User {
            id: Uuid::now_v7(),
            email: email.clone(),
            first_name: input.first_name,
            last_name: input.last_name,
            password_hash,
            verified: false,
            verified_at: None,
            is_locked: false,
            login_attempts: 0,
            last_login_at: None,
            organization_id: organization.id,
            created_at: now,
        };

        let code = generate_otp();
        let otp_session = OtpSession::start(
            user.id,
            organization.id,
            &email,
            OtpPurpose::EmailVerification,
            now,
        );
        let otp_token = OtpToken::issue(otp_session.id, hash_otp(&code), now);
        let otp_expires_at = otp_token.expires_at;

        let audit = AuditEntry::new(
            "auth.register",
            ctx,
            json!({ "email": email, "organization": organization.name }),
        )
        .with_user(user.id, organization.id);

        self.users
            .create_registration(&NewRegistration {
                organization,
                user,
                owner_role_id,
                otp_session,
                otp_token,
                audit,
            })
            .await?;

        // Delivery is out-of-band; outside production the code is also
        // surfaced here so end-to-end tests can pick it up.
        if self.log_otp_codes {
            tracing::info!(email = %email, code = %code, "verification code issued");
        }

        Ok(RegisterOutput { otp_expires_at })
    }

    async fn unique_slug(&self, organization_name: &str) -> Result<String, ApiError> {
        let base = slugify(organization_name);
        if !self.organizations.slug_exists(&base).await? {
            return Ok(base);
        }
        for _ in 0..SLUG_MAX_RETRIES {
            let candidate = format!("{base}-{}", random_suffix());
            if !self.organizations.slug_exists(&candidate).await? {
                return Ok(candidate);
            }
        }
        // Exhausting the retries means slug space is pathologically
        // saturated — a configuration problem, not a user error.
        Err(ApiError::Internal(anyhow::anyhow!(
            "slug disambiguation exhausted for {base:?}"
        )))
    }
}
