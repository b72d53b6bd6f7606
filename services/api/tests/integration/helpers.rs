use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use clientele_api::credentials::{hash_otp, hash_password};
use clientele_api::domain::repository::{
    AuditLogRepository, ClientRepository, NewRegistration, OrganizationRepository, OtpRepository,
    PasswordResetCompletion, SessionRepository, UserRepository,
};
use clientele_api::domain::types::{
    AuditEntry, AuthOrgFlags, AuthUserFlags, Client, OTP_MAX_ATTEMPTS, OTP_SESSION_TTL_HOURS,
    OTP_TOKEN_TTL_MINS, OtpAttemptRecord, OtpPurpose, OtpSession, OtpToken, Organization,
    RequestContext, SESSION_TTL_DAYS, Session, SessionForAuth, User, UserForLogin,
};
use clientele_api::error::ApiError;

/// The well-known OTP code used by fixtures.
pub const TEST_CODE: &str = "123456";
pub const TEST_PASSWORD: &str = "Passw0rd!";

// ── MockDb ───────────────────────────────────────────────────────────────────

/// In-memory stand-in for the database. Every mock repository produced by
/// the factory methods shares the same vectors, so composite operations are
/// observable across repositories just like rows in one schema.
#[derive(Default)]
pub struct MockDb {
    pub users: Arc<Mutex<Vec<User>>>,
    pub organizations: Arc<Mutex<Vec<Organization>>>,
    pub roles: Arc<Mutex<Vec<(String, Uuid)>>>,
    pub permissions: Arc<Mutex<Vec<String>>>,
    pub otp_sessions: Arc<Mutex<Vec<OtpSession>>>,
    pub otp_tokens: Arc<Mutex<Vec<OtpToken>>>,
    pub otp_attempts: Arc<Mutex<Vec<OtpAttemptRecord>>>,
    pub sessions: Arc<Mutex<Vec<Session>>>,
    pub audits: Arc<Mutex<Vec<AuditEntry>>>,
    pub clients: Arc<Mutex<Vec<Client>>>,
}

impl MockDb {
    /// Fresh store with the OWNER seed role, like a migrated database.
    pub fn seeded() -> Self {
        let db = Self::default();
        db.roles
            .lock()
            .unwrap()
            .push(("OWNER".to_owned(), Uuid::new_v4()));
        db
    }

    pub fn user_repo(&self) -> MockUserRepo {
        MockUserRepo {
            users: Arc::clone(&self.users),
            organizations: Arc::clone(&self.organizations),
            roles: Arc::clone(&self.roles),
            permissions: Arc::clone(&self.permissions),
            otp_sessions: Arc::clone(&self.otp_sessions),
            otp_tokens: Arc::clone(&self.otp_tokens),
            sessions: Arc::clone(&self.sessions),
            audits: Arc::clone(&self.audits),
        }
    }

    pub fn organization_repo(&self) -> MockOrganizationRepo {
        MockOrganizationRepo {
            organizations: Arc::clone(&self.organizations),
        }
    }

    pub fn otp_repo(&self) -> MockOtpRepo {
        MockOtpRepo {
            users: Arc::clone(&self.users),
            otp_sessions: Arc::clone(&self.otp_sessions),
            otp_tokens: Arc::clone(&self.otp_tokens),
            otp_attempts: Arc::clone(&self.otp_attempts),
            sessions: Arc::clone(&self.sessions),
            audits: Arc::clone(&self.audits),
        }
    }

    pub fn session_repo(&self) -> MockSessionRepo {
        MockSessionRepo {
            users: Arc::clone(&self.users),
            organizations: Arc::clone(&self.organizations),
            sessions: Arc::clone(&self.sessions),
        }
    }

    pub fn audit_repo(&self) -> MockAuditRepo {
        MockAuditRepo {
            audits: Arc::clone(&self.audits),
        }
    }

    pub fn client_repo(&self) -> MockClientRepo {
        MockClientRepo {
            clients: Arc::clone(&self.clients),
        }
    }

    // ── Fixture insertion ─────────────────────────────────────────────────

    pub fn insert_organization(&self) -> Organization {
        let org = Organization {
            id: Uuid::new_v4(),
            name: "Acme Corp".to_owned(),
            slug: "acme-corp".to_owned(),
            deleted_at: None,
            created_at: Utc::now(),
        };
        self.organizations.lock().unwrap().push(org.clone());
        org
    }

    pub fn insert_user(&self, org_id: Uuid, email: &str, verified: bool) -> User {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_owned(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            verified,
            verified_at: verified.then(Utc::now),
            is_locked: false,
            login_attempts: 0,
            last_login_at: None,
            organization_id: org_id,
            created_at: Utc::now(),
        };
        self.users.lock().unwrap().push(user.clone());
        user
    }

    /// Active OTP session plus one usable token hashing [`TEST_CODE`].
    pub fn insert_otp_session(&self, user: &User, purpose: OtpPurpose) -> (OtpSession, OtpToken) {
        let now = Utc::now();
        let session = OtpSession {
            id: Uuid::new_v4(),
            user_id: user.id,
            organization_id: user.organization_id,
            email: user.email.clone(),
            purpose,
            active: true,
            expires_at: now + Duration::hours(OTP_SESSION_TTL_HOURS),
            attempt_count: 0,
            max_attempts: OTP_MAX_ATTEMPTS,
            lock_until: None,
            resend_count: 0,
            last_sent_at: now - Duration::seconds(120),
            last_attempt_at: None,
            created_at: now,
        };
        let token = OtpToken {
            id: Uuid::new_v4(),
            session_id: session.id,
            code_hash: hash_otp(TEST_CODE),
            code_length: 6,
            expires_at: now + Duration::minutes(OTP_TOKEN_TTL_MINS),
            consumed_at: None,
            created_at: now,
        };
        self.otp_sessions.lock().unwrap().push(session.clone());
        self.otp_tokens.lock().unwrap().push(token.clone());
        (session, token)
    }

    pub fn insert_session(&self, user: &User) -> Session {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            user_id: user.id,
            organization_id: user.organization_id,
            token_hash: format!("hash-{}", Uuid::new_v4()),
            token_last_four: "abcd".to_owned(),
            ip_address: None,
            user_agent: None,
            last_activity: now,
            expires_at: now + Duration::days(SESSION_TTL_DAYS),
            revoked_at: None,
            revoked_reason: None,
            created_at: now,
        };
        self.sessions.lock().unwrap().push(session.clone());
        session
    }

    pub fn grant_permissions(&self, perms: &[&str]) {
        let mut lock = self.permissions.lock().unwrap();
        for p in perms {
            lock.push((*p).to_owned());
        }
    }

    // ── Inspection ────────────────────────────────────────────────────────

    pub fn active_otp_sessions(&self, email: &str, purpose: OtpPurpose) -> usize {
        self.otp_sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.email == email && s.purpose == purpose && s.active)
            .count()
    }

    pub fn unconsumed_tokens(&self, session_id: Uuid) -> usize {
        self.otp_tokens
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.session_id == session_id && t.consumed_at.is_none())
            .count()
    }

    pub fn user_by_email(&self, email: &str) -> User {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .expect("user not found")
    }

    pub fn audit_actions(&self) -> Vec<String> {
        self.audits
            .lock()
            .unwrap()
            .iter()
            .map(|a| a.action.clone())
            .collect()
    }
}

pub fn ctx() -> RequestContext {
    RequestContext {
        ip_address: Some("203.0.113.9".to_owned()),
        user_agent: Some("integration-test".to_owned()),
    }
}

// ── MockUserRepo ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockUserRepo {
    users: Arc<Mutex<Vec<User>>>,
    organizations: Arc<Mutex<Vec<Organization>>>,
    roles: Arc<Mutex<Vec<(String, Uuid)>>>,
    permissions: Arc<Mutex<Vec<String>>>,
    otp_sessions: Arc<Mutex<Vec<OtpSession>>>,
    otp_tokens: Arc<Mutex<Vec<OtpToken>>>,
    sessions: Arc<Mutex<Vec<Session>>>,
    audits: Arc<Mutex<Vec<AuditEntry>>>,
}

impl UserRepository for MockUserRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn find_for_login(&self, email: &str) -> Result<Option<UserForLogin>, ApiError> {
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(None);
        };
        let organization = self
            .organizations
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == user.organization_id)
            .cloned()
            .expect("fixture user without organization");
        let permissions = self.permissions.lock().unwrap().clone();
        Ok(Some(UserForLogin {
            user,
            organization,
            permissions,
        }))
    }

    async fn load_permissions(&self, _user_id: Uuid) -> Result<Vec<String>, ApiError> {
        Ok(self.permissions.lock().unwrap().clone())
    }

    async fn find_role_id(&self, name: &str) -> Result<Option<Uuid>, ApiError> {
        Ok(self
            .roles
            .lock()
            .unwrap()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id))
    }

    async fn create_registration(&self, reg: &NewRegistration) -> Result<(), ApiError> {
        self.organizations
            .lock()
            .unwrap()
            .push(reg.organization.clone());
        self.users.lock().unwrap().push(reg.user.clone());
        self.otp_sessions
            .lock()
            .unwrap()
            .push(reg.otp_session.clone());
        self.otp_tokens.lock().unwrap().push(reg.otp_token.clone());
        self.audits.lock().unwrap().push(reg.audit.clone());
        Ok(())
    }

    async fn record_login_failure(
        &self,
        user_id: Uuid,
        login_attempts: i32,
        is_locked: bool,
        audit: &AuditEntry,
    ) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        let user = users.iter_mut().find(|u| u.id == user_id).unwrap();
        user.login_attempts = login_attempts;
        user.is_locked = is_locked;
        self.audits.lock().unwrap().push(audit.clone());
        Ok(())
    }

    async fn complete_login(
        &self,
        user_id: Uuid,
        session: &Session,
        audit: &AuditEntry,
    ) -> Result<(), ApiError> {
        {
            let mut users = self.users.lock().unwrap();
            let user = users.iter_mut().find(|u| u.id == user_id).unwrap();
            user.login_attempts = 0;
            user.last_login_at = Some(Utc::now());
        }
        self.sessions.lock().unwrap().push(session.clone());
        self.audits.lock().unwrap().push(audit.clone());
        Ok(())
    }

    async fn change_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
        keep_session_id: Uuid,
        audit: &AuditEntry,
    ) -> Result<u64, ApiError> {
        {
            let mut users = self.users.lock().unwrap();
            let user = users.iter_mut().find(|u| u.id == user_id).unwrap();
            user.password_hash = password_hash.to_owned();
        }
        let revoked = revoke_user_sessions(
            &self.sessions,
            user_id,
            Some(keep_session_id),
            "password_change",
        );
        self.audits.lock().unwrap().push(audit.clone());
        Ok(revoked)
    }
}

fn revoke_user_sessions(
    sessions: &Arc<Mutex<Vec<Session>>>,
    user_id: Uuid,
    keep: Option<Uuid>,
    reason: &str,
) -> u64 {
    let now = Utc::now();
    let mut revoked = 0;
    for s in sessions.lock().unwrap().iter_mut() {
        if s.user_id == user_id && s.revoked_at.is_none() && Some(s.id) != keep {
            s.revoked_at = Some(now);
            s.revoked_reason = Some(reason.to_owned());
            revoked += 1;
        }
    }
    revoked
}

// ── MockOrganizationRepo ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockOrganizationRepo {
    organizations: Arc<Mutex<Vec<Organization>>>,
}

impl OrganizationRepository for MockOrganizationRepo {
    async fn slug_exists(&self, slug: &str) -> Result<bool, ApiError> {
        Ok(self
            .organizations
            .lock()
            .unwrap()
            .iter()
            .any(|o| o.slug == slug))
    }
}

// ── MockOtpRepo ──────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockOtpRepo {
    users: Arc<Mutex<Vec<User>>>,
    otp_sessions: Arc<Mutex<Vec<OtpSession>>>,
    otp_tokens: Arc<Mutex<Vec<OtpToken>>>,
    otp_attempts: Arc<Mutex<Vec<OtpAttemptRecord>>>,
    sessions: Arc<Mutex<Vec<Session>>>,
    audits: Arc<Mutex<Vec<AuditEntry>>>,
}

impl OtpRepository for MockOtpRepo {
    async fn find_active_session(
        &self,
        email: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpSession>, ApiError> {
        Ok(self
            .otp_sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.email == email && s.purpose == purpose && s.active)
            .cloned())
    }

    async fn find_locked_session(
        &self,
        email: &str,
        purpose: OtpPurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<OtpSession>, ApiError> {
        Ok(self
            .otp_sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| {
                s.email == email && s.purpose == purpose && s.lock_until.is_some_and(|l| l > now)
            })
            .cloned())
    }

    async fn find_latest_unconsumed_token(
        &self,
        session_id: Uuid,
    ) -> Result<Option<OtpToken>, ApiError> {
        Ok(self
            .otp_tokens
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.session_id == session_id && t.consumed_at.is_none())
            .max_by_key(|t| t.created_at)
            .cloned())
    }

    async fn record_failed_attempt(
        &self,
        session_id: Uuid,
        attempt_count: i32,
        lock_until: Option<DateTime<Utc>>,
        attempt: &OtpAttemptRecord,
    ) -> Result<(), ApiError> {
        {
            let mut sessions = self.otp_sessions.lock().unwrap();
            let session = sessions.iter_mut().find(|s| s.id == session_id).unwrap();
            session.attempt_count = attempt_count;
            session.last_attempt_at = Some(Utc::now());
            if lock_until.is_some() {
                session.lock_until = lock_until;
            }
        }
        self.otp_attempts.lock().unwrap().push(attempt.clone());
        Ok(())
    }

    async fn complete_verification(
        &self,
        token_id: Uuid,
        session_id: Uuid,
        user_id: Uuid,
        attempt: &OtpAttemptRecord,
        audit: &AuditEntry,
    ) -> Result<(), ApiError> {
        let now = Utc::now();
        consume_mock_token(&self.otp_tokens, token_id, now);
        deactivate_mock_session(&self.otp_sessions, session_id);
        {
            let mut users = self.users.lock().unwrap();
            let user = users.iter_mut().find(|u| u.id == user_id).unwrap();
            user.verified = true;
            user.verified_at = Some(now);
        }
        self.otp_attempts.lock().unwrap().push(attempt.clone());
        self.audits.lock().unwrap().push(audit.clone());
        Ok(())
    }

    async fn replace_session(
        &self,
        old_session_id: Uuid,
        session: &OtpSession,
        token: &OtpToken,
        audit: &AuditEntry,
    ) -> Result<(), ApiError> {
        deactivate_mock_session(&self.otp_sessions, old_session_id);
        self.otp_sessions.lock().unwrap().push(session.clone());
        self.otp_tokens.lock().unwrap().push(token.clone());
        self.audits.lock().unwrap().push(audit.clone());
        Ok(())
    }

    async fn create_session(
        &self,
        session: &OtpSession,
        token: &OtpToken,
        audit: &AuditEntry,
    ) -> Result<(), ApiError> {
        self.otp_sessions.lock().unwrap().push(session.clone());
        self.otp_tokens.lock().unwrap().push(token.clone());
        self.audits.lock().unwrap().push(audit.clone());
        Ok(())
    }

    async fn rotate_token(
        &self,
        session_id: Uuid,
        token: &OtpToken,
        resend_count: i32,
        last_sent_at: DateTime<Utc>,
        attempt: &OtpAttemptRecord,
    ) -> Result<(), ApiError> {
        let now = Utc::now();
        for t in self.otp_tokens.lock().unwrap().iter_mut() {
            if t.session_id == session_id && t.consumed_at.is_none() {
                t.consumed_at = Some(now);
            }
        }
        self.otp_tokens.lock().unwrap().push(token.clone());
        {
            let mut sessions = self.otp_sessions.lock().unwrap();
            let session = sessions.iter_mut().find(|s| s.id == session_id).unwrap();
            session.resend_count = resend_count;
            session.last_sent_at = last_sent_at;
        }
        self.otp_attempts.lock().unwrap().push(attempt.clone());
        Ok(())
    }

    async fn complete_password_reset(
        &self,
        completion: &PasswordResetCompletion,
    ) -> Result<(), ApiError> {
        let now = Utc::now();
        consume_mock_token(&self.otp_tokens, completion.otp_token_id, now);
        deactivate_mock_session(&self.otp_sessions, completion.otp_session_id);
        {
            let mut users = self.users.lock().unwrap();
            let user = users
                .iter_mut()
                .find(|u| u.id == completion.user_id)
                .unwrap();
            user.password_hash = completion.password_hash.clone();
            user.login_attempts = 0;
            user.is_locked = false;
            if completion.newly_verified {
                user.verified = true;
                user.verified_at = Some(now);
            }
        }
        revoke_user_sessions(&self.sessions, completion.user_id, None, "password_reset");
        self.otp_attempts
            .lock()
            .unwrap()
            .push(completion.attempt.clone());
        self.audits.lock().unwrap().push(completion.audit.clone());
        Ok(())
    }
}

fn consume_mock_token(tokens: &Arc<Mutex<Vec<OtpToken>>>, token_id: Uuid, now: DateTime<Utc>) {
    if let Some(t) = tokens.lock().unwrap().iter_mut().find(|t| t.id == token_id) {
        t.consumed_at = Some(now);
    }
}

fn deactivate_mock_session(sessions: &Arc<Mutex<Vec<OtpSession>>>, session_id: Uuid) {
    if let Some(s) = sessions
        .lock()
        .unwrap()
        .iter_mut()
        .find(|s| s.id == session_id)
    {
        s.active = false;
    }
}

// ── MockSessionRepo ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockSessionRepo {
    users: Arc<Mutex<Vec<User>>>,
    organizations: Arc<Mutex<Vec<Organization>>>,
    sessions: Arc<Mutex<Vec<Session>>>,
}

impl SessionRepository for MockSessionRepo {
    async fn find_for_auth(&self, token_hash: &str) -> Result<Option<SessionForAuth>, ApiError> {
        let Some(session) = self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.token_hash == token_hash)
            .cloned()
        else {
            return Ok(None);
        };
        let user = self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == session.user_id)
            .map(|u| AuthUserFlags {
                verified: u.verified,
                is_locked: u.is_locked,
            });
        let organization = self
            .organizations
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == session.organization_id)
            .map(|o| AuthOrgFlags {
                deleted_at: o.deleted_at,
            });
        Ok(Some(SessionForAuth {
            session,
            user,
            organization,
        }))
    }

    async fn touch_activity(&self, session_id: Uuid, now: DateTime<Utc>) -> Result<(), ApiError> {
        if let Some(s) = self
            .sessions
            .lock()
            .unwrap()
            .iter_mut()
            .find(|s| s.id == session_id)
        {
            s.last_activity = now;
        }
        Ok(())
    }

    async fn revoke(
        &self,
        session_id: Uuid,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        if let Some(s) = self
            .sessions
            .lock()
            .unwrap()
            .iter_mut()
            .find(|s| s.id == session_id)
        {
            s.revoked_at = Some(now);
            s.revoked_reason = Some(reason.to_owned());
        }
        Ok(())
    }
}

// ── MockAuditRepo ────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockAuditRepo {
    audits: Arc<Mutex<Vec<AuditEntry>>>,
}

impl AuditLogRepository for MockAuditRepo {
    async fn append(&self, entry: &AuditEntry) -> Result<(), ApiError> {
        self.audits.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

// ── MockClientRepo ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockClientRepo {
    clients: Arc<Mutex<Vec<Client>>>,
}

impl ClientRepository for MockClientRepo {
    async fn list(
        &self,
        organization_id: Uuid,
        created_by: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> Result<Vec<Client>, ApiError> {
        let mut matched: Vec<Client> = self
            .clients
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.organization_id == organization_id)
            .filter(|c| created_by.is_none_or(|creator| c.created_by == creator))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched
            .into_iter()
            .skip(((page - 1) * per_page) as usize)
            .take(per_page as usize)
            .collect())
    }

    async fn create(&self, client: &Client) -> Result<(), ApiError> {
        self.clients.lock().unwrap().push(client.clone());
        Ok(())
    }
}
