use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use clientele_api::credentials::{generate_session_token, hash_session_token};
use clientele_api::domain::repository::SessionRepository;
use clientele_api::domain::types::{ACTIVITY_TOUCH_THRESHOLD_SECS, AuthContext, SessionForAuth};
use clientele_api::error::ApiError;
use clientele_api::usecase::session::{AuthenticateSessionUseCase, LogoutUseCase};

use crate::helpers::{MockDb, MockSessionRepo, ctx};

fn usecase(db: &MockDb) -> AuthenticateSessionUseCase<MockSessionRepo> {
    AuthenticateSessionUseCase {
        sessions: db.session_repo(),
    }
}

/// Insert a session whose plaintext bearer token is returned for lookups.
fn authed_fixture(db: &MockDb, verified: bool) -> (String, AuthContext) {
    let org = db.insert_organization();
    let user = db.insert_user(org.id, "a@x.com", verified);
    let session = db.insert_session(&user);
    let token = generate_session_token();
    db.sessions
        .lock()
        .unwrap()
        .iter_mut()
        .find(|s| s.id == session.id)
        .unwrap()
        .token_hash = hash_session_token(&token);
    (
        token,
        AuthContext {
            user_id: user.id,
            session_id: session.id,
            organization_id: org.id,
        },
    )
}

#[tokio::test]
async fn should_authenticate_valid_session() {
    let db = MockDb::seeded();
    let (token, expected) = authed_fixture(&db, true);

    let authed = usecase(&db).execute(&token).await.unwrap();
    assert_eq!(authed.auth.user_id, expected.user_id);
    assert_eq!(authed.auth.session_id, expected.session_id);
    assert_eq!(authed.auth.organization_id, expected.organization_id);
    // Fresh activity needs no touch.
    assert!(!authed.should_touch);
}

#[tokio::test]
async fn should_flag_stale_activity_for_touch() {
    let db = MockDb::seeded();
    let (token, auth) = authed_fixture(&db, true);
    db.sessions
        .lock()
        .unwrap()
        .iter_mut()
        .find(|s| s.id == auth.session_id)
        .unwrap()
        .last_activity = Utc::now() - Duration::seconds(ACTIVITY_TOUCH_THRESHOLD_SECS + 60);

    let authed = usecase(&db).execute(&token).await.unwrap();
    assert!(authed.should_touch);
}

#[tokio::test]
async fn should_reject_unknown_token() {
    let db = MockDb::seeded();
    let result = usecase(&db).execute("no-such-token").await;
    assert!(
        matches!(result, Err(ApiError::InvalidSession)),
        "expected InvalidSession, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_revoked_session() {
    let db = MockDb::seeded();
    let (token, auth) = authed_fixture(&db, true);
    db.session_repo()
        .revoke(auth.session_id, "password_reset", Utc::now())
        .await
        .unwrap();

    let result = usecase(&db).execute(&token).await;
    assert!(
        matches!(result, Err(ApiError::SessionRevoked)),
        "expected SessionRevoked, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_expired_session() {
    let db = MockDb::seeded();
    let (token, auth) = authed_fixture(&db, true);
    db.sessions
        .lock()
        .unwrap()
        .iter_mut()
        .find(|s| s.id == auth.session_id)
        .unwrap()
        .expires_at = Utc::now() - Duration::hours(1);

    let result = usecase(&db).execute(&token).await;
    assert!(
        matches!(result, Err(ApiError::SessionExpired)),
        "expected SessionExpired, got {result:?}"
    );
}

#[tokio::test]
async fn should_prefer_revoked_over_expired() {
    let db = MockDb::seeded();
    let (token, auth) = authed_fixture(&db, true);
    {
        let mut sessions = db.sessions.lock().unwrap();
        let s = sessions.iter_mut().find(|s| s.id == auth.session_id).unwrap();
        s.expires_at = Utc::now() - Duration::hours(1);
        s.revoked_at = Some(Utc::now() - Duration::hours(2));
    }

    let result = usecase(&db).execute(&token).await;
    assert!(
        matches!(result, Err(ApiError::SessionRevoked)),
        "expected SessionRevoked, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_unverified_user() {
    let db = MockDb::seeded();
    let (token, _) = authed_fixture(&db, false);

    let result = usecase(&db).execute(&token).await;
    assert!(
        matches!(result, Err(ApiError::EmailNotVerified)),
        "expected EmailNotVerified, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_locked_user() {
    let db = MockDb::seeded();
    let (token, auth) = authed_fixture(&db, true);
    db.users
        .lock()
        .unwrap()
        .iter_mut()
        .find(|u| u.id == auth.user_id)
        .unwrap()
        .is_locked = true;

    let result = usecase(&db).execute(&token).await;
    assert!(
        matches!(result, Err(ApiError::AccountLocked)),
        "expected AccountLocked, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_soft_deleted_organization() {
    let db = MockDb::seeded();
    let (token, auth) = authed_fixture(&db, true);
    db.organizations
        .lock()
        .unwrap()
        .iter_mut()
        .find(|o| o.id == auth.organization_id)
        .unwrap()
        .deleted_at = Some(Utc::now());

    let result = usecase(&db).execute(&token).await;
    assert!(
        matches!(result, Err(ApiError::OrganizationInactive)),
        "expected OrganizationInactive, got {result:?}"
    );
}

#[tokio::test]
async fn should_surface_dangling_session_as_internal() {
    let db = MockDb::seeded();
    let (token, auth) = authed_fixture(&db, true);
    // Corrupt the store: session without a user row.
    db.users.lock().unwrap().retain(|u| u.id != auth.user_id);

    let result = usecase(&db).execute(&token).await;
    assert!(
        matches!(result, Err(ApiError::Internal(_))),
        "expected Internal, got {result:?}"
    );
}

#[tokio::test]
async fn should_revoke_session_and_audit_on_logout() {
    let db = MockDb::seeded();
    let (_, auth) = authed_fixture(&db, true);

    LogoutUseCase {
        sessions: db.session_repo(),
        audit: db.audit_repo(),
    }
    .execute(&auth, &ctx())
    .await;

    let sessions = db.sessions.lock().unwrap();
    let revoked = sessions.iter().find(|s| s.id == auth.session_id).unwrap();
    assert!(revoked.revoked_at.is_some());
    assert_eq!(revoked.revoked_reason.as_deref(), Some("logout"));
    drop(sessions);

    assert_eq!(db.audit_actions(), vec!["auth.logout"]);
}

/// Every call fails as if the database dropped mid-request.
struct FailingSessionRepo;

impl SessionRepository for FailingSessionRepo {
    async fn find_for_auth(&self, _token_hash: &str) -> Result<Option<SessionForAuth>, ApiError> {
        Err(ApiError::Internal(anyhow::anyhow!("storage offline")))
    }

    async fn touch_activity(&self, _session_id: Uuid, _now: DateTime<Utc>) -> Result<(), ApiError> {
        Err(ApiError::Internal(anyhow::anyhow!("storage offline")))
    }

    async fn revoke(
        &self,
        _session_id: Uuid,
        _reason: &str,
        _now: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        Err(ApiError::Internal(anyhow::anyhow!("storage offline")))
    }
}

#[tokio::test]
async fn should_complete_logout_even_when_revoke_fails() {
    let db = MockDb::seeded();
    let (_, auth) = authed_fixture(&db, true);

    // Returns unit; the handler clears the cookie and answers 204 regardless.
    LogoutUseCase {
        sessions: FailingSessionRepo,
        audit: db.audit_repo(),
    }
    .execute(&auth, &ctx())
    .await;

    // Revoke failing short-circuits before the audit append.
    assert!(db.audit_actions().is_empty());
}
