use chrono::Utc;

use clientele_api::credentials::hash_session_token;
use clientele_api::domain::types::MAX_LOGIN_ATTEMPTS;
use clientele_api::error::ApiError;
use clientele_api::usecase::login::{LoginInput, LoginUseCase};

use crate::helpers::{MockDb, MockUserRepo, TEST_PASSWORD, ctx};

fn usecase(db: &MockDb) -> LoginUseCase<MockUserRepo> {
    LoginUseCase {
        users: db.user_repo(),
    }
}

fn input(email: &str, password: &str) -> LoginInput {
    LoginInput {
        email: email.to_owned(),
        password: password.to_owned(),
    }
}

#[tokio::test]
async fn should_login_and_create_session() {
    let db = MockDb::seeded();
    let org = db.insert_organization();
    let user = db.insert_user(org.id, "a@x.com", true);
    db.grant_permissions(&["clients:read"]);

    let out = usecase(&db)
        .execute(input("a@x.com", TEST_PASSWORD), &ctx())
        .await
        .unwrap();

    assert_eq!(out.user.id, user.id);
    assert_eq!(out.organization.id, org.id);
    assert_eq!(out.permissions, vec!["clients:read".to_owned()]);
    assert!(out.session_expires_at > Utc::now());
    assert_eq!(out.token_last_four.len(), 4);
    assert!(out.token.ends_with(&out.token_last_four));

    // Only the digest of the bearer token is stored.
    let sessions = db.sessions.lock().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].token_hash, hash_session_token(&out.token));
    assert_eq!(sessions[0].user_id, user.id);
    drop(sessions);

    let stored = db.user_by_email("a@x.com");
    assert_eq!(stored.login_attempts, 0);
    assert!(stored.last_login_at.is_some());
    assert_eq!(db.audit_actions(), vec!["auth.login"]);
}

#[tokio::test]
async fn should_return_invalid_credentials_for_unknown_email() {
    let db = MockDb::seeded();
    let result = usecase(&db)
        .execute(input("nobody@x.com", TEST_PASSWORD), &ctx())
        .await;
    assert!(
        matches!(result, Err(ApiError::InvalidCredentials)),
        "expected InvalidCredentials, got {result:?}"
    );
}

#[tokio::test]
async fn should_return_invalid_credentials_for_wrong_password() {
    let db = MockDb::seeded();
    let org = db.insert_organization();
    db.insert_user(org.id, "a@x.com", true);

    let result = usecase(&db).execute(input("a@x.com", "wrong"), &ctx()).await;
    assert!(
        matches!(result, Err(ApiError::InvalidCredentials)),
        "expected InvalidCredentials, got {result:?}"
    );

    let user = db.user_by_email("a@x.com");
    assert_eq!(user.login_attempts, 1);
    assert!(!user.is_locked);
    assert_eq!(db.audit_actions(), vec!["auth.login_failed"]);
}

#[tokio::test]
async fn should_lock_after_max_attempts_and_stay_locked() {
    let db = MockDb::seeded();
    let org = db.insert_organization();
    db.insert_user(org.id, "a@x.com", true);

    // Five consecutive wrong passwords; the fifth response is still the
    // generic credential error, not a lock notice.
    for attempt in 1..=MAX_LOGIN_ATTEMPTS {
        let result = usecase(&db).execute(input("a@x.com", "wrong"), &ctx()).await;
        assert!(
            matches!(result, Err(ApiError::InvalidCredentials)),
            "attempt {attempt}: expected InvalidCredentials, got {result:?}"
        );
    }
    assert!(db.user_by_email("a@x.com").is_locked);

    // No auto-unlock: even the correct password now reports the lock.
    let result = usecase(&db)
        .execute(input("a@x.com", TEST_PASSWORD), &ctx())
        .await;
    assert!(
        matches!(result, Err(ApiError::AccountLocked)),
        "expected AccountLocked, got {result:?}"
    );
    assert!(db.user_by_email("a@x.com").is_locked);
    assert!(db.sessions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_unverified_user() {
    let db = MockDb::seeded();
    let org = db.insert_organization();
    db.insert_user(org.id, "a@x.com", false);

    let result = usecase(&db)
        .execute(input("a@x.com", TEST_PASSWORD), &ctx())
        .await;
    assert!(
        matches!(result, Err(ApiError::AccountNotVerified)),
        "expected AccountNotVerified, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_soft_deleted_organization() {
    let db = MockDb::seeded();
    let org = db.insert_organization();
    db.insert_user(org.id, "a@x.com", true);
    db.organizations
        .lock()
        .unwrap()
        .iter_mut()
        .find(|o| o.id == org.id)
        .unwrap()
        .deleted_at = Some(Utc::now());

    let result = usecase(&db)
        .execute(input("a@x.com", TEST_PASSWORD), &ctx())
        .await;
    assert!(
        matches!(result, Err(ApiError::OrganizationInactive)),
        "expected OrganizationInactive, got {result:?}"
    );
}

#[tokio::test]
async fn should_treat_email_case_insensitively() {
    let db = MockDb::seeded();
    let org = db.insert_organization();
    db.insert_user(org.id, "a@x.com", true);

    let out = usecase(&db)
        .execute(input("A@X.com", TEST_PASSWORD), &ctx())
        .await
        .unwrap();
    assert_eq!(out.user.email, "a@x.com");
}
