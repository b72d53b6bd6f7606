use chrono::Utc;

use clientele_api::domain::types::OtpPurpose;
use clientele_api::error::ApiError;
use clientele_api::usecase::register::{RegisterInput, RegisterUseCase};

use crate::helpers::{MockDb, ctx};

fn input(email: &str) -> RegisterInput {
    RegisterInput {
        first_name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
        email: email.to_owned(),
        password: "Passw0rd!".to_owned(),
        organization_name: "Acme Corp".to_owned(),
    }
}

#[tokio::test]
async fn should_register_and_issue_verification_code() {
    let db = MockDb::seeded();
    let uc = RegisterUseCase {
        users: db.user_repo(),
        organizations: db.organization_repo(),
        log_otp_codes: false,
    };

    let out = uc.execute(input("a@x.com"), &ctx()).await.unwrap();
    assert!(out.otp_expires_at > Utc::now());

    let user = db.user_by_email("a@x.com");
    assert!(!user.verified);
    assert_eq!(user.login_attempts, 0);

    let orgs = db.organizations.lock().unwrap();
    assert_eq!(orgs.len(), 1);
    assert_eq!(orgs[0].slug, "acme-corp");
    drop(orgs);

    assert_eq!(db.active_otp_sessions("a@x.com", OtpPurpose::EmailVerification), 1);
    let tokens = db.otp_tokens.lock().unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].code_length, 6);
    assert!(tokens[0].consumed_at.is_none());
    drop(tokens);

    assert_eq!(db.audit_actions(), vec!["auth.register"]);
}

#[tokio::test]
async fn should_lowercase_email_before_storing() {
    let db = MockDb::seeded();
    let uc = RegisterUseCase {
        users: db.user_repo(),
        organizations: db.organization_repo(),
        log_otp_codes: false,
    };

    uc.execute(input("  Ada@X.COM "), &ctx()).await.unwrap();
    assert_eq!(db.user_by_email("ada@x.com").email, "ada@x.com");
}

#[tokio::test]
async fn should_reject_verified_email_with_conflict() {
    let db = MockDb::seeded();
    let org = db.insert_organization();
    db.insert_user(org.id, "a@x.com", true);

    let uc = RegisterUseCase {
        users: db.user_repo(),
        organizations: db.organization_repo(),
        log_otp_codes: false,
    };

    let result = uc.execute(input("a@x.com"), &ctx()).await;
    assert!(
        matches!(result, Err(ApiError::EmailAlreadyRegistered)),
        "expected EmailAlreadyRegistered, got {result:?}"
    );
}

#[tokio::test]
async fn should_signal_unverified_email_distinctly() {
    let db = MockDb::seeded();
    let org = db.insert_organization();
    db.insert_user(org.id, "a@x.com", false);

    let uc = RegisterUseCase {
        users: db.user_repo(),
        organizations: db.organization_repo(),
        log_otp_codes: false,
    };

    let result = uc.execute(input("a@x.com"), &ctx()).await;
    assert!(
        matches!(result, Err(ApiError::EmailNotVerified)),
        "expected EmailNotVerified, got {result:?}"
    );
}

#[tokio::test]
async fn should_disambiguate_slug_collision_with_suffix() {
    let db = MockDb::seeded();
    // Occupies the "acme-corp" slug before the new tenant arrives.
    db.insert_organization();

    let uc = RegisterUseCase {
        users: db.user_repo(),
        organizations: db.organization_repo(),
        log_otp_codes: false,
    };

    uc.execute(input("b@x.com"), &ctx()).await.unwrap();

    let orgs = db.organizations.lock().unwrap();
    let fresh = orgs.iter().find(|o| o.slug != "acme-corp").unwrap();
    assert!(fresh.slug.starts_with("acme-corp-"));
    assert_eq!(fresh.slug.len(), "acme-corp-".len() + 4);
}

#[tokio::test]
async fn should_fail_when_owner_seed_role_missing() {
    // No seeding: the OWNER role is absent, which is a deployment defect.
    let db = MockDb::default();
    let uc = RegisterUseCase {
        users: db.user_repo(),
        organizations: db.organization_repo(),
        log_otp_codes: false,
    };

    let result = uc.execute(input("a@x.com"), &ctx()).await;
    assert!(
        matches!(result, Err(ApiError::Internal(_))),
        "expected Internal, got {result:?}"
    );
    assert!(db.users.lock().unwrap().is_empty());
}
