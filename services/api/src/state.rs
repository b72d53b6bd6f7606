use sea_orm::DatabaseConnection;

use crate::infra::db::{
    DbAuditLogRepository, DbClientRepository, DbOrganizationRepository, DbOtpRepository,
    DbSessionRepository, DbUserRepository,
};

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub cookie_domain: String,
    /// Secure cookie attribute; on in production.
    pub secure_cookies: bool,
    /// Dev-mode OTP delivery through the log; off in production.
    pub log_otp_codes: bool,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn organization_repo(&self) -> DbOrganizationRepository {
        DbOrganizationRepository {
            db: self.db.clone(),
        }
    }

    pub fn otp_repo(&self) -> DbOtpRepository {
        DbOtpRepository {
            db: self.db.clone(),
        }
    }

    pub fn session_repo(&self) -> DbSessionRepository {
        DbSessionRepository {
            db: self.db.clone(),
        }
    }

    pub fn audit_repo(&self) -> DbAuditLogRepository {
        DbAuditLogRepository {
            db: self.db.clone(),
        }
    }

    pub fn client_repo(&self) -> DbClientRepository {
        DbClientRepository {
            db: self.db.clone(),
        }
    }
}
