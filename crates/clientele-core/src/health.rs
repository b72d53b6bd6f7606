use axum::http::StatusCode;

/// `GET /healthz` — liveness. Answers as long as the process is up; says
/// nothing about the database.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// `GET /readyz` — readiness. The API service currently treats a reachable
/// process as ready; connection failures surface per-request instead.
pub async fn readyz() -> StatusCode {
    StatusCode::OK
}
