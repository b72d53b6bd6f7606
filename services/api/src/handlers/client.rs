use axum::{
    Extension, Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::authz::AuthorizeUseCase;
use crate::domain::types::{AuthContext, Client};
use crate::error::ApiError;
use crate::handlers::request_context;
use crate::state::AppState;
use crate::usecase::client::{
    CreateClientInput, CreateClientUseCase, ListClientsInput, ListClientsUseCase,
};

#[derive(Serialize)]
pub struct ClientResponse {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub created_by: Uuid,
    #[serde(serialize_with = "clientele_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

fn client_response(client: Client) -> ClientResponse {
    ClientResponse {
        id: client.id,
        name: client.name,
        email: client.email,
        phone: client.phone,
        company: client.company,
        created_by: client.created_by,
        created_at: client.created_at,
    }
}

// ── GET /clients ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ListClientsQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

#[derive(Serialize)]
pub struct ListClientsResponse {
    pub clients: Vec<ClientResponse>,
    pub page: u64,
    pub per_page: u64,
}

pub async fn list_clients(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    headers: HeaderMap,
    Query(query): Query<ListClientsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = request_context(&headers);
    let scope = AuthorizeUseCase {
        users: state.user_repo(),
        audit: state.audit_repo(),
    }
    .execute(&auth, "clients:read", &ctx)
    .await?;

    let usecase = ListClientsUseCase {
        clients: state.client_repo(),
    };
    let clients = usecase
        .execute(
            &auth,
            &scope,
            ListClientsInput {
                page: query.page,
                per_page: query.per_page,
            },
        )
        .await?;

    Ok(Json(ListClientsResponse {
        clients: clients.into_iter().map(client_response).collect(),
        page: query.page.max(1),
        per_page: query.per_page.clamp(1, 100),
    }))
}

// ── POST /clients ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateClientRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
}

pub async fn create_client(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    headers: HeaderMap,
    Json(body): Json<CreateClientRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = request_context(&headers);
    AuthorizeUseCase {
        users: state.user_repo(),
        audit: state.audit_repo(),
    }
    .execute(&auth, "clients:create", &ctx)
    .await?;

    let usecase = CreateClientUseCase {
        clients: state.client_repo(),
    };
    let client = usecase
        .execute(
            &auth,
            CreateClientInput {
                name: body.name,
                email: body.email,
                phone: body.phone,
                company: body.company,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(client_response(client))))
}
