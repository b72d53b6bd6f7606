use chrono::Utc;
use uuid::Uuid;

use crate::authz::AccessScope;
use crate::domain::repository::ClientRepository;
use crate::domain::types::{AuthContext, Client};
use crate::error::ApiError;

pub struct ListClientsInput {
    pub page: u64,
    pub per_page: u64,
}

pub struct CreateClientInput {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
}

/// Tenant-scoped client listing. The access scope decides whether the user
/// sees the whole organization or only their own records.
pub struct ListClientsUseCase<C>
where
    C: ClientRepository,
{
    pub clients: C,
}

impl<C> ListClientsUseCase<C>
where
    C: ClientRepository,
{
    pub async fn execute(
        &self,
        auth: &AuthContext,
        scope: &AccessScope,
        input: ListClientsInput,
    ) -> Result<Vec<Client>, ApiError> {
        let per_page = input.per_page.clamp(1, 100);
        let page = input.page.max(1);
        self.clients
            .list(
                auth.organization_id,
                scope.created_by_filter(),
                page,
                per_page,
            )
            .await
    }
}

pub struct CreateClientUseCase<C>
where
    C: ClientRepository,
{
    pub clients: C,
}

impl<C> CreateClientUseCase<C>
where
    C: ClientRepository,
{
    pub async fn execute(
        &self,
        auth: &AuthContext,
        input: CreateClientInput,
    ) -> Result<Client, ApiError> {
        let now = Utc::now();
        let client = Client {
            id: Uuid::now_v7(),
            organization_id: auth.organization_id,
            created_by: auth.user_id,
            name: input.name,
            email: input.email,
            phone: input.phone,
            company: input.company,
            created_at: now,
            updated_at: now,
        };
        self.clients.create(&client).await?;
        Ok(client)
    }
}
