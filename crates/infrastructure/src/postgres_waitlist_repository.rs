//! PostgreSQL-backed waitlist repository.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use launchpad_application::{EntryStatusUpdate, WaitlistRepository};
use launchpad_core::{AppError, AppResult, OrganizationId};
use launchpad_domain::{
    DefinitionStats, DefinitionVisibility, EntryPage, EntrySearch, FieldValue,
    ListDefinitionsInput, WaitlistDefinition,
    WaitlistDefinitionId, WaitlistEntry, WaitlistEntryId, WaitlistEntryStatus, WaitlistField,
    WaitlistStatus, WaitlistType,
};

mod definitions;
mod entries;

/// PostgreSQL implementation of the waitlist repository port.
#[derive(Clone)]
pub struct PostgresWaitlistRepository {
    pool: PgPool,
}

impl PostgresWaitlistRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DefinitionRow {
    id: uuid::Uuid,
    name: String,
    description: String,
    waitlist_type: String,
    status: String,
    fields: Json<Vec<WaitlistField>>,
    organization_id: Option<uuid::Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DefinitionRow> for WaitlistDefinition {
    type Error = AppError;

    fn try_from(row: DefinitionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: WaitlistDefinitionId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            waitlist_type: WaitlistType::from_str(row.waitlist_type.as_str()).map_err(corrupt)?,
            status: WaitlistStatus::from_str(row.status.as_str()).map_err(corrupt)?,
            fields: row.fields.0,
            organization_id: row.organization_id.map(OrganizationId::from_uuid),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    id: uuid::Uuid,
    definition_id: uuid::Uuid,
    email: String,
    referred_by: Option<String>,
    status: String,
    metadata: serde_json::Value,
    field_values: Json<Vec<FieldValue>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EntryRow> for WaitlistEntry {
    type Error = AppError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: WaitlistEntryId::from_uuid(row.id),
            definition_id: WaitlistDefinitionId::from_uuid(row.definition_id),
            email: row.email,
            by: row.referred_by,
            status: WaitlistEntryStatus::from_str(row.status.as_str()).map_err(corrupt)?,
            metadata: row.metadata,
            field_values: row.field_values.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UpdatedEntryRow {
    #[sqlx(flatten)]
    entry: EntryRow,
    previous_status: String,
}

fn corrupt(error: AppError) -> AppError {
    AppError::Internal(format!("corrupt waitlist row: {error}"))
}

fn count(value: i64) -> AppResult<u64> {
    u64::try_from(value)
        .map_err(|error| AppError::Internal(format!("invalid row count '{value}': {error}")))
}

#[async_trait]
impl WaitlistRepository for PostgresWaitlistRepository {
    async fn create_definition(&self, definition: WaitlistDefinition) -> AppResult<()> {
        self.create_definition_impl(definition).await
    }

    async fn find_definition(
        &self,
        definition_id: WaitlistDefinitionId,
    ) -> AppResult<Option<WaitlistDefinition>> {
        self.find_definition_impl(definition_id).await
    }

    async fn list_definitions(
        &self,
        visibility: DefinitionVisibility,
        filter: &ListDefinitionsInput,
    ) -> AppResult<Vec<WaitlistDefinition>> {
        self.list_definitions_impl(visibility, filter).await
    }

    async fn count_active_definitions(&self, visibility: DefinitionVisibility) -> AppResult<u64> {
        self.count_active_definitions_impl(visibility).await
    }

    async fn definition_stats(
        &self,
        definition_id: WaitlistDefinitionId,
    ) -> AppResult<DefinitionStats> {
        self.definition_stats_impl(definition_id).await
    }

    async fn create_entry(&self, entry: WaitlistEntry) -> AppResult<()> {
        self.create_entry_impl(entry).await
    }

    async fn find_entry(&self, entry_id: WaitlistEntryId) -> AppResult<Option<WaitlistEntry>> {
        self.find_entry_impl(entry_id).await
    }

    async fn update_entry_status(
        &self,
        entry_id: WaitlistEntryId,
        status: WaitlistEntryStatus,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Option<EntryStatusUpdate>> {
        self.update_entry_status_impl(entry_id, status, updated_at)
            .await
    }

    async fn search_entries(&self, search: &EntrySearch) -> AppResult<EntryPage> {
        self.search_entries_impl(search).await
    }
}
