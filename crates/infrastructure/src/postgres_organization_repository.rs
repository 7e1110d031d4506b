//! PostgreSQL-backed organization and membership repository.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use launchpad_application::OrganizationRepository;
use launchpad_core::{AppError, AppResult, OrganizationId};
use launchpad_domain::{Membership, Organization, OrganizationRole, UserId};

/// PostgreSQL implementation of the organization repository port.
#[derive(Clone)]
pub struct PostgresOrganizationRepository {
    pool: PgPool,
}

impl PostgresOrganizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrganizationRow {
    id: uuid::Uuid,
    name: String,
    slug: String,
    created_at: DateTime<Utc>,
}

impl From<OrganizationRow> for Organization {
    fn from(row: OrganizationRow) -> Self {
        Self {
            id: OrganizationId::from_uuid(row.id),
            name: row.name,
            slug: row.slug,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MembershipRow {
    organization_id: uuid::Uuid,
    user_id: uuid::Uuid,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MembershipRow> for Membership {
    type Error = AppError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        Ok(Self {
            organization_id: OrganizationId::from_uuid(row.organization_id),
            user_id: UserId::from_uuid(row.user_id),
            email: row.email,
            role: OrganizationRole::from_str(row.role.as_str())
                .map_err(|error| AppError::Internal(format!("corrupt membership row: {error}")))?,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl OrganizationRepository for PostgresOrganizationRepository {
    async fn create_organization(
        &self,
        organization: Organization,
        owner: Membership,
    ) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to start organization create transaction: {error}"
            ))
        })?;

        sqlx::query(
            r#"
            INSERT INTO organizations (id, name, slug, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(organization.id.as_uuid())
        .bind(organization.name.as_str())
        .bind(organization.slug.as_str())
        .bind(organization.created_at)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            unique_conflict_or_internal(
                error,
                format!("organization slug '{}' is already taken", organization.slug),
                "create organization",
            )
        })?;

        insert_membership(&mut *transaction, &owner).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to commit organization '{}': {error}",
                organization.slug
            ))
        })?;

        Ok(())
    }

    async fn find_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Option<Organization>> {
        let row = sqlx::query_as::<_, OrganizationRow>(
            r#"
            SELECT id, name, slug, created_at
            FROM organizations
            WHERE id = $1
            "#,
        )
        .bind(organization_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to find organization '{organization_id}': {error}"
            ))
        })?;

        Ok(row.map(Organization::from))
    }

    async fn find_membership(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> AppResult<Option<Membership>> {
        let row = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT members.organization_id, members.user_id, users.email,
                   members.role, members.created_at
            FROM organization_members members
            INNER JOIN users ON users.id = members.user_id
            WHERE members.organization_id = $1 AND members.user_id = $2
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to find membership in organization '{organization_id}': {error}"
            ))
        })?;

        row.map(Membership::try_from).transpose()
    }

    async fn add_membership(&self, membership: Membership) -> AppResult<()> {
        insert_membership(&self.pool, &membership).await
    }
}

async fn insert_membership(
    executor: impl sqlx::PgExecutor<'_>,
    membership: &Membership,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO organization_members (organization_id, user_id, role, created_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(membership.organization_id.as_uuid())
    .bind(membership.user_id.as_uuid())
    .bind(membership.role.as_str())
    .bind(membership.created_at)
    .execute(executor)
    .await
    .map_err(|error| {
        unique_conflict_or_internal(
            error,
            format!(
                "user '{}' is already a member of organization '{}'",
                membership.user_id, membership.organization_id
            ),
            "add organization member",
        )
    })?;

    Ok(())
}

fn unique_conflict_or_internal(error: sqlx::Error, conflict: String, operation: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(conflict);
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}
