use super::*;

impl PostgresWaitlistRepository {
    pub(super) async fn create_definition_impl(
        &self,
        definition: WaitlistDefinition,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO waitlist_definitions (
                id, name, description, waitlist_type, status, fields, organization_id,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(definition.id.as_uuid())
        .bind(definition.name.as_str())
        .bind(definition.description.as_str())
        .bind(definition.waitlist_type.as_str())
        .bind(definition.status.as_str())
        .bind(Json(&definition.fields))
        .bind(definition.organization_id.map(|id| id.as_uuid()))
        .bind(definition.created_at)
        .bind(definition.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to create waitlist definition '{}': {error}",
                definition.name
            ))
        })?;

        Ok(())
    }

    pub(super) async fn find_definition_impl(
        &self,
        definition_id: WaitlistDefinitionId,
    ) -> AppResult<Option<WaitlistDefinition>> {
        let row = sqlx::query_as::<_, DefinitionRow>(
            r#"
            SELECT id, name, description, waitlist_type, status, fields, organization_id,
                created_at, updated_at
            FROM waitlist_definitions
            WHERE id = $1
            "#,
        )
        .bind(definition_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to find waitlist definition '{definition_id}': {error}"
            ))
        })?;

        row.map(WaitlistDefinition::try_from).transpose()
    }

    pub(super) async fn list_definitions_impl(
        &self,
        visibility: DefinitionVisibility,
        filter: &ListDefinitionsInput,
    ) -> AppResult<Vec<WaitlistDefinition>> {
        let rows = sqlx::query_as::<_, DefinitionRow>(
            r#"
            SELECT id, name, description, waitlist_type, status, fields, organization_id,
                created_at, updated_at
            FROM waitlist_definitions
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::TEXT IS NULL OR waitlist_type = $2)
              AND ($3::UUID IS NULL OR organization_id = $3)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(filter.status.map(|status| status.as_str()))
        .bind(filter.waitlist_type.map(|kind| kind.as_str()))
        .bind(visibility.organization_id().map(|id| id.as_uuid()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list waitlist definitions: {error}"))
        })?;

        rows.into_iter().map(WaitlistDefinition::try_from).collect()
    }

    pub(super) async fn count_active_definitions_impl(
        &self,
        visibility: DefinitionVisibility,
    ) -> AppResult<u64> {
        let active = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM waitlist_definitions
            WHERE status = $1
              AND ($2::UUID IS NULL OR organization_id = $2)
            "#,
        )
        .bind(WaitlistStatus::Active.as_str())
        .bind(visibility.organization_id().map(|id| id.as_uuid()))
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to count active waitlists: {error}"))
        })?;

        count(active)
    }

    pub(super) async fn definition_stats_impl(
        &self,
        definition_id: WaitlistDefinitionId,
    ) -> AppResult<DefinitionStats> {
        let (total, pending, approved, rejected) =
            sqlx::query_as::<_, (i64, i64, i64, i64)>(
                r#"
                SELECT
                    COUNT(*),
                    COUNT(*) FILTER (WHERE status = 'PENDING'),
                    COUNT(*) FILTER (WHERE status = 'APPROVED'),
                    COUNT(*) FILTER (WHERE status = 'REJECTED')
                FROM waitlist_entries
                WHERE definition_id = $1
                "#,
            )
            .bind(definition_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to compute stats for waitlist '{definition_id}': {error}"
                ))
            })?;

        Ok(DefinitionStats {
            definition_id,
            total: count(total)?,
            pending: count(pending)?,
            approved: count(approved)?,
            rejected: count(rejected)?,
        })
    }
}
