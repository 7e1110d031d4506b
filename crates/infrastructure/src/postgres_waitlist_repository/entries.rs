use super::*;

impl PostgresWaitlistRepository {
    pub(super) async fn create_entry_impl(&self, entry: WaitlistEntry) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO waitlist_entries (
                id, definition_id, email, referred_by, status, metadata,
                field_values, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(entry.id.as_uuid())
        .bind(entry.definition_id.as_uuid())
        .bind(entry.email.as_str())
        .bind(entry.by.as_deref())
        .bind(entry.status.as_str())
        .bind(&entry.metadata)
        .bind(Json(&entry.field_values))
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(ref database_error) = error
                && database_error.code().as_deref() == Some("23505")
            {
                return AppError::Conflict(format!(
                    "'{}' has already joined waitlist '{}'",
                    entry.email, entry.definition_id
                ));
            }

            AppError::Internal(format!("failed to create waitlist entry: {error}"))
        })?;

        Ok(())
    }

    pub(super) async fn find_entry_impl(
        &self,
        entry_id: WaitlistEntryId,
    ) -> AppResult<Option<WaitlistEntry>> {
        let row = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT id, definition_id, email, referred_by, status, metadata,
                   field_values, created_at, updated_at
            FROM waitlist_entries
            WHERE id = $1
            "#,
        )
        .bind(entry_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find waitlist entry '{entry_id}': {error}"))
        })?;

        row.map(WaitlistEntry::try_from).transpose()
    }

    pub(super) async fn update_entry_status_impl(
        &self,
        entry_id: WaitlistEntryId,
        status: WaitlistEntryStatus,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Option<EntryStatusUpdate>> {
        let row = sqlx::query_as::<_, UpdatedEntryRow>(
            r#"
            WITH previous AS (
                SELECT id, status
                FROM waitlist_entries
                WHERE id = $1
                FOR UPDATE
            )
            UPDATE waitlist_entries entries
            SET status = $2, updated_at = $3
            FROM previous
            WHERE entries.id = previous.id
            RETURNING entries.id, entries.definition_id, entries.email, entries.referred_by,
                      entries.status, entries.metadata, entries.field_values,
                      entries.created_at, entries.updated_at,
                      previous.status AS previous_status
            "#,
        )
        .bind(entry_id.as_uuid())
        .bind(status.as_str())
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to update status of waitlist entry '{entry_id}': {error}"
            ))
        })?;

        row.map(|row| {
            Ok(EntryStatusUpdate {
                previous_status: WaitlistEntryStatus::from_str(row.previous_status.as_str())
                    .map_err(corrupt)?,
                entry: WaitlistEntry::try_from(row.entry)?,
            })
        })
        .transpose()
    }

    pub(super) async fn search_entries_impl(&self, search: &EntrySearch) -> AppResult<EntryPage> {
        let definition_id = search.definition_id.map(|id| id.as_uuid());
        let status = search.status.map(|status| status.as_str());
        let email = search.email.as_deref();

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM waitlist_entries
            WHERE ($1::UUID IS NULL OR definition_id = $1)
              AND ($2::TEXT IS NULL OR status = $2)
              AND ($3::TEXT IS NULL OR POSITION($3 IN email) > 0)
            "#,
        )
        .bind(definition_id)
        .bind(status)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count waitlist entries: {error}")))?;

        let rows = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT id, definition_id, email, referred_by, status, metadata,
                   field_values, created_at, updated_at
            FROM waitlist_entries
            WHERE ($1::UUID IS NULL OR definition_id = $1)
              AND ($2::TEXT IS NULL OR status = $2)
              AND ($3::TEXT IS NULL OR POSITION($3 IN email) > 0)
            ORDER BY created_at DESC, id DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(definition_id)
        .bind(status)
        .bind(email)
        .bind(i64::from(search.limit))
        .bind(i64::from(search.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to search waitlist entries: {error}"))
        })?;

        Ok(EntryPage {
            entries: rows
                .into_iter()
                .map(WaitlistEntry::try_from)
                .collect::<AppResult<Vec<_>>>()?,
            total: count(total)?,
            limit: search.limit,
            offset: search.offset,
        })
    }
}
