use super::*;

impl PostgresUserRepository {
    pub(super) async fn create_impl(&self, user: NewUserRecord) -> AppResult<UserRecord> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, password_hash, role)
            VALUES ($1, LOWER($2), $3, $4)
            RETURNING id, email, password_hash, role, created_at
            "#,
        )
        .bind(UserId::new().as_uuid())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_str())
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| email_conflict_or_internal(error, "create user"))?;

        UserRecord::try_from(row)
    }
}
