use chrono::Utc;
use launchpad_core::{AppError, AppResult, Validate};
use launchpad_domain::{
    ActiveCount, Actor, CreateDefinitionInput, DefinitionStats, GetActiveCountInput,
    GetDefinitionInput, GetStatsInput, ListDefinitionsInput, Permission, WaitlistDefinition,
    WaitlistDefinitionId,
};

use super::WaitlistService;

impl WaitlistService {
    /// Creates a waitlist definition.
    ///
    /// A definition created within an organization is owned by it; one
    /// created without an organization context is global.
    pub async fn create_definition(
        &self,
        actor: &Actor,
        input: CreateDefinitionInput,
    ) -> AppResult<WaitlistDefinition> {
        self.authorization_service
            .require_permission(actor, Permission::WaitlistDefinitionCreate)
            .await?;

        let definition = input.into_definition(actor.organization_id, Utc::now())?;
        self.repository
            .create_definition(definition.clone())
            .await?;

        Ok(definition)
    }

    /// Returns one definition.
    pub async fn get_definition(
        &self,
        actor: &Actor,
        input: GetDefinitionInput,
    ) -> AppResult<WaitlistDefinition> {
        input.validate()?;

        self.authorized_definition(actor, Permission::WaitlistDefinitionGet, input.id)
            .await?
            .ok_or_else(|| missing_definition(input.id))
    }

    /// Lists the definitions the actor can see, matching optional filters.
    pub async fn list_definitions(
        &self,
        actor: &Actor,
        input: ListDefinitionsInput,
    ) -> AppResult<Vec<WaitlistDefinition>> {
        input.validate()?;
        let visibility = self
            .visibility(actor, Permission::WaitlistDefinitionList)
            .await?;

        self.repository.list_definitions(visibility, &input).await
    }

    /// Returns per-status entry counts of one definition.
    pub async fn get_stats(
        &self,
        actor: &Actor,
        input: GetStatsInput,
    ) -> AppResult<DefinitionStats> {
        input.validate()?;

        self.authorized_definition(
            actor,
            Permission::WaitlistDefinitionGetStats,
            input.definition_id,
        )
        .await?
        .ok_or_else(|| missing_definition(input.definition_id))?;
        self.repository.definition_stats(input.definition_id).await
    }

    /// Returns the number of visible definitions accepting entries.
    pub async fn get_active_count(
        &self,
        actor: &Actor,
        input: GetActiveCountInput,
    ) -> AppResult<ActiveCount> {
        input.validate()?;
        let visibility = self
            .visibility(actor, Permission::WaitlistDefinitionGetActiveCount)
            .await?;

        Ok(ActiveCount {
            count: self.repository.count_active_definitions(visibility).await?,
        })
    }
}

pub(super) fn missing_definition(definition_id: WaitlistDefinitionId) -> AppError {
    AppError::NotFound(format!("waitlist definition '{definition_id}' does not exist"))
}
