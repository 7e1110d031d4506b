//! Waitlist definitions and entries.
//!
//! Every operation checks its permission before changing storage. Global
//! roles reach every definition; organization roles only reach definitions
//! owned by the organization the actor acts within. Entry writes invalidate
//! cached searches of the affected definition and publish an
//! [`EntryStatusChanged`](launchpad_domain::EntryStatusChanged) event.

use std::sync::Arc;

use launchpad_core::{AppResult, OrganizationId};
use launchpad_domain::{
    Actor, DefinitionVisibility, EntryStatusChanged, Permission, WaitlistDefinition,
    WaitlistDefinitionId, WaitlistEntry, WaitlistEntryId,
};
use tracing::warn;

use crate::{AuthorizationService, EntrySearchCache, WaitlistEventPublisher, WaitlistRepository};

mod definitions;
mod entries;
mod subscriptions;

#[cfg(test)]
mod tests;

/// Application service for waitlists.
#[derive(Clone)]
pub struct WaitlistService {
    repository: Arc<dyn WaitlistRepository>,
    authorization_service: AuthorizationService,
    search_cache: Arc<dyn EntrySearchCache>,
    event_publisher: Arc<dyn WaitlistEventPublisher>,
}

impl WaitlistService {
    /// Creates a new waitlist service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn WaitlistRepository>,
        authorization_service: AuthorizationService,
        search_cache: Arc<dyn EntrySearchCache>,
        event_publisher: Arc<dyn WaitlistEventPublisher>,
    ) -> Self {
        Self {
            repository,
            authorization_service,
            search_cache,
            event_publisher,
        }
    }

    async fn holds_globally(&self, actor: &Actor, permission: Permission) -> AppResult<bool> {
        self.authorization_service
            .has_permission_on(actor, permission, None)
            .await
    }

    async fn holds_on(
        &self,
        actor: &Actor,
        permission: Permission,
        owner: Option<OrganizationId>,
    ) -> AppResult<bool> {
        if owner.is_none() {
            return Ok(false);
        }

        self.authorization_service
            .has_permission_on(actor, permission, owner)
            .await
    }

    /// Loads a definition the actor may act on with `permission`.
    ///
    /// Without a global grant, a definition outside the actor's organization
    /// is `Forbidden` whether or not it exists.
    async fn authorized_definition(
        &self,
        actor: &Actor,
        permission: Permission,
        definition_id: WaitlistDefinitionId,
    ) -> AppResult<Option<WaitlistDefinition>> {
        if self.holds_globally(actor, permission).await? {
            return self.repository.find_definition(definition_id).await;
        }
        if actor.organization_id.is_none() {
            return Err(AuthorizationService::denied(actor, permission));
        }

        let definition = self.repository.find_definition(definition_id).await?;
        let owner = definition
            .as_ref()
            .and_then(|definition| definition.organization_id);
        if self.holds_on(actor, permission, owner).await? {
            return Ok(definition);
        }

        Err(AuthorizationService::denied(actor, permission))
    }

    /// Loads an entry the actor may act on with `permission`, judged by the
    /// owner of the entry's definition.
    async fn authorized_entry(
        &self,
        actor: &Actor,
        permission: Permission,
        entry_id: WaitlistEntryId,
    ) -> AppResult<Option<WaitlistEntry>> {
        if self.holds_globally(actor, permission).await? {
            return self.repository.find_entry(entry_id).await;
        }
        if actor.organization_id.is_none() {
            return Err(AuthorizationService::denied(actor, permission));
        }

        let Some(entry) = self.repository.find_entry(entry_id).await? else {
            return Err(AuthorizationService::denied(actor, permission));
        };
        let owner = self
            .repository
            .find_definition(entry.definition_id)
            .await?
            .and_then(|definition| definition.organization_id);
        if self.holds_on(actor, permission, owner).await? {
            return Ok(Some(entry));
        }

        Err(AuthorizationService::denied(actor, permission))
    }

    /// Resolves which definitions an unscoped read may cover.
    async fn visibility(
        &self,
        actor: &Actor,
        permission: Permission,
    ) -> AppResult<DefinitionVisibility> {
        if self.holds_globally(actor, permission).await? {
            return Ok(DefinitionVisibility::All);
        }

        if let Some(organization_id) = actor.organization_id
            && self
                .holds_on(actor, permission, Some(organization_id))
                .await?
        {
            return Ok(DefinitionVisibility::Organization(organization_id));
        }

        Err(AuthorizationService::denied(actor, permission))
    }

    /// Runs the follow-ups of a committed entry write.
    ///
    /// The entry is already stored, so failures are logged rather than
    /// returned to the caller.
    async fn after_entry_write(&self, event: EntryStatusChanged) {
        if let Err(error) = self
            .search_cache
            .invalidate_definition(event.definition_id)
            .await
        {
            warn!(
                definition_id = %event.definition_id,
                error = %error,
                "failed to invalidate cached entry searches"
            );
        }

        let entry_id = event.entry_id;
        if let Err(error) = self.event_publisher.publish(event).await {
            warn!(
                entry_id = %entry_id,
                error = %error,
                "failed to publish entry status change"
            );
        }
    }
}
