use chrono::Utc;
use launchpad_core::{AppError, AppResult, Validate};
use launchpad_domain::{
    Actor, CreateEntryInput, EntryPage, EntryStatusChanged, GetEntryInput, Permission,
    SearchEntriesInput, UpdateEntryStatusInput, WaitlistEntry, WaitlistEntryId,
};

use super::WaitlistService;
use super::definitions::missing_definition;

impl WaitlistService {
    /// Joins a waitlist.
    ///
    /// The definition must exist and be `ACTIVE`.
    pub async fn create_entry(
        &self,
        actor: &Actor,
        input: CreateEntryInput,
    ) -> AppResult<WaitlistEntry> {
        let definition = self
            .authorized_definition(actor, Permission::WaitlistEntryCreate, input.definition_id)
            .await?
            .ok_or_else(|| missing_definition(input.definition_id))?;

        let new_entry = input.into_new_entry()?;
        if !definition.accepts_entries() {
            return Err(AppError::Conflict(format!(
                "waitlist '{}' is {} and does not accept entries",
                definition.name,
                definition.status.as_str()
            )));
        }

        let entry = new_entry.into_entry(Utc::now());
        self.repository.create_entry(entry.clone()).await?;
        self.after_entry_write(EntryStatusChanged::created(&entry))
            .await;

        Ok(entry)
    }

    /// Overwrites an entry's review status.
    ///
    /// Concurrent updates of one entry are last-writer-wins.
    pub async fn update_entry_status(
        &self,
        actor: &Actor,
        input: UpdateEntryStatusInput,
    ) -> AppResult<WaitlistEntry> {
        input.validate()?;
        self.authorized_entry(actor, Permission::WaitlistEntryUpdateStatus, input.entry_id)
            .await?
            .ok_or_else(|| missing_entry(input.entry_id))?;

        let update = self
            .repository
            .update_entry_status(input.entry_id, input.status, Utc::now())
            .await?
            .ok_or_else(|| missing_entry(input.entry_id))?;
        self.after_entry_write(EntryStatusChanged::updated(
            &update.entry,
            update.previous_status,
        ))
        .await;

        Ok(update.entry)
    }

    /// Returns one entry.
    pub async fn get_entry(&self, actor: &Actor, input: GetEntryInput) -> AppResult<WaitlistEntry> {
        input.validate()?;

        self.authorized_entry(actor, Permission::WaitlistEntryGetEntry, input.entry_id)
            .await?
            .ok_or_else(|| missing_entry(input.entry_id))
    }

    /// Pages through entries, serving repeated searches from the cache.
    ///
    /// Organization grants only cover searches filtered to one of the
    /// organization's definitions.
    pub async fn search_entries(
        &self,
        actor: &Actor,
        input: SearchEntriesInput,
    ) -> AppResult<EntryPage> {
        input.validate()?;
        let permission = Permission::WaitlistEntrySearchEntries;
        match input.definition_id {
            Some(definition_id) => {
                self.authorized_definition(actor, permission, definition_id)
                    .await?;
            }
            None => {
                self.authorization_service
                    .require_permission_on(actor, permission, None)
                    .await?;
            }
        }

        let search = input.normalized();
        if let Some(page) = self.search_cache.get_page(&search).await? {
            return Ok(page);
        }

        let page = self.repository.search_entries(&search).await?;
        self.search_cache.put_page(search, page.clone()).await?;
        Ok(page)
    }
}

fn missing_entry(entry_id: WaitlistEntryId) -> AppError {
    AppError::NotFound(format!("waitlist entry '{entry_id}' does not exist"))
}
