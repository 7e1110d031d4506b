use async_trait::async_trait;
use chrono::{DateTime, Utc};
use launchpad_core::AppResult;
use launchpad_domain::{
    DefinitionStats, DefinitionVisibility, EntryPage, EntrySearch, ListDefinitionsInput,
    WaitlistDefinition,
    WaitlistDefinitionId, WaitlistEntry, WaitlistEntryId, WaitlistEntryStatus,
};

/// Outcome of an entry status update.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryStatusUpdate {
    /// Status the entry had before the update.
    pub previous_status: WaitlistEntryStatus,
    /// Entry after the update.
    pub entry: WaitlistEntry,
}

/// Repository port for waitlist definitions and entries.
#[async_trait]
pub trait WaitlistRepository: Send + Sync {
    /// Persists a new definition.
    async fn create_definition(&self, definition: WaitlistDefinition) -> AppResult<()>;

    /// Finds a definition by identifier.
    async fn find_definition(
        &self,
        definition_id: WaitlistDefinitionId,
    ) -> AppResult<Option<WaitlistDefinition>>;

    /// Lists visible definitions matching the filters, newest first.
    async fn list_definitions(
        &self,
        visibility: DefinitionVisibility,
        filter: &ListDefinitionsInput,
    ) -> AppResult<Vec<WaitlistDefinition>>;

    /// Counts visible definitions with status `ACTIVE`.
    async fn count_active_definitions(&self, visibility: DefinitionVisibility) -> AppResult<u64>;

    /// Counts entries of one definition per status.
    async fn definition_stats(
        &self,
        definition_id: WaitlistDefinitionId,
    ) -> AppResult<DefinitionStats>;

    /// Persists a new entry.
    ///
    /// Fails with `Conflict` when the email already joined the definition.
    async fn create_entry(&self, entry: WaitlistEntry) -> AppResult<()>;

    /// Finds an entry by identifier.
    async fn find_entry(&self, entry_id: WaitlistEntryId) -> AppResult<Option<WaitlistEntry>>;

    /// Overwrites the status of an entry. Concurrent updates are
    /// last-writer-wins. Returns `None` for an unknown entry.
    async fn update_entry_status(
        &self,
        entry_id: WaitlistEntryId,
        status: WaitlistEntryStatus,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Option<EntryStatusUpdate>>;

    /// Returns one page of entries matching a normalized search.
    async fn search_entries(&self, search: &EntrySearch) -> AppResult<EntryPage>;
}
