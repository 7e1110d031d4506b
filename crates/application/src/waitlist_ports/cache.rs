use async_trait::async_trait;
use launchpad_core::AppResult;
use launchpad_domain::{EntryPage, EntrySearch, WaitlistDefinitionId};

/// Cache port for entry search pages, keyed by normalized search.
#[async_trait]
pub trait EntrySearchCache: Send + Sync {
    /// Returns a cached page for one search.
    async fn get_page(&self, search: &EntrySearch) -> AppResult<Option<EntryPage>>;

    /// Stores a page for one search.
    async fn put_page(&self, search: EntrySearch, page: EntryPage) -> AppResult<()>;

    /// Drops every cached page that may include entries of the definition,
    /// including searches without a definition filter.
    async fn invalidate_definition(&self, definition_id: WaitlistDefinitionId) -> AppResult<()>;
}
