use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use launchpad_application::EntrySearchCache;
use launchpad_core::AppResult;
use launchpad_domain::{EntryPage, EntrySearch, WaitlistDefinitionId};
use tokio::sync::RwLock;

/// Upper bound on cached pages; the page closest to expiry is evicted first.
const MAX_CACHED_SEARCHES: usize = 1024;

#[derive(Debug, Clone)]
struct SearchCacheEntry {
    page: EntryPage,
    expires_at: Instant,
}

/// In-memory TTL cache for entry search pages.
#[derive(Debug)]
pub struct InMemoryEntrySearchCache {
    ttl: Duration,
    max_entries: usize,
    entries: RwLock<HashMap<EntrySearch, SearchCacheEntry>>,
}

impl InMemoryEntrySearchCache {
    /// Creates an empty cache. A zero ttl disables caching.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            max_entries: MAX_CACHED_SEARCHES,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl EntrySearchCache for InMemoryEntrySearchCache {
    async fn get_page(&self, search: &EntrySearch) -> AppResult<Option<EntryPage>> {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(search) {
                if entry.expires_at > Instant::now() {
                    return Ok(Some(entry.page.clone()));
                }
            } else {
                return Ok(None);
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(search)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(search);
        }

        Ok(None)
    }

    async fn put_page(&self, search: EntrySearch, page: EntryPage) -> AppResult<()> {
        if self.ttl.is_zero() {
            return Ok(());
        }

        let now = Instant::now();
        let expires_at = now.checked_add(self.ttl).unwrap_or(now);

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
        if !entries.contains_key(&search) && entries.len() >= self.max_entries {
            let soonest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.expires_at)
                .map(|(key, _)| key.clone());
            if let Some(soonest) = soonest {
                entries.remove(&soonest);
            }
        }
        entries.insert(search, SearchCacheEntry { page, expires_at });

        Ok(())
    }

    async fn invalidate_definition(&self, definition_id: WaitlistDefinitionId) -> AppResult<()> {
        self.entries.write().await.retain(|search, _| {
            search
                .definition_id
                .is_some_and(|cached| cached != definition_id)
        });

        Ok(())
    }
}
