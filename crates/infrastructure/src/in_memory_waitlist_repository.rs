use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use launchpad_application::{EntryStatusUpdate, WaitlistRepository};
use launchpad_core::{AppError, AppResult};
use launchpad_domain::{
    DefinitionStats, DefinitionVisibility, EntryPage, EntrySearch, ListDefinitionsInput,
    WaitlistDefinition,
    WaitlistDefinitionId, WaitlistEntry, WaitlistEntryId, WaitlistEntryStatus, WaitlistStatus,
};
use tokio::sync::RwLock;


/// In-memory waitlist repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryWaitlistRepository {
    definitions: RwLock<HashMap<WaitlistDefinitionId, WaitlistDefinition>>,
    entries: RwLock<HashMap<WaitlistEntryId, WaitlistEntry>>,
}

impl InMemoryWaitlistRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, uuid::Uuid)) {
    items.sort_by(|left, right| key(right).cmp(&key(left)));
}

#[async_trait]
impl WaitlistRepository for InMemoryWaitlistRepository {
    async fn create_definition(&self, definition: WaitlistDefinition) -> AppResult<()> {
        let mut definitions = self.definitions.write().await;
        if definitions.contains_key(&definition.id) {
            return Err(AppError::Conflict(format!(
                "waitlist definition '{}' already exists",
                definition.id
            )));
        }

        definitions.insert(definition.id, definition);
        Ok(())
    }

    async fn find_definition(
        &self,
        definition_id: WaitlistDefinitionId,
    ) -> AppResult<Option<WaitlistDefinition>> {
        Ok(self.definitions.read().await.get(&definition_id).cloned())
    }

    async fn list_definitions(
        &self,
        visibility: DefinitionVisibility,
        filter: &ListDefinitionsInput,
    ) -> AppResult<Vec<WaitlistDefinition>> {
        let mut values: Vec<WaitlistDefinition> = self
            .definitions
            .read()
            .await
            .values()
            .filter(|definition| visibility.includes(definition) && filter.matches(definition))
            .cloned()
            .collect();
        newest_first(&mut values, |definition| {
            (definition.created_at, definition.id.as_uuid())
        });

        Ok(values)
    }

    async fn count_active_definitions(&self, visibility: DefinitionVisibility) -> AppResult<u64> {
        let active = self
            .definitions
            .read()
            .await
            .values()
            .filter(|definition| {
                visibility.includes(definition) && definition.status == WaitlistStatus::Active
            })
            .count();

        Ok(u64::try_from(active).unwrap_or(u64::MAX))
    }

    async fn definition_stats(
        &self,
        definition_id: WaitlistDefinitionId,
    ) -> AppResult<DefinitionStats> {
        let entries = self.entries.read().await;
        let mut stats = DefinitionStats {
            definition_id,
            ..DefinitionStats::default()
        };

        for entry in entries
            .values()
            .filter(|entry| entry.definition_id == definition_id)
        {
            stats.total += 1;
            match entry.status {
                WaitlistEntryStatus::Pending => stats.pending += 1,
                WaitlistEntryStatus::Approved => stats.approved += 1,
                WaitlistEntryStatus::Rejected => stats.rejected += 1,
            }
        }

        Ok(stats)
    }

    async fn create_entry(&self, entry: WaitlistEntry) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        if entries.values().any(|existing| {
            existing.definition_id == entry.definition_id && existing.email == entry.email
        }) {
            return Err(AppError::Conflict(format!(
                "'{}' has already joined waitlist '{}'",
                entry.email, entry.definition_id
            )));
        }

        entries.insert(entry.id, entry);
        Ok(())
    }

    async fn find_entry(&self, entry_id: WaitlistEntryId) -> AppResult<Option<WaitlistEntry>> {
        Ok(self.entries.read().await.get(&entry_id).cloned())
    }

    async fn update_entry_status(
        &self,
        entry_id: WaitlistEntryId,
        status: WaitlistEntryStatus,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Option<EntryStatusUpdate>> {
        let mut entries = self.entries.write().await;
        let Some(entry) = entries.get_mut(&entry_id) else {
            return Ok(None);
        };

        let previous_status = entry.status;
        entry.status = status;
        entry.updated_at = updated_at;

        Ok(Some(EntryStatusUpdate {
            previous_status,
            entry: entry.clone(),
        }))
    }

    async fn search_entries(&self, search: &EntrySearch) -> AppResult<EntryPage> {
        let mut matching: Vec<WaitlistEntry> = self
            .entries
            .read()
            .await
            .values()
            .filter(|entry| search.matches(entry))
            .cloned()
            .collect();
        newest_first(&mut matching, |entry| (entry.created_at, entry.id.as_uuid()));

        let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let offset = usize::try_from(search.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(search.limit).unwrap_or(usize::MAX);

        Ok(EntryPage {
            entries: matching.into_iter().skip(offset).take(limit).collect(),
            total,
            limit: search.limit,
            offset: search.offset,
        })
    }
}
