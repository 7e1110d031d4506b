//! Waitlist definitions, entries and their input schemas.

mod definition;
mod entry;

pub use definition::{
    ActiveCount, CreateDefinitionInput, DESCRIPTION_MIN_LENGTH, DefinitionStats,
    DefinitionVisibility, FieldType,
    GetActiveCountInput, GetDefinitionInput, GetStatsInput, ListDefinitionsInput, NAME_MAX_LENGTH,
    WaitlistDefinition, WaitlistDefinitionId, WaitlistField, WaitlistStatus, WaitlistType,
};
pub use entry::{
    CreateEntryInput, EntryPage, EntrySearch, EntryStatusChanged, EntryStatusSubscriptionInput,
    FieldValue, GetEntryInput, NewWaitlistEntry, SEARCH_DEFAULT_LIMIT, SEARCH_MAX_LIMIT,
    SearchEntriesInput, UpdateEntryStatusInput, WaitlistEntry, WaitlistEntryId,
    WaitlistEntryStatus,
};
