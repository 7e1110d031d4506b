use launchpad_application::EntryStatusStream;
use launchpad_core::AppResult;
use launchpad_domain::{
    ActiveCount, CreateDefinitionInput, CreateEntryInput, DefinitionStats, EntryPage,
    EntryStatusSubscriptionInput, GetActiveCountInput, GetDefinitionInput, GetEntryInput,
    GetStatsInput, ListDefinitionsInput, SearchEntriesInput, UpdateEntryStatusInput,
    WaitlistDefinition, WaitlistEntry,
};

use crate::middleware::RequestContext;
use crate::state::AppState;

pub async fn create_definition(
    state: AppState,
    context: RequestContext,
    input: CreateDefinitionInput,
) -> AppResult<WaitlistDefinition> {
    let actor = context.actor(&state).await?;
    state.waitlist_service.create_definition(&actor, input).await
}

pub async fn get_definition(
    state: AppState,
    context: RequestContext,
    input: GetDefinitionInput,
) -> AppResult<WaitlistDefinition> {
    let actor = context.actor(&state).await?;
    state.waitlist_service.get_definition(&actor, input).await
}

pub async fn list_definitions(
    state: AppState,
    context: RequestContext,
    input: ListDefinitionsInput,
) -> AppResult<Vec<WaitlistDefinition>> {
    let actor = context.actor(&state).await?;
    state.waitlist_service.list_definitions(&actor, input).await
}

pub async fn get_stats(
    state: AppState,
    context: RequestContext,
    input: GetStatsInput,
) -> AppResult<DefinitionStats> {
    let actor = context.actor(&state).await?;
    state.waitlist_service.get_stats(&actor, input).await
}

pub async fn get_active_count(
    state: AppState,
    context: RequestContext,
    input: GetActiveCountInput,
) -> AppResult<ActiveCount> {
    let actor = context.actor(&state).await?;
    state.waitlist_service.get_active_count(&actor, input).await
}

pub async fn create_entry(
    state: AppState,
    context: RequestContext,
    input: CreateEntryInput,
) -> AppResult<WaitlistEntry> {
    let actor = context.actor(&state).await?;
    state.waitlist_service.create_entry(&actor, input).await
}

pub async fn update_entry_status(
    state: AppState,
    context: RequestContext,
    input: UpdateEntryStatusInput,
) -> AppResult<WaitlistEntry> {
    let actor = context.actor(&state).await?;
    state
        .waitlist_service
        .update_entry_status(&actor, input)
        .await
}

pub async fn get_entry(
    state: AppState,
    context: RequestContext,
    input: GetEntryInput,
) -> AppResult<WaitlistEntry> {
    let actor = context.actor(&state).await?;
    state.waitlist_service.get_entry(&actor, input).await
}

pub async fn search_entries(
    state: AppState,
    context: RequestContext,
    input: SearchEntriesInput,
) -> AppResult<EntryPage> {
    let actor = context.actor(&state).await?;
    state.waitlist_service.search_entries(&actor, input).await
}

pub async fn on_status_changed(
    state: AppState,
    context: RequestContext,
    input: EntryStatusSubscriptionInput,
) -> AppResult<EntryStatusStream> {
    let actor = context.actor(&state).await?;
    state
        .waitlist_service
        .subscribe_status_changes(&actor, input)
        .await
}
