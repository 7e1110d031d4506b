use launchpad_core::AppResult;
use launchpad_domain::{
    AddMemberInput, CreateOrganizationInput, GetMembershipInput, Membership, Organization,
};

use crate::middleware::RequestContext;
use crate::state::AppState;

pub async fn create(
    state: AppState,
    context: RequestContext,
    input: CreateOrganizationInput,
) -> AppResult<Organization> {
    let actor = context.actor(&state).await?;
    state.organization_service.create(&actor, input).await
}

pub async fn add_member(
    state: AppState,
    context: RequestContext,
    input: AddMemberInput,
) -> AppResult<Membership> {
    let actor = context.actor(&state).await?;
    state.organization_service.add_member(&actor, input).await
}

pub async fn get_membership(
    state: AppState,
    context: RequestContext,
    input: GetMembershipInput,
) -> AppResult<Membership> {
    let actor = context.actor(&state).await?;
    state
        .organization_service
        .get_membership(&actor, input)
        .await
}
