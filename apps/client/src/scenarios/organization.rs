use launchpad_contract::routes::organization;
use launchpad_core::{AppError, AppResult};
use launchpad_domain::{
    AddMemberInput, CreateOrganizationInput, GetMembershipInput, OrganizationRole,
};
use tracing::info;

use super::ScenarioContext;
use super::steps::{expect_forbidden, passed, signup_user, unique_email, unique_suffix};

/// Owner creates an organization and adds a member; the member may read its
/// membership but not add others.
pub(super) async fn run(context: &ScenarioContext) -> AppResult<()> {
    let (_, owner) = signup_user(context, "owner").await?;
    let suffix = unique_suffix();
    let created = owner
        .mutate::<organization::Create>(&CreateOrganizationInput {
            name: format!("Scenario {suffix}"),
            slug: format!("scenario-{suffix}"),
        })
        .await?;
    info!(organization_id = %created.id, slug = %created.slug, "organization created");
    passed("create organization");

    let (member_email, member) = signup_user(context, "member").await?;
    let added = owner
        .with_organization(created.id)
        .mutate::<organization::AddMember>(&AddMemberInput {
            organization_id: created.id,
            email: member_email,
            role: OrganizationRole::Member,
        })
        .await?;
    info!(user_id = %added.user_id, "member added");
    passed("add member");

    let member = member.with_organization(created.id);
    let membership = member
        .query::<organization::GetMembership>(&GetMembershipInput {
            organization_id: created.id,
        })
        .await?;
    if membership.role != OrganizationRole::Member {
        return Err(AppError::Internal(format!(
            "expected MEMBER membership, got {}",
            membership.role.as_str()
        )));
    }
    passed("read membership");

    let denied = member
        .mutate::<organization::AddMember>(&AddMemberInput {
            organization_id: created.id,
            email: unique_email("outsider"),
            role: OrganizationRole::Member,
        })
        .await;
    expect_forbidden("member adds member", denied)
}
