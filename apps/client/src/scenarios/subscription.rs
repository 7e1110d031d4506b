use futures::StreamExt;
use launchpad_contract::routes::waitlist::entry;
use launchpad_core::{AppError, AppResult};
use launchpad_domain::{
    CreateEntryInput, EntryStatusChanged, EntryStatusSubscriptionInput, GetEntryInput,
    UpdateEntryStatusInput, WaitlistEntryId, WaitlistEntryStatus,
};
use tracing::{info, warn};

use super::ScenarioContext;
use super::steps::{login_admin, passed, signup_user};
use super::waitlist::create_definition;
use crate::rpc_client::Subscription;

/// Admin watches a definition, approves an entry and waits for the event.
///
/// A missing event is a soft failure: the entry is read back once for
/// diagnostics and the scenario continues.
pub(super) async fn run(context: &ScenarioContext) -> AppResult<()> {
    let admin = login_admin(context).await?;
    let watched = create_definition(&admin, "Scenario subscription").await?;

    let (user_email, user) = signup_user(context, "subscriber").await?;
    let joined = user
        .mutate::<entry::Create>(&CreateEntryInput {
            definition_id: watched.id,
            email: user_email,
            by: None,
            status: None,
            metadata: None,
            field_values: Vec::new(),
        })
        .await?;

    let mut events = admin
        .subscribe::<entry::OnStatusChanged>(&EntryStatusSubscriptionInput {
            definition_id: Some(watched.id),
        })
        .await?;
    passed("subscribe to status changes");

    admin
        .mutate::<entry::UpdateStatus>(&UpdateEntryStatusInput {
            entry_id: joined.id,
            status: WaitlistEntryStatus::Approved,
        })
        .await?;
    passed("admin updates status");

    match tokio::time::timeout(
        context.config.timeout,
        next_change(&mut events, joined.id, WaitlistEntryStatus::Approved),
    )
    .await
    {
        Ok(event) => {
            let event = event?;
            info!(
                entry_id = %event.entry_id,
                previous = event.previous_status.map(|status| status.as_str()),
                status = event.status.as_str(),
                "status change observed"
            );
            passed("status event received");
        }
        Err(_) => {
            warn!(
                entry_id = %joined.id,
                timeout_seconds = context.config.timeout.as_secs(),
                "no status event before timeout, reading entry back"
            );
            let current = admin
                .query::<entry::GetEntry>(&GetEntryInput {
                    entry_id: joined.id,
                })
                .await?;
            warn!(
                entry_id = %current.id,
                status = current.status.as_str(),
                "entry state after missed event"
            );
        }
    }

    Ok(())
}

async fn next_change(
    events: &mut Subscription<EntryStatusChanged>,
    entry_id: WaitlistEntryId,
    status: WaitlistEntryStatus,
) -> AppResult<EntryStatusChanged> {
    while let Some(event) = events.next().await {
        let event = event?;
        if event.entry_id == entry_id && event.status == status {
            return Ok(event);
        }
    }

    Err(AppError::Internal(
        "status stream closed before the expected event".to_owned(),
    ))
}
