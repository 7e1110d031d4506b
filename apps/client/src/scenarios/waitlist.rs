use launchpad_contract::routes::waitlist::{definition, entry};
use launchpad_core::{AppError, AppResult};
use launchpad_domain::{
    CreateDefinitionInput, CreateEntryInput, FieldType, FieldValue, GetActiveCountInput,
    GetStatsInput, SearchEntriesInput, UpdateEntryStatusInput, WaitlistDefinition,
    WaitlistEntryStatus, WaitlistField, WaitlistType,
};
use tracing::info;

use super::ScenarioContext;
use super::steps::{
    expect_forbidden, expect_validation, login_admin, passed, signup_user, unique_suffix,
};
use crate::rpc_client::RpcClient;

/// Admin manages a definition while a user joins it and is denied review.
pub(super) async fn run(context: &ScenarioContext) -> AppResult<()> {
    let admin = login_admin(context).await?;
    let created = create_definition(&admin, "Scenario beta").await?;
    passed("create definition");

    let (user_email, user) = signup_user(context, "entrant").await?;
    let joined = user
        .mutate::<entry::Create>(&CreateEntryInput {
            definition_id: created.id,
            email: user_email.clone(),
            by: Some("scenario".to_owned()),
            status: None,
            metadata: None,
            field_values: vec![FieldValue {
                field_type: FieldType::Text,
                field_value: "Acme".to_owned(),
            }],
        })
        .await?;
    info!(entry_id = %joined.id, status = joined.status.as_str(), "entry created");
    passed("join waitlist");

    let denied = user
        .mutate::<entry::UpdateStatus>(&UpdateEntryStatusInput {
            entry_id: joined.id,
            status: WaitlistEntryStatus::Approved,
        })
        .await;
    expect_forbidden("user updates entry status", denied)?;

    let approved = admin
        .mutate::<entry::UpdateStatus>(&UpdateEntryStatusInput {
            entry_id: joined.id,
            status: WaitlistEntryStatus::Approved,
        })
        .await?;
    if approved.status != WaitlistEntryStatus::Approved {
        return Err(AppError::Internal(format!(
            "entry {} is {} after approval",
            approved.id,
            approved.status.as_str()
        )));
    }
    passed("approve entry");

    let duplicate_value = FieldValue {
        field_type: FieldType::Text,
        field_value: "same".to_owned(),
    };
    let duplicated = user
        .mutate::<entry::Create>(&CreateEntryInput {
            definition_id: created.id,
            email: user_email.clone(),
            by: None,
            status: None,
            metadata: None,
            field_values: vec![duplicate_value.clone(), duplicate_value],
        })
        .await;
    expect_validation("duplicate field values", duplicated)?;

    let short = admin
        .mutate::<definition::Create>(&CreateDefinitionInput {
            description: "Too short".to_owned(),
            ..definition_input("Short description")
        })
        .await;
    expect_validation("short description", short)?;

    let page = admin
        .query::<entry::SearchEntries>(&SearchEntriesInput {
            definition_id: Some(created.id),
            email: Some(user_email),
            ..SearchEntriesInput::default()
        })
        .await?;
    if !page.entries.iter().any(|found| found.id == joined.id) {
        return Err(AppError::Internal(format!(
            "search did not return entry {}",
            joined.id
        )));
    }
    info!(total = page.total, "search answered");
    passed("search entries");

    let stats = admin
        .query::<definition::GetStats>(&GetStatsInput {
            definition_id: created.id,
        })
        .await?;
    let active = admin
        .query::<definition::GetActiveCount>(&GetActiveCountInput {})
        .await?;
    info!(
        approved = stats.approved,
        pending = stats.pending,
        active_definitions = active.count,
        "statistics answered"
    );
    passed("read statistics");

    Ok(())
}

fn definition_input(name: &str) -> CreateDefinitionInput {
    CreateDefinitionInput {
        name: format!("{name} {}", unique_suffix()),
        description: "Created by the launchpad client scenarios.".to_owned(),
        waitlist_type: WaitlistType::Beta,
        status: None,
        fields: vec![WaitlistField {
            name: "company".to_owned(),
            label: Some("Company".to_owned()),
            field_type: FieldType::Text,
            required: false,
            options: Vec::new(),
        }],
    }
}

pub(super) async fn create_definition(
    admin: &RpcClient,
    name: &str,
) -> AppResult<WaitlistDefinition> {
    let created = admin
        .mutate::<definition::Create>(&definition_input(name))
        .await?;
    info!(definition_id = %created.id, name = %created.name, "definition created");
    Ok(created)
}
