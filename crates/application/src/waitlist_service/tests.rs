use std::sync::Arc;
use std::sync::atomic::Ordering;

use chrono::Utc;
use futures::StreamExt;
use launchpad_core::{AppError, AppResult, OrganizationId};
use launchpad_domain::{
    Actor, CreateDefinitionInput, CreateEntryInput, CreateOrganizationInput,
    EntryStatusSubscriptionInput, FieldType, FieldValue, GetActiveCountInput,
    GetDefinitionInput, GetEntryInput, GetStatsInput, ListDefinitionsInput, Membership,
    OrganizationRole, SearchEntriesInput, UpdateEntryStatusInput, UserRole,
    WaitlistDefinition, WaitlistEntryStatus, WaitlistStatus, WaitlistType,
};
use serde_json::json;

use crate::test_support::{
    FakeEventPublisher, FakeOrganizationRepository, FakeSearchCache, FakeUserRepository,
    FakeWaitlistRepository, actor,
};
use crate::{AuthorizationService, OrganizationService};

use super::WaitlistService;

struct Harness {
    service: WaitlistService,
    organizations: Arc<FakeOrganizationRepository>,
    repository: Arc<FakeWaitlistRepository>,
    cache: Arc<FakeSearchCache>,
    events: Arc<FakeEventPublisher>,
}

fn harness() -> Harness {
    let organizations = Arc::new(FakeOrganizationRepository::default());
    let repository = Arc::new(FakeWaitlistRepository::default());
    let cache = Arc::new(FakeSearchCache::default());
    let events = Arc::new(FakeEventPublisher::default());
    let service = WaitlistService::new(
        repository.clone(),
        AuthorizationService::new(organizations.clone()),
        cache.clone(),
        events.clone(),
    );
    Harness {
        service,
        organizations,
        repository,
        cache,
        events,
    }
}

fn definition_input(status: Option<WaitlistStatus>) -> CreateDefinitionInput {
    CreateDefinitionInput {
        name: "Private beta".to_owned(),
        description: "Early access to the private beta".to_owned(),
        waitlist_type: WaitlistType::Beta,
        status,
        fields: Vec::new(),
    }
}

fn entry_input(definition: &WaitlistDefinition, email: &str) -> CreateEntryInput {
    CreateEntryInput {
        definition_id: definition.id,
        email: email.to_owned(),
        by: None,
        status: None,
        metadata: Some(json!({ "source": "landing" })),
        field_values: vec![FieldValue {
            field_type: FieldType::Text,
            field_value: "Acme".to_owned(),
        }],
    }
}

async fn organization_actor(
    organizations: &FakeOrganizationRepository,
    organization_id: OrganizationId,
    role: OrganizationRole,
) -> Actor {
    let scoped = actor(UserRole::User).within(Some(organization_id));
    organizations
        .seed_membership(Membership {
            organization_id,
            user_id: scoped.user_id,
            email: scoped.email.to_string(),
            role,
            created_at: Utc::now(),
        })
        .await;
    scoped
}

#[tokio::test]
async fn only_admins_create_definitions() -> AppResult<()> {
    let Harness { service, .. } = harness();

    let denied = service
        .create_definition(&actor(UserRole::User), definition_input(None))
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let definition = service
        .create_definition(&actor(UserRole::Admin), definition_input(None))
        .await?;
    assert_eq!(definition.status, WaitlistStatus::Active);
    Ok(())
}

#[tokio::test]
async fn user_joins_and_cannot_update_status() -> AppResult<()> {
    let Harness {
        service, events, ..
    } = harness();
    let admin = actor(UserRole::Admin);
    let user = actor(UserRole::User);
    let definition = service
        .create_definition(&admin, definition_input(None))
        .await?;

    let entry = service
        .create_entry(&user, entry_input(&definition, "Joiner@Example.com"))
        .await?;
    assert_eq!(entry.status, WaitlistEntryStatus::Pending);
    assert_eq!(entry.email, "joiner@example.com");

    let denied = service
        .update_entry_status(
            &user,
            UpdateEntryStatusInput {
                entry_id: entry.id,
                status: WaitlistEntryStatus::Approved,
            },
        )
        .await;
    match denied {
        Err(error) => {
            assert!(error.is_forbidden());
            assert!(!error.is_validation());
        }
        Ok(_) => panic!("user must not update entry status"),
    }

    let approved = service
        .update_entry_status(
            &admin,
            UpdateEntryStatusInput {
                entry_id: entry.id,
                status: WaitlistEntryStatus::Approved,
            },
        )
        .await?;
    assert_eq!(approved.status, WaitlistEntryStatus::Approved);

    let published = events.published.lock().await;
    assert_eq!(published.len(), 2);
    assert_eq!(published[1].previous_status, Some(WaitlistEntryStatus::Pending));
    assert_eq!(published[1].status, WaitlistEntryStatus::Approved);
    Ok(())
}

#[tokio::test]
async fn duplicate_field_values_fail_validation() -> AppResult<()> {
    let Harness { service, .. } = harness();
    let definition = service
        .create_definition(&actor(UserRole::Admin), definition_input(None))
        .await?;

    let mut input = entry_input(&definition, "dup@example.com");
    input.field_values.push(input.field_values[0].clone());

    let result = service.create_entry(&actor(UserRole::User), input).await;
    assert!(matches!(result, Err(AppError::InvalidField(v)) if v.path == "fieldValues"));
    Ok(())
}

#[tokio::test]
async fn inactive_definition_rejects_entries() -> AppResult<()> {
    let Harness { service, .. } = harness();
    let definition = service
        .create_definition(
            &actor(UserRole::Admin),
            definition_input(Some(WaitlistStatus::Inactive)),
        )
        .await?;

    let result = service
        .create_entry(
            &actor(UserRole::User),
            entry_input(&definition, "late@example.com"),
        )
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn missing_entry_is_not_found() {
    let Harness { service, .. } = harness();
    let result = service
        .get_entry(
            &actor(UserRole::Admin),
            GetEntryInput {
                entry_id: launchpad_domain::WaitlistEntryId::new(),
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn stats_and_active_count_reflect_storage() -> AppResult<()> {
    let Harness { service, .. } = harness();
    let admin = actor(UserRole::Admin);
    let open = service
        .create_definition(&admin, definition_input(None))
        .await?;
    service
        .create_definition(&admin, definition_input(Some(WaitlistStatus::Archived)))
        .await?;

    let first = service
        .create_entry(&admin, entry_input(&open, "one@example.com"))
        .await?;
    service
        .create_entry(&admin, entry_input(&open, "two@example.com"))
        .await?;
    service
        .update_entry_status(
            &admin,
            UpdateEntryStatusInput {
                entry_id: first.id,
                status: WaitlistEntryStatus::Rejected,
            },
        )
        .await?;

    let stats = service
        .get_stats(
            &admin,
            GetStatsInput {
                definition_id: open.id,
            },
        )
        .await?;
    assert_eq!((stats.total, stats.pending, stats.rejected), (2, 1, 1));

    let active = service
        .get_active_count(&admin, GetActiveCountInput::default())
        .await?;
    assert_eq!(active.count, 1);

    let archived = service
        .list_definitions(
            &admin,
            ListDefinitionsInput {
                status: Some(WaitlistStatus::Archived),
                waitlist_type: None,
            },
        )
        .await?;
    assert_eq!(archived.len(), 1);
    Ok(())
}

#[tokio::test]
async fn repeated_search_is_served_from_cache_until_a_write() -> AppResult<()> {
    let Harness {
        service,
        repository,
        cache,
        ..
    } = harness();
    let admin = actor(UserRole::Admin);
    let definition = service
        .create_definition(&admin, definition_input(None))
        .await?;
    service
        .create_entry(&admin, entry_input(&definition, "first@example.com"))
        .await?;

    let search = SearchEntriesInput {
        definition_id: Some(definition.id),
        email: Some(" FIRST ".to_owned()),
        ..SearchEntriesInput::default()
    };
    let first = service.search_entries(&admin, search.clone()).await?;
    let second = service
        .search_entries(
            &admin,
            SearchEntriesInput {
                email: Some("first".to_owned()),
                ..search.clone()
            },
        )
        .await?;
    assert_eq!(first, second);
    assert_eq!(repository.searches.load(Ordering::Relaxed), 1);

    service
        .create_entry(&admin, entry_input(&definition, "first.again@example.com"))
        .await?;
    assert!(cache.invalidated.lock().await.contains(&definition.id));

    let third = service.search_entries(&admin, search).await?;
    assert_eq!(third.total, 2);
    assert_eq!(repository.searches.load(Ordering::Relaxed), 2);
    Ok(())
}

#[tokio::test]
async fn organization_roles_reach_only_owned_definitions() -> AppResult<()> {
    let Harness {
        service,
        organizations,
        ..
    } = harness();
    let organization_id = OrganizationId::new();
    let owner = organization_actor(&organizations, organization_id, OrganizationRole::Owner).await;
    let analyst =
        organization_actor(&organizations, organization_id, OrganizationRole::Analyst).await;

    let global = service
        .create_definition(&actor(UserRole::Admin), definition_input(None))
        .await?;
    let owned = service
        .create_definition(&owner, definition_input(None))
        .await?;
    assert_eq!(owned.organization_id, Some(organization_id));
    assert_eq!(global.organization_id, None);

    let entry = service
        .create_entry(&analyst, entry_input(&owned, "lead@example.com"))
        .await?;
    let page = service
        .search_entries(
            &analyst,
            SearchEntriesInput {
                definition_id: Some(owned.id),
                ..SearchEntriesInput::default()
            },
        )
        .await?;
    assert_eq!(page.total, 1);

    let foreign = service
        .search_entries(
            &analyst,
            SearchEntriesInput {
                definition_id: Some(global.id),
                ..SearchEntriesInput::default()
            },
        )
        .await;
    assert!(matches!(foreign, Err(AppError::Forbidden(_))));

    let unfiltered = service
        .search_entries(&analyst, SearchEntriesInput::default())
        .await;
    assert!(matches!(unfiltered, Err(AppError::Forbidden(_))));

    let denied = service
        .update_entry_status(
            &analyst,
            UpdateEntryStatusInput {
                entry_id: entry.id,
                status: WaitlistEntryStatus::Approved,
            },
        )
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let approved = service
        .update_entry_status(
            &owner,
            UpdateEntryStatusInput {
                entry_id: entry.id,
                status: WaitlistEntryStatus::Approved,
            },
        )
        .await?;
    assert_eq!(approved.status, WaitlistEntryStatus::Approved);
    Ok(())
}

#[tokio::test]
async fn self_made_organization_owner_cannot_approve_global_entries() -> AppResult<()> {
    let Harness {
        service,
        organizations,
        ..
    } = harness();
    let organization_service = OrganizationService::new(
        organizations.clone(),
        Arc::new(FakeUserRepository::default()),
        AuthorizationService::new(organizations.clone()),
    );
    let admin = actor(UserRole::Admin);
    let definition = service
        .create_definition(&admin, definition_input(None))
        .await?;
    let entry = service
        .create_entry(
            &actor(UserRole::User),
            entry_input(&definition, "someone@example.com"),
        )
        .await?;

    let user = actor(UserRole::User);
    let organization = organization_service
        .create(
            &user,
            CreateOrganizationInput {
                name: "Side project".to_owned(),
                slug: "side-project".to_owned(),
            },
        )
        .await?;
    let owner = user.within(Some(organization.id));

    let approve = service
        .update_entry_status(
            &owner,
            UpdateEntryStatusInput {
                entry_id: entry.id,
                status: WaitlistEntryStatus::Rejected,
            },
        )
        .await;
    assert!(matches!(approve, Err(AppError::Forbidden(_))));

    let read = service
        .get_definition(&owner, GetDefinitionInput { id: definition.id })
        .await;
    assert!(matches!(read, Err(AppError::Forbidden(_))));

    let stats = service
        .get_stats(
            &owner,
            GetStatsInput {
                definition_id: definition.id,
            },
        )
        .await;
    assert!(matches!(stats, Err(AppError::Forbidden(_))));

    let subscription = service
        .subscribe_status_changes(&owner, EntryStatusSubscriptionInput::default())
        .await;
    assert!(matches!(subscription, Err(AppError::Forbidden(_))));

    let unchanged = service
        .get_entry(&admin, GetEntryInput { entry_id: entry.id })
        .await?;
    assert_eq!(unchanged.status, WaitlistEntryStatus::Pending);
    Ok(())
}

#[tokio::test]
async fn organization_listing_and_counts_cover_owned_definitions() -> AppResult<()> {
    let Harness {
        service,
        organizations,
        ..
    } = harness();
    let organization_id = OrganizationId::new();
    let owner = organization_actor(&organizations, organization_id, OrganizationRole::Owner).await;
    service
        .create_definition(&actor(UserRole::Admin), definition_input(None))
        .await?;
    let owned = service
        .create_definition(&owner, definition_input(None))
        .await?;

    let listed = service
        .list_definitions(&owner, ListDefinitionsInput::default())
        .await?;
    assert_eq!(listed, vec![owned]);

    let active = service
        .get_active_count(&owner, GetActiveCountInput::default())
        .await?;
    assert_eq!(active.count, 1);

    let outside = service
        .list_definitions(&owner.clone().within(None), ListDefinitionsInput::default())
        .await;
    assert!(matches!(outside, Err(AppError::Forbidden(_))));
    Ok(())
}

#[tokio::test]
async fn stored_entry_is_returned_when_follow_ups_fail() -> AppResult<()> {
    let Harness {
        service,
        repository,
        cache,
        events,
        ..
    } = harness();
    let definition = service
        .create_definition(&actor(UserRole::Admin), definition_input(None))
        .await?;
    cache.unavailable.store(true, Ordering::Relaxed);

    let entry = service
        .create_entry(
            &actor(UserRole::User),
            entry_input(&definition, "kept@example.com"),
        )
        .await?;

    assert_eq!(repository.entries.lock().await.len(), 1);
    assert_eq!(entry.email, "kept@example.com");
    assert_eq!(events.published.lock().await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn subscription_streams_matching_status_changes() -> AppResult<()> {
    let Harness { service, .. } = harness();
    let admin = actor(UserRole::Admin);
    let watched = service
        .create_definition(&admin, definition_input(None))
        .await?;
    let other = service
        .create_definition(&admin, definition_input(None))
        .await?;

    let denied = service
        .subscribe_status_changes(
            &actor(UserRole::User),
            EntryStatusSubscriptionInput::default(),
        )
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let mut stream = service
        .subscribe_status_changes(
            &admin,
            EntryStatusSubscriptionInput {
                definition_id: Some(watched.id),
            },
        )
        .await?;

    service
        .create_entry(&admin, entry_input(&other, "elsewhere@example.com"))
        .await?;
    let entry = service
        .create_entry(&admin, entry_input(&watched, "watched@example.com"))
        .await?;
    service
        .update_entry_status(
            &admin,
            UpdateEntryStatusInput {
                entry_id: entry.id,
                status: WaitlistEntryStatus::Approved,
            },
        )
        .await?;

    let created = stream.next().await;
    assert_eq!(created.as_ref().map(|event| event.entry_id), Some(entry.id));
    assert_eq!(created.and_then(|event| event.previous_status), None);

    let approved = stream.next().await;
    assert_eq!(
        approved.map(|event| event.status),
        Some(WaitlistEntryStatus::Approved)
    );
    Ok(())
}
