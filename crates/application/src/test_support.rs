//! Port fakes shared by the service tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use futures::StreamExt;
use launchpad_core::{AppError, AppResult, OrganizationId};
use launchpad_domain::{
    Actor, DefinitionStats, DefinitionVisibility, EmailAddress, EntryPage, EntrySearch, EntryStatusChanged,
    ListDefinitionsInput, Membership, Organization, UserId, UserRole, WaitlistDefinition,
    WaitlistDefinitionId, WaitlistEntry, WaitlistEntryId, WaitlistEntryStatus, WaitlistStatus,
};
use tokio::sync::{Mutex, broadcast};

use crate::{
    EntrySearchCache, EntryStatusStream, EntryStatusUpdate, IssuedToken, NewUserRecord,
    OrganizationRepository, PasswordHasher, RevokedTokenRepository, TokenClaims, TokenIssuer,
    UserRecord, UserRepository, WaitlistEventPublisher, WaitlistRepository,
};

pub(crate) fn actor(role: UserRole) -> Actor {
    Actor {
        user_id: UserId::new(),
        email: EmailAddress::new(format!("{}@example.com", role.as_str().to_lowercase()))
            .unwrap_or_else(|error| panic!("test email must be valid: {error}")),
        role,
        organization_id: None,
    }
}

#[derive(Default)]
pub(crate) struct FakeUserRepository {
    pub(crate) users: Mutex<Vec<UserRecord>>,
}

#[async_trait]
impl UserRepository for FakeUserRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|user| user.id == user_id)
            .cloned())
    }

    async fn create(&self, user: NewUserRecord) -> AppResult<UserRecord> {
        let mut users = self.users.lock().await;
        if users.iter().any(|existing| existing.email == user.email) {
            return Err(AppError::Conflict("email taken".to_owned()));
        }
        let record = UserRecord {
            id: UserId::new(),
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        users.push(record.clone());
        Ok(record)
    }
}

pub(crate) struct FakePasswordHasher;

impl PasswordHasher for FakePasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("hashed:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(hash == format!("hashed:{password}"))
    }
}

/// Issues `<user_id>|<role>|<serial>` tokens valid for one hour.
#[derive(Default)]
pub(crate) struct FakeTokenIssuer {
    serial: AtomicU64,
}

impl TokenIssuer for FakeTokenIssuer {
    fn issue(&self, user: &UserRecord) -> AppResult<IssuedToken> {
        let serial = self.serial.fetch_add(1, Ordering::Relaxed);
        Ok(IssuedToken {
            token: format!("{}|{}|{serial}|{}", user.id, user.role.as_str(), user.email),
            expires_at: Utc::now() + Duration::hours(1),
        })
    }

    fn verify(&self, token: &str) -> AppResult<TokenClaims> {
        let parts: Vec<&str> = token.split('|').collect();
        let [user_id, role, serial, email] = parts.as_slice() else {
            return Err(AppError::Unauthorized("malformed token".to_owned()));
        };
        let now = Utc::now();
        Ok(TokenClaims {
            user_id: UserId::parse(user_id)?,
            email: (*email).to_owned(),
            role: role.parse()?,
            token_id: (*serial).to_owned(),
            issued_at: now,
            expires_at: now + Duration::hours(1),
        })
    }
}

#[derive(Default)]
pub(crate) struct FakeRevokedTokenRepository {
    pub(crate) revoked: Mutex<HashMap<String, DateTime<Utc>>>,
}

#[async_trait]
impl RevokedTokenRepository for FakeRevokedTokenRepository {
    async fn revoke(&self, token_digest: &str, expires_at: DateTime<Utc>) -> AppResult<()> {
        self.revoked
            .lock()
            .await
            .insert(token_digest.to_owned(), expires_at);
        Ok(())
    }

    async fn is_revoked(&self, token_digest: &str) -> AppResult<bool> {
        Ok(self.revoked.lock().await.contains_key(token_digest))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut revoked = self.revoked.lock().await;
        let before = revoked.len();
        revoked.retain(|_, expires_at| *expires_at > now);
        Ok((before - revoked.len()) as u64)
    }
}

#[derive(Default)]
pub(crate) struct FakeOrganizationRepository {
    pub(crate) organizations: Mutex<Vec<Organization>>,
    pub(crate) memberships: Mutex<Vec<Membership>>,
}

impl FakeOrganizationRepository {
    pub(crate) async fn seed_membership(&self, membership: Membership) {
        self.memberships.lock().await.push(membership);
    }
}

#[async_trait]
impl OrganizationRepository for FakeOrganizationRepository {
    async fn create_organization(
        &self,
        organization: Organization,
        owner: Membership,
    ) -> AppResult<()> {
        let mut organizations = self.organizations.lock().await;
        if organizations
            .iter()
            .any(|existing| existing.slug == organization.slug)
        {
            return Err(AppError::Conflict("slug taken".to_owned()));
        }
        organizations.push(organization);
        self.memberships.lock().await.push(owner);
        Ok(())
    }

    async fn find_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Option<Organization>> {
        Ok(self
            .organizations
            .lock()
            .await
            .iter()
            .find(|organization| organization.id == organization_id)
            .cloned())
    }

    async fn find_membership(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> AppResult<Option<Membership>> {
        Ok(self
            .memberships
            .lock()
            .await
            .iter()
            .find(|membership| {
                membership.organization_id == organization_id && membership.user_id == user_id
            })
            .cloned())
    }

    async fn add_membership(&self, membership: Membership) -> AppResult<()> {
        let mut memberships = self.memberships.lock().await;
        if memberships.iter().any(|existing| {
            existing.organization_id == membership.organization_id
                && existing.user_id == membership.user_id
        }) {
            return Err(AppError::Conflict("already a member".to_owned()));
        }
        memberships.push(membership);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeWaitlistRepository {
    pub(crate) definitions: Mutex<Vec<WaitlistDefinition>>,
    pub(crate) entries: Mutex<Vec<WaitlistEntry>>,
    pub(crate) searches: AtomicU64,
}

#[async_trait]
impl WaitlistRepository for FakeWaitlistRepository {
    async fn create_definition(&self, definition: WaitlistDefinition) -> AppResult<()> {
        self.definitions.lock().await.push(definition);
        Ok(())
    }

    async fn find_definition(
        &self,
        definition_id: WaitlistDefinitionId,
    ) -> AppResult<Option<WaitlistDefinition>> {
        Ok(self
            .definitions
            .lock()
            .await
            .iter()
            .find(|definition| definition.id == definition_id)
            .cloned())
    }

    async fn list_definitions(
        &self,
        visibility: DefinitionVisibility,
        filter: &ListDefinitionsInput,
    ) -> AppResult<Vec<WaitlistDefinition>> {
        Ok(self
            .definitions
            .lock()
            .await
            .iter()
            .filter(|definition| visibility.includes(definition) && filter.matches(definition))
            .cloned()
            .collect())
    }

    async fn count_active_definitions(&self, visibility: DefinitionVisibility) -> AppResult<u64> {
        Ok(self
            .definitions
            .lock()
            .await
            .iter()
            .filter(|definition| {
                visibility.includes(definition) && definition.status == WaitlistStatus::Active
            })
            .count() as u64)
    }

    async fn definition_stats(
        &self,
        definition_id: WaitlistDefinitionId,
    ) -> AppResult<DefinitionStats> {
        let entries = self.entries.lock().await;
        let mut stats = DefinitionStats {
            definition_id,
            ..DefinitionStats::default()
        };
        for entry in entries.iter().filter(|entry| entry.definition_id == definition_id) {
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
        let mut entries = self.entries.lock().await;
        if entries.iter().any(|existing| {
            existing.definition_id == entry.definition_id && existing.email == entry.email
        }) {
            return Err(AppError::Conflict("already joined".to_owned()));
        }
        entries.push(entry);
        Ok(())
    }

    async fn find_entry(&self, entry_id: WaitlistEntryId) -> AppResult<Option<WaitlistEntry>> {
        Ok(self
            .entries
            .lock()
            .await
            .iter()
            .find(|entry| entry.id == entry_id)
            .cloned())
    }

    async fn update_entry_status(
        &self,
        entry_id: WaitlistEntryId,
        status: WaitlistEntryStatus,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Option<EntryStatusUpdate>> {
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.iter_mut().find(|entry| entry.id == entry_id) else {
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
        self.searches.fetch_add(1, Ordering::Relaxed);
        let entries = self.entries.lock().await;
        let matching: Vec<&WaitlistEntry> =
            entries.iter().filter(|entry| search.matches(entry)).collect();
        Ok(EntryPage {
            total: matching.len() as u64,
            entries: matching
                .into_iter()
                .skip(search.offset as usize)
                .take(search.limit as usize)
                .cloned()
                .collect(),
            limit: search.limit,
            offset: search.offset,
        })
    }
}

#[derive(Default)]
pub(crate) struct FakeSearchCache {
    pub(crate) pages: Mutex<HashMap<EntrySearch, EntryPage>>,
    pub(crate) invalidated: Mutex<Vec<WaitlistDefinitionId>>,
    pub(crate) unavailable: AtomicBool,
}

#[async_trait]
impl EntrySearchCache for FakeSearchCache {
    async fn get_page(&self, search: &EntrySearch) -> AppResult<Option<EntryPage>> {
        Ok(self.pages.lock().await.get(search).cloned())
    }

    async fn put_page(&self, search: EntrySearch, page: EntryPage) -> AppResult<()> {
        self.pages.lock().await.insert(search, page);
        Ok(())
    }

    async fn invalidate_definition(&self, definition_id: WaitlistDefinitionId) -> AppResult<()> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(AppError::Internal("search cache unavailable".to_owned()));
        }
        self.pages.lock().await.retain(|search, _| {
            search
                .definition_id
                .is_some_and(|filtered| filtered != definition_id)
        });
        self.invalidated.lock().await.push(definition_id);
        Ok(())
    }
}

pub(crate) struct FakeEventPublisher {
    sender: broadcast::Sender<EntryStatusChanged>,
    pub(crate) published: Mutex<Vec<EntryStatusChanged>>,
}

impl Default for FakeEventPublisher {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(16);
        Self {
            sender,
            published: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl WaitlistEventPublisher for FakeEventPublisher {
    async fn publish(&self, event: EntryStatusChanged) -> AppResult<()> {
        self.published.lock().await.push(event.clone());
        let _ = self.sender.send(event);
        Ok(())
    }

    fn subscribe(&self) -> EntryStatusStream {
        futures::stream::unfold(self.sender.subscribe(), |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => return Some((event, receiver)),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .boxed()
    }
}
