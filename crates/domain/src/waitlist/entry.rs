use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use launchpad_core::validation::reject;
use launchpad_core::{AppError, AppResult, Validate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::definition::{FieldType, WaitlistDefinitionId};
use crate::user::EmailAddress;

/// Page size used when a search omits `limit`.
pub const SEARCH_DEFAULT_LIMIT: u32 = 50;

/// Largest page size a search may request.
pub const SEARCH_MAX_LIMIT: u32 = 100;

/// Unique identifier for a waitlist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaitlistEntryId(Uuid);

impl WaitlistEntryId {
    /// Creates a random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for WaitlistEntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for WaitlistEntryId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Review status of an entry. Any status may follow any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaitlistEntryStatus {
    /// Awaiting review.
    #[default]
    Pending,
    /// Admitted.
    Approved,
    /// Declined.
    Rejected,
}

impl WaitlistEntryStatus {
    /// Returns the storage string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl FromStr for WaitlistEntryStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            _ => Err(AppError::Validation(format!(
                "unknown entry status '{value}'"
            ))),
        }
    }
}

/// One submitted value of a custom field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValue {
    /// Type of the field the value belongs to.
    pub field_type: FieldType,
    /// Submitted value as text.
    pub field_value: String,
}

/// Persisted waitlist entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEntry {
    /// Entry identifier.
    pub id: WaitlistEntryId,
    /// Definition the entry joined.
    pub definition_id: WaitlistDefinitionId,
    /// Entrant email, lower-cased.
    pub email: String,
    /// Referrer or submitting party.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,
    /// Review status.
    pub status: WaitlistEntryStatus,
    /// Free-form JSON object.
    pub metadata: Value,
    /// Submitted custom field values.
    pub field_values: Vec<FieldValue>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Validated entry ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWaitlistEntry {
    /// Definition the entry joins.
    pub definition_id: WaitlistDefinitionId,
    /// Normalized email.
    pub email: EmailAddress,
    /// Referrer or submitting party.
    pub by: Option<String>,
    /// Initial status.
    pub status: WaitlistEntryStatus,
    /// JSON object, `{}` when omitted.
    pub metadata: Value,
    /// Unique field values.
    pub field_values: Vec<FieldValue>,
}

impl NewWaitlistEntry {
    /// Materializes the entry with a fresh identifier.
    #[must_use]
    pub fn into_entry(self, now: DateTime<Utc>) -> WaitlistEntry {
        WaitlistEntry {
            id: WaitlistEntryId::new(),
            definition_id: self.definition_id,
            email: self.email.into(),
            by: self.by,
            status: self.status,
            metadata: self.metadata,
            field_values: self.field_values,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request to join a waitlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryInput {
    /// Definition to join.
    pub definition_id: WaitlistDefinitionId,
    /// Entrant email.
    pub email: String,
    /// Referrer or submitting party.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,
    /// Initial status; defaults to `PENDING`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WaitlistEntryStatus>,
    /// Free-form JSON object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Custom field values; no two may be identical.
    #[serde(default)]
    pub field_values: Vec<FieldValue>,
}

impl CreateEntryInput {
    /// Validates and normalizes the request.
    pub fn into_new_entry(self) -> AppResult<NewWaitlistEntry> {
        self.validate()?;

        Ok(NewWaitlistEntry {
            definition_id: self.definition_id,
            email: EmailAddress::new(&self.email)?,
            by: self
                .by
                .map(|by| by.trim().to_owned())
                .filter(|by| !by.is_empty()),
            status: self.status.unwrap_or_default(),
            metadata: self
                .metadata
                .unwrap_or_else(|| Value::Object(serde_json::Map::new())),
            field_values: self.field_values,
        })
    }
}

impl Validate for CreateEntryInput {
    fn validate(&self) -> AppResult<()> {
        EmailAddress::new(&self.email)?;

        let mut seen = HashSet::with_capacity(self.field_values.len());
        if !self.field_values.iter().all(|value| seen.insert(value)) {
            return reject("fieldValues", "No duplicate fields allowed");
        }

        if let Some(metadata) = &self.metadata
            && !metadata.is_object()
        {
            return reject("metadata", "metadata must be a JSON object");
        }

        Ok(())
    }
}

/// Request to change an entry's review status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryStatusInput {
    /// Entry to update.
    pub entry_id: WaitlistEntryId,
    /// New status.
    pub status: WaitlistEntryStatus,
}

impl Validate for UpdateEntryStatusInput {
    fn validate(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Lookup of one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetEntryInput {
    /// Entry identifier.
    pub entry_id: WaitlistEntryId,
}

impl Validate for GetEntryInput {
    fn validate(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Entry search filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntriesInput {
    /// Only entries of this definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_id: Option<WaitlistDefinitionId>,
    /// Only entries with this status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WaitlistEntryStatus>,
    /// Case-insensitive email fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Page size, at most [`SEARCH_MAX_LIMIT`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Entries to skip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl SearchEntriesInput {
    /// Returns the canonical form of this search.
    ///
    /// Inputs that select the same page produce equal fingerprints, so the
    /// result doubles as a cache key.
    #[must_use]
    pub fn normalized(&self) -> EntrySearch {
        EntrySearch {
            definition_id: self.definition_id,
            status: self.status,
            email: self
                .email
                .as_deref()
                .map(|fragment| fragment.trim().to_lowercase())
                .filter(|fragment| !fragment.is_empty()),
            limit: self.limit.unwrap_or(SEARCH_DEFAULT_LIMIT),
            offset: self.offset.unwrap_or(0),
        }
    }
}

impl Validate for SearchEntriesInput {
    fn validate(&self) -> AppResult<()> {
        match self.limit {
            Some(0) => reject("limit", "limit must be at least 1"),
            Some(limit) if limit > SEARCH_MAX_LIMIT => reject(
                "limit",
                format!("limit must not exceed {SEARCH_MAX_LIMIT}"),
            ),
            _ => Ok(()),
        }
    }
}

/// Normalized search fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntrySearch {
    /// Definition filter.
    pub definition_id: Option<WaitlistDefinitionId>,
    /// Status filter.
    pub status: Option<WaitlistEntryStatus>,
    /// Trimmed, lower-cased email fragment.
    pub email: Option<String>,
    /// Page size.
    pub limit: u32,
    /// Entries skipped.
    pub offset: u32,
}

impl EntrySearch {
    /// Returns whether an entry passes the filters, ignoring paging.
    #[must_use]
    pub fn matches(&self, entry: &WaitlistEntry) -> bool {
        self.definition_id
            .is_none_or(|definition_id| entry.definition_id == definition_id)
            && self.status.is_none_or(|status| entry.status == status)
            && self
                .email
                .as_deref()
                .is_none_or(|fragment| entry.email.contains(fragment))
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPage {
    /// Entries on this page, newest first.
    pub entries: Vec<WaitlistEntry>,
    /// Matching entries across all pages.
    pub total: u64,
    /// Page size used.
    pub limit: u32,
    /// Entries skipped.
    pub offset: u32,
}

/// Subscription filter for status change events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryStatusSubscriptionInput {
    /// Only events for this definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_id: Option<WaitlistDefinitionId>,
}

impl EntryStatusSubscriptionInput {
    /// Returns whether an event passes the filter.
    #[must_use]
    pub fn matches(&self, event: &EntryStatusChanged) -> bool {
        self.definition_id
            .is_none_or(|definition_id| event.definition_id == definition_id)
    }
}

impl Validate for EntryStatusSubscriptionInput {
    fn validate(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Event published whenever an entry is created or its status changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryStatusChanged {
    /// Affected entry.
    pub entry_id: WaitlistEntryId,
    /// Definition of the entry.
    pub definition_id: WaitlistDefinitionId,
    /// Entrant email.
    pub email: String,
    /// Status before the change; absent for new entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<WaitlistEntryStatus>,
    /// Status after the change.
    pub status: WaitlistEntryStatus,
    /// Time of the change.
    pub changed_at: DateTime<Utc>,
}

impl EntryStatusChanged {
    /// Builds the event for a freshly created entry.
    #[must_use]
    pub fn created(entry: &WaitlistEntry) -> Self {
        Self {
            entry_id: entry.id,
            definition_id: entry.definition_id,
            email: entry.email.clone(),
            previous_status: None,
            status: entry.status,
            changed_at: entry.created_at,
        }
    }

    /// Builds the event for a status update.
    #[must_use]
    pub fn updated(entry: &WaitlistEntry, previous_status: WaitlistEntryStatus) -> Self {
        Self {
            entry_id: entry.id,
            definition_id: entry.definition_id,
            email: entry.email.clone(),
            previous_status: Some(previous_status),
            status: entry.status,
            changed_at: entry.updated_at,
        }
    }
}
