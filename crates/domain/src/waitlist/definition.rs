use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use launchpad_core::validation::reject;
use launchpad_core::{AppError, AppResult, OrganizationId, Validate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum description length for a waitlist definition, in characters.
pub const DESCRIPTION_MIN_LENGTH: usize = 20;

/// Maximum waitlist name length, in characters.
pub const NAME_MAX_LENGTH: usize = 120;

/// Unique identifier for a waitlist definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaitlistDefinitionId(Uuid);

impl WaitlistDefinitionId {
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

impl Default for WaitlistDefinitionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for WaitlistDefinitionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Kind of waitlist being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaitlistType {
    /// General interest list.
    General,
    /// Closed beta enrollment.
    Beta,
    /// Early access to a release.
    EarlyAccess,
    /// Product launch announcement list.
    ProductLaunch,
    /// Event registration.
    Event,
}

impl WaitlistType {
    /// Returns every waitlist type.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[
            Self::General,
            Self::Beta,
            Self::EarlyAccess,
            Self::ProductLaunch,
            Self::Event,
        ]
    }

    /// Returns the storage string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "GENERAL",
            Self::Beta => "BETA",
            Self::EarlyAccess => "EARLY_ACCESS",
            Self::ProductLaunch => "PRODUCT_LAUNCH",
            Self::Event => "EVENT",
        }
    }
}

impl FromStr for WaitlistType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown waitlist type '{value}'")))
    }
}

/// Lifecycle status of a waitlist definition. Any status may follow any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaitlistStatus {
    /// Accepting entries.
    #[default]
    Active,
    /// Temporarily closed.
    Inactive,
    /// Retired.
    Archived,
}

impl WaitlistStatus {
    /// Returns the storage string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Archived => "ARCHIVED",
        }
    }
}

impl FromStr for WaitlistStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ACTIVE" => Ok(Self::Active),
            "INACTIVE" => Ok(Self::Inactive),
            "ARCHIVED" => Ok(Self::Archived),
            _ => Err(AppError::Validation(format!(
                "unknown waitlist status '{value}'"
            ))),
        }
    }
}

/// Input type of a custom waitlist field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    /// Free text.
    Text,
    /// Email address.
    Email,
    /// Numeric value.
    Number,
    /// Phone number.
    Phone,
    /// Web address.
    Url,
    /// One of a fixed set of options.
    Select,
    /// Boolean toggle.
    Checkbox,
    /// Calendar date.
    Date,
}

/// A custom field collected from each entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistField {
    /// Field key, unique within the definition.
    pub name: String,
    /// Optional display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Input type.
    pub field_type: FieldType,
    /// Whether entries must supply a value.
    #[serde(default)]
    pub required: bool,
    /// Allowed options for `SELECT` fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// Persisted waitlist definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistDefinition {
    /// Definition identifier.
    pub id: WaitlistDefinitionId,
    /// Display name.
    pub name: String,
    /// Description shown to prospective entrants.
    pub description: String,
    /// Kind of waitlist.
    pub waitlist_type: WaitlistType,
    /// Lifecycle status.
    pub status: WaitlistStatus,
    /// Custom fields collected from entries.
    pub fields: Vec<WaitlistField>,
    /// Owning organization; `None` for global definitions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<OrganizationId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl WaitlistDefinition {
    /// Returns whether new entries may join.
    #[must_use]
    pub fn accepts_entries(&self) -> bool {
        self.status == WaitlistStatus::Active
    }
}

/// Which definitions a read may reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionVisibility {
    /// Every definition, global or organization-owned.
    All,
    /// Only definitions owned by this organization.
    Organization(OrganizationId),
}

impl DefinitionVisibility {
    /// Returns whether the definition is within reach.
    #[must_use]
    pub fn includes(&self, definition: &WaitlistDefinition) -> bool {
        match self {
            Self::All => true,
            Self::Organization(organization_id) => {
                definition.organization_id == Some(*organization_id)
            }
        }
    }

    /// Returns the owning organization to filter on, if any.
    #[must_use]
    pub fn organization_id(&self) -> Option<OrganizationId> {
        match self {
            Self::All => None,
            Self::Organization(organization_id) => Some(*organization_id),
        }
    }
}

/// Request to create a waitlist definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDefinitionInput {
    /// Display name.
    pub name: String,
    /// Description, at least [`DESCRIPTION_MIN_LENGTH`] characters.
    pub description: String,
    /// Kind of waitlist.
    pub waitlist_type: WaitlistType,
    /// Initial status; defaults to `ACTIVE`.
    #[serde(default)]
    pub status: Option<WaitlistStatus>,
    /// Custom fields.
    #[serde(default)]
    pub fields: Vec<WaitlistField>,
}

impl CreateDefinitionInput {
    /// Builds the definition to persist, owned by `organization_id` when set.
    pub fn into_definition(
        self,
        organization_id: Option<OrganizationId>,
        now: DateTime<Utc>,
    ) -> AppResult<WaitlistDefinition> {
        self.validate()?;

        Ok(WaitlistDefinition {
            id: WaitlistDefinitionId::new(),
            name: self.name.trim().to_owned(),
            description: self.description,
            waitlist_type: self.waitlist_type,
            status: self.status.unwrap_or_default(),
            fields: self.fields,
            organization_id,
            created_at: now,
            updated_at: now,
        })
    }
}

impl Validate for CreateDefinitionInput {
    fn validate(&self) -> AppResult<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return reject("name", "name must not be empty");
        }
        if name.chars().count() > NAME_MAX_LENGTH {
            return reject(
                "name",
                format!("name must not exceed {NAME_MAX_LENGTH} characters"),
            );
        }

        if self.description.chars().count() < DESCRIPTION_MIN_LENGTH {
            return reject(
                "description",
                format!("description must be at least {DESCRIPTION_MIN_LENGTH} characters"),
            );
        }

        let mut seen = HashSet::new();
        for (index, field) in self.fields.iter().enumerate() {
            let field_name = field.name.trim();
            if field_name.is_empty() {
                return reject(format!("fields.{index}.name"), "field name must not be empty");
            }
            if !seen.insert(field_name) {
                return reject(
                    format!("fields.{index}.name"),
                    format!("field '{field_name}' is declared more than once"),
                );
            }
            if field.field_type == FieldType::Select && field.options.is_empty() {
                return reject(
                    format!("fields.{index}.options"),
                    "select fields need at least one option",
                );
            }
        }

        Ok(())
    }
}

/// Lookup of one definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetDefinitionInput {
    /// Definition identifier.
    pub id: WaitlistDefinitionId,
}

impl Validate for GetDefinitionInput {
    fn validate(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Optional filters for listing definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDefinitionsInput {
    /// Only definitions with this status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WaitlistStatus>,
    /// Only definitions of this type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waitlist_type: Option<WaitlistType>,
}

impl ListDefinitionsInput {
    /// Returns whether a definition passes the filters.
    #[must_use]
    pub fn matches(&self, definition: &WaitlistDefinition) -> bool {
        self.status.is_none_or(|status| definition.status == status)
            && self
                .waitlist_type
                .is_none_or(|kind| definition.waitlist_type == kind)
    }
}

impl Validate for ListDefinitionsInput {
    fn validate(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Request for per-status entry counts of one definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetStatsInput {
    /// Definition identifier.
    pub definition_id: WaitlistDefinitionId,
}

impl Validate for GetStatsInput {
    fn validate(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Entry counts of one definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionStats {
    /// Definition identifier.
    pub definition_id: WaitlistDefinitionId,
    /// All entries.
    pub total: u64,
    /// Entries awaiting review.
    pub pending: u64,
    /// Approved entries.
    pub approved: u64,
    /// Rejected entries.
    pub rejected: u64,
}

/// Request for the number of active definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetActiveCountInput {}

impl Validate for GetActiveCountInput {
    fn validate(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Number of definitions currently accepting entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCount {
    /// Active definitions.
    pub count: u64,
}
