//! Organizations and memberships.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use launchpad_core::validation::reject;
use launchpad_core::{AppError, AppResult, OrganizationId, Validate};
use serde::{Deserialize, Serialize};

use crate::roles::{
    Role, organization_admin, organization_analyst, organization_member, organization_owner,
};
use crate::user::{EmailAddress, UserId};

/// Maximum organization slug length.
pub const ORGANIZATION_SLUG_MAX_LENGTH: usize = 48;

/// Role held through an organization membership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrganizationRole {
    /// Organization creator.
    Owner,
    /// Manages members and waitlists.
    Admin,
    /// Reads waitlists and statistics.
    Analyst,
    /// Baseline membership.
    #[default]
    Member,
}

impl OrganizationRole {
    /// Returns the storage string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Admin => "ADMIN",
            Self::Analyst => "ANALYST",
            Self::Member => "MEMBER",
        }
    }

    /// Returns the organization catalogue role for this membership role.
    pub fn catalogue_role(&self) -> AppResult<&'static Role> {
        match self {
            Self::Owner => organization_owner(),
            Self::Admin => organization_admin(),
            Self::Analyst => organization_analyst(),
            Self::Member => organization_member(),
        }
    }
}

impl FromStr for OrganizationRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "OWNER" => Ok(Self::Owner),
            "ADMIN" => Ok(Self::Admin),
            "ANALYST" => Ok(Self::Analyst),
            "MEMBER" => Ok(Self::Member),
            _ => Err(AppError::Validation(format!(
                "unknown organization role '{value}'"
            ))),
        }
    }
}

/// Organization record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Organization identifier.
    pub id: OrganizationId,
    /// Display name.
    pub name: String,
    /// Unique URL slug.
    pub slug: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A user's role inside one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    /// Organization the membership belongs to.
    pub organization_id: OrganizationId,
    /// Member account.
    pub user_id: UserId,
    /// Member email at the time of lookup.
    pub email: String,
    /// Role within the organization.
    pub role: OrganizationRole,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Request to create an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationInput {
    /// Display name.
    pub name: String,
    /// URL slug: lower-case letters, digits and `-`.
    pub slug: String,
}

impl Validate for CreateOrganizationInput {
    fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return reject("name", "organization name must not be empty");
        }

        if self.slug.is_empty() || self.slug.len() > ORGANIZATION_SLUG_MAX_LENGTH {
            return reject(
                "slug",
                format!("slug must be 1 to {ORGANIZATION_SLUG_MAX_LENGTH} characters"),
            );
        }

        if !self
            .slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            || self.slug.starts_with('-')
            || self.slug.ends_with('-')
        {
            return reject(
                "slug",
                "slug may only contain lower-case letters, digits and inner '-'",
            );
        }

        Ok(())
    }
}

/// Request to add an existing account to an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberInput {
    /// Target organization.
    pub organization_id: OrganizationId,
    /// Email of the account to add.
    pub email: String,
    /// Role to grant.
    #[serde(default)]
    pub role: OrganizationRole,
}

impl Validate for AddMemberInput {
    fn validate(&self) -> AppResult<()> {
        EmailAddress::new(&self.email)?;
        if self.role == OrganizationRole::Owner {
            return reject("role", "ownership cannot be granted through addMember");
        }
        Ok(())
    }
}

/// Request for the caller's own membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetMembershipInput {
    /// Organization to look up.
    pub organization_id: OrganizationId,
}

impl Validate for GetMembershipInput {
    fn validate(&self) -> AppResult<()> {
        Ok(())
    }
}
