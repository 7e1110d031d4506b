//! Permission vocabulary and statement composition.
//!
//! A statement maps each resource to the set of actions granted on it. The
//! vocabulary is closed: every grantable pair is a [`Permission`] variant, so a
//! statement can never name an action its resource does not define.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use launchpad_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

macro_rules! permission_vocabulary {
    ($(
        $(#[$resource_meta:meta])*
        $resource:ident ($wire:literal) => { $($variant:ident => $action:literal),+ $(,)? }
    ),+ $(,)?) => {
        /// Resource types that statements grant actions on.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Resource {
            $($(#[$resource_meta])* $resource,)+
        }

        impl Resource {
            /// Returns every known resource.
            #[must_use]
            pub fn all() -> &'static [Self] {
                const ALL: &[Resource] = &[$(Resource::$resource,)+];
                ALL
            }

            /// Returns the stable wire name of this resource.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$resource => $wire,)+
                }
            }

            /// Returns the permissions defined for this resource, in declaration order.
            #[must_use]
            pub fn permissions(&self) -> &'static [Permission] {
                match self {
                    $(Self::$resource => &[$(Permission::$variant),+],)+
                }
            }
        }

        /// One grantable `(resource, action)` pair.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum Permission {
            $($(
                #[doc = concat!("`", $wire, ":", $action, "`.")]
                $variant,
            )+)+
        }

        impl Permission {
            /// Returns every known permission, grouped by resource.
            #[must_use]
            pub fn all() -> &'static [Self] {
                const ALL: &[Permission] = &[$($(Permission::$variant,)+)+];
                ALL
            }

            /// Returns the resource this permission applies to.
            #[must_use]
            pub fn resource(&self) -> Resource {
                match self {
                    $($(Self::$variant => Resource::$resource,)+)+
                }
            }

            /// Returns the action name within its resource.
            #[must_use]
            pub fn action(&self) -> &'static str {
                match self {
                    $($(Self::$variant => $action,)+)+
                }
            }

            /// Returns the stable `resource:action` wire value.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($(Self::$variant => concat!($wire, ":", $action),)+)+
                }
            }
        }
    };
}

permission_vocabulary! {
    /// Accounts managed by the global admin plugin.
    User("user") => {
        UserCreate => "create",
        UserList => "list",
        UserSetRole => "set-role",
        UserBan => "ban",
        UserImpersonate => "impersonate",
        UserDelete => "delete",
        UserSetPassword => "set-password",
    },
    /// Login sessions managed by the global admin plugin.
    Session("session") => {
        SessionList => "list",
        SessionRevoke => "revoke",
        SessionDelete => "delete",
    },
    /// The organization record itself.
    Organization("organization") => {
        OrganizationUpdate => "update",
        OrganizationDelete => "delete",
    },
    /// Organization memberships.
    Member("member") => {
        MemberCreate => "create",
        MemberUpdate => "update",
        MemberDelete => "delete",
    },
    /// Pending organization invitations.
    Invitation("invitation") => {
        InvitationCreate => "create",
        InvitationCancel => "cancel",
    },
    /// Teams inside an organization.
    Team("team") => {
        TeamCreate => "create",
        TeamUpdate => "update",
        TeamDelete => "delete",
    },
    /// Waitlist definitions.
    WaitlistDefinition("waitlistDefinition") => {
        WaitlistDefinitionCreate => "create",
        WaitlistDefinitionGet => "get",
        WaitlistDefinitionList => "list",
        WaitlistDefinitionGetStats => "getStats",
        WaitlistDefinitionGetActiveCount => "getActiveCount",
    },
    /// Signups against a waitlist definition.
    WaitlistEntry("waitlistEntry") => {
        WaitlistEntryCreate => "create",
        WaitlistEntryUpdateStatus => "updateStatus",
        WaitlistEntryGetEntry => "getEntry",
        WaitlistEntrySearchEntries => "searchEntries",
    },
}

impl Resource {
    /// Finds the permission for one action name on this resource.
    pub fn permission(&self, action: &str) -> AppResult<Permission> {
        self.permissions()
            .iter()
            .copied()
            .find(|permission| permission.action() == action)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "action '{action}' is not defined for resource '{}'",
                    self.as_str()
                ))
            })
    }
}

impl Display for Resource {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|resource| resource.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown resource '{value}'")))
    }
}

impl Permission {
    /// Parses a transport value into a permission.
    pub fn from_transport(value: &str) -> AppResult<Self> {
        Self::from_str(value)
    }
}

impl Display for Permission {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let Some((resource, action)) = value.split_once(':') else {
            return Err(AppError::Validation(format!(
                "unknown permission value '{value}'"
            )));
        };

        Resource::from_str(resource)?.permission(action)
    }
}

impl TryFrom<String> for Permission {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(value.as_str())
    }
}

impl From<Permission> for String {
    fn from(value: Permission) -> Self {
        value.as_str().to_owned()
    }
}

/// Resource to granted-action mapping.
///
/// A resource may be present with an empty action set; presence matters to
/// [`Statements::override_resources`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statements {
    grants: BTreeMap<Resource, BTreeSet<Permission>>,
}

impl Statements {
    /// Creates an empty statement.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a statement from typed permissions.
    #[must_use]
    pub fn from_permissions(permissions: impl IntoIterator<Item = Permission>) -> Self {
        let mut statements = Self::new();
        for permission in permissions {
            statements.insert(permission);
        }
        statements
    }

    /// Adds typed permissions to this statement.
    #[must_use]
    pub fn with(mut self, permissions: &[Permission]) -> Self {
        for permission in permissions {
            self.insert(*permission);
        }
        self
    }

    /// Declares a resource without granting any action on it.
    #[must_use]
    pub fn declare(mut self, resource: Resource) -> Self {
        self.grants.entry(resource).or_default();
        self
    }

    /// Grants named actions on one resource.
    ///
    /// Rejects any action the resource does not define.
    pub fn grant(mut self, resource: Resource, actions: &[&str]) -> AppResult<Self> {
        let entry = self.grants.entry(resource).or_default();
        for action in actions {
            entry.insert(resource.permission(action)?);
        }
        Ok(self)
    }

    fn insert(&mut self, permission: Permission) {
        self.grants
            .entry(permission.resource())
            .or_default()
            .insert(permission);
    }

    /// Returns the per-resource union of both statements.
    ///
    /// Duplicate actions collapse; no grant from either side is lost.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for (resource, permissions) in &other.grants {
            merged
                .grants
                .entry(*resource)
                .or_default()
                .extend(permissions.iter().copied());
        }
        merged
    }

    /// Returns a copy where every resource present in `other` is replaced
    /// wholesale by `other`'s action set.
    ///
    /// This is the shallow "later key wins" merge. It can drop grants: use
    /// [`Statements::union`] for inheritance.
    #[must_use]
    pub fn override_resources(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for (resource, permissions) in &other.grants {
            merged.grants.insert(*resource, permissions.clone());
        }
        merged
    }

    /// Returns whether the permission is granted.
    #[must_use]
    pub fn allows(&self, permission: Permission) -> bool {
        self.grants
            .get(&permission.resource())
            .is_some_and(|permissions| permissions.contains(&permission))
    }

    /// Returns whether every named action on the resource is granted.
    pub fn allows_all(&self, resource: Resource, actions: &[&str]) -> AppResult<bool> {
        for action in actions {
            if !self.allows(resource.permission(action)?) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Returns whether this statement is a superset of `other` for every
    /// resource `other` mentions.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        other.grants.iter().all(|(resource, permissions)| {
            self.grants
                .get(resource)
                .is_some_and(|granted| granted.is_superset(permissions))
        })
    }

    /// Returns the resources present in this statement.
    pub fn resources(&self) -> impl Iterator<Item = Resource> + '_ {
        self.grants.keys().copied()
    }

    /// Returns the granted action names for one resource.
    #[must_use]
    pub fn actions(&self, resource: Resource) -> Vec<&'static str> {
        self.grants
            .get(&resource)
            .map(|permissions| permissions.iter().map(Permission::action).collect())
            .unwrap_or_default()
    }

    /// Returns every granted permission.
    pub fn permissions(&self) -> impl Iterator<Item = Permission> + '_ {
        self.grants.values().flat_map(|permissions| permissions.iter().copied())
    }

    /// Returns an inspectable `resource -> actions` view.
    #[must_use]
    pub fn by_resource(&self) -> BTreeMap<&'static str, Vec<&'static str>> {
        self.grants
            .iter()
            .map(|(resource, permissions)| {
                (
                    resource.as_str(),
                    permissions.iter().map(Permission::action).collect(),
                )
            })
            .collect()
    }

    /// Returns whether no action is granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grants.values().all(BTreeSet::is_empty)
    }

    /// Every action of the global admin plugin.
    #[must_use]
    pub fn vendor_admin_defaults() -> Self {
        Self::from_permissions(
            Resource::User
                .permissions()
                .iter()
                .chain(Resource::Session.permissions())
                .copied(),
        )
    }

    /// Organization plugin defaults for the `owner` role.
    #[must_use]
    pub fn vendor_organization_owner_defaults() -> Self {
        Self::from_permissions(
            [
                Resource::Organization,
                Resource::Member,
                Resource::Invitation,
                Resource::Team,
            ]
            .iter()
            .flat_map(|resource| resource.permissions().iter().copied()),
        )
    }

    /// Organization plugin defaults for the `admin` role.
    #[must_use]
    pub fn vendor_organization_admin_defaults() -> Self {
        Self::from_permissions(
            [Resource::Member, Resource::Invitation, Resource::Team]
                .iter()
                .flat_map(|resource| resource.permissions().iter().copied()),
        )
        .with(&[Permission::OrganizationUpdate])
    }

    /// Organization plugin defaults for the `member` role: resources declared,
    /// nothing granted.
    #[must_use]
    pub fn vendor_organization_member_defaults() -> Self {
        Self::new()
            .declare(Resource::Organization)
            .declare(Resource::Member)
            .declare(Resource::Invitation)
            .declare(Resource::Team)
    }

    /// Every waitlist definition and entry action.
    #[must_use]
    pub fn waitlist_full() -> Self {
        Self::from_permissions(
            Resource::WaitlistDefinition
                .permissions()
                .iter()
                .chain(Resource::WaitlistEntry.permissions())
                .copied(),
        )
    }
}

/// Outcome of checking a role against requested actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizeResponse {
    /// Whether every requested action is granted.
    pub success: bool,
    /// Reason for denial.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthorizeResponse {
    /// Successful authorization.
    #[must_use]
    pub fn granted() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// Denied authorization with a reason.
    #[must_use]
    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(reason.into()),
        }
    }
}
