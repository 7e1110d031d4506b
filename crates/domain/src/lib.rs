//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access;
mod auth;
mod organization;
/// Role catalogues per access scope.
pub mod roles;
mod user;
mod waitlist;

pub use access::{AuthorizeResponse, Permission, Resource, Statements};
pub use auth::{LoginInput, LoginOutput, LogoutInput, LogoutOutput, SignupInput, SignupOutput};
pub use organization::{
    AddMemberInput, CreateOrganizationInput, GetMembershipInput, Membership,
    ORGANIZATION_SLUG_MAX_LENGTH, Organization, OrganizationRole,
};
pub use roles::{AccessScope, Role, RoleCatalogue, RoleCatalogueBuilder};
pub use user::{
    Actor, EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, UserId, UserRole,
    validate_password,
};
pub use waitlist::{
    ActiveCount, CreateDefinitionInput, CreateEntryInput, DESCRIPTION_MIN_LENGTH,
    DefinitionStats, DefinitionVisibility, EntryPage, EntrySearch, EntryStatusChanged, EntryStatusSubscriptionInput,
    FieldType, FieldValue, GetActiveCountInput, GetDefinitionInput, GetEntryInput,
    GetStatsInput, ListDefinitionsInput, NAME_MAX_LENGTH, NewWaitlistEntry,
    SEARCH_DEFAULT_LIMIT, SEARCH_MAX_LIMIT, SearchEntriesInput, UpdateEntryStatusInput,
    WaitlistDefinition, WaitlistDefinitionId, WaitlistEntry, WaitlistEntryId,
    WaitlistEntryStatus, WaitlistField, WaitlistStatus, WaitlistType,
};
