use launchpad_core::AppResult;

use crate::tree::RouteTree;

/// Account session procedures.
pub mod auth {
    use launchpad_domain::{
        LoginInput, LoginOutput, LogoutInput, LogoutOutput, SignupInput, SignupOutput,
    };

    crate::procedure! {
        /// Exchanges credentials for a bearer token.
        pub Login: mutation "auth.login" (LoginInput) -> LoginOutput;
        /// Registers an account and signs it in.
        pub Signup: mutation "auth.signup" (SignupInput) -> SignupOutput;
        /// Revokes the caller's bearer token.
        pub Logout: mutation "auth.logout" (LogoutInput) -> LogoutOutput;
    }
}

/// Organization procedures.
pub mod organization {
    use launchpad_domain::{
        AddMemberInput, CreateOrganizationInput, GetMembershipInput, Membership, Organization,
    };

    crate::procedure! {
        /// Creates an organization owned by the caller.
        pub Create: mutation "organization.create" (CreateOrganizationInput) -> Organization;
        /// Adds an existing account to an organization.
        pub AddMember: mutation "organization.addMember" (AddMemberInput) -> Membership;
        /// Returns the caller's membership.
        pub GetMembership: query "organization.getMembership" (GetMembershipInput) -> Membership;
    }
}

/// Waitlist procedures.
pub mod waitlist {
    /// Waitlist definition procedures.
    pub mod definition {
        use launchpad_domain::{
            ActiveCount, CreateDefinitionInput, DefinitionStats, GetActiveCountInput,
            GetDefinitionInput, GetStatsInput, ListDefinitionsInput, WaitlistDefinition,
        };

        crate::procedure! {
            /// Creates a waitlist definition.
            pub Create: mutation "waitlist.definition.create" (CreateDefinitionInput) -> WaitlistDefinition;
            /// Returns one definition.
            pub Get: query "waitlist.definition.get" (GetDefinitionInput) -> WaitlistDefinition;
            /// Lists definitions matching optional filters.
            pub List: query "waitlist.definition.list" (ListDefinitionsInput) -> Vec<WaitlistDefinition>;
            /// Per-status entry counts.
            pub GetStats: query "waitlist.definition.getStats" (GetStatsInput) -> DefinitionStats;
            /// Number of definitions accepting entries.
            pub GetActiveCount: query "waitlist.definition.getActiveCount" (GetActiveCountInput) -> ActiveCount;
        }
    }

    /// Waitlist entry procedures.
    pub mod entry {
        use launchpad_domain::{
            CreateEntryInput, EntryPage, EntryStatusChanged, EntryStatusSubscriptionInput,
            GetEntryInput, SearchEntriesInput, UpdateEntryStatusInput, WaitlistEntry,
        };

        crate::procedure! {
            /// Joins a waitlist.
            pub Create: mutation "waitlist.entry.create" (CreateEntryInput) -> WaitlistEntry;
            /// Approves or rejects an entry.
            pub UpdateStatus: mutation "waitlist.entry.updateStatus" (UpdateEntryStatusInput) -> WaitlistEntry;
            /// Returns one entry.
            pub GetEntry: query "waitlist.entry.getEntry" (GetEntryInput) -> WaitlistEntry;
            /// Pages through entries matching filters.
            pub SearchEntries: query "waitlist.entry.searchEntries" (SearchEntriesInput) -> EntryPage;
            /// Streams status changes until the client disconnects.
            pub OnStatusChanged: subscription "waitlist.entry.onStatusChanged" (EntryStatusSubscriptionInput) -> EntryStatusChanged;
        }
    }
}

/// Builds the route tree served by the API.
pub fn app_contract() -> AppResult<RouteTree> {
    RouteTree::new()
        .with::<auth::Login>()?
        .with::<auth::Signup>()?
        .with::<auth::Logout>()?
        .with::<organization::Create>()?
        .with::<organization::AddMember>()?
        .with::<organization::GetMembership>()?
        .with::<waitlist::definition::Create>()?
        .with::<waitlist::definition::Get>()?
        .with::<waitlist::definition::List>()?
        .with::<waitlist::definition::GetStats>()?
        .with::<waitlist::definition::GetActiveCount>()?
        .with::<waitlist::entry::Create>()?
        .with::<waitlist::entry::UpdateStatus>()?
        .with::<waitlist::entry::GetEntry>()?
        .with::<waitlist::entry::SearchEntries>()?
        .with::<waitlist::entry::OnStatusChanged>()
}
