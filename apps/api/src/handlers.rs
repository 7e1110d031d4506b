pub mod auth;
pub mod health;
pub mod organization;
pub mod waitlist;

use launchpad_contract::routes::{auth as auth_routes, organization as organization_routes};
use launchpad_contract::routes::waitlist::{definition, entry};
use launchpad_core::AppResult;

use crate::rpc::RpcServer;

/// Binds every procedure of the route contract to its resolver.
pub fn bind_procedures(server: RpcServer) -> AppResult<RpcServer> {
    server
        .mutation::<auth_routes::Login, _, _>(auth::login)?
        .mutation::<auth_routes::Signup, _, _>(auth::signup)?
        .mutation::<auth_routes::Logout, _, _>(auth::logout)?
        .mutation::<organization_routes::Create, _, _>(organization::create)?
        .mutation::<organization_routes::AddMember, _, _>(organization::add_member)?
        .query::<organization_routes::GetMembership, _, _>(organization::get_membership)?
        .mutation::<definition::Create, _, _>(waitlist::create_definition)?
        .query::<definition::Get, _, _>(waitlist::get_definition)?
        .query::<definition::List, _, _>(waitlist::list_definitions)?
        .query::<definition::GetStats, _, _>(waitlist::get_stats)?
        .query::<definition::GetActiveCount, _, _>(waitlist::get_active_count)?
        .mutation::<entry::Create, _, _>(waitlist::create_entry)?
        .mutation::<entry::UpdateStatus, _, _>(waitlist::update_entry_status)?
        .query::<entry::GetEntry, _, _>(waitlist::get_entry)?
        .query::<entry::SearchEntries, _, _>(waitlist::search_entries)?
        .subscription::<entry::OnStatusChanged, _, _, _>(waitlist::on_status_changed)
}
