use launchpad_application::{AuthService, OrganizationService, WaitlistService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub organization_service: OrganizationService,
    pub waitlist_service: WaitlistService,
}
