//! Application services and ports.

#![forbid(unsafe_code)]

mod auth_ports;
mod auth_service;
mod authorization_service;
mod organization_ports;
mod organization_service;
mod waitlist_ports;
mod waitlist_service;

#[cfg(test)]
mod test_support;

pub use auth_ports::{
    IssuedToken, NewUserRecord, PasswordHasher, RevokedTokenRepository, TokenClaims, TokenIssuer,
    UserRecord, UserRepository,
};
pub use auth_service::{AuthService, token_digest};
pub use authorization_service::AuthorizationService;
pub use organization_ports::OrganizationRepository;
pub use organization_service::OrganizationService;
pub use waitlist_ports::{
    EntrySearchCache, EntryStatusStream, EntryStatusUpdate, WaitlistEventPublisher,
    WaitlistRepository,
};
pub use waitlist_service::WaitlistService;
