//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod broadcast_waitlist_event_publisher;
mod in_memory_entry_search_cache;
mod in_memory_organization_repository;
mod in_memory_user_repository;
mod in_memory_waitlist_repository;
mod jwt_token_issuer;
mod postgres_organization_repository;
mod postgres_revoked_token_repository;
mod postgres_user_repository;
mod postgres_waitlist_repository;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use broadcast_waitlist_event_publisher::BroadcastWaitlistEventPublisher;
pub use in_memory_entry_search_cache::InMemoryEntrySearchCache;
pub use in_memory_organization_repository::InMemoryOrganizationRepository;
pub use in_memory_user_repository::{InMemoryRevokedTokenRepository, InMemoryUserRepository};
pub use in_memory_waitlist_repository::InMemoryWaitlistRepository;
pub use jwt_token_issuer::{JWT_SECRET_MIN_LENGTH, JwtTokenIssuer};
pub use postgres_organization_repository::PostgresOrganizationRepository;
pub use postgres_revoked_token_repository::PostgresRevokedTokenRepository;
pub use postgres_user_repository::PostgresUserRepository;
pub use postgres_waitlist_repository::PostgresWaitlistRepository;
