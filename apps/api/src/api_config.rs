use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use launchpad_core::AppError;
use launchpad_infrastructure::JWT_SECRET_MIN_LENGTH;
use tracing_subscriber::EnvFilter;

/// Account seeded with the platform `ADMIN` role at startup.
#[derive(Debug, Clone)]
pub struct AdminSeedConfig {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub token_ttl_seconds: i64,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub search_cache_ttl: Duration,
    pub event_buffer_capacity: usize,
    pub revocation_purge_interval: Duration,
    pub admin_seed: Option<AdminSeedConfig>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = optional_non_empty_env("DATABASE_URL");
        if migrate_only && database_url.is_none() {
            return Err(AppError::Validation(
                "DATABASE_URL is required to run migrations".to_owned(),
            ));
        }

        let jwt_secret = required_env("JWT_SECRET")?;
        if jwt_secret.len() < JWT_SECRET_MIN_LENGTH {
            return Err(AppError::Validation(format!(
                "JWT_SECRET must be at least {JWT_SECRET_MIN_LENGTH} characters"
            )));
        }

        let token_ttl_seconds = parsed_env("TOKEN_TTL_SECONDS", 3600_i64)?;
        if token_ttl_seconds <= 0 {
            return Err(AppError::Validation(
                "TOKEN_TTL_SECONDS must be positive".to_owned(),
            ));
        }

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let search_cache_ttl =
            Duration::from_secs(parsed_env("SEARCH_CACHE_TTL_SECONDS", 30_u64)?);
        let event_buffer_capacity = parsed_env("EVENT_BUFFER_CAPACITY", 256_usize)?;
        let revocation_purge_interval =
            Duration::from_secs(parsed_env("REVOCATION_PURGE_INTERVAL_SECONDS", 300_u64)?.max(1));

        let admin_seed = match (
            optional_non_empty_env("ADMIN_EMAIL"),
            optional_non_empty_env("ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(AdminSeedConfig { email, password }),
            (None, None) => None,
            _ => {
                return Err(AppError::Validation(
                    "ADMIN_EMAIL and ADMIN_PASSWORD must be set together".to_owned(),
                ));
            }
        };

        Ok(Self {
            migrate_only,
            database_url,
            jwt_secret,
            token_ttl_seconds,
            frontend_url,
            api_host,
            api_port,
            search_cache_ttl,
            event_buffer_capacity,
            revocation_purge_interval,
            admin_seed,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;

        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn optional_non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parsed_env<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_non_empty_env(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        None => Ok(default),
    }
}
