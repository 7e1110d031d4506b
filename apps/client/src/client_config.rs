use std::env;
use std::str::FromStr;
use std::time::Duration;

use launchpad_core::{AppError, AppResult};
use tracing_subscriber::EnvFilter;

use crate::scenarios::Scenario;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub scenario: Scenario,
    pub api_base_url: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn load() -> AppResult<Self> {
        let scenario = match env::args().nth(1) {
            Some(value) => value.parse::<Scenario>()?,
            None => Scenario::All,
        };
        let api_base_url = env::var("API_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:3001".to_owned())
            .trim_end_matches('/')
            .to_owned();
        let admin_email = optional_non_empty_env("CLIENT_ADMIN_EMAIL");
        let admin_password = optional_non_empty_env("CLIENT_ADMIN_PASSWORD");
        let timeout_seconds = parse_env("CLIENT_TIMEOUT_SECONDS", 15_u64)?;

        if timeout_seconds == 0 {
            return Err(AppError::Validation(
                "CLIENT_TIMEOUT_SECONDS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            scenario,
            api_base_url,
            admin_email,
            admin_password,
            timeout: Duration::from_secs(timeout_seconds),
        })
    }

    /// Admin credentials, required by scenarios with admin-only steps.
    pub fn admin_credentials(&self) -> AppResult<(&str, &str)> {
        match (self.admin_email.as_deref(), self.admin_password.as_deref()) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => Err(AppError::Validation(
                "CLIENT_ADMIN_EMAIL and CLIENT_ADMIN_PASSWORD are required for admin steps"
                    .to_owned(),
            )),
        }
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

fn optional_non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_env<T>(name: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) => value.trim().parse::<T>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}
