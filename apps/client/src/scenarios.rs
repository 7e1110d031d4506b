//! Scripted end-to-end flows against a running API.
//!
//! Every scenario is a linear chain of steps. The first unexpected error
//! ends the scenario and is returned to the caller.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use launchpad_core::{AppError, AppResult};
use tracing::info;

use crate::client_config::ClientConfig;
use crate::rpc_client::RpcClient;

mod auth;
mod organization;
mod steps;
mod subscription;
mod waitlist;

/// Selectable scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Auth,
    Organization,
    Waitlist,
    Subscription,
    All,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Organization => "organization",
            Self::Waitlist => "waitlist",
            Self::Subscription => "subscription",
            Self::All => "all",
        }
    }

    fn expand(self) -> Vec<Self> {
        match self {
            Self::All => vec![
                Self::Auth,
                Self::Organization,
                Self::Waitlist,
                Self::Subscription,
            ],
            single => vec![single],
        }
    }
}

impl Display for Scenario {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auth" => Ok(Self::Auth),
            "organization" => Ok(Self::Organization),
            "waitlist" => Ok(Self::Waitlist),
            "subscription" => Ok(Self::Subscription),
            "all" => Ok(Self::All),
            _ => Err(AppError::Validation(format!(
                "unknown scenario '{value}', expected auth|organization|waitlist|subscription|all"
            ))),
        }
    }
}

/// What every scenario runs with.
pub struct ScenarioContext {
    pub config: ClientConfig,
    /// Anonymous client; scenarios derive authenticated copies from it.
    pub client: RpcClient,
}

/// Runs the selected scenarios in order, stopping at the first failure.
pub async fn run(scenario: Scenario, context: &ScenarioContext) -> AppResult<()> {
    for scenario in scenario.expand() {
        info!(%scenario, "scenario started");
        match scenario {
            Scenario::Auth => auth::run(context).await?,
            Scenario::Organization => organization::run(context).await?,
            Scenario::Waitlist => waitlist::run(context).await?,
            Scenario::Subscription => subscription::run(context).await?,
            Scenario::All => {}
        }
        info!(%scenario, "scenario passed");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_case_insensitively() -> AppResult<()> {
        assert_eq!("Waitlist".parse::<Scenario>()?, Scenario::Waitlist);
        assert_eq!(" all ".parse::<Scenario>()?, Scenario::All);
        assert!(matches!(
            "billing".parse::<Scenario>(),
            Err(AppError::Validation(_))
        ));
        Ok(())
    }

    #[test]
    fn all_expands_to_every_scenario_once() {
        let expanded = Scenario::All.expand();
        assert_eq!(expanded.len(), 4);
        assert!(!expanded.contains(&Scenario::All));
        assert_eq!(Scenario::Auth.expand(), vec![Scenario::Auth]);
    }
}
