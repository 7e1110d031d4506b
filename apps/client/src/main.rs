//! Launchpad scenario client.
//!
//! Drives scripted flows against a running API and exits non-zero on the
//! first unexpected failure.

#![forbid(unsafe_code)]

mod client_config;
mod rpc_client;
mod scenarios;

use launchpad_contract::app_contract;
use launchpad_core::{AppError, AppResult};
use tracing::{error, info};

use crate::client_config::ClientConfig;
use crate::rpc_client::RpcClient;
use crate::scenarios::ScenarioContext;

/// Longest error summary printed before exiting.
const ERROR_SUMMARY_MAX_CHARS: usize = 300;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    client_config::init_tracing();

    if let Err(failure) = run().await {
        error!(error = %summarize(&failure), "scenario failed");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let config = ClientConfig::load()?;
    let http_client = reqwest::Client::builder()
        .connect_timeout(config.timeout)
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;
    let client = RpcClient::new(http_client, &config.api_base_url, &app_contract()?)
        .with_request_timeout(config.timeout);

    info!(
        scenario = %config.scenario,
        api_base_url = %config.api_base_url,
        procedures = client.paths().len(),
        "launchpad-client started"
    );

    let scenario = config.scenario;
    scenarios::run(scenario, &ScenarioContext { config, client }).await
}

fn summarize(failure: &AppError) -> String {
    let text = failure.to_string();
    if text.chars().count() <= ERROR_SUMMARY_MAX_CHARS {
        return text;
    }

    let mut summary: String = text.chars().take(ERROR_SUMMARY_MAX_CHARS - 3).collect();
    summary.push_str("...");
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summaries_are_capped() {
        let long = AppError::Internal("x".repeat(1_000));
        let summary = summarize(&long);
        assert_eq!(summary.chars().count(), ERROR_SUMMARY_MAX_CHARS);
        assert!(summary.ends_with("..."));

        let short = AppError::Forbidden("nope".to_owned());
        assert_eq!(summarize(&short), short.to_string());
    }
}
