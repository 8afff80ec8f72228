use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

/// Connection setup is bounded separately from the whole request
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates an HTTP client with an explicit request timeout.
    ///
    /// No retry middleware: a failed call surfaces to the caller, which
    /// decides whether to use a fallback.
    pub fn create_client(timeout: Duration) -> Result<Client> {
        Client::builder()
            .pool_max_idle_per_host(5)
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .user_agent(concat!("water-futures/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")
    }
}
