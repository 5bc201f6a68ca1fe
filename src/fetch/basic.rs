use super::client::HttpClient;
use crate::errors::{FirmsWatchError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Default [`HttpClient`] backed by a `reqwest::Client` with explicit
/// timeouts. The FIRMS endpoint has no documented SLA, so a hung request
/// must not stall a refresh cycle indefinitely.
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client with static config");
        Self(client)
    }
}

impl Default for BasicClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> Result<reqwest::Response> {
        self.0
            .execute(req)
            .await
            .map_err(|e| FirmsWatchError::NetworkFailure(e.to_string()))
    }
}
