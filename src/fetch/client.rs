use async_trait::async_trait;
use reqwest::{Request, Response};

use crate::errors::Result;

/// Transport seam for the fetcher. The production implementation is
/// [`BasicClient`](super::BasicClient); tests substitute canned clients to
/// exercise cache and error paths without a network.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> Result<Response>;
}
