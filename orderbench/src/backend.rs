use crate::config::Endpoint;
use crate::error::BackendError;
use reqwest::Client;
use url::Url;

/// The externally-owned order stack as the harness sees it: somewhere to
/// submit orders, and a monotonically increasing counter of processed ones.
///
/// The counter is the only completion signal. The backend increments it
/// exactly once per processed order and never resets it while a benchmark
/// is running.
#[trait_variant::make(Send)]
pub trait Backend {
    /// Issue a single submission attempt for `order`.
    async fn submit(&self, endpoint: Endpoint, order: u64) -> Result<(), BackendError>;

    /// Read the processed-order counter.
    async fn order_count(&self) -> Result<u64, BackendError>;
}

/// [`Backend`] speaking HTTP to the real gateway/backend pair.
///
/// Submissions are `POST {gateway}/<endpoint>/{order}`; the counter is
/// `GET {backend}/ordercount`, returning the count as a plain decimal body.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    gateway: Url,
    backend: Url,
}

impl HttpBackend {
    /// Both base URLs should end with a trailing slash.
    pub fn new(gateway: Url, backend: Url) -> Self {
        Self {
            client: Client::new(),
            gateway,
            backend,
        }
    }
}

impl Backend for HttpBackend {
    async fn submit(&self, endpoint: Endpoint, order: u64) -> Result<(), BackendError> {
        let url = self.gateway.join(&format!("{}/{order}", endpoint.path()))?;
        let res = self.client.post(url).send().await?;
        if res.status().is_success() {
            Ok(())
        } else {
            Err(BackendError::Status(res.status()))
        }
    }

    async fn order_count(&self) -> Result<u64, BackendError> {
        let url = self.backend.join("ordercount")?;
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        body.trim()
            .parse()
            .map_err(|_| BackendError::InvalidCount(body))
    }
}
