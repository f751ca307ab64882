use std::sync::LazyLock;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::{
    Fetched, WyreOrder, WyreTransfer, apple_pay::ApplePayOrderPayload, config::WYRE_CONFIG,
    config::WyreConfig,
};

// Global client for the wyre api
pub static WYRE_CLIENT: LazyLock<WyreClient> =
    LazyLock::new(|| WyreClient::new(WYRE_CONFIG.clone()));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WyreClientError {
    #[error("invalid wyre url: {0}")]
    Url(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status code {0}")]
    Status(u16),

    #[error("unable to parse response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for WyreClientError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error.to_string())
    }
}

impl From<url::ParseError> for WyreClientError {
    fn from(error: url::ParseError) -> Self {
        Self::Url(error.to_string())
    }
}

/// Status and body of a response, whatever the status was
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WyreResponse {
    pub status: u16,
    pub body: String,
}

/// Calls against the Wyre api, `network` picks the production or test environment
#[async_trait]
pub trait WyreApi: Send + Sync + std::fmt::Debug {
    /// `None` when the response body is empty
    async fn order_status(
        &self,
        network: &str,
        order_id: &str,
    ) -> Result<Option<Fetched<WyreOrder>>, WyreClientError>;

    async fn transfer_status(
        &self,
        network: &str,
        transfer_id: &str,
    ) -> Result<Option<Fetched<WyreTransfer>>, WyreClientError>;

    /// Resolves for any response, success is decided by the caller from the status
    async fn create_apple_pay_order(
        &self,
        network: &str,
        payload: &ApplePayOrderPayload,
    ) -> Result<WyreResponse, WyreClientError>;
}

#[derive(Debug, Clone)]
pub struct WyreClient {
    config: WyreConfig,
    client: reqwest::Client,
}

impl WyreClient {
    pub fn new(config: WyreConfig) -> Self {
        Self { config, client: reqwest::Client::new() }
    }

    pub fn config(&self) -> &WyreConfig {
        &self.config
    }

    fn url(&self, network: &str, path: &str) -> Result<Url, WyreClientError> {
        let base = Url::parse(self.config.api_endpoint_for(network))?;
        Ok(base.join(path)?)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<Option<Fetched<T>>, WyreClientError> {
        debug!("wyre GET {url}");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WyreClientError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_body(body)
    }
}

#[async_trait]
impl WyreApi for WyreClient {
    async fn order_status(
        &self,
        network: &str,
        order_id: &str,
    ) -> Result<Option<Fetched<WyreOrder>>, WyreClientError> {
        let url = self.url(network, &format!("v3/orders/{order_id}"))?;
        self.get(url).await
    }

    async fn transfer_status(
        &self,
        network: &str,
        transfer_id: &str,
    ) -> Result<Option<Fetched<WyreTransfer>>, WyreClientError> {
        let url = self.url(network, &format!("v2/transfer/{transfer_id}/track"))?;
        self.get(url).await
    }

    async fn create_apple_pay_order(
        &self,
        network: &str,
        payload: &ApplePayOrderPayload,
    ) -> Result<WyreResponse, WyreClientError> {
        let url = self.url(network, "v3/apple-pay/process/partner")?;
        debug!("wyre POST {url}");

        let response = self
            .client
            .post(url)
            .timeout(self.config.checkout_timeout)
            .json(payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(WyreResponse { status, body })
    }
}

/// Empty and `null` bodies are reported as `None`
fn parse_body<T: DeserializeOwned>(body: String) -> Result<Option<Fetched<T>>, WyreClientError> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }

    let value =
        serde_json::from_str(trimmed).map_err(|error| WyreClientError::Parse(error.to_string()))?;

    Ok(Some(Fetched { value, raw: body }))
}
