//! HTTP client for the LinkTap cloud API

use async_trait::async_trait;
use reqwest::Client;
use serde::de::{DeserializeOwned, IgnoredAny};
use shared::Inventory;

use crate::types::{
    has_envelope, parse_envelope, ApiRequest, WateringMode, WateringStatus, WateringStatusResponse,
    GET_ALL_DEVICES, GET_WATERING_STATUS,
};
use crate::{ClientConfig, ClientError, ClientResult, Credentials};

/// LinkTap API operations used by the bridge
///
/// Calls are never retried here; every failure is surfaced to the caller.
#[async_trait]
pub trait LinkTapApi: Send + Sync {
    /// `getAllDevices`: every gateway and taplinker of the account
    async fn list_devices(&self) -> ClientResult<Inventory>;

    /// `getWateringStatus`: `None` when the service reports no status
    async fn watering_status(&self, taplinker_id: &str) -> ClientResult<Option<WateringStatus>>;

    /// `activate*Mode` for one taplinker
    async fn send_command(
        &self,
        mode: WateringMode,
        gateway_id: &str,
        taplinker_id: &str,
    ) -> ClientResult<()>;
}

/// Network client for the LinkTap API
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    api_url: String,
    credentials: Credentials,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url(),
            credentials: config.credentials.clone(),
        })
    }

    /// API root every method name is appended to
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn request<'a>(
        &'a self,
        gateway_id: Option<&'a str>,
        taplinker_id: Option<&'a str>,
    ) -> ApiRequest<'a> {
        ApiRequest {
            username: &self.credentials.username,
            api_key: &self.credentials.api_key,
            gateway_id,
            taplinker_id,
        }
    }

    async fn post<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &ApiRequest<'_>,
    ) -> ClientResult<T> {
        let url = format!("{}{}", self.api_url, method);
        tracing::debug!(method, "LinkTap request");

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json, text/plain")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        // LinkTap reports rate limits and auth failures in the envelope too
        if !status.is_success() && !has_envelope(&text) {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_envelope(&text)
    }
}

#[async_trait]
impl LinkTapApi for HttpClient {
    async fn list_devices(&self) -> ClientResult<Inventory> {
        let inventory: Inventory = self.post(GET_ALL_DEVICES, &self.request(None, None)).await?;
        tracing::debug!(
            gateways = inventory.devices.len(),
            taplinkers = inventory.taplinker_count(),
            "Fetched LinkTap inventory"
        );
        Ok(inventory)
    }

    async fn watering_status(&self, taplinker_id: &str) -> ClientResult<Option<WateringStatus>> {
        let resp: WateringStatusResponse = self
            .post(GET_WATERING_STATUS, &self.request(None, Some(taplinker_id)))
            .await?;
        Ok(resp.status)
    }

    async fn send_command(
        &self,
        mode: WateringMode,
        gateway_id: &str,
        taplinker_id: &str,
    ) -> ClientResult<()> {
        let _: IgnoredAny = self
            .post(
                mode.method(),
                &self.request(Some(gateway_id), Some(taplinker_id)),
            )
            .await?;
        Ok(())
    }
}
