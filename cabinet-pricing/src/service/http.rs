//! `CabinetApi` over HTTP.

use reqwest::{Client, Method, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument};

use super::{
    api::CabinetApi,
    models::{
        DeviceAddRequest, DeviceReduceRequest, MutationResult, PurchaseRequest,
        ServerUpdateRequest, ServersResponse, SubscriptionResponse, SwitchRequest,
        TariffsResponse, TrafficPackagesResponse, TrafficPurchaseRequest, decode_failure,
    },
};
use crate::{
    catalog::{DevicePriceQuote, ServerOption, Subscription, Tariff, TariffId, TrafficPackage},
    config::ApiConfig,
    error::{PricingError, Result},
    pricing::PromoSnapshot,
    switch::SwitchPreview,
};

/// Cabinet backend client authenticated with a bearer token.
///
/// # Examples
///
/// ```rust,no_run
/// use cabinet_pricing::service::{CabinetApi, HttpCabinetClient};
///
/// # async fn example() -> cabinet_pricing::error::Result<()> {
/// let client = HttpCabinetClient::new("https://cabinet.example.com/api", "token")?;
/// let tariffs = client.tariffs().await?;
/// println!("{} tariffs", tariffs.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpCabinetClient {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpCabinetClient {
    /// Creates a client with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Config`] if `base_url` is invalid, or
    /// [`PricingError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        let config = ApiConfig { base_url: base_url.to_owned(), ..ApiConfig::default() };
        Self::with_token(&config, token)
    }

    /// Creates a client from configuration, reading the token from
    /// `config.token_env`.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Config`] if the configuration is invalid or the
    /// token variable is unset.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let token = std::env::var(&config.token_env).map_err(|_| {
            PricingError::Config(format!("environment variable {} is not set", config.token_env))
        })?;
        Self::with_token(config, token)
    }

    /// Creates a client from configuration and an explicit token.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Config`] if the configuration is invalid, or
    /// [`PricingError::Http`] if the HTTP client cannot be built.
    pub fn with_token(config: &ApiConfig, token: impl Into<String>) -> Result<Self> {
        config.validate()?;
        let base_url = config.parsed_base_url()?;

        let client = Client::builder()
            .pool_max_idle_per_host(10)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(PricingError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_owned(),
            token: token.into(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(&self.token)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(self.request(Method::GET, path)).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let failure = decode_failure(status.as_u16(), &body);
            debug!(status = status.as_u16(), %failure, "cabinet request rejected");
            return Err(PricingError::Service(failure));
        }

        serde_json::from_slice(&body).map_err(|e| PricingError::Decode(e.to_string()))
    }
}

impl CabinetApi for HttpCabinetClient {
    #[instrument(skip(self))]
    async fn tariffs(&self) -> Result<Vec<Tariff>> {
        let response: TariffsResponse = self.get_json("/subscription/tariffs").await?;
        Ok(response.tariffs)
    }

    #[instrument(skip(self))]
    async fn promo_discount(&self) -> Result<PromoSnapshot> {
        self.get_json("/promo/discount").await
    }

    #[instrument(skip(self))]
    async fn subscription(&self) -> Result<Option<Subscription>> {
        let response: SubscriptionResponse = self.get_json("/subscription").await?;
        Ok(response.subscription)
    }

    #[instrument(skip(self), fields(tariff_id = %target))]
    async fn preview_switch(&self, target: TariffId) -> Result<SwitchPreview> {
        let body = serde_json::json!({ "tariff_id": target });
        self.post_json("/subscription/tariff/switch/preview", &body).await
    }

    #[instrument(skip(self, request), fields(tariff_id = %request.tariff_id, key = %request.idempotency_key))]
    async fn switch_tariff<'a>(&'a self, request: &'a SwitchRequest) -> Result<MutationResult> {
        self.post_json("/subscription/tariff/switch", request).await
    }

    #[instrument(
        skip(self, request),
        fields(tariff_id = %request.tariff_id, period_days = request.period_days, key = %request.idempotency_key)
    )]
    async fn purchase<'a>(&'a self, request: &'a PurchaseRequest) -> Result<MutationResult> {
        self.post_json("/subscription/purchase", request).await
    }

    #[instrument(skip(self))]
    async fn traffic_packages(&self) -> Result<Vec<TrafficPackage>> {
        let response: TrafficPackagesResponse =
            self.get_json("/subscription/traffic-packages").await?;
        Ok(response.packages)
    }

    #[instrument(skip(self, request), fields(gb = request.gb, key = %request.idempotency_key))]
    async fn purchase_traffic<'a>(
        &'a self,
        request: &'a TrafficPurchaseRequest,
    ) -> Result<MutationResult> {
        self.post_json("/subscription/traffic", request).await
    }

    #[instrument(skip(self))]
    async fn device_price(&self) -> Result<DevicePriceQuote> {
        self.get_json("/subscription/devices/price").await
    }

    #[instrument(skip(self, request), fields(devices = request.devices, key = %request.idempotency_key))]
    async fn add_devices<'a>(&'a self, request: &'a DeviceAddRequest) -> Result<MutationResult> {
        self.post_json("/subscription/devices", request).await
    }

    #[instrument(
        skip(self, request),
        fields(new_device_limit = request.new_device_limit, key = %request.idempotency_key)
    )]
    async fn reduce_devices<'a>(
        &'a self,
        request: &'a DeviceReduceRequest,
    ) -> Result<MutationResult> {
        self.post_json("/subscription/devices/reduce", request).await
    }

    #[instrument(skip(self))]
    async fn server_options(&self) -> Result<Vec<ServerOption>> {
        let response: ServersResponse = self.get_json("/subscription/servers").await?;
        Ok(response.servers)
    }

    #[instrument(skip(self, request), fields(servers = request.servers.len(), key = %request.idempotency_key))]
    async fn update_servers<'a>(
        &'a self,
        request: &'a ServerUpdateRequest,
    ) -> Result<MutationResult> {
        self.post_json("/subscription/servers", request).await
    }
}
