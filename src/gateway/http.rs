use crate::config::TrackerConfig;
use crate::gateway::{GatewayError, OrderGateway};
use crate::model::{OrderId, OrderRequest, OrderView};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, instrument};

/// [`OrderGateway`] speaking JSON over HTTP.
///
/// - `POST <endpoint>` with the [`OrderRequest`] body submits an order.
/// - `GET <endpoint>/<id>` reads its status.
///
/// Both expect an [`OrderView`] body; any non-2xx status becomes
/// [`GatewayError::Status`].
#[derive(Clone)]
pub struct HttpOrderGateway {
    client: Client,
    endpoint: String,
    submit_timeout: Duration,
    request_timeout: Duration,
}

impl HttpOrderGateway {
    /// Creates a gateway for the endpoint and timeouts in `config`.
    pub fn new(config: &TrackerConfig) -> Result<Self, GatewayError> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, config))
    }

    /// Same as [`HttpOrderGateway::new`] but reuses an existing `reqwest` client.
    pub fn with_client(client: Client, config: &TrackerConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            submit_timeout: config.submit_timeout,
            request_timeout: config.effective_request_timeout(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn order_url(&self, id: OrderId) -> String {
        format!("{}/{}", self.endpoint, id)
    }

    async fn read_view(response: Response) -> Result<OrderView, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn map_send_error(e: reqwest::Error, timeout: Duration) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout(timeout)
        } else {
            e.into()
        }
    }
}

#[async_trait]
impl OrderGateway for HttpOrderGateway {
    #[instrument(skip(self, request), fields(endpoint = %self.endpoint))]
    async fn submit_order(&self, request: &OrderRequest) -> Result<OrderView, GatewayError> {
        debug!(?request, "Sending order");
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.submit_timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| Self::map_send_error(e, self.submit_timeout))?;

        Self::read_view(response).await
    }

    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch_order_status(&self, id: OrderId) -> Result<OrderView, GatewayError> {
        debug!("Fetching order status");
        let response = self
            .client
            .get(self.order_url(id))
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| Self::map_send_error(e, self.request_timeout))?;

        Self::read_view(response).await
    }
}
