//! HTTP client for the kitchen server API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use shared::ApiResponse;
use shared::order::{NewOrder, Order, OrderId, OrderStatus, PaymentMethod};

use crate::{ClientConfig, ClientError, ClientResult};

/// Operations the dashboard needs from the server
#[async_trait]
pub trait KitchenApi: Send + Sync {
    /// Full list of kitchen-relevant orders, newest first
    async fn kitchen_orders(&self) -> ClientResult<Vec<Order>>;

    async fn update_status(&self, id: OrderId, status: OrderStatus) -> ClientResult<Order>;

    async fn adjust_eta(&self, id: OrderId, delta_minutes: i64) -> ClientResult<Order>;
}

/// HTTP client for making network requests to the kitchen server
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    /// No overall timeout: the live stream stays open indefinitely
    stream_client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;
        let stream_client = Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            stream_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request without body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.client.post(self.url(path)).send().await?;
        Self::handle_response(response).await
    }

    /// Make a PATCH request with JSON body
    pub async fn patch<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self.client.patch(self.url(path)).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Unwrap the `{"code","message","data"}` envelope
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let bytes = response.bytes().await?;

        let envelope: ApiResponse<T> = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(e.into()),
            Err(_) => {
                return Err(ClientError::InvalidResponse(format!(
                    "{}: {}",
                    status,
                    String::from_utf8_lossy(&bytes)
                )));
            }
        };

        if !status.is_success() || !envelope.is_success() {
            return Err(ClientError::Api(envelope.into_error()));
        }

        envelope
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing response data".to_string()))
    }

    // ========== Orders API ==========

    pub async fn create_order(&self, input: &NewOrder) -> ClientResult<Order> {
        self.post("/api/orders", input).await
    }

    pub async fn fetch_order(&self, id: OrderId) -> ClientResult<Order> {
        self.get(&format!("/api/orders/{id}")).await
    }

    pub async fn mark_paid(&self, id: OrderId, method: PaymentMethod) -> ClientResult<Order> {
        self.post(
            &format!("/api/orders/{id}/pay"),
            &json!({ "payment_method": method }),
        )
        .await
    }

    pub async fn set_payment_method(&self, id: OrderId, method: PaymentMethod) -> ClientResult<Order> {
        self.patch(
            &format!("/api/orders/{id}/payment-method"),
            &json!({ "payment_method": method }),
        )
        .await
    }

    pub async fn cancel(&self, id: OrderId) -> ClientResult<Order> {
        self.post_empty(&format!("/api/orders/{id}/cancel")).await
    }

    // ========== Live Orders API ==========

    /// Open the live order event stream
    pub async fn open_live_stream(&self) -> ClientResult<reqwest::Response> {
        let response = self
            .stream_client
            .get(self.url("/api/live-orders"))
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::InvalidResponse(format!(
                "live stream rejected: {}",
                response.status()
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl KitchenApi for HttpClient {
    async fn kitchen_orders(&self) -> ClientResult<Vec<Order>> {
        self.get("/api/live-orders/list").await
    }

    async fn update_status(&self, id: OrderId, status: OrderStatus) -> ClientResult<Order> {
        self.patch(&format!("/api/orders/{id}"), &json!({ "status": status }))
            .await
    }

    async fn adjust_eta(&self, id: OrderId, delta_minutes: i64) -> ClientResult<Order> {
        self.post(
            &format!("/api/orders/{id}/adjust-eta"),
            &json!({ "delta_minutes": delta_minutes }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slashes() {
        let client = HttpClient::new(&ClientConfig::new("http://localhost:3000/")).unwrap();
        assert_eq!(client.url("/api/orders"), "http://localhost:3000/api/orders");
        assert_eq!(client.url("health"), "http://localhost:3000/health");
    }
}
