//! Chain gateway over the node's REST API

use super::{ChainError, ChainGateway, Resource};
use crate::validate::Address;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ViewRequest<'a> {
    function: &'a str,
    type_arguments: Vec<String>,
    arguments: Vec<String>,
}

/// Gateway implementation backed by `POST /view` and
/// `GET /accounts/<address>/resources`
pub struct HttpChainGateway {
    client: Client,
    base_url: String,
    vault_address: String,
    timeout: Duration,
}

impl HttpChainGateway {
    pub fn new(
        rpc_url: &str,
        vault_address: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ChainError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChainError::not_configured(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: rpc_url.trim_end_matches('/').to_string(),
            vault_address: vault_address.into(),
            timeout,
        })
    }

    /// Every request runs under an explicit deadline on top of the client timeout,
    /// so a stalled body read still resolves to `Timeout`.
    async fn with_deadline<T>(
        &self,
        what: &str,
        fut: impl Future<Output = Result<T, ChainError>>,
    ) -> Result<T, ChainError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(ChainError::timeout(format!(
                "{what} timed out after {}s",
                self.timeout.as_secs_f32()
            ))),
        }
    }

    fn classify(e: &reqwest::Error) -> ChainError {
        if e.is_timeout() {
            ChainError::timeout(format!("Request timed out: {e}"))
        } else if e.is_decode() {
            ChainError::malformed(format!("Invalid response body: {e}"))
        } else {
            ChainError::network(format!("Request failed: {e}"))
        }
    }

    async fn error_body(response: reqwest::Response) -> ChainError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        ChainError::status(status.as_u16(), format!("Chain returned {status}: {text}"))
    }
}

#[async_trait]
impl ChainGateway for HttpChainGateway {
    fn vault_address(&self) -> &str {
        &self.vault_address
    }

    async fn view(
        &self,
        function: &str,
        arguments: Vec<String>,
        type_arguments: Vec<String>,
    ) -> Result<Vec<Value>, ChainError> {
        let url = format!("{}/view", self.base_url);
        let body = ViewRequest {
            function,
            type_arguments,
            arguments,
        };

        self.with_deadline(function, async {
            let response = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| Self::classify(&e))?;

            if !response.status().is_success() {
                return Err(Self::error_body(response).await);
            }

            let value: Value = response.json().await.map_err(|e| Self::classify(&e))?;
            match value {
                Value::Array(values) => Ok(values),
                other => Err(ChainError::malformed(format!(
                    "View result is not an array: {other}"
                ))),
            }
        })
        .await
    }

    async fn get_account_resources(&self, address: &Address) -> Result<Vec<Resource>, ChainError> {
        let url = format!("{}/accounts/{}/resources", self.base_url, address);

        self.with_deadline("account resources", async {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| Self::classify(&e))?;

            if response.status() == StatusCode::NOT_FOUND {
                return Err(ChainError::not_found(format!("Account {address} not found")));
            }
            if !response.status().is_success() {
                return Err(Self::error_body(response).await);
            }

            response
                .json::<Vec<Resource>>()
                .await
                .map_err(|e| Self::classify(&e))
        })
        .await
    }
}
