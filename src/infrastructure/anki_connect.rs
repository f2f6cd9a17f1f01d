// src/infrastructure/anki_connect.rs
use crate::application::{AnkiTransport, HttpReply};
use crate::domain::BridgeError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// AnkiConnect over HTTP
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AnkiTransport for HttpTransport {
    #[instrument(level = "trace", skip(self, body), fields(url = %self.url, action = %body["action"]))]
    async fn post(&self, body: &Value) -> Result<HttpReply, BridgeError> {
        let response = self
            .client
            .post(&self.url)
            .json(body)
            .send()
            .await
            .map_err(|e| BridgeError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| BridgeError::Transport(e.to_string()))?;
        debug!(status, len = body.len(), "AnkiConnect replied");

        Ok(HttpReply { status, body })
    }
}
