use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use super::batcher::{BatchReceipt, SinkError, TapSink};
use crate::auth::USER_ID_HEADER;

#[derive(Debug, Serialize)]
struct BatchRequest {
    count: i64,
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    date: NaiveDate,
    #[serde(rename = "tapCount")]
    tap_count: i64,
    processed: i64,
}

/// Sink that submits batches to a merit tap server over HTTP
pub struct HttpTapSink {
    client: Client,
    endpoint: Url,
    user_id: String,
}

impl HttpTapSink {
    /// `base_url` is the server root, e.g. `http://localhost:8080`.
    pub fn new(base_url: &str, user_id: impl Into<String>) -> Result<Self, SinkError> {
        let endpoint = Url::parse(base_url)
            .and_then(|url| url.join("/api/taps/batch"))
            .map_err(|err| SinkError::Transport(err.to_string()))?;

        Ok(Self {
            client: Client::new(),
            endpoint,
            user_id: user_id.into(),
        })
    }
}

#[async_trait]
impl TapSink for HttpTapSink {
    async fn submit(&self, count: i64) -> Result<BatchReceipt, SinkError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(USER_ID_HEADER, &self.user_id)
            .json(&BatchRequest { count })
            .send()
            .await
            .map_err(|err| SinkError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(SinkError::Rejected(format!(
                "status {}",
                response.status()
            )));
        }

        let body: BatchResponse = response
            .json()
            .await
            .map_err(|err| SinkError::Transport(err.to_string()))?;

        Ok(BatchReceipt {
            date: body.date,
            tap_count: body.tap_count,
            processed: body.processed,
        })
    }
}
