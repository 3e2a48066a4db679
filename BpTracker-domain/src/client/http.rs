use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::{debug, instrument};

use super::source::{ClientError, ReadingsSource};
use crate::entities::{CreateReadingRequest, Reading};
use crate::range::ResolvedRange;

/// Readings source backed by the BP Tracker HTTP API
#[derive(Debug, Clone)]
pub struct HttpReadingsClient {
    base_url: String,
    http: Client,
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl HttpReadingsClient {
    /// Create a client for the server at `base_url`, e.g. `http://localhost:3000`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a client sharing an existing connection pool
    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn readings_url(&self) -> String {
        format!("{}/api/bp-readings", self.base_url)
    }
}

/// Turn non-success responses into errors, preferring the server's message
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|json| json.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or(body);

    Err(ClientError::Status { status: status.as_u16(), message })
}

#[async_trait]
impl ReadingsSource for HttpReadingsClient {
    #[instrument(skip(self))]
    async fn fetch_readings(&self, range: &ResolvedRange) -> Result<Vec<Reading>, ClientError> {
        if !range.is_ready() {
            debug!("Range not ready, skipping fetch");
            return Ok(Vec::new());
        }

        let response = self.http
            .get(self.readings_url())
            .query(&[("startDate", &range.start_date), ("endDate", &range.end_date)])
            .send()
            .await?;

        let readings = check_status(response).await?.json::<Vec<Reading>>().await?;
        debug!("Fetched {} readings", readings.len());
        Ok(readings)
    }

    #[instrument(skip(self))]
    async fn create_reading(&self, request: &CreateReadingRequest) -> Result<Reading, ClientError> {
        let response = self.http
            .post(self.readings_url())
            .json(request)
            .send()
            .await?;

        Ok(check_status(response).await?.json::<Reading>().await?)
    }
}
