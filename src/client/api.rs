//! HTTP client for the homework statuses API

use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, instrument, warn};

use super::{
    config::ClientConfig,
    error::{ClientError, Result},
};
use crate::domain::{ApiResponse, Cursor};

/// Pure HTTP client for the homework statuses endpoint
#[derive(Debug)]
pub struct HomeworkApi {
    client: Client,
    config: ClientConfig,
}

impl HomeworkApi {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.request.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ClientError::Http)?;

        Ok(Self { client, config })
    }

    /// Fetch homework statuses updated since `cursor`
    #[instrument(skip(self), fields(from_date = %cursor))]
    pub async fn fetch(&self, cursor: Cursor) -> Result<ApiResponse> {
        let response = self
            .authenticated_request()
            .query(&[("from_date", cursor.value())])
            .send()
            .await
            .map_err(ClientError::Request)?;

        self.handle_response(response).await
    }

    /// Create authenticated request builder
    fn authenticated_request(&self) -> RequestBuilder {
        self.client
            .get(self.config.endpoint.as_str())
            .header("Authorization", format!("OAuth {}", self.config.api_token))
    }

    /// Check the status and decode the JSON body
    async fn handle_response(&self, response: Response) -> Result<ApiResponse> {
        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Homework API rejected the request");
            return Err(ClientError::Response { status });
        }

        let body = response.text().await.map_err(ClientError::Request)?;
        let value: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            debug!(error = %e, body_len = body.len(), "Failed to decode homework API response");
            ClientError::Decode(e)
        })?;

        debug!("Homework API response decoded");
        Ok(ApiResponse::from(value))
    }
}
