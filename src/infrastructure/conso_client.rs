// Consumption API client - reqwest implementation of the repository
use crate::application::consumption_repository::{ConsumptionRepository, Endpoint, FetchError};
use crate::domain::account::AccountContext;
use crate::domain::consumption::DateRange;
use crate::domain::reading::Reading;
use crate::infrastructure::config::ApiSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, FROM, USER_AGENT};
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct ConsoApiClient {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
    max_logged_body_bytes: usize,
}

#[derive(Debug, Deserialize)]
struct ConsumptionResponse {
    interval_reading: Option<Vec<Reading>>,
}

impl ConsoApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            user_agent: settings.user_agent.clone(),
            max_logged_body_bytes: settings.max_logged_body_bytes,
        })
    }

    fn build_url(&self, endpoint: Endpoint, account: &AccountContext, range: DateRange) -> String {
        format!(
            "{}{}?prm={}&start={}&end={}",
            self.base_url,
            endpoint.path(),
            urlencoding::encode(account.point_id()),
            range.start_param(),
            range.end_param()
        )
    }

    fn parse_body(body: &str) -> Result<Vec<Reading>, FetchError> {
        let response: ConsumptionResponse =
            serde_json::from_str(body).map_err(|e| FetchError::MalformedResponse(e.to_string()))?;

        response.interval_reading.ok_or_else(|| {
            FetchError::MalformedResponse("missing field `interval_reading`".to_string())
        })
    }
}

#[async_trait]
impl ConsumptionRepository for ConsoApiClient {
    async fn fetch(
        &self,
        endpoint: Endpoint,
        account: &AccountContext,
        range: DateRange,
    ) -> Result<Vec<Reading>, FetchError> {
        let url = self.build_url(endpoint, account, range);
        tracing::debug!(
            %endpoint,
            start = %range.start,
            end = %range.end,
            "Querying consumption API"
        );

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", account.api_key()))
            .header(USER_AGENT, &self.user_agent)
            .header(FROM, account.contact_email())
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        tracing::debug!(
            %endpoint,
            status = status.as_u16(),
            "data={}",
            truncate_body(&body, self.max_logged_body_bytes)
        );

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_body(&body, self.max_logged_body_bytes).to_string(),
            });
        }

        let readings = Self::parse_body(&body)?;
        tracing::debug!(%endpoint, readings = readings.len(), "Fetched consumption readings");
        Ok(readings)
    }
}

/// Cut `body` to at most `max_bytes`, backing off to a char boundary
fn truncate_body(body: &str, max_bytes: usize) -> &str {
    if body.len() <= max_bytes {
        return body;
    }
    let mut end = max_bytes;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
