// Repository trait for consumption data access
use crate::domain::account::AccountContext;
use crate::domain::consumption::DateRange;
use crate::domain::reading::Reading;
use async_trait::async_trait;

/// Remote series the API exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    DailyConsumption,
    LoadCurve,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::DailyConsumption => "/api/daily_consumption",
            Endpoint::LoadCurve => "/api/consumption_load_curve",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::DailyConsumption => f.write_str("daily_consumption"),
            Endpoint::LoadCurve => f.write_str("consumption_load_curve"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

#[async_trait]
pub trait ConsumptionRepository: Send + Sync {
    /// Fetch the `interval_reading` list of one endpoint for an inclusive date range.
    /// An empty list is a successful fetch.
    async fn fetch(
        &self,
        endpoint: Endpoint,
        account: &AccountContext,
        range: DateRange,
    ) -> Result<Vec<Reading>, FetchError>;
}
