// HTTP request handlers
use crate::application::update_service::CycleOutcome;
use crate::domain::sensor::SensorName;
use crate::presentation::app_state::AppState;
use crate::presentation::entity_mapper::{record_to_entity, records_to_entities, EntityView};
use crate::presentation::event_stream::stream_from_receiver;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// All three sensors in fixed order
pub async fn list_sensors(State(state): State<Arc<AppState>>) -> Json<Vec<EntityView>> {
    Json(records_to_entities(state.store.get_all().await))
}

pub async fn get_sensor(
    Path(unique_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<EntityView>, StatusCode> {
    let name = SensorName::parse(&unique_id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(record_to_entity(state.store.get(name).await)))
}

/// Run one update cycle now and report how it went
pub async fn trigger_update(State(state): State<Arc<AppState>>) -> Json<CycleOutcome> {
    tracing::info!("Manual update requested");
    Json(state.update_service.run_cycle().await)
}

/// Server-sent `linky_update` events, one per store change
pub async fn stream_events(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    stream_from_receiver(state.update_service.subscribe())
}

#[cfg(test)]
mod tests {
    use crate::application::consumption_repository::{ConsumptionRepository, Endpoint, FetchError};
    use crate::application::sensor_store::SensorStore;
    use crate::application::update_service::{FailurePolicy, UpdateService};
    use crate::domain::account::AccountContext;
    use crate::domain::consumption::DateRange;
    use crate::domain::reading::Reading;
    use crate::presentation::app_state::AppState;
    use crate::presentation::router;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Arc;

    struct FixtureRepository;

    #[async_trait]
    impl ConsumptionRepository for FixtureRepository {
        async fn fetch(
            &self,
            endpoint: Endpoint,
            _account: &AccountContext,
            _range: DateRange,
        ) -> Result<Vec<Reading>, FetchError> {
            Ok(match endpoint {
                Endpoint::DailyConsumption => vec![
                    Reading::new("2024-03-01", 1000.0),
                    Reading::new("2024-03-02", 2000.0),
                ],
                Endpoint::LoadCurve => vec![Reading::new("2024-03-01 00:30:00", 310.0)],
            })
        }
    }

    async fn spawn_app() -> (String, Arc<UpdateService>) {
        let account = Arc::new(AccountContext::new("key".to_string(), "0123".to_string(), None));
        let service = Arc::new(UpdateService::new(
            Arc::new(FixtureRepository),
            account,
            Arc::new(SensorStore::new()),
            FailurePolicy::Retain,
        ));
        let app = router(Arc::new(AppState::new(service.clone())));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), service)
    }

    #[tokio::test]
    async fn test_health_check() {
        let (base, _) = spawn_app().await;
        let body = reqwest::get(format!("{}/healthz", base)).await.unwrap().text().await.unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_list_sensors_before_and_after_update() {
        let (base, _) = spawn_app().await;
        let client = reqwest::Client::new();

        let sensors: Vec<Value> = client
            .get(format!("{}/sensors", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(sensors.len(), 3);
        assert_eq!(sensors[0]["unique_id"], "Linky energy");
        assert_eq!(sensors[0]["state"], 0.0);
        assert_eq!(sensors[2]["attribution"], Value::Array(vec![]));

        let outcome: Value = client
            .post(format!("{}/update", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(outcome["outcome"], "applied");

        let sensors: Vec<Value> = client
            .get(format!("{}/sensors", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(sensors[0]["state"], 2.0);
        assert_eq!(sensors[1]["state"], 3.0);
        assert_eq!(sensors[1]["last_updated"], "2024-03-02T00:00:00");
        assert_eq!(sensors[2]["state"], 1);
        assert_eq!(sensors[2]["attribution"][0]["value"], 310.0);
    }

    #[tokio::test]
    async fn test_get_sensor_by_unique_id() {
        let (base, _) = spawn_app().await;

        let response = reqwest::get(format!("{}/sensors/Linky%20energy%20month", base))
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let sensor: Value = response.json().await.unwrap();
        assert_eq!(sensor["name"], "Linky energy month");
        assert_eq!(sensor["unit_of_measurement"], "kWh");

        let response = reqwest::get(format!("{}/sensors/unknown", base)).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_events_stream_forwards_notifications() {
        let (base, service) = spawn_app().await;

        let mut response = reqwest::get(format!("{}/events", base)).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        service.run_cycle().await;

        let chunk = tokio::time::timeout(std::time::Duration::from_secs(5), response.chunk())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let text = String::from_utf8_lossy(&chunk);
        assert!(text.contains("event: linky_update"));
    }
}
