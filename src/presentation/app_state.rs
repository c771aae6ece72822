// Application state for HTTP handlers
use crate::application::sensor_store::SensorStore;
use crate::application::update_service::UpdateService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub update_service: Arc<UpdateService>,
    pub store: Arc<SensorStore>,
}

impl AppState {
    pub fn new(update_service: Arc<UpdateService>) -> Self {
        let store = update_service.store().clone();
        Self {
            update_service,
            store,
        }
    }
}
