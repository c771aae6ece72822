// Application layer - Use cases and ports
pub mod consumption_repository;
pub mod sensor_store;
pub mod update_service;
