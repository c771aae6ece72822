// Mapper to convert sensor records to entity views
use crate::domain::reading::Reading;
use crate::domain::sensor::{SensorName, SensorRecord, SensorValue};
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

/// Sensor as seen by dashboards and the load curve card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityView {
    pub unique_id: &'static str,
    pub name: &'static str,
    pub state: Value,
    pub unit_of_measurement: Option<String>,
    pub device_class: Option<&'static str>,
    pub state_class: Option<&'static str>,
    pub last_updated: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<Vec<Reading>>,
}

pub fn record_to_entity(record: SensorRecord) -> EntityView {
    let name = record.name.as_str();

    // The curve sensor carries its readings as an attribute, its state is the point count
    let (state, attribution) = match record.value {
        SensorValue::Energy(kwh) => (Value::from(kwh), None),
        SensorValue::Curve(readings) => (Value::from(readings.len()), Some(readings)),
    };

    let (device_class, state_class) = match record.name {
        SensorName::HoursEnergy => (None, None),
        _ => (Some("energy"), Some("total_increasing")),
    };

    EntityView {
        unique_id: name,
        name,
        state,
        unit_of_measurement: record.unit,
        device_class,
        state_class,
        last_updated: record.timestamp,
        attribution,
    }
}

pub fn records_to_entities(records: Vec<SensorRecord>) -> Vec<EntityView> {
    records.into_iter().map(record_to_entity).collect()
}
