// Consumption reading domain model
use serde::{Deserialize, Deserializer, Serialize};

/// One dated measurement as returned in `interval_reading`.
///
/// `date` is kept exactly as the API sent it: `YYYY-MM-DD` for daily
/// readings, `YYYY-MM-DD HH:MM:SS` for load curve points.
/// `value` is in watt-hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub date: String,
    #[serde(deserialize_with = "deserialize_watt_hours")]
    pub value: f64,
}

impl Reading {
    pub fn new(date: impl Into<String>, value: f64) -> Self {
        Self {
            date: date.into(),
            value,
        }
    }

    pub fn kwh(&self) -> f64 {
        self.value / 1000.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Text(String),
}

// The API sends numbers as strings; accept both
fn deserialize_watt_hours<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match RawValue::deserialize(deserializer)? {
        RawValue::Number(n) => n,
        RawValue::Text(s) => s.trim().parse::<f64>().map_err(|e| {
            serde::de::Error::custom(format!("invalid reading value '{}': {}", s, e))
        })?,
    };

    if !value.is_finite() {
        return Err(serde::de::Error::custom(format!(
            "non-finite reading value {}",
            value
        )));
    }
    Ok(value)
}
