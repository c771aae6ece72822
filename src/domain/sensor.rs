// Sensor domain models
use super::reading::Reading;
use chrono::NaiveDateTime;
use serde::Serialize;

pub const ENERGY_UNIT: &str = "kWh";

/// The three sensors the integration exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SensorName {
    #[serde(rename = "Linky energy")]
    LastEnergy,
    #[serde(rename = "Linky energy month")]
    MonthEnergy,
    #[serde(rename = "Linky energy hours")]
    HoursEnergy,
}

impl SensorName {
    /// Fixed order of records in the store
    pub const ALL: [SensorName; 3] = [
        SensorName::LastEnergy,
        SensorName::MonthEnergy,
        SensorName::HoursEnergy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorName::LastEnergy => "Linky energy",
            SensorName::MonthEnergy => "Linky energy month",
            SensorName::HoursEnergy => "Linky energy hours",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }

    pub fn index(&self) -> usize {
        match self {
            SensorName::LastEnergy => 0,
            SensorName::MonthEnergy => 1,
            SensorName::HoursEnergy => 2,
        }
    }

    pub fn unit(&self) -> Option<&'static str> {
        match self {
            SensorName::HoursEnergy => None,
            _ => Some(ENERGY_UNIT),
        }
    }

    pub fn is_curve(&self) -> bool {
        matches!(self, SensorName::HoursEnergy)
    }
}

impl std::fmt::Display for SensorName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Energy(f64),
    Curve(Vec<Reading>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorRecord {
    pub name: SensorName,
    pub unit: Option<String>,
    pub value: SensorValue,
    pub timestamp: Option<NaiveDateTime>,
}

impl SensorRecord {
    /// Record as it exists before the first successful update
    pub fn initial(name: SensorName) -> Self {
        let value = if name.is_curve() {
            SensorValue::Curve(Vec::new())
        } else {
            SensorValue::Energy(0.0)
        };

        Self {
            name,
            unit: name.unit().map(str::to_string),
            value,
            timestamp: None,
        }
    }
}

/// New value for one record, produced by an update cycle
#[derive(Debug, Clone, PartialEq)]
pub struct SensorUpdate {
    pub name: SensorName,
    pub value: SensorValue,
    pub timestamp: Option<NaiveDateTime>,
}
