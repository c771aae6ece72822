// Consumption normalization - Wh readings to kWh sensor values
use super::reading::Reading;
use super::sensor::{SensorName, SensorUpdate, SensorValue};
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive calendar date range sent as `start`/`end` query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// First day of `today`'s month through `today`
    pub fn month_to_date(today: NaiveDate) -> Self {
        let start = today.with_day(1).unwrap_or(today);
        Self { start, end: today }
    }

    /// Yesterday through `today`
    pub fn since_yesterday(today: NaiveDate) -> Self {
        let start = today.checked_sub_days(Days::new(1)).unwrap_or(today);
        Self { start, end: today }
    }

    pub fn start_param(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_param(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum NormalizeError {
    #[error("no readings for the requested range")]
    NoData,
    #[error("invalid reading date '{0}'")]
    InvalidDate(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailySummary {
    pub last_kwh: f64,
    pub month_kwh: f64,
    pub timestamp: NaiveDateTime,
}

impl DailySummary {
    pub fn to_updates(&self) -> [SensorUpdate; 2] {
        [
            SensorUpdate {
                name: SensorName::LastEnergy,
                value: SensorValue::Energy(self.last_kwh),
                timestamp: Some(self.timestamp),
            },
            SensorUpdate {
                name: SensorName::MonthEnergy,
                value: SensorValue::Energy(self.month_kwh),
                timestamp: Some(self.timestamp),
            },
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourlyCurve {
    pub readings: Vec<Reading>,
    pub timestamp: NaiveDateTime,
}

impl HourlyCurve {
    pub fn to_update(&self) -> SensorUpdate {
        SensorUpdate {
            name: SensorName::HoursEnergy,
            value: SensorValue::Curve(self.readings.clone()),
            timestamp: Some(self.timestamp),
        }
    }
}

/// Summarize the month's daily readings.
///
/// The last reading gives the last-day value and the timestamp, the sum
/// of all readings the month-to-date value. Both are converted to kWh
/// without rounding.
pub fn normalize_daily(readings: &[Reading]) -> Result<DailySummary, NormalizeError> {
    let last = readings.last().ok_or(NormalizeError::NoData)?;

    let date = NaiveDate::parse_from_str(last.date.trim(), DATE_FORMAT)
        .map_err(|_| NormalizeError::InvalidDate(last.date.clone()))?;

    let month_wh: f64 = readings.iter().map(|r| r.value).sum();

    Ok(DailySummary {
        last_kwh: last.kwh(),
        month_kwh: month_wh / 1000.0,
        timestamp: date.and_time(chrono::NaiveTime::MIN),
    })
}

/// Wrap the load curve as-is, stamped with the time the fetch completed.
pub fn normalize_hourly(
    readings: Vec<Reading>,
    fetched_at: NaiveDateTime,
) -> Result<HourlyCurve, NormalizeError> {
    if readings.is_empty() {
        return Err(NormalizeError::NoData);
    }

    Ok(HourlyCurve {
        readings,
        timestamp: fetched_at,
    })
}
