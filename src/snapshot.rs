//! Latest known probe state, as shown to the user and handed to persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::sensors::{
    resistance_sensor::ResistanceState,
    sensor::{Sensor, INVALID},
    temperature_sensor::TemperatureState,
};

pub const DATE_FORMAT: &str = "%b %-d, %Y, %I:%M %p %Z";

/// Moisture shown while the probe reports an open circuit.
pub const SATURATED_MOISTURE_DISPLAY: &str = "0%";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResistanceSentinel {
    None,
    Disconnected,
    Saturated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureSentinel {
    None,
    Disconnected,
}

/// `moisture_percent` is only ever set together with a valid resistance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorSnapshot {
    pub date_observed: Option<DateTime<Utc>>,
    pub resistance: ResistanceState,
    pub temperature: TemperatureState,
    pub moisture_percent: Option<f64>,
}

impl SensorSnapshot {
    pub fn raw_resistance_ohms(&self) -> Option<f64> {
        self.resistance.ohms()
    }

    pub fn temperature_fahrenheit(&self) -> Option<f64> {
        self.temperature.fahrenheit()
    }

    pub fn resistance_sentinel(&self) -> ResistanceSentinel {
        match self.resistance {
            ResistanceState::Saturated => ResistanceSentinel::Saturated,
            _ => ResistanceSentinel::None,
        }
    }

    pub fn temperature_sentinel(&self) -> TemperatureSentinel {
        match self.temperature {
            TemperatureState::Disconnected => TemperatureSentinel::Disconnected,
            _ => TemperatureSentinel::None,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn date_display(&self) -> String {
        match self.date_observed {
            Some(date) => date.format(DATE_FORMAT).to_string(),
            None => INVALID.to_string(),
        }
    }

    pub fn resistance_display(&self) -> String {
        self.resistance.display()
    }

    pub fn temperature_display(&self) -> String {
        self.temperature.display()
    }

    pub fn temperature_celsius_display(&self) -> String {
        self.temperature.display_celsius()
    }

    pub fn moisture_display(&self) -> String {
        if self.resistance.is_saturated() {
            return SATURATED_MOISTURE_DISPLAY.to_string();
        }

        match self.moisture_percent {
            Some(moisture) => format!("{:.1}%", moisture),
            None => INVALID.to_string(),
        }
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();

        map.insert(
            "date".to_string(),
            json!(self.date_observed.map(|date| date.to_rfc3339())),
        );
        self.resistance.add_json_value(&mut map);
        self.temperature.add_json_value(&mut map);
        let moisture = if self.resistance.is_saturated() {
            Some(0.0)
        } else {
            self.moisture_percent
        };
        map.insert("moisture".to_string(), json!(moisture));

        Value::Object(map)
    }

    pub fn pretty_print(&self) -> String {
        format!(
            "{} | {} | Moisture: {} | {}",
            self.resistance.pretty_print(),
            self.temperature.pretty_print(),
            self.moisture_display(),
            self.date_display()
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_empty_snapshot_displays_invalid() {
        let snapshot = SensorSnapshot::default();

        assert!(snapshot.is_empty());
        assert_eq!(snapshot.date_display(), "-------");
        assert_eq!(snapshot.resistance_display(), "-------");
        assert_eq!(snapshot.temperature_display(), "-------");
        assert_eq!(snapshot.moisture_display(), "-------");
        assert_eq!(snapshot.resistance_sentinel(), ResistanceSentinel::None);
        assert_eq!(snapshot.temperature_sentinel(), TemperatureSentinel::None);
    }

    #[test]
    fn test_saturated_forces_zero_moisture() {
        let snapshot = SensorSnapshot {
            resistance: ResistanceState::Saturated,
            temperature: TemperatureState::Valid(70.0),
            ..Default::default()
        };

        assert_eq!(snapshot.moisture_display(), "0%");
        assert_eq!(snapshot.resistance_display(), "INF kΩ");
        assert_eq!(snapshot.resistance_sentinel(), ResistanceSentinel::Saturated);
        assert_eq!(snapshot.to_json()["moisture"], json!(0.0));
        assert_eq!(snapshot.to_json()["resistance"], json!("INF"));
    }

    #[test]
    fn test_date_display() {
        let snapshot = SensorSnapshot {
            date_observed: Some(Utc.with_ymd_and_hms(2017, 3, 13, 14, 5, 0).unwrap()),
            ..Default::default()
        };

        assert_eq!(snapshot.date_display(), "Mar 13, 2017, 02:05 PM UTC");
    }

    #[test]
    fn test_to_json() {
        let snapshot = SensorSnapshot {
            date_observed: None,
            resistance: ResistanceState::Valid(1000.0),
            temperature: TemperatureState::Disconnected,
            moisture_percent: Some(99.173),
        };

        assert_eq!(
            snapshot.to_json(),
            json!({
                "date": null,
                "resistance": 1000.0,
                "temperature": "disconnected",
                "moisture": 99.173
            })
        );
        assert_eq!(
            snapshot.temperature_sentinel(),
            TemperatureSentinel::Disconnected
        );
    }
}
