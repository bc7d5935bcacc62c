use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::moisture_sensor::fahrenheit_to_celsius;
use super::sensor::{Sensor, INVALID};

pub const DISCONNECTED_DISPLAY: &str = "Disconnected";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "fahrenheit", rename_all = "snake_case")]
pub enum TemperatureState {
    #[default]
    Invalid,
    /// The thermistor reported one of the firmware error codes.
    Disconnected,
    Valid(f64),
}

impl TemperatureState {
    pub fn fahrenheit(&self) -> Option<f64> {
        match self {
            TemperatureState::Valid(fahrenheit) => Some(*fahrenheit),
            _ => None,
        }
    }

    pub fn celsius(&self) -> Option<f64> {
        self.fahrenheit().map(fahrenheit_to_celsius)
    }

    pub fn is_disconnected(&self) -> bool {
        matches!(self, TemperatureState::Disconnected)
    }

    pub fn display(&self) -> String {
        match self {
            TemperatureState::Invalid => INVALID.to_string(),
            TemperatureState::Disconnected => DISCONNECTED_DISPLAY.to_string(),
            TemperatureState::Valid(fahrenheit) => format!("{:.1}℉", fahrenheit),
        }
    }

    pub fn display_celsius(&self) -> String {
        match self.celsius() {
            Some(celsius) => format!("{:.1}℃", celsius),
            None => INVALID.to_string(),
        }
    }
}

impl Sensor for TemperatureState {
    fn add_json_value(&self, map: &mut Map<String, Value>) {
        let value = match self {
            TemperatureState::Invalid => Value::Null,
            TemperatureState::Disconnected => json!("disconnected"),
            TemperatureState::Valid(fahrenheit) => json!(fahrenheit),
        };
        map.insert("temperature".to_string(), value);
    }

    fn pretty_print(&self) -> String {
        format!(
            "Temperature: {} ({})",
            self.display(),
            self.display_celsius()
        )
    }
}
