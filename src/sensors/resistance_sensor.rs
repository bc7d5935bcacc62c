use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::sensor::{Sensor, INVALID};

pub const SATURATED_DISPLAY: &str = "INF kΩ";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "ohms", rename_all = "snake_case")]
pub enum ResistanceState {
    /// No resistance reported since the session started.
    #[default]
    Invalid,
    /// Open circuit, the probe is out of the soil or unplugged.
    Saturated,
    Valid(f64),
}

impl ResistanceState {
    pub fn ohms(&self) -> Option<f64> {
        match self {
            ResistanceState::Valid(ohms) => Some(*ohms),
            _ => None,
        }
    }

    pub fn kilo_ohms(&self) -> Option<f64> {
        self.ohms().map(|ohms| ohms / 1000.0)
    }

    pub fn is_saturated(&self) -> bool {
        matches!(self, ResistanceState::Saturated)
    }

    pub fn display(&self) -> String {
        match self {
            ResistanceState::Invalid => INVALID.to_string(),
            ResistanceState::Saturated => SATURATED_DISPLAY.to_string(),
            ResistanceState::Valid(ohms) => format!("{:.1} kΩ", ohms / 1000.0),
        }
    }
}

impl Sensor for ResistanceState {
    fn add_json_value(&self, map: &mut Map<String, Value>) {
        let value = match self {
            ResistanceState::Invalid => Value::Null,
            ResistanceState::Saturated => json!("INF"),
            ResistanceState::Valid(ohms) => json!(ohms),
        };
        map.insert("resistance".to_string(), value);
    }

    fn pretty_print(&self) -> String {
        format!("Resistance: {}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ResistanceState::Invalid.display(), "-------");
        assert_eq!(ResistanceState::Saturated.display(), "INF kΩ");
        assert_eq!(ResistanceState::Valid(1523.0).display(), "1.5 kΩ");
        assert_eq!(ResistanceState::Valid(500.0).display(), "0.5 kΩ");
    }

    #[test]
    fn test_json_value() {
        let mut map = Map::new();
        ResistanceState::Saturated.add_json_value(&mut map);
        assert_eq!(map["resistance"], json!("INF"));

        ResistanceState::Valid(820.0).add_json_value(&mut map);
        assert_eq!(map["resistance"], json!(820.0));

        ResistanceState::Invalid.add_json_value(&mut map);
        assert!(map["resistance"].is_null());
    }
}
