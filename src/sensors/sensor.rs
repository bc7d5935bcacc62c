use serde_json::{Map, Value};

/// Display placeholder for a value the probe has not reported yet.
pub const INVALID: &str = "-------";

pub trait Sensor {
    fn add_json_value(&self, map: &mut Map<String, Value>);
    fn pretty_print(&self) -> String;
}
