use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::sensors::moisture_sensor::CalibrationConstants;

pub const KEY_NAME: &str = "NAME";
pub const KEY_DEVICE: &str = "DEVICE";
pub const KEY_RECORDS: &str = "RECORDS";
pub const KEY_AMBIENT: &str = "AMBIENT";

pub const KEY_CIRCUMFERENCE: &str = "CIRC";
pub const KEY_LENGTH: &str = "LENGTH";
pub const KEY_EXPOSED_LENGTH: &str = "EXPOSED";
pub const KEY_ALPHA: &str = "ALPHA";
pub const KEY_BETA: &str = "BETA";
pub const KEY_COEFFICIENT: &str = "COEFF";
pub const KEY_EXPONENT: &str = "EXPONENT";

pub const DEFAULT_DEVICE: &str = "JPLSoil";
pub const DEFAULT_RECORDS: &str = "soil_records.jsonl";

/// Key/value settings persisted as a flat JSON object.
pub struct FileConfiguration {
    path: PathBuf,
    values: Map<String, Value>,
}

impl FileConfiguration {
    /// Loads `path`, a missing file gives an empty configuration.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();

        let values = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => Map::new(),
            Ok(content) => serde_json::from_str::<Map<String, Value>>(&content).map_err(
                |source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                },
            )?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No configuration at {}, using defaults", path.display());
                Map::new()
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(&self.values).map_err(ConfigError::Serialize)?;

        fs::write(&self.path, content).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })
    }

    pub fn get_name(&self) -> String {
        self.read_string(KEY_NAME, "")
    }

    pub fn set_name(&mut self, name: &str) {
        self.store_string(KEY_NAME, name, 32)
    }

    pub fn get_device(&self) -> String {
        self.read_string(KEY_DEVICE, DEFAULT_DEVICE)
    }

    pub fn get_records_path(&self) -> PathBuf {
        PathBuf::from(self.read_string(KEY_RECORDS, DEFAULT_RECORDS))
    }

    pub fn get_ambient_temperature(&self) -> Option<f64> {
        self.read_optional_float(KEY_AMBIENT)
    }

    pub fn calibration_constants(&self) -> CalibrationConstants {
        let defaults = CalibrationConstants::default();

        CalibrationConstants {
            circumference: self.read_float(KEY_CIRCUMFERENCE, defaults.circumference),
            length: self.read_float(KEY_LENGTH, defaults.length),
            exposed_length: self.read_float(KEY_EXPOSED_LENGTH, defaults.exposed_length),
            alpha: self.read_float(KEY_ALPHA, defaults.alpha),
            beta: self.read_float(KEY_BETA, defaults.beta),
            coefficient: self.read_float(KEY_COEFFICIENT, defaults.coefficient),
            exponent: self.read_float(KEY_EXPONENT, defaults.exponent),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    pub fn store_string(&mut self, key: &str, value: &str, max_size: usize) {
        self.values.insert(
            key.to_string(),
            Value::String(Self::trunc_string(value, max_size).to_string()),
        );
    }

    pub fn read_string(&self, key: &str, default: &str) -> String {
        match self.values.get(key) {
            Some(Value::String(value)) if !value.is_empty() => value.clone(),
            Some(Value::String(_)) | None => default.to_string(),
            Some(other) => {
                warn!("Config {} is not a string ({}), using default", key, other);
                default.to_string()
            }
        }
    }

    pub fn store_float(&mut self, key: &str, value: f64) -> Result<(), ConfigError> {
        let number = serde_json::Number::from_f64(value).ok_or(ConfigError::InvalidValue {
            key: key.to_string(),
            expected: "finite number",
        })?;

        self.values.insert(key.to_string(), Value::Number(number));
        Ok(())
    }

    pub fn read_float(&self, key: &str, default: f64) -> f64 {
        self.read_optional_float(key).unwrap_or(default)
    }

    pub fn read_optional_float(&self, key: &str) -> Option<f64> {
        match self.values.get(key) {
            Some(Value::Number(number)) => number.as_f64(),
            None | Some(Value::Null) => None,
            Some(other) => {
                warn!("Config {} is not a number ({}), ignoring it", key, other);
                None
            }
        }
    }

    fn trunc_string(s: &str, max: usize) -> &str {
        match s.char_indices().nth(max) {
            None => s,
            Some((idx, _)) => &s[..idx],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileConfiguration::open(dir.path().join("config.json")).unwrap();

        assert_eq!(config.get_name(), "");
        assert_eq!(config.get_device(), "JPLSoil");
        assert_eq!(config.get_records_path(), PathBuf::from("soil_records.jsonl"));
        assert_eq!(config.get_ambient_temperature(), None);
        assert_eq!(
            config.calibration_constants(),
            CalibrationConstants::JPL_SOIL_PROBE
        );
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = FileConfiguration::open(&path).unwrap();
        config.set_name("A site name that is way longer than thirty-two chars");
        config.store_float(KEY_ALPHA, 0.0015).unwrap();
        config.store_float(KEY_AMBIENT, 71.5).unwrap();
        config.save().unwrap();

        let config = FileConfiguration::open(&path).unwrap();
        assert_eq!(config.get_name(), "A site name that is way longer t");
        assert_eq!(config.calibration_constants().alpha, 0.0015);
        assert_eq!(config.calibration_constants().beta, 0.1562);
        assert_eq!(config.get_ambient_temperature(), Some(71.5));
    }

    #[test]
    fn test_rejects_non_finite_float() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = FileConfiguration::open(dir.path().join("c.json")).unwrap();

        assert!(matches!(
            config.store_float(KEY_BETA, f64::NAN),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(!config.contains(KEY_BETA));
    }

    #[test]
    fn test_wrong_types_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"ALPHA": "high", "NAME": 12}"#).unwrap();

        let config = FileConfiguration::open(&path).unwrap();
        assert_eq!(config.calibration_constants().alpha, 0.0012);
        assert_eq!(config.get_name(), "");
    }

    #[test]
    fn test_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "[1, 2]").unwrap();

        assert!(matches!(
            FileConfiguration::open(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
