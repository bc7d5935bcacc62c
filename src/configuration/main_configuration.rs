use super::file_configuration::*;
use crate::error::ConfigError;
use crate::sensors::moisture_sensor::CalibrationConstants;

const K: CalibrationConstants = CalibrationConstants::JPL_SOIL_PROBE;

#[derive(Debug)]
pub enum MapFormType {
    /// Default value and max length in chars.
    String(&'static str, usize),
    Float(f64),
    OptionalFloat,
}

#[derive(Debug)]
pub struct MapFormElement {
    pub key: &'static str,
    pub form_name: &'static str,
    pub data_type: MapFormType,
}

pub const MAP_CONFIG_FORM: &[MapFormElement] = &[
    MapFormElement {
        key: KEY_NAME,
        form_name: "name",
        data_type: MapFormType::String("", 32),
    },
    MapFormElement {
        key: KEY_DEVICE,
        form_name: "device",
        data_type: MapFormType::String(DEFAULT_DEVICE, 32),
    },
    MapFormElement {
        key: KEY_RECORDS,
        form_name: "records",
        data_type: MapFormType::String(DEFAULT_RECORDS, 255),
    },
    MapFormElement {
        key: KEY_AMBIENT,
        form_name: "ambient",
        data_type: MapFormType::OptionalFloat,
    },
    MapFormElement {
        key: KEY_CIRCUMFERENCE,
        form_name: "circumference",
        data_type: MapFormType::Float(K.circumference),
    },
    MapFormElement {
        key: KEY_LENGTH,
        form_name: "length",
        data_type: MapFormType::Float(K.length),
    },
    MapFormElement {
        key: KEY_EXPOSED_LENGTH,
        form_name: "exposed_length",
        data_type: MapFormType::Float(K.exposed_length),
    },
    MapFormElement {
        key: KEY_ALPHA,
        form_name: "alpha",
        data_type: MapFormType::Float(K.alpha),
    },
    MapFormElement {
        key: KEY_BETA,
        form_name: "beta",
        data_type: MapFormType::Float(K.beta),
    },
    MapFormElement {
        key: KEY_COEFFICIENT,
        form_name: "coefficient",
        data_type: MapFormType::Float(K.coefficient),
    },
    MapFormElement {
        key: KEY_EXPONENT,
        form_name: "exponent",
        data_type: MapFormType::Float(K.exponent),
    },
];

pub fn find_element(form_name: &str) -> Option<&'static MapFormElement> {
    MAP_CONFIG_FORM
        .iter()
        .find(|elem| elem.form_name == form_name || elem.key == form_name)
}

/// Stores a `name=value` setting coming from the command line.
///
/// An empty value removes the key so its default applies again.
pub fn apply_setting(
    config: &mut FileConfiguration,
    form_name: &str,
    value: &str,
) -> Result<(), ConfigError> {
    let elem = find_element(form_name).ok_or(ConfigError::InvalidValue {
        key: form_name.to_string(),
        expected: "setting name",
    })?;

    let value = value.trim();
    if value.is_empty() {
        config.remove(elem.key);
        return Ok(());
    }

    match elem.data_type {
        MapFormType::String(_, max_size) => config.store_string(elem.key, value, max_size),
        MapFormType::Float(_) | MapFormType::OptionalFloat => {
            let number = value.parse::<f64>().map_err(|_| ConfigError::InvalidValue {
                key: elem.key.to_string(),
                expected: "number",
            })?;
            config.store_float(elem.key, number)?
        }
    };

    Ok(())
}

/// Current value of a setting, formatted for display.
pub fn display_value(config: &FileConfiguration, elem: &MapFormElement) -> String {
    match elem.data_type {
        MapFormType::String(default, _) => config.read_string(elem.key, default),
        MapFormType::Float(default) => format!("{}", config.read_float(elem.key, default)),
        MapFormType::OptionalFloat => config
            .read_optional_float(elem.key)
            .map(|value| format!("{}", value))
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> (tempfile::TempDir, FileConfiguration) {
        let dir = tempfile::tempdir().unwrap();
        let config = FileConfiguration::open(dir.path().join("config.json")).unwrap();
        (dir, config)
    }

    #[test]
    fn test_apply_setting() {
        let (_dir, mut config) = config();

        apply_setting(&mut config, "name", "North bed").unwrap();
        apply_setting(&mut config, "alpha", "0.002").unwrap();
        apply_setting(&mut config, "AMBIENT", "65").unwrap();

        assert_eq!(config.get_name(), "North bed");
        assert_eq!(config.calibration_constants().alpha, 0.002);
        assert_eq!(config.get_ambient_temperature(), Some(65.0));

        apply_setting(&mut config, "alpha", "").unwrap();
        assert_eq!(config.calibration_constants().alpha, 0.0012);
    }

    #[test]
    fn test_apply_setting_errors() {
        let (_dir, mut config) = config();

        assert!(matches!(
            apply_setting(&mut config, "nope", "1"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            apply_setting(&mut config, "beta", "warm"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_display_value_defaults() {
        let (_dir, config) = config();

        let device = find_element("device").unwrap();
        assert_eq!(display_value(&config, device), "JPLSoil");

        let exponent = find_element("exponent").unwrap();
        assert_eq!(display_value(&config, exponent), "-1.196");

        let ambient = find_element("ambient").unwrap();
        assert_eq!(display_value(&config, ambient), "");
    }
}
