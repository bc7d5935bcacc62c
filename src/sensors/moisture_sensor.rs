//! Temperature compensated moisture calibration for the resistive probe.
//!
//! The probe resistance is converted to a geometry independent resistivity,
//! normalized to the 20°C reference of the calibration curve, converted back
//! to a resistance and finally fed to the empirical power law fit.

use serde::{Deserialize, Serialize};

/// Temperature of the empirical moisture curve, in Celsius.
pub const REFERENCE_CELSIUS: f64 = 20.0;

/// Physical parameters of the probe and of its thermal model.
///
/// Lengths are in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConstants {
    pub circumference: f64,
    pub length: f64,
    pub exposed_length: f64,
    pub alpha: f64,
    pub beta: f64,
    /// Power law coefficient of the moisture fit.
    pub coefficient: f64,
    /// Power law exponent of the moisture fit.
    pub exponent: f64,
}

impl CalibrationConstants {
    pub const JPL_SOIL_PROBE: Self = Self {
        circumference: 0.0095,
        length: 0.049,
        exposed_length: 0.05,
        alpha: 0.0012,
        beta: 0.1562,
        coefficient: 387258.0,
        exponent: -1.196,
    };

    pub fn geometry_factor(&self) -> f64 {
        self.exposed_length * (self.circumference / 2.0) / self.length
    }

    pub fn resistivity(&self, resistance: f64) -> f64 {
        resistance * self.geometry_factor()
    }

    pub fn resistance(&self, resistivity: f64) -> f64 {
        resistivity / self.geometry_factor()
    }
}

impl Default for CalibrationConstants {
    fn default() -> Self {
        Self::JPL_SOIL_PROBE
    }
}

#[inline]
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) / 1.8
}

/// Resistance the probe would read at the reference temperature.
pub fn normalize_resistance(
    resistance_ohms: f64,
    temperature_fahrenheit: f64,
    constants: &CalibrationConstants,
) -> f64 {
    let resistivity = constants.resistivity(resistance_ohms);
    let celsius = fahrenheit_to_celsius(temperature_fahrenheit);

    let ser20 = resistivity
        / (1.0
            - resistivity
                * constants.alpha
                * (constants.beta * (celsius - REFERENCE_CELSIUS)).exp());

    constants.resistance(ser20)
}

/// Moisture percentage, rounded to 3 decimals and not clamped.
///
/// Past the compensation range of the thermal model the normalized
/// resistance turns negative and the result is NaN.
pub fn moisture_from_resistance(
    resistance_ohms: f64,
    temperature_fahrenheit: f64,
    constants: &CalibrationConstants,
) -> f64 {
    let normalized = normalize_resistance(resistance_ohms, temperature_fahrenheit, constants);
    let moisture = constants.coefficient * normalized.powf(constants.exponent);

    (moisture * 1000.0).round() / 1000.0
}

pub struct MoistureSensor {
    constants: CalibrationConstants,
}

impl MoistureSensor {
    pub fn new(constants: CalibrationConstants) -> Self {
        Self { constants }
    }

    pub fn constants(&self) -> &CalibrationConstants {
        &self.constants
    }

    pub fn get_moisture_level(&self, resistance_ohms: f64, temperature_fahrenheit: f64) -> f64 {
        moisture_from_resistance(resistance_ohms, temperature_fahrenheit, &self.constants)
    }
}

impl Default for MoistureSensor {
    fn default() -> Self {
        Self::new(CalibrationConstants::default())
    }
}
