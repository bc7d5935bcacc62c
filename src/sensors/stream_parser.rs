//! Line tokenizer for the probe's serial text stream.
//!
//! The firmware prints one reading per line, prefixed by a three character
//! tag: `R: ` for resistance (ohms) and `T: ` for temperature (Fahrenheit).

use log::{debug, trace};

pub const RESISTANCE_TAG: &str = "R: ";
pub const TEMPERATURE_TAG: &str = "T: ";

const TAG_LEN: usize = 3;

/// Open circuit marker sent in place of a resistance value.
pub const OPEN_CIRCUIT: &str = "INF";

/// Firmware error codes reported by a disconnected thermistor.
pub const TEMPERATURE_DISCONNECTED_CODES: &[&str] = &["-196.60", "185.00"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingKind {
    Resistance,
    Temperature,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedReading {
    ResistanceOhms(f64),
    /// Open circuit, resistance is effectively infinite.
    ResistanceSaturated,
    TemperatureFahrenheit(f64),
    TemperatureDisconnected,
    /// A known tag followed by a value that is not a usable number.
    Malformed(ReadingKind),
    Unrecognized,
}

impl ParsedReading {
    pub fn kind(&self) -> Option<ReadingKind> {
        match self {
            ParsedReading::ResistanceOhms(_)
            | ParsedReading::ResistanceSaturated
            | ParsedReading::Malformed(ReadingKind::Resistance) => Some(ReadingKind::Resistance),
            ParsedReading::TemperatureFahrenheit(_)
            | ParsedReading::TemperatureDisconnected
            | ParsedReading::Malformed(ReadingKind::Temperature) => Some(ReadingKind::Temperature),
            ParsedReading::Unrecognized => None,
        }
    }
}

pub fn parse_line(line: &str) -> ParsedReading {
    let line = line.trim_end_matches(&['\r', '\n'][..]);

    let reading = if line.starts_with(RESISTANCE_TAG) {
        parse_resistance(&line[TAG_LEN..])
    } else if line.starts_with(TEMPERATURE_TAG) {
        parse_temperature(&line[TAG_LEN..])
    } else {
        trace!("Ignoring line: {:?}", line);
        return ParsedReading::Unrecognized;
    };

    if let ParsedReading::Malformed(kind) = reading {
        debug!("Malformed {:?} value in line: {:?}", kind, line);
    }

    reading
}

fn parse_resistance(value: &str) -> ParsedReading {
    let value = value.trim();

    if value.eq_ignore_ascii_case(OPEN_CIRCUIT) {
        return ParsedReading::ResistanceSaturated;
    }

    match value.parse::<f64>() {
        Ok(ohms) if ohms == f64::INFINITY => ParsedReading::ResistanceSaturated,
        Ok(ohms) if ohms.is_finite() => ParsedReading::ResistanceOhms(ohms),
        _ => ParsedReading::Malformed(ReadingKind::Resistance),
    }
}

fn parse_temperature(value: &str) -> ParsedReading {
    let value = value.trim();

    if TEMPERATURE_DISCONNECTED_CODES.contains(&value) {
        return ParsedReading::TemperatureDisconnected;
    }

    match value.parse::<f64>() {
        Ok(fahrenheit) if fahrenheit.is_finite() => ParsedReading::TemperatureFahrenheit(fahrenheit),
        _ => ParsedReading::Malformed(ReadingKind::Temperature),
    }
}
