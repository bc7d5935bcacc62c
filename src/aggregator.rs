//! Reading aggregator.
//!
//! Folds parsed readings into a [`SensorSnapshot`]. Each update builds the
//! next snapshot aside and swaps it in with a single assignment, so a reader
//! only ever sees a whole snapshot.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::{
    link::{ConnectionStatus, LinkEvent},
    record::SoilObservationRecord,
    sensors::{
        moisture_sensor::{CalibrationConstants, MoistureSensor},
        resistance_sensor::ResistanceState,
        stream_parser::{parse_line, ParsedReading},
        temperature_sensor::TemperatureState,
    },
    snapshot::{ResistanceSentinel, SensorSnapshot},
};

pub struct ReadingAggregator {
    moisture_sensor: MoistureSensor,
    snapshot: SensorSnapshot,
    connection: ConnectionStatus,
    /// Last valid probe temperature of the session. Outlives a thermistor
    /// fault, which only changes what the snapshot displays.
    last_temperature_f: Option<f64>,
    /// Weather fallback, only used until the probe reports a valid temperature.
    ambient_temperature_f: Option<f64>,
}

impl ReadingAggregator {
    pub fn new(constants: CalibrationConstants) -> Self {
        Self {
            moisture_sensor: MoistureSensor::new(constants),
            snapshot: SensorSnapshot::default(),
            connection: ConnectionStatus::default(),
            last_temperature_f: None,
            ambient_temperature_f: None,
        }
    }

    pub fn snapshot(&self) -> &SensorSnapshot {
        &self.snapshot
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.connection
    }

    pub fn constants(&self) -> &CalibrationConstants {
        self.moisture_sensor.constants()
    }

    /// Like [`SensorSnapshot::resistance_sentinel`], but reports
    /// `Disconnected` while the link is down.
    pub fn resistance_sentinel(&self) -> ResistanceSentinel {
        match self.connection {
            ConnectionStatus::Disconnected => ResistanceSentinel::Disconnected,
            ConnectionStatus::Connected => self.snapshot.resistance_sentinel(),
        }
    }

    pub fn ambient_temperature(&self) -> Option<f64> {
        self.ambient_temperature_f
    }

    pub fn supply_ambient_temperature(&mut self, fahrenheit: f64) {
        if !fahrenheit.is_finite() {
            warn!("Ignoring non finite ambient temperature {}", fahrenheit);
            return;
        }

        debug!("Ambient temperature fallback set to {:.1}°F", fahrenheit);
        self.ambient_temperature_f = Some(fahrenheit);
    }

    pub fn clear_ambient_temperature(&mut self) {
        self.ambient_temperature_f = None;
    }

    /// Temperature used for calibration: the last valid probe reading since
    /// the session began, then the ambient fallback.
    pub fn temperature_on_hand(&self) -> Option<f64> {
        self.last_temperature_f.or(self.ambient_temperature_f)
    }

    pub fn dispatch(&mut self, event: LinkEvent) {
        self.dispatch_at(event, Utc::now())
    }

    pub fn dispatch_at(&mut self, event: LinkEvent, now: DateTime<Utc>) {
        match event {
            LinkEvent::Connected => {
                info!("Probe connected");
                self.connection = ConnectionStatus::Connected;
                self.reset();
            }
            LinkEvent::Disconnected => {
                info!("Probe disconnected");
                self.connection = ConnectionStatus::Disconnected;
                self.reset();
            }
            LinkEvent::DataLine(line) => self.apply_at(parse_line(&line), now),
        }
    }

    pub fn apply(&mut self, reading: ParsedReading) {
        self.apply_at(reading, Utc::now())
    }

    pub fn apply_at(&mut self, reading: ParsedReading, now: DateTime<Utc>) {
        if let ParsedReading::TemperatureFahrenheit(fahrenheit) = reading {
            self.last_temperature_f = Some(fahrenheit);
        }

        if let Some(next) = self.next_snapshot(reading, now) {
            self.snapshot = next;
        }
    }

    /// Returns `None` when the reading leaves the snapshot untouched.
    fn next_snapshot(&self, reading: ParsedReading, now: DateTime<Utc>) -> Option<SensorSnapshot> {
        let mut next = self.snapshot.clone();

        match reading {
            ParsedReading::ResistanceOhms(ohms) => {
                next.resistance = ResistanceState::Valid(ohms);
                next.moisture_percent = self.moisture_for(ohms);
            }
            ParsedReading::ResistanceSaturated => {
                if !self.snapshot.resistance.is_saturated() {
                    info!("Probe resistance saturated (open circuit)");
                }
                next.resistance = ResistanceState::Saturated;
                next.moisture_percent = None;
            }
            ParsedReading::TemperatureFahrenheit(fahrenheit) => {
                next.temperature = TemperatureState::Valid(fahrenheit);
            }
            ParsedReading::TemperatureDisconnected => {
                if !self.snapshot.temperature.is_disconnected() {
                    warn!("Probe thermistor disconnected");
                }
                next.temperature = TemperatureState::Disconnected;
            }
            ParsedReading::Malformed(_) | ParsedReading::Unrecognized => return None,
        }

        next.date_observed = Some(now);
        Some(next)
    }

    fn moisture_for(&self, ohms: f64) -> Option<f64> {
        let Some(fahrenheit) = self.temperature_on_hand() else {
            debug!("No temperature on hand, moisture not computed for {} Ω", ohms);
            return None;
        };

        if ohms <= 0.0 {
            warn!("Non positive resistance {} Ω, reporting 0%", ohms);
            return Some(0.0);
        }

        let moisture = self.moisture_sensor.get_moisture_level(ohms, fahrenheit);

        if !moisture.is_finite() {
            warn!(
                "{} Ω at {:.1}°F is past the compensation range, reporting 0%",
                ohms, fahrenheit
            );
            return Some(0.0);
        }

        Some(moisture)
    }

    /// Drops every reading at once, e.g. when a new session begins.
    pub fn reset(&mut self) {
        self.snapshot = SensorSnapshot::default();
        self.last_temperature_f = None;
    }

    pub fn finalize(&self, site_name: &str, timestamp: DateTime<Utc>) -> SoilObservationRecord {
        SoilObservationRecord::new(site_name, timestamp, &self.snapshot.moisture_display())
    }
}

impl Default for ReadingAggregator {
    fn default() -> Self {
        Self::new(CalibrationConstants::default())
    }
}

/// Aggregator shared between the link thread and readers.
///
/// Every update goes through one mutex and readers get owned copies of the
/// snapshot.
#[derive(Clone)]
pub struct SharedAggregator {
    inner: Arc<Mutex<ReadingAggregator>>,
}

impl SharedAggregator {
    pub fn new(aggregator: ReadingAggregator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(aggregator)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ReadingAggregator> {
        // A panic mid update never leaves a partial snapshot behind.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn dispatch(&self, event: LinkEvent) {
        self.lock().dispatch(event)
    }

    pub fn supply_ambient_temperature(&self, fahrenheit: f64) {
        self.lock().supply_ambient_temperature(fahrenheit)
    }

    pub fn snapshot(&self) -> SensorSnapshot {
        self.lock().snapshot().clone()
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.lock().connection_status()
    }

    pub fn finalize(&self, site_name: &str, timestamp: DateTime<Utc>) -> SoilObservationRecord {
        self.lock().finalize(site_name, timestamp)
    }
}
