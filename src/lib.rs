//! Soil moisture probe reading pipeline.
//!
//! The probe streams text lines over its wireless link. Each line goes
//! through three stages:
//!
//! ```text
//! line ──> stream_parser ──> ParsedReading ──> ReadingAggregator ──> SensorSnapshot
//!                                                   │
//!                                          moisture_sensor (calibration)
//! ```
//!
//! Snapshots feed the display (see [`template`]) and can be finalized into
//! [`record::SoilObservationRecord`]s for a [`record::RecordStore`].

pub mod aggregator;
pub mod configuration;
pub mod error;
pub mod link;
pub mod record;
pub mod sensors;
pub mod snapshot;
pub mod template;

pub use aggregator::{ReadingAggregator, SharedAggregator};
pub use link::{ConnectionStatus, LinkEvent};
pub use record::{Coordinates, JsonLinesRecordStore, RecordStore, SoilObservationRecord};
pub use sensors::moisture_sensor::{moisture_from_resistance, CalibrationConstants};
pub use sensors::stream_parser::{parse_line, ParsedReading, ReadingKind};
pub use snapshot::SensorSnapshot;
