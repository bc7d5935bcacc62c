//! Saved soil observations and where they go.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A snapshot the user chose to keep. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilObservationRecord {
    site_name: String,
    timestamp: DateTime<Utc>,
    /// Moisture as displayed when the record was taken, e.g. `"42.3%"`.
    moisture: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    coordinates: Option<Coordinates>,
}

impl SoilObservationRecord {
    pub fn new(site_name: &str, timestamp: DateTime<Utc>, moisture: &str) -> Self {
        Self {
            site_name: site_name.to_string(),
            timestamp,
            moisture: moisture.to_string(),
            photo: None,
            coordinates: None,
        }
    }

    /// Attach a reference (path or URI) to a photo of the site.
    pub fn with_photo(mut self, photo: &str) -> Self {
        self.photo = Some(photo.to_string());
        self
    }

    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn moisture(&self) -> &str {
        &self.moisture
    }

    pub fn photo(&self) -> Option<&str> {
        self.photo.as_deref()
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }
}

/// Destination for finalized records. Records are only ever appended.
pub trait RecordStore {
    fn append(&mut self, record: &SoilObservationRecord) -> Result<(), StoreError>;
}

/// Appends one JSON document per line to a file.
pub struct JsonLinesRecordStore {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonLinesRecordStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| StoreError::Open {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for JsonLinesRecordStore {
    fn append(&mut self, record: &SoilObservationRecord) -> Result<(), StoreError> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;

        info!(
            "Saved record for site '{}' ({}) to {}",
            record.site_name(),
            record.moisture(),
            self.path.display()
        );
        Ok(())
    }
}
