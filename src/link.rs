//! Events coming from the probe's wireless link.
//!
//! The transport itself (BLE UART service, serial bridge, capture file) is
//! not modelled here; it only has to turn what it receives into
//! [`LinkEvent`]s.

use std::io::{self, BufRead};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    Connected,
    Disconnected,
    DataLine(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connected => "connected",
        }
    }
}

/// Splits a byte stream into [`LinkEvent::DataLine`]s.
///
/// Blank lines are skipped and invalid UTF-8 is replaced, the probe is
/// known to emit garbage while the radio settles.
pub struct LineSource<R: BufRead> {
    reader: R,
    buffer: Vec<u8>,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::with_capacity(64),
        }
    }
}

impl<R: BufRead> Iterator for LineSource<R> {
    type Item = io::Result<LinkEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buffer.clear();

            match self.reader.read_until(b'\n', &mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&self.buffer);
                    let line = line.trim_end_matches(&['\r', '\n'][..]);

                    if line.trim().is_empty() {
                        continue;
                    }

                    return Some(Ok(LinkEvent::DataLine(line.to_string())));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
