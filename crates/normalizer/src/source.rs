use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::Context;
use common::{AppError, Result};
use tracing::debug;

use crate::errors::RecordError;
use crate::payloads::RawEvent;

pub type ScanItem = Result<std::result::Result<RawEvent, RecordError>>;

pub type EventScan<'a> = Box<dyn Iterator<Item = ScanItem> + 'a>;

/// Every call to `scan` starts again from the first event.
pub trait EventSource {
    fn scan(&self) -> Result<EventScan<'_>>;
}

impl EventSource for [RawEvent] {
    fn scan(&self) -> Result<EventScan<'_>> {
        Ok(Box::new(self.iter().cloned().map(|event| Ok(Ok(event)))))
    }
}

impl EventSource for Vec<RawEvent> {
    fn scan(&self) -> Result<EventScan<'_>> {
        self.as_slice().scan()
    }
}

#[derive(Debug, Clone)]
pub struct JsonLinesSource {
    path: PathBuf,
}

impl JsonLinesSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EventSource for JsonLinesSource {
    fn scan(&self) -> Result<EventScan<'_>> {
        let file = File::open(&self.path)
            .with_context(|| format!("opening event file {}", self.path.display()))
            .map_err(AppError::ingest)?;
        debug!(path = %self.path.display(), "scanning event file");
        let lines = BufReader::new(file).split(b'\n');
        Ok(Box::new(lines.filter_map(|line| match line {
            Ok(line) if line.iter().all(u8::is_ascii_whitespace) => None,
            Ok(line) => Some(Ok(
                serde_json::from_slice::<RawEvent>(&line).map_err(RecordError::Decode)
            )),
            Err(err) => Some(Err(AppError::ingest(err))),
        })))
    }
}
