//! JSONL writer for call and phase trace events.
//!
//! Each [`TraceEvent`] becomes one line: the payload fields plus `type` and
//! `timestamp`. The file is opened for append so several runs can share it.

use chrono::{SecondsFormat, Utc};
use deliberation_application::{TraceEvent, TraceLogger};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::warn;

/// Trace logger that appends one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`; every line is flushed as it is
/// written.
pub struct JsonlTraceLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
    written: AtomicUsize,
}

impl JsonlTraceLogger {
    /// Open `path` for append, creating it and its parent directories.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
            written: AtomicUsize::new(0),
        })
    }

    /// Open a fresh timestamped file (`trace-YYYYmmdd-HHMMSS.jsonl`) in `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> io::Result<Self> {
        let name = format!("trace-{}.jsonl", Utc::now().format("%Y%m%d-%H%M%S"));
        Self::open(dir.as_ref().join(name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of lines written so far
    pub fn written(&self) -> usize {
        self.written.load(Ordering::Relaxed)
    }

    fn record(event: TraceEvent) -> Value {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut map = match event.payload {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        map.insert("type".to_string(), Value::String(event.event_type.to_string()));
        map.insert("timestamp".to_string(), Value::String(timestamp));
        Value::Object(map)
    }
}

impl TraceLogger for JsonlTraceLogger {
    fn log(&self, event: TraceEvent) {
        let Ok(line) = serde_json::to_string(&Self::record(event)) else {
            return;
        };
        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        match writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            Ok(()) => {
                self.written.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => warn!("Could not write trace event to {}: {}", self.path.display(), e),
        }
    }
}

impl Drop for JsonlTraceLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
