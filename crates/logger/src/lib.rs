/// Streamisko — Logger
/// JSONL event stream: API health + resolution audit

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

pub struct EventLogger {
    log_dir: PathBuf,
}

impl EventLogger {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        let dir = log_dir.into();
        fs::create_dir_all(&dir).ok();
        Self { log_dir: dir }
    }

    pub fn log<T: Serialize>(&self, event: &T) -> Result<()> {
        let date  = Utc::now().format("%Y-%m-%d").to_string();
        let path  = self.log_dir.join(format!("{date}.jsonl"));
        let line  = serde_json::to_string(event)?;
        let mut f = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(f, "{line}")?;
        Ok(())
    }
}

pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

// ── Event typy ────────────────────────────────────────────────────────────────

#[derive(Serialize, Debug)]
pub struct ApiStatusEvent {
    pub ts:          String,
    pub event:       &'static str,   // "API_STATUS"
    pub source:      String,         // provider klíč nebo endpoint ("alpha", "matches/all")
    pub scope:       String,         // provider-local id / listing scope
    pub ok:          bool,
    pub status_code: Option<u16>,
    pub message:     String,
    pub items:       usize,
}

#[derive(Serialize, Debug)]
pub struct ResolutionEvent {
    pub ts:                String,
    pub event:             &'static str,   // "STREAMS_RESOLVED"
    pub match_id:          String,
    pub requested_sources: usize,
    pub healthy_sources:   usize,
    pub streams_found:     usize,
    pub retry_no:          u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_appends_one_json_line_per_event() {
        let dir = std::env::temp_dir().join(format!("streamisko_logger_test_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let logger = EventLogger::new(&dir);

        let ev = ApiStatusEvent {
            ts:          now_iso(),
            event:       "API_STATUS",
            source:      "alpha".to_string(),
            scope:       "42".to_string(),
            ok:          true,
            status_code: Some(200),
            message:     "ok".to_string(),
            items:       3,
        };
        logger.log(&ev).unwrap();
        logger.log(&ev).unwrap();

        let date = Utc::now().format("%Y-%m-%d").to_string();
        let contents = fs::read_to_string(dir.join(format!("{date}.jsonl"))).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["event"], "API_STATUS");
        assert_eq!(parsed["source"], "alpha");

        let _ = fs::remove_dir_all(&dir);
    }
}
