//! Persisted record of the most recently applied update (applied_update.json).

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::core::paths;

const METADATA_FILE: &str = "applied_update.json";

/// What was installed, when, and whether this launch is the first one
/// running it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedUpdate {
    /// Release label, e.g. "v1.4.0".
    pub label: String,
    /// Release notes at install time.
    pub description: String,
    /// Link to the release page, when the service provides one.
    pub release_url: Option<String>,
    /// Unix seconds when the install finished.
    pub applied_at: u64,
    /// Set on install; cleared by [`mark_ready`] once a launch survives
    /// startup.
    pub first_run: bool,
}

fn metadata_path() -> Option<PathBuf> {
    paths::data_dir().map(|d| d.join(METADATA_FILE))
}

fn ensure_data_dir() -> io::Result<PathBuf> {
    let dir = paths::data_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "No data directory"))?;
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub(super) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn write_record(record: &AppliedUpdate) -> io::Result<()> {
    let dir = ensure_data_dir()?;
    let json = serde_json::to_string_pretty(record).map_err(io::Error::other)?;
    fs::write(dir.join(METADATA_FILE), json)
}

/// Record a freshly applied update. The next launch reads it back with
/// `first_run` still set.
pub fn record_applied(
    label: &str,
    description: &str,
    release_url: Option<String>,
) -> io::Result<()> {
    write_record(&AppliedUpdate {
        label: label.to_string(),
        description: description.to_string(),
        release_url,
        applied_at: unix_now(),
        first_run: true,
    })
}

/// Load the record, if any. Unreadable or corrupt files read as `None`.
pub fn load_applied() -> Option<AppliedUpdate> {
    let path = metadata_path()?;
    let json = match fs::read_to_string(&path) {
        Ok(json) => json,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
        Err(e) => {
            log::warn!("could not read {}: {}", METADATA_FILE, e);
            return None;
        }
    };
    match serde_json::from_str(&json) {
        Ok(record) => Some(record),
        Err(e) => {
            log::warn!("ignoring corrupt {}: {}", METADATA_FILE, e);
            None
        }
    }
}

/// Clear the first-run marker. No-op when there is no record or the marker
/// is already clear.
pub fn mark_ready() -> io::Result<()> {
    let Some(mut record) = load_applied() else {
        return Ok(());
    };
    if !record.first_run {
        return Ok(());
    }
    record.first_run = false;
    write_record(&record)
}
