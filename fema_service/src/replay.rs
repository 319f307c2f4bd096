/// Offline replay of saved API responses
///
/// When the live OpenFEMA API is unavailable, or a run needs to be
/// reproducible, the dashboard can read records from a snapshot file
/// instead. A snapshot has the same JSON shape as the live response, so
/// a body saved with `curl` works as well as one written by `save`.

use std::fs;
use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::ingest::fema;
use crate::logging::{self, Component};
use crate::model::{DashboardError, RawRecord, COLLECTION_KEY};

/// A response body stored on disk.
pub struct Snapshot {
    pub path: PathBuf,
}

impl Snapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the raw records from the snapshot file.
    ///
    /// Unlike the live fetch, a missing or malformed snapshot is an error:
    /// the caller asked for this exact data.
    pub fn load(&self) -> Result<Vec<RawRecord>, DashboardError> {
        let body = fs::read_to_string(&self.path).map_err(|e| {
            DashboardError::Io(format!("cannot read snapshot {}: {}", self.path.display(), e))
        })?;
        let records = fema::parse_declarations_response(&body)?;

        logging::info(
            Component::Fema,
            None,
            &format!("Loaded {} records from snapshot {}", records.len(), self.path.display()),
        );
        Ok(records)
    }

    /// Write `records` in the live response shape, stamped with the save time.
    pub fn save(&self, records: &[RawRecord]) -> Result<(), DashboardError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let items: Vec<Value> = records.iter().cloned().map(Value::Object).collect();
        let body = json!({
            "metadata": {
                "savedAt": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                "count": items.len(),
            },
            (COLLECTION_KEY): items,
        });

        fs::write(&self.path, serde_json::to_string_pretty(&body)?)?;
        logging::info(
            Component::Fema,
            None,
            &format!("Saved {} records to snapshot {}", records.len(), self.path.display()),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("fema_replay_{}_{}.json", name, std::process::id()))
    }

    fn record(state: &str) -> RawRecord {
        match json!({"stateCode": state, "incidentEndDate": null}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_save_then_load_preserves_records() {
        let snapshot = Snapshot::new(temp_path("save_load"));
        snapshot.save(&[record("CA"), record("TX")]).expect("save should succeed");

        let loaded = snapshot.load().expect("load should succeed");
        assert_eq!(loaded, vec![record("CA"), record("TX")]);

        let _ = fs::remove_file(&snapshot.path);
    }

    #[test]
    fn test_missing_snapshot_is_io_error() {
        let result = Snapshot::new("/nonexistent/snapshot.json").load();
        assert!(matches!(result, Err(DashboardError::Io(msg)) if msg.contains("snapshot")));
    }

    #[test]
    fn test_snapshot_without_collection_key_is_parse_error() {
        let path = temp_path("no_key");
        fs::write(&path, r#"{"metadata": {}}"#).unwrap();

        let result = Snapshot::new(path.clone()).load();
        assert!(matches!(result, Err(DashboardError::ParseError(_))));

        let _ = fs::remove_file(&path);
    }
}
