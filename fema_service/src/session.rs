/// Dashboard session orchestration.
///
/// A `DashboardSession` owns everything a run needs: configuration, the
/// HTTP client and the fetch cache. Building a report runs the pipeline
/// fetch → normalize → classify → aggregate and returns every artifact the
/// presenter renders.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use crate::analysis::classify::{classify_at, window_start};
use crate::analysis::groupings::{summarize, SubsetSummary};
use crate::config::DashboardConfig;
use crate::ingest::cache::FetchCache;
use crate::ingest::fema;
use crate::ingest::normalize::normalize;
use crate::logging::{self, Component};
use crate::model::{DashboardError, DisasterDeclaration, RawRecord};
use crate::replay::Snapshot;

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Everything rendered for one reference instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub reference_instant: NaiveDateTime,
    pub window_days: u32,
    /// Earliest incident begin date counted as recent.
    pub window_start: NaiveDateTime,
    /// URL or snapshot path the records came from.
    pub source: String,
    pub records_received: usize,
    pub records_rejected: usize,
    pub active: Vec<DisasterDeclaration>,
    pub recently_closed: Vec<DisasterDeclaration>,
    pub active_summary: SubsetSummary,
    pub recently_closed_summary: SubsetSummary,
}

/// Runs normalize → classify → aggregate over `raw`. Pure: the same
/// input and reference instant always produce the same report.
pub fn build_report_from_raw(
    raw: &[RawRecord],
    reference_instant: NaiveDateTime,
    window_days: u32,
    source: &str,
) -> DashboardReport {
    let table = normalize(raw);
    let classification = classify_at(&table.records, reference_instant, window_days);

    DashboardReport {
        reference_instant,
        window_days,
        window_start: window_start(reference_instant, window_days),
        source: source.to_string(),
        records_received: raw.len(),
        records_rejected: table.rejected.len(),
        active_summary: summarize(&classification.active),
        recently_closed_summary: summarize(&classification.recently_closed),
        active: classification.active,
        recently_closed: classification.recently_closed,
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct DashboardSession {
    config: DashboardConfig,
    /// Only built when records come from the live API.
    client: Option<reqwest::blocking::Client>,
    cache: FetchCache,
}

impl DashboardSession {
    pub fn new(config: DashboardConfig) -> Result<Self, DashboardError> {
        let client = match config.source.snapshot {
            Some(_) => None,
            None => Some(fema::build_client(config.source.timeout())?),
        };
        let cache = FetchCache::new(config.source.cache_ttl());

        Ok(Self { config, client, cache })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Where records are read from, for display.
    pub fn source_label(&self) -> String {
        match &self.config.source.snapshot {
            Some(path) => path.display().to_string(),
            None => self.config.source.url.clone(),
        }
    }

    /// Raw records for this session, from the snapshot or the cached API.
    ///
    /// A failed API fetch yields an empty collection (already reported to
    /// the user); a failed snapshot read is an error.
    pub fn load_raw_at(&mut self, now: DateTime<Utc>) -> Result<Vec<RawRecord>, DashboardError> {
        if let Some(path) = &self.config.source.snapshot {
            return Snapshot::new(path.clone()).load();
        }

        let client = match &self.client {
            Some(client) => client,
            None => return Err(DashboardError::Config("no HTTP client configured".to_string())),
        };
        let url = self.config.source.url.clone();
        Ok(self
            .cache
            .get_or_fetch_at(&url, now, |u| fema::fetch_or_empty(client, u)))
    }

    /// Builds the report for `reference_instant`, fetching if needed.
    pub fn build_report_at(
        &mut self,
        reference_instant: NaiveDateTime,
        now: DateTime<Utc>,
    ) -> Result<DashboardReport, DashboardError> {
        let raw = self.load_raw_at(now)?;
        Ok(self.build_report_from(&raw, reference_instant))
    }

    /// Builds the report from records already loaded this session.
    pub fn build_report_from(&self, raw: &[RawRecord], reference_instant: NaiveDateTime) -> DashboardReport {
        if raw.is_empty() {
            logging::warn(Component::System, None, "No declaration records available; report will be empty");
        }
        build_report_from_raw(
            raw,
            reference_instant,
            self.config.classify.window_days,
            &self.source_label(),
        )
    }

    /// Saves `raw` to `path` for later replay. An empty collection is not
    /// written; returns whether a file was saved.
    pub fn save_snapshot(&self, raw: &[RawRecord], path: &Path) -> Result<bool, DashboardError> {
        if raw.is_empty() {
            logging::warn(
                Component::System,
                None,
                &format!("No records to save; snapshot {} not written", path.display()),
            );
            return Ok(false);
        }
        Snapshot::new(path).save(raw)?;
        Ok(true)
    }

    /// Drops cached records so the next report refetches.
    pub fn refresh(&mut self) {
        let url = self.config.source.url.clone();
        if self.cache.invalidate(&url) {
            logging::debug(Component::Cache, None, &format!("Invalidated {}", url));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::{json, Value};

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn raw(state: &str, kind: &str, begin: &str, end: Value) -> RawRecord {
        match json!({
            "disasterName": format!("{} {}", state, kind),
            "stateCode": state,
            "stateName": state,
            "declarationDate": begin,
            "incidentBeginDate": begin,
            "incidentEndDate": end,
            "incidentType": kind,
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_report_contains_all_four_artifacts() {
        let input = vec![
            raw("CA", "Flood", "2024-01-01", Value::Null),
            raw("TX", "Fire", "2024-01-01", json!("2024-01-15")),
            raw("CA", "Fire", "2024-01-20", json!("2024-01-25")),
            raw("OK", "Tornado", "2023-06-01", json!("2023-06-02")),
        ];
        let report = build_report_from_raw(&input, day(2024, 2, 1), 90, "test");

        assert_eq!(report.active.len(), 1);
        assert_eq!(report.recently_closed.len(), 2);
        assert_eq!(report.active_summary.by_state.get("CA"), 1);
        assert_eq!(report.recently_closed_summary.by_state.get("CA"), 1);
        assert_eq!(report.recently_closed_summary.by_state.get("TX"), 1);
        assert_eq!(report.recently_closed_summary.by_incident_type.get("Fire"), 2);
        assert_eq!(report.records_received, 4);
        assert_eq!(report.window_start, day(2023, 11, 3));
    }

    #[test]
    fn test_rejected_records_are_counted_not_classified() {
        let input = vec![
            raw("CA", "Flood", "not a date", Value::Null),
            raw("CA", "Flood", "2024-01-01", Value::Null),
        ];
        let report = build_report_from_raw(&input, day(2024, 2, 1), 90, "test");
        assert_eq!(report.records_rejected, 1);
        assert_eq!(report.active.len(), 1);
    }

    #[test]
    fn test_api_session_labels_source_with_url() {
        let mut session = DashboardSession::new(DashboardConfig::default()).unwrap();
        assert_eq!(session.source_label(), crate::model::DEFAULT_API_URL);
        assert_eq!(session.config().classify.window_days, 90);
        session.refresh();
    }

    #[test]
    fn test_report_from_loaded_records_does_not_fetch() {
        let session = DashboardSession::new(DashboardConfig::default()).unwrap();
        let input = vec![raw("CA", "Flood", "2024-01-01", Value::Null)];

        let report = session.build_report_from(&input, day(2024, 2, 1));

        assert_eq!(report.active.len(), 1);
        assert_eq!(report.source, crate::model::DEFAULT_API_URL);
        assert!(session.cache.is_empty());
    }

    #[test]
    fn test_empty_records_are_not_saved_as_snapshot() {
        let session = DashboardSession::new(DashboardConfig::default()).unwrap();
        let path = std::env::temp_dir().join(format!("fema_session_empty_{}.json", std::process::id()));

        assert!(!session.save_snapshot(&[], &path).unwrap());
        assert!(!path.exists());

        assert!(session
            .save_snapshot(&[raw("TX", "Fire", "2024-01-01", json!("2024-01-15"))], &path)
            .unwrap());
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_snapshot_session_reads_file() {
        let path = std::env::temp_dir().join(format!("fema_session_{}.json", std::process::id()));
        Snapshot::new(path.clone())
            .save(&[raw("CA", "Flood", "2024-01-01", Value::Null)])
            .unwrap();

        let mut config = DashboardConfig::default();
        config.source.snapshot = Some(path.clone());
        let mut session = DashboardSession::new(config).unwrap();
        let report = session.build_report_at(day(2024, 2, 1), Utc::now()).unwrap();

        assert_eq!(report.active.len(), 1);
        assert_eq!(report.source, path.display().to_string());
        let _ = std::fs::remove_file(&path);
    }
}
