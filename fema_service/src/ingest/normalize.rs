/// Record validation and date normalization.
///
/// Turns the loosely-typed records delivered by the API into
/// `DisasterDeclaration`s. Required fields are checked up front and every
/// timestamp is reduced to a timezone-naive `NaiveDateTime`, so that
/// classification can compare against a naive reference instant.
///
/// # Rejection policy
/// A record missing `stateCode` or `incidentType`, or whose
/// `incidentBeginDate` cannot be parsed, is dropped and reported in
/// `NormalizedTable::rejected` with a warning. The rest of the table is
/// still produced.
///
/// The display-only fields are tolerant. A missing `disasterName` becomes
/// empty and a missing `stateName` falls back to the registry name.
/// `incidentEndDate` and `declarationDate` become `None` when null,
/// missing, blank or unparsable.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::logging::{self, Component};
use crate::model::*;
use crate::states;

/// Naive datetime layouts accepted after RFC 3339 has been tried.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A record that failed validation, kept for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    /// Position of the record in the raw input.
    pub index: usize,
    /// `disasterName` if one could be read, for log context.
    pub disaster_name: Option<String>,
    pub error: DashboardError,
}

/// Output of one normalization pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedTable {
    pub records: Vec<DisasterDeclaration>,
    pub rejected: Vec<RejectedRecord>,
}

impl NormalizedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Date parsing
// ---------------------------------------------------------------------------

/// Parses a source timestamp into a timezone-naive datetime.
///
/// Offsets are stripped by keeping the wall-clock time as written:
/// `2024-01-01T00:00:00-05:00` becomes `2024-01-01 00:00:00`.
/// Date-only values resolve to midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Strict parse for `incidentBeginDate`: a missing or malformed value is an error.
pub fn parse_begin_date(record: &RawRecord) -> Result<NaiveDateTime, DashboardError> {
    let raw = required_str(record, FIELD_INCIDENT_BEGIN_DATE)?;
    parse_timestamp(raw).ok_or_else(|| DashboardError::InvalidDate {
        field: FIELD_INCIDENT_BEGIN_DATE,
        value: raw.to_string(),
    })
}

/// Tolerant parse used for `incidentEndDate` and `declarationDate`.
pub fn parse_optional_date(record: &RawRecord, field: &'static str) -> Option<NaiveDateTime> {
    let raw = optional_str(record, field)?;
    let parsed = parse_timestamp(raw);
    if parsed.is_none() && !raw.trim().is_empty() {
        logging::debug(
            Component::Normalize,
            None,
            &format!("Unparsable {} '{}' treated as no value", field, raw),
        );
    }
    parsed
}

// ---------------------------------------------------------------------------
// Field access
// ---------------------------------------------------------------------------

fn required_str<'a>(record: &'a RawRecord, field: &'static str) -> Result<&'a str, DashboardError> {
    match record.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.as_str()),
        _ => Err(DashboardError::MissingField { field }),
    }
}

fn optional_str<'a>(record: &'a RawRecord, field: &str) -> Option<&'a str> {
    record.get(field).and_then(Value::as_str)
}

/// Trimmed non-blank string, for fields that are only displayed.
fn display_str(record: &RawRecord, field: &str) -> Option<String> {
    optional_str(record, field)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Reads a small unsigned integer that the API may ship as a number or a string.
fn optional_uint(record: &RawRecord, field: &str) -> Option<u64> {
    match record.get(field)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Validates and converts a single raw record.
pub fn normalize_record(record: &RawRecord) -> Result<DisasterDeclaration, DashboardError> {
    let state_code = required_str(record, FIELD_STATE_CODE)?.trim().to_string();
    let incident_type = required_str(record, FIELD_INCIDENT_TYPE)?.trim().to_string();
    let incident_begin_date = parse_begin_date(record)?;
    let disaster_name = display_str(record, FIELD_DISASTER_NAME).unwrap_or_default();
    let state_name = display_str(record, FIELD_STATE_NAME)
        .or_else(|| states::find_state(&state_code).map(|info| info.name.to_string()))
        .unwrap_or_default();

    Ok(DisasterDeclaration {
        disaster_name,
        state_code,
        state_name,
        declaration_date: parse_optional_date(record, FIELD_DECLARATION_DATE),
        incident_begin_date,
        incident_end_date: parse_optional_date(record, FIELD_INCIDENT_END_DATE),
        incident_type,
        disaster_number: optional_uint(record, FIELD_DISASTER_NUMBER)
            .and_then(|n| u32::try_from(n).ok()),
        declaration_type: display_str(record, FIELD_DECLARATION_TYPE),
        region: optional_uint(record, FIELD_REGION).and_then(|n| u8::try_from(n).ok()),
    })
}

/// The registry's region for the record's state, when the record carries a
/// different one.
pub fn region_mismatch(declaration: &DisasterDeclaration) -> Option<u8> {
    let reported = declaration.region?;
    states::expected_region(&declaration.state_code).filter(|expected| *expected != reported)
}

/// Normalizes a whole raw collection. Never fails: bad records are
/// collected in `rejected` and the remainder is returned in input order.
pub fn normalize(raw: &[RawRecord]) -> NormalizedTable {
    let mut table = NormalizedTable::default();

    for (index, record) in raw.iter().enumerate() {
        match normalize_record(record) {
            Ok(declaration) => {
                if !states::is_known_state_code(&declaration.state_code) {
                    logging::debug(
                        Component::Normalize,
                        Some(&declaration.label()),
                        &format!("Unregistered state code '{}'", declaration.state_code),
                    );
                }
                if let Some(expected) = region_mismatch(&declaration) {
                    logging::warn(
                        Component::Normalize,
                        Some(&declaration.label()),
                        &format!(
                            "Region {} reported for {}, registry lists region {}",
                            declaration.region.unwrap_or_default(),
                            declaration.state_code,
                            expected
                        ),
                    );
                }
                table.records.push(declaration);
            }
            Err(error) => {
                let disaster_name = optional_str(record, FIELD_DISASTER_NAME).map(String::from);
                let record_id = format!("record {}", index);
                logging::warn(
                    Component::Normalize,
                    Some(&record_id),
                    &format!("Dropped {}: {}", disaster_name.as_deref().unwrap_or("unnamed record"), error),
                );
                table.rejected.push(RejectedRecord { index, disaster_name, error });
            }
        }
    }

    if !raw.is_empty() {
        logging::log_normalize_summary(raw.len(), table.records.len(), table.rejected.len());
    }

    table
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
