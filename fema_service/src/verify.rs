//! Data Source Verification Module
//!
//! Checks the configured OpenFEMA endpoint against the live API: whether it
//! answers, whether the record collection is where the normalizer expects
//! it, and how completely the fields the dashboard depends on are filled.
//!
//! Use this before pointing the dashboard at a new endpoint or dataset version.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ingest::fema;
use crate::ingest::normalize::parse_timestamp;
use crate::model::*;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldCoverage {
    pub field: String,
    /// Records where the field holds a non-empty string.
    pub present: usize,
    /// For date fields, records where the value also parses.
    pub parseable: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointVerification {
    pub timestamp: String,
    pub url: String,
    pub status: VerificationStatus,
    pub reachable: bool,
    pub http_status: Option<u16>,
    pub collection_found: bool,
    pub record_count: usize,
    pub field_coverage: Vec<FieldCoverage>,
    pub error_message: Option<String>,
}

// ============================================================================
// Field Coverage
// ============================================================================

fn is_date_field(field: &str) -> bool {
    matches!(
        field,
        FIELD_DECLARATION_DATE | FIELD_INCIDENT_BEGIN_DATE | FIELD_INCIDENT_END_DATE
    )
}

/// Counts how many records carry each display field.
pub fn field_coverage(records: &[RawRecord]) -> Vec<FieldCoverage> {
    DISPLAY_FIELDS
        .iter()
        .map(|&field| {
            let values: Vec<&str> = records
                .iter()
                .filter_map(|r| r.get(field).and_then(Value::as_str))
                .filter(|s| !s.trim().is_empty())
                .collect();
            let parseable = is_date_field(field)
                .then(|| values.iter().filter(|v| parse_timestamp(v).is_some()).count());

            FieldCoverage {
                field: field.to_string(),
                present: values.len(),
                parseable,
            }
        })
        .collect()
}

/// Fields every record must carry. `incidentEndDate` and `declarationDate`
/// are legitimately sparse.
fn coverage_is_complete(coverage: &[FieldCoverage], record_count: usize) -> bool {
    coverage
        .iter()
        .filter(|c| c.field != FIELD_INCIDENT_END_DATE && c.field != FIELD_DECLARATION_DATE)
        .all(|c| c.present == record_count && c.parseable.unwrap_or(record_count) == record_count)
}

/// Grades a response body that was received with a success status.
pub fn assess_body(url: &str, body: &str) -> EndpointVerification {
    let mut result = EndpointVerification {
        timestamp: Utc::now().to_rfc3339(),
        url: url.to_string(),
        status: VerificationStatus::Failed,
        reachable: true,
        http_status: Some(200),
        collection_found: false,
        record_count: 0,
        field_coverage: Vec::new(),
        error_message: None,
    };

    match fema::parse_declarations_response(body) {
        Ok(records) => {
            result.collection_found = true;
            result.record_count = records.len();
            result.field_coverage = field_coverage(&records);

            result.status = if !records.is_empty()
                && coverage_is_complete(&result.field_coverage, records.len())
            {
                VerificationStatus::Success
            } else {
                VerificationStatus::PartialSuccess
            };
        }
        Err(e) => {
            result.error_message = Some(e.to_string());
        }
    }

    result
}

// ============================================================================
// Endpoint Verification
// ============================================================================

pub fn verify_endpoint(client: &reqwest::blocking::Client, url: &str) -> EndpointVerification {
    let failed = |http_status: Option<u16>, reachable: bool, message: String| EndpointVerification {
        timestamp: Utc::now().to_rfc3339(),
        url: url.to_string(),
        status: VerificationStatus::Failed,
        reachable,
        http_status,
        collection_found: false,
        record_count: 0,
        field_coverage: Vec::new(),
        error_message: Some(message),
    };

    let response = match client.get(url).header("Accept", "application/json").send() {
        Ok(response) => response,
        Err(e) => return failed(None, false, format!("Request failed: {}", e)),
    };

    let status = response.status();
    if !status.is_success() {
        return failed(Some(status.as_u16()), true, format!("HTTP {}", status));
    }

    match response.text() {
        Ok(body) => {
            let mut result = assess_body(url, &body);
            result.http_status = Some(status.as_u16());
            result
        }
        Err(e) => failed(Some(status.as_u16()), true, format!("Failed to read body: {}", e)),
    }
}

pub fn print_verification(result: &EndpointVerification) {
    println!("═══════════════════════════════════════════════════════════");
    println!("ENDPOINT VERIFICATION");
    println!("═══════════════════════════════════════════════════════════");
    println!("URL:         {}", result.url);
    println!("Status:      {:?}", result.status);
    println!(
        "HTTP:        {}",
        result.http_status.map(|s| s.to_string()).unwrap_or_else(|| "no response".to_string())
    );
    println!("Collection:  {}", if result.collection_found { "found" } else { "missing" });
    println!("Records:     {}", result.record_count);

    if !result.field_coverage.is_empty() {
        println!();
        println!("Field coverage:");
        for c in &result.field_coverage {
            match c.parseable {
                Some(parsed) => println!(
                    "  {:<18} {:>6}/{} present, {} parseable",
                    c.field, c.present, result.record_count, parsed
                ),
                None => println!("  {:<18} {:>6}/{} present", c.field, c.present, result.record_count),
            }
        }
    }

    if let Some(error) = &result.error_message {
        println!();
        println!("Error: {}", error);
    }
    println!("═══════════════════════════════════════════════════════════");
}
