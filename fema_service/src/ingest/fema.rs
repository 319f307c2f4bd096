/// OpenFEMA Disaster Declarations API Client
///
/// Retrieves the web disaster declarations dataset, one record per
/// incident and state, from the OpenFEMA open data API.
///
/// API Documentation: https://www.fema.gov/about/openfema/api
/// Dataset: https://www.fema.gov/openfema-data-page/fema-web-disaster-declarations-v1

use std::time::Duration;

use serde_json::Value;

use crate::logging::{self, Component};
use crate::model::{DashboardError, RawRecord, COLLECTION_KEY};

// ============================================================================
// Client Construction
// ============================================================================

/// Builds the blocking HTTP client used for every OpenFEMA request.
pub fn build_client(timeout: Duration) -> Result<reqwest::blocking::Client, DashboardError> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("fema_dashboard/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(DashboardError::from)
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Fetch the declaration collection from `url`.
///
/// One GET, no retry and no pagination. A non-2xx status is returned as
/// `DashboardError::HttpError`.
pub fn fetch_declarations(
    client: &reqwest::blocking::Client,
    url: &str,
) -> Result<Vec<RawRecord>, DashboardError> {
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()?;

    if !response.status().is_success() {
        return Err(DashboardError::HttpError(response.status().as_u16()));
    }

    let body = response.text()?;
    parse_declarations_response(&body)
}

/// Best-effort fetch: failures are logged as a visible notice and an
/// empty collection is returned so the dashboard still renders.
pub fn fetch_or_empty(client: &reqwest::blocking::Client, url: &str) -> Vec<RawRecord> {
    match fetch_declarations(client, url) {
        Ok(records) => {
            logging::info(
                Component::Fema,
                None,
                &format!("Fetched {} declaration records", records.len()),
            );
            records
        }
        Err(e) => {
            logging::log_fetch_failure(url, &e);
            Vec::new()
        }
    }
}

// ============================================================================
// Response Parsing
// ============================================================================

/// Extract the record collection from an OpenFEMA response body.
///
/// The body must be a JSON object with an array under `COLLECTION_KEY`.
/// Array elements that are not objects are skipped with a warning.
pub fn parse_declarations_response(body: &str) -> Result<Vec<RawRecord>, DashboardError> {
    let json: Value = serde_json::from_str(body)?;
    extract_collection(json)
}

/// Same as `parse_declarations_response`, for an already-decoded body.
pub fn extract_collection(json: Value) -> Result<Vec<RawRecord>, DashboardError> {
    let mut root = match json {
        Value::Object(map) => map,
        _ => return Err(DashboardError::ParseError("response body is not a JSON object".to_string())),
    };

    let items = match root.remove(COLLECTION_KEY) {
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(DashboardError::ParseError(format!("{} is not an array", COLLECTION_KEY)));
        }
        None => {
            return Err(DashboardError::ParseError(format!("missing key {}", COLLECTION_KEY)));
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(record) => records.push(record),
            other => logging::warn(
                Component::Fema,
                Some(&format!("record {}", index)),
                &format!("Skipping non-object element: {}", other),
            ),
        }
    }

    Ok(records)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_BODY: &str = r#"{
        "metadata": {"skip": 0, "top": 1000, "count": 0},
        "FemaWebDisasterDeclarations": [
            {
                "disasterNumber": 4834,
                "declarationDate": "2024-10-08T00:00:00.000Z",
                "disasterName": "HURRICANE MILTON",
                "incidentBeginDate": "2024-10-05T00:00:00.000Z",
                "incidentEndDate": null,
                "declarationType": "EM",
                "stateCode": "FL",
                "stateName": "Florida",
                "incidentType": "Hurricane",
                "region": 4
            },
            {
                "disasterNumber": 4833,
                "declarationDate": "2024-10-02T00:00:00.000Z",
                "disasterName": "SEVERE STORMS AND FLOODING",
                "incidentBeginDate": "2024-06-16T00:00:00.000Z",
                "incidentEndDate": "2024-06-23T00:00:00.000Z",
                "declarationType": "DR",
                "stateCode": "SD",
                "stateName": "South Dakota",
                "incidentType": "Flood",
                "region": 8
            }
        ]
    }"#;

    #[test]
    fn test_parse_sample_response() {
        let records = parse_declarations_response(SAMPLE_BODY).expect("sample should parse");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["stateCode"], "FL");
        assert!(records[0]["incidentEndDate"].is_null());
    }

    #[test]
    fn test_empty_collection_is_ok() {
        let records = parse_declarations_response(r#"{"FemaWebDisasterDeclarations": []}"#)
            .expect("empty collection is not an error");
        assert!(records.is_empty());
    }

    #[test]
    fn test_missing_collection_key_is_parse_error() {
        let result = parse_declarations_response(r#"{"DisasterDeclarationsSummaries": []}"#);
        assert!(matches!(result, Err(DashboardError::ParseError(msg)) if msg.contains(COLLECTION_KEY)));
    }

    #[test]
    fn test_non_object_body_is_parse_error() {
        let result = parse_declarations_response("[1, 2, 3]");
        assert!(matches!(result, Err(DashboardError::ParseError(_))));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let result = parse_declarations_response("<html>Service Unavailable</html>");
        assert!(matches!(result, Err(DashboardError::ParseError(_))));
    }

    #[test]
    fn test_non_object_elements_are_skipped() {
        let body = r#"{"FemaWebDisasterDeclarations": [{"stateCode": "TX"}, 42, null]}"#;
        let records = parse_declarations_response(body).unwrap();
        assert_eq!(records.len(), 1);
    }
}
