/// Core data types for the FEMA disaster declarations dashboard.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic and no I/O, only types, constants and the error
/// taxonomy used across the pipeline.

use chrono::NaiveDateTime;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Source constants
// ---------------------------------------------------------------------------

/// OpenFEMA web disaster declarations endpoint, newest disaster first.
pub const DEFAULT_API_URL: &str =
    "https://www.fema.gov/api/open/v1/FemaWebDisasterDeclarations?$orderby=disasterNumber%20desc";

/// Key under which the endpoint returns its record collection.
pub const COLLECTION_KEY: &str = "FemaWebDisasterDeclarations";

/// Default trailing window, in days, for "recently closed" classification.
pub const DEFAULT_WINDOW_DAYS: u32 = 90;

// ---------------------------------------------------------------------------
// Source field names
// ---------------------------------------------------------------------------

pub const FIELD_DISASTER_NAME: &str = "disasterName";
pub const FIELD_STATE_CODE: &str = "stateCode";
pub const FIELD_STATE_NAME: &str = "stateName";
pub const FIELD_DECLARATION_DATE: &str = "declarationDate";
pub const FIELD_INCIDENT_BEGIN_DATE: &str = "incidentBeginDate";
pub const FIELD_INCIDENT_END_DATE: &str = "incidentEndDate";
pub const FIELD_INCIDENT_TYPE: &str = "incidentType";
pub const FIELD_DISASTER_NUMBER: &str = "disasterNumber";
pub const FIELD_DECLARATION_TYPE: &str = "declarationType";
pub const FIELD_REGION: &str = "region";

/// The seven fields every dashboard row displays.
pub const DISPLAY_FIELDS: &[&str] = &[
    FIELD_DISASTER_NAME,
    FIELD_STATE_CODE,
    FIELD_STATE_NAME,
    FIELD_DECLARATION_DATE,
    FIELD_INCIDENT_BEGIN_DATE,
    FIELD_INCIDENT_END_DATE,
    FIELD_INCIDENT_TYPE,
];

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

/// One record as delivered by the data source: field name to JSON value.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// A single incident-state disaster declaration after normalization.
///
/// All timestamps are timezone-naive. `incident_end_date == None` means the
/// incident is still open.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisasterDeclaration {
    pub disaster_name: String,
    pub state_code: String,
    pub state_name: String,
    pub declaration_date: Option<NaiveDateTime>,
    pub incident_begin_date: NaiveDateTime,
    pub incident_end_date: Option<NaiveDateTime>,
    pub incident_type: String,

    // Supplemental fields; absent or malformed values never reject a record.
    pub disaster_number: Option<u32>,
    pub declaration_type: Option<String>,
    pub region: Option<u8>,
}

impl DisasterDeclaration {
    /// True when the declaration carries an incident end date.
    pub fn has_end_date(&self) -> bool {
        self.incident_end_date.is_some()
    }

    /// Short identifier used in log lines, e.g. "DR-4834 TX".
    pub fn label(&self) -> String {
        match (&self.declaration_type, self.disaster_number) {
            (Some(kind), Some(number)) => format!("{}-{} {}", kind, number, self.state_code),
            (None, Some(number)) => format!("{} {}", number, self.state_code),
            _ => format!("{} {}", self.disaster_name, self.state_code),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching, validating or configuring the
/// dashboard pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardError {
    /// Non-2xx HTTP response from the OpenFEMA API.
    HttpError(u16),
    /// The request never produced a response (DNS, TLS, timeout, ...).
    RequestFailed(String),
    /// The response body could not be deserialized.
    ParseError(String),
    /// A required record field is absent, null or not a string.
    MissingField { field: &'static str },
    /// A required date field is present but not a recognizable timestamp.
    InvalidDate { field: &'static str, value: String },
    /// The configuration file or an override is invalid.
    Config(String),
    /// Reading or writing a local file failed.
    Io(String),
}

impl std::fmt::Display for DashboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DashboardError::HttpError(code) => write!(f, "HTTP error: {}", code),
            DashboardError::RequestFailed(msg) => write!(f, "Request failed: {}", msg),
            DashboardError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DashboardError::MissingField { field } => write!(f, "Missing field: {}", field),
            DashboardError::InvalidDate { field, value } => {
                write!(f, "Invalid date in {}: '{}'", field, value)
            }
            DashboardError::Config(msg) => write!(f, "Config error: {}", msg),
            DashboardError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for DashboardError {}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => DashboardError::HttpError(status.as_u16()),
            None => DashboardError::RequestFailed(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for DashboardError {
    fn from(err: std::io::Error) -> Self {
        DashboardError::Io(err.to_string())
    }
}
