/// Structured logging for the disaster declarations dashboard
///
/// Provides context-rich logging with pipeline component tags, optional
/// record identifiers, timestamps, and severity levels. Supports both
/// console output and file-based logging.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    Fema,
    Normalize,
    Classify,
    Cache,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Fema => write!(f, "FEMA"),
            Component::Normalize => write!(f, "NORM"),
            Component::Classify => write!(f, "CLASS"),
            Component::Cache => write!(f, "CACHE"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - the API is rate limiting or briefly unavailable
    Expected,
    /// Unexpected failure - indicates an API change or configuration issue
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    fn log(&self, level: LogLevel, component: &Component, record_id: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let record_part = record_id.map(|s| format!(" [{}]", s)).unwrap_or_default();
        let log_entry = format_entry(&timestamp.to_string(), level, component, &record_part, message);

        // Console output goes to stderr so report output on stdout stays clean
        if self.console_timestamps {
            eprintln!("{}", log_entry);
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", component, record_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", component, record_part, message),
                LogLevel::Info => eprintln!("   {}", message),
                LogLevel::Debug => eprintln!("   [DEBUG] {}{}: {}", component, record_part, message),
            }
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

fn format_entry(
    timestamp: &str,
    level: LogLevel,
    component: &Component,
    record_part: &str,
    message: &str,
) -> String {
    format!("{} {} {}{}: {}", timestamp, level, component, record_part, message)
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn dispatch(level: LogLevel, component: Component, record_id: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, &component, record_id, message);
        }
    }
}

/// Log a general informational message
pub fn info(component: Component, record_id: Option<&str>, message: &str) {
    dispatch(LogLevel::Info, component, record_id, message);
}

/// Log a warning message
pub fn warn(component: Component, record_id: Option<&str>, message: &str) {
    dispatch(LogLevel::Warning, component, record_id, message);
}

/// Log an error message
pub fn error(component: Component, record_id: Option<&str>, message: &str) {
    dispatch(LogLevel::Error, component, record_id, message);
}

/// Log a debug message
pub fn debug(component: Component, record_id: Option<&str>, message: &str) {
    dispatch(LogLevel::Debug, component, record_id, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify an OpenFEMA fetch failure from its error message
pub fn classify_fetch_failure(error_message: &str) -> FailureType {
    // 429 and 503 are what OpenFEMA returns while throttling or deploying
    if error_message.contains("HTTP error: 429") || error_message.contains("HTTP error: 503") {
        FailureType::Expected
    }
    else if error_message.contains("HTTP error") {
        FailureType::Unexpected
    }
    // Parse errors suggest the response shape changed
    else if error_message.contains("Parse error") {
        FailureType::Unexpected
    }
    // Timeouts and connection resets could be either side's fault
    else {
        FailureType::Unknown
    }
}

/// Log a fetch failure with automatic classification.
///
/// Every classification is at least a warning: a failed fetch empties the
/// dashboard and the user has to see why.
pub fn log_fetch_failure(url: &str, err: &dyn std::error::Error) {
    let error_msg = err.to_string();
    let failure_type = classify_fetch_failure(&error_msg);

    let message = format!(
        "Fetch of {} failed [{}]: {}",
        url,
        failure_type,
        error_msg
    );

    match failure_type {
        FailureType::Unexpected => error(Component::Fema, None, &message),
        FailureType::Expected | FailureType::Unknown => warn(Component::Fema, None, &message),
    }
}

// ---------------------------------------------------------------------------
// Normalization Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of a normalization pass
pub fn log_normalize_summary(total: usize, accepted: usize, rejected: usize) {
    let message = format!(
        "Normalized {}/{} records, {} rejected",
        accepted,
        total,
        rejected
    );

    if rejected == 0 {
        info(Component::Normalize, None, &message);
    } else if accepted == 0 {
        error(Component::Normalize, None, &message);
    } else {
        warn(Component::Normalize, None, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_log_level_parses_case_insensitively() {
        assert_eq!("DEBUG".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!(" warn ".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_failure_classification() {
        assert_eq!(classify_fetch_failure("HTTP error: 503"), FailureType::Expected);
        assert_eq!(classify_fetch_failure("HTTP error: 404"), FailureType::Unexpected);
        assert_eq!(
            classify_fetch_failure("Parse error: missing key FemaWebDisasterDeclarations"),
            FailureType::Unexpected
        );
        assert_eq!(
            classify_fetch_failure("Request failed: operation timed out"),
            FailureType::Unknown
        );
    }

    #[test]
    fn test_entry_format_includes_component_and_record() {
        let entry = format_entry(
            "2024-02-01 00:00:00 UTC",
            LogLevel::Warning,
            &Component::Normalize,
            " [record 3]",
            "dropped",
        );
        assert_eq!(entry, "2024-02-01 00:00:00 UTC WARN NORM [record 3]: dropped");
    }
}
