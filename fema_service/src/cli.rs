//! Command-line flags for the `fema_dashboard` binary.

use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::config::DashboardConfig;
use crate::ingest::normalize::parse_timestamp;
use crate::model::DashboardError;

pub const USAGE: &str = "\
Usage: fema_dashboard [OPTIONS]

Options:
  --config <PATH>         TOML config file (default: ./fema_dashboard.toml if present)
  --snapshot <PATH>       Read records from a saved response instead of the API
  --save-snapshot <PATH>  Save the fetched records before rendering
  --as-of <DATE>          Reference instant, e.g. 2024-02-01 or 2024-02-01T12:00:00
  --window-days <N>       Recently-closed window in days (default: 90)
  --json                  Print the report as JSON
  --verify                Check the configured endpoint and exit
  -h, --help              Show this help
";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub snapshot: Option<PathBuf>,
    pub save_snapshot: Option<PathBuf>,
    pub as_of: Option<NaiveDateTime>,
    pub window_days: Option<u32>,
    pub json: bool,
    pub verify: bool,
    pub help: bool,
}

impl CliArgs {
    /// Flags win over the file and the environment.
    pub fn apply_to(&self, config: &mut DashboardConfig) -> Result<(), DashboardError> {
        if let Some(path) = &self.snapshot {
            config.source.snapshot = Some(path.clone());
        }
        if let Some(days) = self.window_days {
            config.classify.window_days = days;
        }
        config.validate()
    }
}

/// Parses arguments, excluding the program name.
pub fn parse_args<I>(args: I) -> Result<CliArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(a) = args.next() {
        let mut value = |flag: &str| args.next().ok_or_else(|| format!("{} needs a value", flag));

        match a.as_str() {
            "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
            "--snapshot" => parsed.snapshot = Some(PathBuf::from(value("--snapshot")?)),
            "--save-snapshot" => parsed.save_snapshot = Some(PathBuf::from(value("--save-snapshot")?)),
            "--as-of" => {
                let raw = value("--as-of")?;
                let instant = parse_timestamp(&raw)
                    .ok_or_else(|| format!("--as-of: cannot parse '{}' as a date", raw))?;
                parsed.as_of = Some(instant);
            }
            "--window-days" => {
                let raw = value("--window-days")?;
                let days: u32 = raw
                    .parse()
                    .map_err(|_| format!("--window-days: '{}' is not a whole number", raw))?;
                parsed.window_days = Some(days);
            }
            "--json" => parsed.json = true,
            "--verify" => parsed.verify = true,
            "-h" | "--help" => parsed.help = true,
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }

    if parsed.snapshot.is_some() && parsed.save_snapshot.is_some() {
        return Err("--snapshot and --save-snapshot cannot be combined".to_string());
    }

    Ok(parsed)
}
