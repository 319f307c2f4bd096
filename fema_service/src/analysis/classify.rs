/// Active / recently-closed classification.
///
/// - **Active**: no `incident_end_date`, regardless of how old the incident is.
/// - **Recently closed**: has an end date AND `incident_begin_date` falls on
///   or after `now - window_days`.
///
/// The recent window is measured on the *begin* date. An incident that began
/// long ago and closed yesterday is in neither subset.
///
/// # Clock injection
/// `classify_at` takes the reference instant as a parameter. `classify`
/// resolves it from `ClassifyOptions`, falling back to wall-clock local time
/// only when none was supplied.

use chrono::{Duration, Local, NaiveDateTime};

use crate::logging::{self, Component};
use crate::model::{DisasterDeclaration, DEFAULT_WINDOW_DAYS};

// ---------------------------------------------------------------------------
// Options and output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifyOptions {
    /// Length of the trailing recent window in days.
    pub window_days: u32,
    /// Instant the window is measured back from. `None` means "now".
    pub reference_instant: Option<NaiveDateTime>,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            reference_instant: None,
        }
    }
}

impl ClassifyOptions {
    /// The reference instant to use, reading the local clock if none was injected.
    pub fn resolve_reference(&self) -> NaiveDateTime {
        self.reference_instant
            .unwrap_or_else(|| Local::now().naive_local())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub active: Vec<DisasterDeclaration>,
    pub recently_closed: Vec<DisasterDeclaration>,
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Earliest begin date still inside the window. Saturates at the earliest
/// representable instant, so an oversized window counts every begin date.
pub fn window_start(now: NaiveDateTime, window_days: u32) -> NaiveDateTime {
    now.checked_sub_signed(Duration::days(i64::from(window_days)))
        .unwrap_or(NaiveDateTime::MIN)
}

pub fn is_active(declaration: &DisasterDeclaration) -> bool {
    declaration.incident_end_date.is_none()
}

/// Inclusive at the boundary: a begin date exactly `window_days` before
/// `now` is recent.
pub fn is_recently_closed_at(
    declaration: &DisasterDeclaration,
    now: NaiveDateTime,
    window_days: u32,
) -> bool {
    declaration.incident_end_date.is_some()
        && declaration.incident_begin_date >= window_start(now, window_days)
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Splits `records` into the active and recently-closed subsets, preserving
/// input order within each.
pub fn classify_at(
    records: &[DisasterDeclaration],
    now: NaiveDateTime,
    window_days: u32,
) -> Classification {
    let mut result = Classification::default();

    for declaration in records {
        if is_active(declaration) {
            result.active.push(declaration.clone());
        } else if is_recently_closed_at(declaration, now, window_days) {
            result.recently_closed.push(declaration.clone());
        }
    }

    logging::debug(
        Component::Classify,
        None,
        &format!(
            "{} active, {} closed since {} ({} of {} records unclassified)",
            result.active.len(),
            result.recently_closed.len(),
            window_start(now, window_days).format("%Y-%m-%d"),
            records.len() - result.active.len() - result.recently_closed.len(),
            records.len()
        ),
    );

    result
}

/// Convenience wrapper that resolves the reference instant from `options`.
/// Use `classify_at` in tests to keep them deterministic.
pub fn classify(records: &[DisasterDeclaration], options: &ClassifyOptions) -> Classification {
    classify_at(records, options.resolve_reference(), options.window_days)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
