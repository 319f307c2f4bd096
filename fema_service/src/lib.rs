//! FEMA disaster declarations dashboard.
//!
//! Fetches the OpenFEMA web disaster declarations dataset, splits it into
//! active and recently closed incidents, and summarizes each subset by
//! state and by incident type.
//!
//! Pipeline: `ingest::fema` → `ingest::normalize` → `analysis::classify`
//! → `analysis::groupings` → `report`, orchestrated by `session`.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod replay;
pub mod report;
pub mod session;
pub mod states;
pub mod verify;
