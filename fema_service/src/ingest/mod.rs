/// Data acquisition for the dashboard.
///
/// Submodules:
/// - `fema`: OpenFEMA HTTP client and response parsing.
/// - `cache`: session-owned, URL-keyed fetch cache.
/// - `normalize`: record validation and timezone-naive date parsing.

pub mod cache;
pub mod fema;
pub mod normalize;
