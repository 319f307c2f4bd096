/// Filtering and aggregation over normalized declarations.
///
/// Both stages are pure, single-pass transformations over an in-memory
/// table. Rendering and sorting for display are left to `report`.
///
/// Submodules:
/// - `classify`: splits declarations into active and recently-closed subsets.
/// - `groupings`: per-state and per-incident-type count tables.

pub mod classify;
pub mod groupings;
