/// State and territory registry for the disaster declarations dashboard.
///
/// Lists the two-letter codes OpenFEMA uses in `stateCode`, with display
/// names. The registry is for diagnostics and labels only. Aggregation
/// never pads its output with registry entries and normalization never
/// drops a record because its code is missing here.

// ---------------------------------------------------------------------------
// State metadata
// ---------------------------------------------------------------------------

/// Metadata for one declaring jurisdiction.
pub struct StateInfo {
    /// USPS two-letter code, as it appears in `stateCode`.
    pub code: &'static str,
    pub name: &'static str,
    /// FEMA region (1-10) responsible for the jurisdiction.
    pub fema_region: u8,
}

const fn state(code: &'static str, name: &'static str, fema_region: u8) -> StateInfo {
    StateInfo { code, name, fema_region }
}

/// Every jurisdiction that can appear in a FEMA declaration.
pub static STATE_REGISTRY: &[StateInfo] = &[
    state("AL", "Alabama", 4),
    state("AK", "Alaska", 10),
    state("AZ", "Arizona", 9),
    state("AR", "Arkansas", 6),
    state("CA", "California", 9),
    state("CO", "Colorado", 8),
    state("CT", "Connecticut", 1),
    state("DE", "Delaware", 3),
    state("DC", "District of Columbia", 3),
    state("FL", "Florida", 4),
    state("GA", "Georgia", 4),
    state("HI", "Hawaii", 9),
    state("ID", "Idaho", 10),
    state("IL", "Illinois", 5),
    state("IN", "Indiana", 5),
    state("IA", "Iowa", 7),
    state("KS", "Kansas", 7),
    state("KY", "Kentucky", 4),
    state("LA", "Louisiana", 6),
    state("ME", "Maine", 1),
    state("MD", "Maryland", 3),
    state("MA", "Massachusetts", 1),
    state("MI", "Michigan", 5),
    state("MN", "Minnesota", 5),
    state("MS", "Mississippi", 4),
    state("MO", "Missouri", 7),
    state("MT", "Montana", 8),
    state("NE", "Nebraska", 7),
    state("NV", "Nevada", 9),
    state("NH", "New Hampshire", 1),
    state("NJ", "New Jersey", 2),
    state("NM", "New Mexico", 6),
    state("NY", "New York", 2),
    state("NC", "North Carolina", 4),
    state("ND", "North Dakota", 8),
    state("OH", "Ohio", 5),
    state("OK", "Oklahoma", 6),
    state("OR", "Oregon", 10),
    state("PA", "Pennsylvania", 3),
    state("RI", "Rhode Island", 1),
    state("SC", "South Carolina", 4),
    state("SD", "South Dakota", 8),
    state("TN", "Tennessee", 4),
    state("TX", "Texas", 6),
    state("UT", "Utah", 8),
    state("VT", "Vermont", 1),
    state("VA", "Virginia", 3),
    state("WA", "Washington", 10),
    state("WV", "West Virginia", 3),
    state("WI", "Wisconsin", 5),
    state("WY", "Wyoming", 8),
    // Territories and freely associated states
    state("AS", "American Samoa", 9),
    state("GU", "Guam", 9),
    state("MP", "Northern Mariana Islands", 9),
    state("PR", "Puerto Rico", 2),
    state("VI", "U.S. Virgin Islands", 2),
    state("FM", "Federated States of Micronesia", 9),
    state("MH", "Marshall Islands", 9),
    state("PW", "Palau", 9),
];

/// Looks up a jurisdiction by code. Returns `None` if not found.
pub fn find_state(code: &str) -> Option<&'static StateInfo> {
    STATE_REGISTRY.iter().find(|s| s.code == code)
}

pub fn is_known_state_code(code: &str) -> bool {
    find_state(code).is_some()
}

/// FEMA region the registry assigns to `code`.
pub fn expected_region(code: &str) -> Option<u8> {
    find_state(code).map(|info| info.fema_region)
}

/// Display label for a code: "TX (Texas)", or the bare code if unknown.
pub fn display_label(code: &str) -> String {
    match find_state(code) {
        Some(info) => format!("{} ({})", info.code, info.name),
        None => code.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
