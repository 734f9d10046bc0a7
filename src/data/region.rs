// ---------------------------------------------------------------------------
// Aggregate / region classification
// ---------------------------------------------------------------------------

/// Lower-case keywords marking continents, income tiers, blocs and
/// sub-regions. Matched as substrings of the lower-cased label.
const AGGREGATE_KEYWORDS: &[&str] = &[
    "africa",
    "asia",
    "europe",
    "oceania",
    "north america",
    "south america",
    "latin america",
    "americas",
    "antarctica",
    "world",
    "european union",
    "eu",
    "income",
    "high-income",
    "low-income",
    "upper-middle",
    "lower-middle",
    "oecd",
    "sub-saharan",
    "middle east",
    "caribbean",
    "micronesia",
    "melanesia",
    "polynesia",
    "international transport",
    "international aviation",
    "international shipping",
    "kuwaiti oil fires",
];

/// Whether a country label denotes an aggregate (continent, bloc, income
/// tier...) rather than a real country.
///
/// Empty labels and anything carrying a parenthesised qualifier such as
/// `"Africa (GCP)"` are aggregates.
pub fn is_aggregate(label: &str) -> bool {
    let trimmed = label.trim();
    if trimmed.is_empty() || trimmed.contains(['(', ')']) {
        return true;
    }

    let lower = trimmed.to_lowercase();
    AGGREGATE_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::is_aggregate;

    #[test]
    fn known_aggregates() {
        assert!(is_aggregate("World"));
        assert!(is_aggregate("Sub-Saharan Africa (GCP)"));
        assert!(is_aggregate("OECD"));
        assert!(is_aggregate("Eastern Europe"));
        assert!(is_aggregate("European Union (27)"));
        assert!(is_aggregate("High-income countries"));
        assert!(is_aggregate("Lower-middle-income countries"));
        assert!(is_aggregate("Latin America and the Caribbean"));
        assert!(is_aggregate("EU-27"));
        assert!(is_aggregate("Euro area"));
        assert!(is_aggregate("EU28"));
        assert!(is_aggregate("Africa (GCP)"));
    }

    #[test]
    fn real_countries() {
        assert!(!is_aggregate("France"));
        assert!(!is_aggregate("Brazil"));
        assert!(!is_aggregate("Peru"));
        assert!(!is_aggregate("United States"));
        assert!(!is_aggregate("Malaysia"));
    }

    #[test]
    fn substring_rule_catches_country_names_containing_a_continent() {
        // Plain substring match: a continent inside a country name counts.
        assert!(is_aggregate("South Africa"));
    }

    #[test]
    fn empty_and_blank_labels_are_aggregates() {
        assert!(is_aggregate(""));
        assert!(is_aggregate("   "));
    }

    #[test]
    fn matching_ignores_case() {
        assert!(is_aggregate("WORLD"));
        assert!(is_aggregate("middle EAST"));
    }
}
