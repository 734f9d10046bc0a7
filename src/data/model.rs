use std::collections::BTreeSet;

use serde::Deserialize;

use super::region::is_aggregate;

// ---------------------------------------------------------------------------
// RawRow – one textual row as extracted from the source table
// ---------------------------------------------------------------------------

/// A single row after header-based field extraction, before any coercion.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRow {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub co2_per_capita: String,
}

// ---------------------------------------------------------------------------
// Observation – one (country, year, value) fact
// ---------------------------------------------------------------------------

/// One CO₂-per-capita reading. `value` is `None` when the source cell was
/// empty or not a number; the row is still kept so the year axis stays valid.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub country: String,
    pub year: i32,
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(country: &str, year: i32, value: Option<f64>) -> Self {
        Self {
            country: country.to_string(),
            year,
            value,
        }
    }
}

/// A plotted point: one year and its value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

impl YearValue {
    pub fn new(year: i32, value: f64) -> Self {
        Self { year, value }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the immutable working table
// ---------------------------------------------------------------------------

/// The working dataset, built once at load time and never mutated.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Observations in input order.
    pub observations: Vec<Observation>,
    /// Sorted set of every distinct country label (aggregates included).
    pub countries: BTreeSet<String>,
    /// Rows rejected at ingest because their year could not be parsed.
    pub dropped_rows: usize,
}

impl Dataset {
    /// Build the dataset from already-validated observations.
    pub fn from_observations(observations: Vec<Observation>, dropped_rows: usize) -> Self {
        let countries = observations.iter().map(|o| o.country.clone()).collect();
        Dataset {
            observations,
            countries,
            dropped_rows,
        }
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Number of observations carrying a numeric value.
    pub fn numeric_count(&self) -> usize {
        self.observations.iter().filter(|o| o.value.is_some()).count()
    }

    pub fn contains_country(&self, country: &str) -> bool {
        self.countries.contains(country)
    }

    /// Labels that classify as real countries, sorted. Feeds the dropdown.
    pub fn real_countries(&self) -> Vec<&str> {
        self.countries
            .iter()
            .map(String::as_str)
            .filter(|c| !is_aggregate(c))
            .collect()
    }

    /// All observations for one country label, in input order.
    pub fn observations_for<'a>(
        &'a self,
        country: &'a str,
    ) -> impl Iterator<Item = &'a Observation> + 'a {
        self.observations.iter().filter(move |o| o.country == country)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_observations(
            vec![
                Observation::new("France", 2000, Some(6.0)),
                Observation::new("World", 2000, Some(4.0)),
                Observation::new("Brazil", 2000, None),
                Observation::new("France", 2001, Some(5.9)),
            ],
            2,
        )
    }

    #[test]
    fn countries_are_sorted_and_deduplicated() {
        let ds = sample();
        let names: Vec<&str> = ds.countries.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["Brazil", "France", "World"]);
        assert_eq!(ds.len(), 4);
        assert_eq!(ds.dropped_rows, 2);
    }

    #[test]
    fn real_countries_skip_aggregates() {
        let ds = sample();
        assert_eq!(ds.real_countries(), vec!["Brazil", "France"]);
    }

    #[test]
    fn numeric_count_ignores_absent_values() {
        assert_eq!(sample().numeric_count(), 3);
    }
}
