use std::collections::BTreeMap;

use thiserror::Error;

use super::model::{Dataset, Observation, YearValue};
use super::region::is_aggregate;
use crate::config::StoryConfig;
use crate::scene::{Scene, ViewRequest};

// ---------------------------------------------------------------------------
// Derived view types
// ---------------------------------------------------------------------------

/// Caller-side input errors. Missing data is never an error; it is reported
/// through [`SceneView::Empty`] or [`ExplorerView::NoNumericHistory`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("country '{0}' does not appear in the dataset")]
    UnknownCountry(String),
}

/// Why a scene has nothing to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// No observation carries a numeric value.
    NoNumericData,
    /// No real country has a numeric value in any year.
    NoQualifyingCountries,
    /// The explorer scene is active but nothing is selected.
    NoCountrySelected,
}

impl EmptyReason {
    /// Fallback text shown instead of an empty chart.
    pub fn message(self) -> &'static str {
        match self {
            EmptyReason::NoNumericData => "No CO₂ per-capita values available to average.",
            EmptyReason::NoQualifyingCountries => {
                "No country has CO₂ per-capita values to rank."
            }
            EmptyReason::NoCountrySelected => "Pick a country to explore its history.",
        }
    }
}

/// Full numeric history of one country, ascending by year.
#[derive(Debug, Clone, PartialEq)]
pub struct CountrySeries {
    pub country: String,
    /// Value in the ranking year.
    pub latest: f64,
    pub points: Vec<YearValue>,
}

/// Representative magnitudes of the ranked values, for a bubble-size legend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeLegend {
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

/// Scene 1: top emitters of the latest well-covered year.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadersView {
    pub year: i32,
    /// `true` when no year reached the coverage floor and the latest year
    /// with any reading was used instead.
    pub coverage_fallback: bool,
    /// Ordered by ranking-year value, highest first.
    pub leaders: Vec<CountrySeries>,
    pub legend: SizeLegend,
}

/// Scene 2: one country's history.
#[derive(Debug, Clone, PartialEq)]
pub enum ExplorerView {
    Series {
        country: String,
        year_extent: (i32, i32),
        points: Vec<YearValue>,
    },
    /// The country has rows but none with a numeric value. The year extent
    /// still lets the caller draw a correctly scaled axis.
    NoNumericHistory {
        country: String,
        year_extent: (i32, i32),
    },
}

impl ExplorerView {
    pub fn country(&self) -> &str {
        match self {
            ExplorerView::Series { country, .. } | ExplorerView::NoNumericHistory { country, .. } => {
                country
            }
        }
    }

    /// Year range over every row of the country, absent values included.
    pub fn year_extent(&self) -> (i32, i32) {
        match self {
            ExplorerView::Series { year_extent, .. }
            | ExplorerView::NoNumericHistory { year_extent, .. } => *year_extent,
        }
    }

    pub fn points(&self) -> &[YearValue] {
        match self {
            ExplorerView::Series { points, .. } => points,
            ExplorerView::NoNumericHistory { .. } => &[],
        }
    }
}

/// Render-ready data for the active scene.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneView {
    GlobalAverage(Vec<YearValue>),
    LeadingEmitters(LeadersView),
    CountryExplorer(ExplorerView),
    Empty(EmptyReason),
}

impl SceneView {
    /// Caption drawn over the chart, derived from the data it shows.
    pub fn annotation(&self) -> Option<String> {
        match self {
            SceneView::GlobalAverage(points) => {
                let peak = points.iter().max_by(|a, b| a.value.total_cmp(&b.value))?;
                Some(format!(
                    "Average emissions peaked in {} at {:.2} t per person",
                    peak.year, peak.value
                ))
            }
            SceneView::LeadingEmitters(view) => {
                let top = view.leaders.first()?;
                let mut text = format!(
                    "{} led {} at {:.2} t per person",
                    top.country, view.year, top.latest
                );
                if view.coverage_fallback {
                    text.push_str(" (few countries reported that year)");
                }
                Some(text)
            }
            SceneView::CountryExplorer(ExplorerView::Series { country, points, .. }) => {
                let last = points.last()?;
                Some(format!(
                    "{country}: {:.2} t per person in {}",
                    last.value, last.year
                ))
            }
            SceneView::CountryExplorer(ExplorerView::NoNumericHistory {
                country,
                year_extent: (from, to),
            }) => Some(format!("No CO₂ readings for {country} between {from} and {to}")),
            SceneView::Empty(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Scene 0 – global average
// ---------------------------------------------------------------------------

/// Arithmetic mean of all numeric values per year, ascending by year.
///
/// With `include_aggregates == false`, labels classified as aggregates are
/// left out of the mean.
pub fn global_average(dataset: &Dataset, include_aggregates: bool) -> Vec<YearValue> {
    let mut by_year: BTreeMap<i32, (f64, usize)> = BTreeMap::new();

    for obs in &dataset.observations {
        let Some(value) = obs.value else {
            continue;
        };
        if !include_aggregates && is_aggregate(&obs.country) {
            continue;
        }
        let slot = by_year.entry(obs.year).or_insert((0.0, 0));
        slot.0 += value;
        slot.1 += 1;
    }

    by_year
        .into_iter()
        .map(|(year, (sum, n))| YearValue::new(year, sum / n as f64))
        .collect()
}

// ---------------------------------------------------------------------------
// Scene 1 – leading emitters
// ---------------------------------------------------------------------------

/// Pick the latest year with at least `min_coverage` real-country readings
/// (falling back to the latest year with any), rank that year's readings
/// and return the `top_k` leaders with their full history.
///
/// Returns `None` when no real country has a numeric value at all.
pub fn leading_emitters(
    dataset: &Dataset,
    top_k: usize,
    min_coverage: usize,
) -> Option<LeadersView> {
    let candidates: Vec<(&Observation, f64)> = dataset
        .observations
        .iter()
        .filter(|o| !is_aggregate(&o.country))
        .filter_map(|o| o.value.map(|v| (o, v)))
        .collect();

    let mut coverage: BTreeMap<i32, usize> = BTreeMap::new();
    for (obs, _) in &candidates {
        *coverage.entry(obs.year).or_default() += 1;
    }

    let covered = coverage
        .iter()
        .rev()
        .find(|(_, n)| **n >= min_coverage)
        .map(|(year, _)| *year);
    let (year, coverage_fallback) = match covered {
        Some(year) => (year, false),
        None => (*coverage.keys().next_back()?, true),
    };
    if coverage_fallback {
        log::debug!("No year reaches {min_coverage} readings; ranking latest year {year}");
    }

    let mut ranked: Vec<(&str, f64)> = candidates
        .iter()
        .filter(|(obs, _)| obs.year == year)
        .map(|(obs, v)| (obs.country.as_str(), *v))
        .collect();
    // Stable: equal values keep input order.
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut leaders: Vec<CountrySeries> = Vec::with_capacity(top_k);
    for (country, latest) in ranked {
        if leaders.len() == top_k {
            break;
        }
        if leaders.iter().any(|l| l.country == country) {
            continue;
        }
        leaders.push(CountrySeries {
            country: country.to_string(),
            latest,
            points: numeric_series(dataset, country),
        });
    }

    let mut values: Vec<f64> = leaders.iter().map(|l| l.latest).collect();
    values.sort_by(f64::total_cmp);
    let legend = SizeLegend {
        min: *values.first()?,
        median: quantile_sorted(&values, 0.5)?,
        max: *values.last()?,
    };

    Some(LeadersView {
        year,
        coverage_fallback,
        leaders,
        legend,
    })
}

/// Linear-interpolated quantile of an ascending slice (`p` in `0..=1`).
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let h = (n - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    if lo + 1 >= n {
        return Some(sorted[n - 1]);
    }
    Some(sorted[lo] + (h - lo as f64) * (sorted[lo + 1] - sorted[lo]))
}

// ---------------------------------------------------------------------------
// Scene 2 – country explorer
// ---------------------------------------------------------------------------

/// Project one country's slice of the dataset.
pub fn country_explorer(dataset: &Dataset, country: &str) -> Result<ExplorerView, ViewError> {
    let years = dataset.observations_for(country).map(|o| o.year);
    let year_extent = years
        .fold(None, |acc: Option<(i32, i32)>, y| match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
        })
        .ok_or_else(|| ViewError::UnknownCountry(country.to_string()))?;

    let points = numeric_series(dataset, country);
    let country = country.to_string();
    if points.is_empty() {
        Ok(ExplorerView::NoNumericHistory {
            country,
            year_extent,
        })
    } else {
        Ok(ExplorerView::Series {
            country,
            year_extent,
            points,
        })
    }
}

/// Numeric readings of one country, ascending by year (stable for repeats).
fn numeric_series(dataset: &Dataset, country: &str) -> Vec<YearValue> {
    let mut points: Vec<YearValue> = dataset
        .observations_for(country)
        .filter_map(|o| o.value.map(|v| YearValue::new(o.year, v)))
        .collect();
    points.sort_by_key(|p| p.year);
    points
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Compute the derived view for a request. Pure: the same dataset, request
/// and config always give the same view.
pub fn compute_view(
    dataset: &Dataset,
    request: &ViewRequest,
    config: &StoryConfig,
) -> Result<SceneView, ViewError> {
    let view = match request.scene {
        Scene::GlobalAverage => {
            let points = global_average(dataset, config.include_aggregates_in_average);
            if points.is_empty() {
                SceneView::Empty(EmptyReason::NoNumericData)
            } else {
                SceneView::GlobalAverage(points)
            }
        }
        Scene::LeadingEmitters => leading_emitters(dataset, config.top_k, config.min_coverage)
            .map(SceneView::LeadingEmitters)
            .unwrap_or(SceneView::Empty(EmptyReason::NoQualifyingCountries)),
        Scene::CountryExplorer => match request.selected_country.as_deref() {
            Some(country) => SceneView::CountryExplorer(country_explorer(dataset, country)?),
            None => SceneView::Empty(EmptyReason::NoCountrySelected),
        },
    };
    Ok(view)
}

// ---------------------------------------------------------------------------
// Chart helpers
// ---------------------------------------------------------------------------

/// Largest value across several series; the y-axis runs from zero to it.
pub fn value_max<'a, I>(series: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a [YearValue]>,
{
    series
        .into_iter()
        .flat_map(|s| s.iter().map(|p| p.value))
        .max_by(f64::total_cmp)
}

/// Hover text for one point.
pub fn tooltip_label(country: &str, year: i32, value: f64) -> String {
    format!("{country} ({year}): {value:.2}")
}
