use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Story configuration
// ---------------------------------------------------------------------------

/// Tunables for scene selection. Every field has a default so a partial
/// JSON file only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoryConfig {
    /// How many leading emitters the ranking scene shows.
    pub top_k: usize,
    /// Minimum number of real-country readings a year needs before it is
    /// picked as the "latest" ranking year.
    pub min_coverage: usize,
    /// Whether aggregate labels ("World", continents...) take part in the
    /// yearly global mean.
    pub include_aggregates_in_average: bool,
    /// Draw latest-year bubbles and the min/median/max size legend.
    pub show_size_legend: bool,
    /// Country pre-selected in the explorer scene, if present in the data.
    pub default_country: Option<String>,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self::simple()
    }
}

impl StoryConfig {
    /// Five leaders, ranked in the latest year with at least five readings.
    pub fn simple() -> Self {
        Self {
            top_k: 5,
            min_coverage: 5,
            include_aggregates_in_average: true,
            show_size_legend: false,
            default_country: None,
        }
    }

    /// Thirty leaders drawn as bubbles with a size legend.
    pub fn bubble() -> Self {
        Self {
            top_k: 30,
            min_coverage: 30,
            show_size_legend: true,
            ..Self::simple()
        }
    }

    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Simple => Self::simple(),
            Preset::Bubble => Self::bubble(),
        }
    }

    /// Load overrides from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: StoryConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config.with_coverage_floor())
    }

    /// The coverage floor never sits below `top_k`, so a ranking year can
    /// always fill the full leader list.
    pub fn with_coverage_floor(mut self) -> Self {
        if self.min_coverage < self.top_k {
            log::debug!(
                "Raising min_coverage from {} to top_k = {}",
                self.min_coverage,
                self.top_k
            );
            self.min_coverage = self.top_k;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            bail!("top_k must be at least 1");
        }
        Ok(())
    }
}

/// Named starting points for the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Preset {
    #[default]
    Simple,
    Bubble,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        let s = StoryConfig::simple();
        assert_eq!((s.top_k, s.min_coverage), (5, 5));
        assert!(s.include_aggregates_in_average);
        assert!(!s.show_size_legend);

        let b = StoryConfig::bubble();
        assert_eq!((b.top_k, b.min_coverage), (30, 30));
        assert!(b.show_size_legend);
        assert_eq!(StoryConfig::from_preset(Preset::Bubble), b);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story.json");
        std::fs::write(
            &path,
            r#"{ "top_k": 3, "include_aggregates_in_average": false, "default_country": "France" }"#,
        )
        .unwrap();

        let cfg = StoryConfig::load(&path).unwrap();
        assert_eq!(cfg.top_k, 3);
        assert_eq!(cfg.min_coverage, 5);
        assert!(!cfg.include_aggregates_in_average);
        assert_eq!(cfg.default_country.as_deref(), Some("France"));
    }

    #[test]
    fn coverage_floor_follows_a_larger_top_k() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story.json");

        std::fs::write(&path, r#"{ "top_k": 10 }"#).unwrap();
        let cfg = StoryConfig::load(&path).unwrap();
        assert_eq!((cfg.top_k, cfg.min_coverage), (10, 10));

        std::fs::write(&path, r#"{ "top_k": 2, "min_coverage": 40 }"#).unwrap();
        let cfg = StoryConfig::load(&path).unwrap();
        assert_eq!((cfg.top_k, cfg.min_coverage), (2, 40));
    }

    #[test]
    fn unknown_fields_and_zero_top_k_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story.json");

        std::fs::write(&path, r#"{ "topk": 3 }"#).unwrap();
        assert!(StoryConfig::load(&path).is_err());

        std::fs::write(&path, r#"{ "top_k": 0 }"#).unwrap();
        let err = StoryConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("top_k"));
    }
}
