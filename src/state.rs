use crate::color::ColorMap;
use crate::config::StoryConfig;
use crate::data::model::Dataset;
use crate::data::views::{SceneView, ViewError, compute_view};
use crate::scene::SceneState;

// ---------------------------------------------------------------------------
// Load status
// ---------------------------------------------------------------------------

/// Where the source table stands. A failed load is kept apart from
/// "nothing loaded yet" so the UI can say which one it is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loaded,
    Failed(String),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    pub config: StoryConfig,

    pub load: LoadState,

    /// Loaded dataset (None until a file loads successfully).
    pub dataset: Option<Dataset>,

    /// Active scene and dropdown selection.
    pub story: SceneState,

    /// View for the current request, recomputed on every navigation event.
    pub view: Option<Result<SceneView, ViewError>>,

    /// Per-country colours.
    pub colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: StoryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Ingest a newly loaded dataset, pick a default country and draw the
    /// current scene.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        if dataset.is_empty() {
            log::warn!("Loaded table has no rows with a valid year");
        }
        let real = dataset.real_countries();
        self.colors = ColorMap::new(real.iter().copied());

        let preferred = self
            .config
            .default_country
            .as_deref()
            .filter(|c| dataset.contains_country(c));
        match preferred.or_else(|| real.first().copied()) {
            Some(country) => {
                log::debug!("Default explorer country: {country}");
                self.story.select_country(country);
            }
            None => self.story.clear_selection(),
        }

        self.dataset = Some(dataset);
        self.load = LoadState::Loaded;
        self.status_message = None;
        self.recompute();
    }

    /// Record a failed load. Any previously loaded dataset stays on screen.
    pub fn set_load_error(&mut self, message: String) {
        log::error!("Failed to load data: {message}");
        self.status_message = Some(format!("Error: {message}"));
        self.load = LoadState::Failed(message);
    }

    pub fn next_scene(&mut self) {
        if self.story.next() {
            self.recompute();
        }
    }

    pub fn previous_scene(&mut self) {
        if self.story.previous() {
            self.recompute();
        }
    }

    /// Change the dropdown selection; only redraws while exploring.
    pub fn select_country(&mut self, country: &str) {
        if self.story.select_country(country) {
            self.recompute();
        }
    }

    /// Recompute the derived view from scratch for the current request.
    pub fn recompute(&mut self) {
        let Some(dataset) = &self.dataset else {
            self.view = None;
            return;
        };
        let request = self.story.request();
        let view = compute_view(dataset, &request, &self.config);
        match &view {
            Ok(SceneView::Empty(reason)) => {
                log::info!("{}: nothing to draw ({reason:?})", request.scene)
            }
            Ok(_) => log::debug!("Computed view for {}", request.scene),
            Err(e) => log::warn!("{}: {e}", request.scene),
        }
        self.view = Some(view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Observation;
    use crate::data::views::ExplorerView;
    use crate::scene::Scene;

    fn dataset() -> Dataset {
        Dataset::from_observations(
            vec![
                Observation::new("World", 2000, Some(4.0)),
                Observation::new("France", 2000, Some(6.0)),
                Observation::new("Brazil", 2000, Some(2.0)),
                Observation::new("Chad", 2000, None),
            ],
            0,
        )
    }

    #[test]
    fn loading_selects_first_real_country_and_draws_scene_zero() {
        let mut state = AppState::new(StoryConfig::simple());
        state.set_dataset(dataset());

        assert_eq!(state.load, LoadState::Loaded);
        assert_eq!(state.story.selected_country(), Some("Brazil"));
        assert!(matches!(state.view, Some(Ok(SceneView::GlobalAverage(_)))));
    }

    #[test]
    fn configured_default_country_wins_when_present() {
        let config = StoryConfig {
            default_country: Some("France".into()),
            ..StoryConfig::simple()
        };
        let mut state = AppState::new(config);
        state.set_dataset(dataset());
        assert_eq!(state.story.selected_country(), Some("France"));
    }

    #[test]
    fn selection_before_explorer_is_stored_not_drawn() {
        let mut state = AppState::new(StoryConfig::simple());
        state.set_dataset(dataset());
        let before = state.view.clone();

        state.select_country("Chad");
        assert_eq!(state.view, before);

        state.next_scene();
        state.next_scene();
        assert_eq!(state.story.scene(), Scene::CountryExplorer);
        assert_eq!(
            state.view,
            Some(Ok(SceneView::CountryExplorer(
                ExplorerView::NoNumericHistory {
                    country: "Chad".into(),
                    year_extent: (2000, 2000),
                }
            )))
        );

        state.select_country("France");
        match &state.view {
            Some(Ok(SceneView::CountryExplorer(view))) => assert_eq!(view.country(), "France"),
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn load_error_is_distinct_from_idle() {
        let mut state = AppState::default();
        assert_eq!(state.load, LoadState::Idle);
        state.set_load_error("no such file".into());
        assert_eq!(state.load, LoadState::Failed("no such file".into()));
        assert!(state.view.is_none());
    }
}
