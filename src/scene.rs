use std::fmt;

// ---------------------------------------------------------------------------
// Scene – the three fixed narrative steps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Scene {
    #[default]
    GlobalAverage,
    LeadingEmitters,
    CountryExplorer,
}

impl Scene {
    pub const ALL: [Scene; 3] = [
        Scene::GlobalAverage,
        Scene::LeadingEmitters,
        Scene::CountryExplorer,
    ];

    /// Position in the story, 0..=2.
    pub fn index(self) -> usize {
        match self {
            Scene::GlobalAverage => 0,
            Scene::LeadingEmitters => 1,
            Scene::CountryExplorer => 2,
        }
    }

    /// Scene at a given position; out-of-range indices clamp to the last one.
    pub fn from_index(index: usize) -> Scene {
        Scene::ALL[index.min(Scene::ALL.len() - 1)]
    }

    /// Short label for the step indicator.
    pub fn title(self) -> &'static str {
        match self {
            Scene::GlobalAverage => "Global average",
            Scene::LeadingEmitters => "Leading emitters",
            Scene::CountryExplorer => "Explore a country",
        }
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.index() + 1, self.title())
    }
}

// ---------------------------------------------------------------------------
// ViewRequest – what the view computation is asked for
// ---------------------------------------------------------------------------

/// Immutable snapshot of the navigation state handed to
/// [`compute_view`](crate::data::views::compute_view).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewRequest {
    pub scene: Scene,
    pub selected_country: Option<String>,
}

impl ViewRequest {
    pub fn new(scene: Scene, selected_country: Option<&str>) -> Self {
        Self {
            scene,
            selected_country: selected_country.map(str::to_string),
        }
    }
}

// ---------------------------------------------------------------------------
// SceneState – navigation state machine
// ---------------------------------------------------------------------------

/// Active scene plus the country picked in the dropdown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneState {
    scene: Scene,
    selected_country: Option<String>,
}

impl SceneState {
    pub fn scene(&self) -> Scene {
        self.scene
    }

    pub fn selected_country(&self) -> Option<&str> {
        self.selected_country.as_deref()
    }

    /// Advance one scene, stopping at the last. Returns whether it moved.
    pub fn next(&mut self) -> bool {
        let next = Scene::from_index(self.scene.index() + 1);
        let moved = next != self.scene;
        self.scene = next;
        moved
    }

    /// Go back one scene, stopping at the first. Returns whether it moved.
    pub fn previous(&mut self) -> bool {
        let prev = Scene::from_index(self.scene.index().saturating_sub(1));
        let moved = prev != self.scene;
        self.scene = prev;
        moved
    }

    /// Store a new selection. Returns `true` when the explorer scene is
    /// active and the view must be recomputed.
    pub fn select_country(&mut self, country: &str) -> bool {
        self.selected_country = Some(country.to_string());
        self.scene == Scene::CountryExplorer
    }

    pub fn clear_selection(&mut self) {
        self.selected_country = None;
    }

    /// The country dropdown is only shown while exploring.
    pub fn dropdown_visible(&self) -> bool {
        self.scene == Scene::CountryExplorer
    }

    pub fn request(&self) -> ViewRequest {
        ViewRequest::new(self.scene, self.selected_country())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_first_scene() {
        let s = SceneState::default();
        assert_eq!(s.scene(), Scene::GlobalAverage);
        assert_eq!(s.selected_country(), None);
        assert!(!s.dropdown_visible());
    }

    #[test]
    fn previous_saturates_at_zero() {
        let mut s = SceneState::default();
        assert!(!s.previous());
        assert_eq!(s.scene().index(), 0);
    }

    #[test]
    fn next_saturates_at_two() {
        let mut s = SceneState::default();
        assert!(s.next());
        assert!(s.next());
        assert_eq!(s.scene(), Scene::CountryExplorer);
        assert!(!s.next());
        assert_eq!(s.scene().index(), 2);
        assert!(s.dropdown_visible());
    }

    #[test]
    fn selection_outside_explorer_does_not_request_recompute() {
        let mut s = SceneState::default();
        assert!(!s.select_country("France"));
        assert_eq!(s.selected_country(), Some("France"));

        s.next();
        s.next();
        assert!(s.select_country("Brazil"));
        assert_eq!(
            s.request(),
            ViewRequest::new(Scene::CountryExplorer, Some("Brazil"))
        );
    }

    #[test]
    fn index_round_trip_and_clamp() {
        for scene in Scene::ALL {
            assert_eq!(Scene::from_index(scene.index()), scene);
        }
        assert_eq!(Scene::from_index(7), Scene::CountryExplorer);
        assert_eq!(Scene::LeadingEmitters.to_string(), "2. Leading emitters");
    }
}
