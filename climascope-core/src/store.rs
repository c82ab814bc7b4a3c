use parking_lot::Mutex;

use crate::model::{GeoCoordinate, SearchMode, WeatherResult};
use crate::viewport::{FOCUS_ZOOM, MapViewport, WORLD_ZOOM};

/// Initial map focus before any result arrives.
pub const WORLD_VIEW: GeoCoordinate = GeoCoordinate { lat: 20.0, lon: 0.0 };

/// Lifecycle of the active submission: Idle until the first one, then
/// Loading, terminating in Success or Failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Success(WeatherResult),
    Failure(String),
}

impl RequestState {
    pub fn is_idle(&self) -> bool {
        matches!(self, RequestState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn result(&self) -> Option<&WeatherResult> {
        match self {
            RequestState::Success(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RequestState::Failure(message) => Some(message),
            _ => None,
        }
    }
}

/// Everything a frontend needs to render.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub mode: SearchMode,
    pub request: RequestState,
    pub map_focus: GeoCoordinate,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            mode: SearchMode::default(),
            request: RequestState::default(),
            map_focus: WORLD_VIEW,
        }
    }
}

/// Exclusive owner of [`ViewState`].
///
/// All mutation goes through the operations below; the commit operations
/// are reserved for the orchestrator. Each operation takes the lock once,
/// so commits are atomic from any reader's point of view. Viewport
/// updates ride along with the state changes that cause them.
#[derive(Debug)]
pub struct ViewStateStore {
    state: Mutex<ViewState>,
    viewport: Box<dyn MapViewport>,
}

impl ViewStateStore {
    pub fn new(viewport: Box<dyn MapViewport>) -> Self {
        let state = ViewState::default();
        viewport.set_center(state.map_focus, WORLD_ZOOM);
        viewport.set_marker(None);
        Self {
            state: Mutex::new(state),
            viewport,
        }
    }

    /// A new submission began: previous error/result are gone, marker too.
    pub fn commit_loading(&self) {
        let mut state = self.state.lock();
        state.request = RequestState::Loading;
        self.viewport.set_marker(None);
    }

    pub fn commit_success(&self, result: WeatherResult) {
        let mut state = self.state.lock();
        state.map_focus = result.coordinate;
        self.viewport.set_center(result.coordinate, FOCUS_ZOOM);
        self.viewport.set_marker(Some(result.coordinate));
        tracing::info!(
            label = %result.location_label,
            date = %result.date_label,
            "committed weather result"
        );
        state.request = RequestState::Success(result);
    }

    pub fn commit_failure(&self, message: impl Into<String>) {
        let mut state = self.state.lock();
        state.request = RequestState::Failure(message.into());
    }

    pub fn set_mode(&self, mode: SearchMode) {
        self.state.lock().mode = mode;
    }

    pub fn set_map_focus(&self, coordinate: GeoCoordinate) {
        let mut state = self.state.lock();
        state.map_focus = coordinate;
        self.viewport.set_center(coordinate, FOCUS_ZOOM);
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.lock().clone()
    }
}
