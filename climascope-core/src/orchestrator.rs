use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::SearchError;
use crate::form::{CURRENT_LOCATION_LABEL, InputForm};
use crate::geolocate::LocationSource;
use crate::model::{GeoCoordinate, SearchMode, WeatherQuery, WeatherResult};
use crate::service::WeatherService;
use crate::store::ViewStateStore;

/// Drives the call sequence for each input modality and owns the
/// request-lifecycle transitions on the store.
///
/// Every submission takes a fresh generation number; a commit whose
/// generation is no longer current is dropped, so the last submission
/// initiated always determines the final committed state. The underlying
/// network call is not aborted, only its effect suppressed.
#[derive(Debug)]
pub struct RequestOrchestrator {
    service: Box<dyn WeatherService>,
    location: Box<dyn LocationSource>,
    store: Arc<ViewStateStore>,
    generation: AtomicU64,
}

impl RequestOrchestrator {
    pub fn new(
        service: Box<dyn WeatherService>,
        location: Box<dyn LocationSource>,
        store: Arc<ViewStateStore>,
    ) -> Self {
        Self {
            service,
            location,
            store,
            generation: AtomicU64::new(0),
        }
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Terminal commit for a submission, unless it was superseded.
    fn commit(&self, generation: u64, outcome: Result<WeatherResult, SearchError>) {
        if !self.is_current(generation) {
            tracing::debug!(generation, "dropping outcome of superseded submission");
            return;
        }
        match outcome {
            Ok(result) => self.store.commit_success(result),
            Err(err) => self.store.commit_failure(err.user_message()),
        }
    }

    /// Free-text modality: one remote call, the response already labeled.
    pub async fn submit_prompt(&self, form: &InputForm) {
        let text = match form.validate_prompt() {
            Ok(text) => text,
            Err(err) => {
                self.store.commit_failure(err.user_message());
                return;
            }
        };

        let generation = self.next_generation();
        self.store.commit_loading();

        let outcome = self.service.process_prompt(&text).await;
        self.commit(generation, outcome);
    }

    /// Manual modality: geocode, then statistics.
    pub async fn submit_manual(&self, form: &InputForm) {
        let input = match form.validate_manual() {
            Ok(input) => input,
            Err(err) => {
                self.store.commit_failure(err.user_message());
                return;
            }
        };

        let generation = self.next_generation();
        self.store.commit_loading();

        let place = match self.service.geocode(&input.location_text).await {
            Ok(place) => place,
            Err(err) => {
                self.commit(generation, Err(err));
                return;
            }
        };

        self.fetch_for_coordinate(generation, place.coordinate, &input.iso_date, place.label)
            .await;
    }

    /// One-shot current-location action: no geocoding, the coordinate
    /// comes from the position capability.
    pub async fn submit_current_location(&self, form: &mut InputForm) {
        let iso_date = match form.validate_date_selected() {
            Ok(date) => date,
            Err(err) => {
                self.store.commit_failure(err.user_message());
                return;
            }
        };

        let generation = self.next_generation();

        let position = match self.location.current_position().await {
            Ok(position) => position,
            Err(err) => {
                self.commit(generation, Err(err.into()));
                return;
            }
        };

        // Mirror the tab switch the original UI performs once a position
        // arrives: manual mode, sentinel location label.
        self.store.set_mode(SearchMode::Manual);
        form.set_location_text(CURRENT_LOCATION_LABEL);
        if self.is_current(generation) {
            self.store.commit_loading();
        }

        self.fetch_for_coordinate(generation, position, &iso_date, CURRENT_LOCATION_LABEL.to_string())
            .await;
    }

    /// Shared second half of the manual and current-location flows:
    /// statistics lookup plus label attachment.
    async fn fetch_for_coordinate(
        &self,
        generation: u64,
        coordinate: GeoCoordinate,
        iso_date: &str,
        label: String,
    ) {
        let query = match WeatherQuery::from_iso_date(coordinate, iso_date) {
            Ok(query) => query,
            Err(err) => {
                self.commit(generation, Err(err));
                return;
            }
        };

        let outcome = self.service.query_statistics(&query).await.map(|mut result| {
            result.location_label = label;
            result.date_label = iso_date.to_string();
            result
        });
        self.commit(generation, outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeolocationError;
    use crate::model::GeocodedPlace;
    use crate::viewport::MapViewport;
    use async_trait::async_trait;
    use parking_lot::Mutex as TestMutex;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[derive(Debug, Clone)]
    struct ScriptedPrompt {
        delay_ms: u64,
        result: Result<WeatherResult, String>,
    }

    /// In-memory stand-in for the remote service. Clonable so tests keep
    /// a handle to the call counters after handing one to the
    /// orchestrator.
    #[derive(Debug, Clone, Default)]
    struct FakeService {
        prompt_calls: Arc<AtomicUsize>,
        geocode_calls: Arc<AtomicUsize>,
        query_calls: Arc<AtomicUsize>,
        queries: Arc<TestMutex<Vec<WeatherQuery>>>,
        prompt_script: Arc<TestMutex<HashMap<String, ScriptedPrompt>>>,
        geocode_result: Arc<TestMutex<Option<GeocodedPlace>>>,
        stats_template: Arc<TestMutex<Option<WeatherResult>>>,
    }

    impl FakeService {
        fn script_prompt(&self, text: &str, delay_ms: u64, result: Result<WeatherResult, String>) {
            self.prompt_script
                .lock()
                .insert(text.to_string(), ScriptedPrompt { delay_ms, result });
        }

        fn script_geocode(&self, place: GeocodedPlace) {
            *self.geocode_result.lock() = Some(place);
        }

        fn script_stats(&self, template: WeatherResult) {
            *self.stats_template.lock() = Some(template);
        }
    }

    #[async_trait]
    impl WeatherService for FakeService {
        async fn process_prompt(&self, text: &str) -> Result<WeatherResult, SearchError> {
            self.prompt_calls.fetch_add(1, Ordering::SeqCst);
            let scripted = self.prompt_script.lock().get(text).cloned();
            let Some(scripted) = scripted else {
                return Err(SearchError::remote("Failed to process prompt."));
            };
            if scripted.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(scripted.delay_ms)).await;
            }
            scripted.result.map_err(SearchError::remote)
        }

        async fn geocode(&self, _query: &str) -> Result<GeocodedPlace, SearchError> {
            self.geocode_calls.fetch_add(1, Ordering::SeqCst);
            self.geocode_result
                .lock()
                .clone()
                .ok_or_else(|| SearchError::remote("Location not found."))
        }

        async fn query_statistics(&self, query: &WeatherQuery) -> Result<WeatherResult, SearchError> {
            self.query_calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().push(*query);
            self.stats_template
                .lock()
                .clone()
                .map(|mut result| {
                    // The backend echoes the queried coordinate.
                    result.coordinate = query.coordinate;
                    result
                })
                .ok_or_else(|| SearchError::remote("Could not fetch weather data."))
        }
    }

    #[derive(Debug, Clone, Copy)]
    enum FakePosition {
        At(GeoCoordinate),
        Denied,
        Unavailable,
    }

    #[async_trait]
    impl LocationSource for FakePosition {
        async fn current_position(&self) -> Result<GeoCoordinate, GeolocationError> {
            match self {
                FakePosition::At(coordinate) => Ok(*coordinate),
                FakePosition::Denied => Err(GeolocationError::DeniedOrFailed),
                FakePosition::Unavailable => Err(GeolocationError::Unavailable),
            }
        }
    }

    #[derive(Debug, Clone, Default)]
    struct RecordingViewport {
        centers: Arc<TestMutex<Vec<(GeoCoordinate, u8)>>>,
        markers: Arc<TestMutex<Vec<Option<GeoCoordinate>>>>,
    }

    impl MapViewport for RecordingViewport {
        fn set_center(&self, center: GeoCoordinate, zoom: u8) {
            self.centers.lock().push((center, zoom));
        }

        fn set_marker(&self, marker: Option<GeoCoordinate>) {
            self.markers.lock().push(marker);
        }
    }

    struct Harness {
        orchestrator: RequestOrchestrator,
        store: Arc<ViewStateStore>,
        service: FakeService,
        viewport: RecordingViewport,
    }

    fn harness(service: FakeService, position: FakePosition) -> Harness {
        let viewport = RecordingViewport::default();
        let store = Arc::new(ViewStateStore::new(Box::new(viewport.clone())));
        let orchestrator = RequestOrchestrator::new(
            Box::new(service.clone()),
            Box::new(position),
            Arc::clone(&store),
        );
        Harness {
            orchestrator,
            store,
            service,
            viewport,
        }
    }

    fn stats_template() -> WeatherResult {
        WeatherResult {
            coordinate: GeoCoordinate::new(0.0, 0.0),
            chance_of_rain: 0.61,
            avg_temp_celsius: 24.1,
            samples_found: 31,
            location_label: String::new(),
            date_label: String::new(),
        }
    }

    fn neeloor_result() -> WeatherResult {
        WeatherResult {
            coordinate: GeoCoordinate::new(10.0, 76.0),
            chance_of_rain: 0.42,
            avg_temp_celsius: 27.5,
            samples_found: 28,
            location_label: "Neeloor".to_string(),
            date_label: "2024-09-02".to_string(),
        }
    }

    #[tokio::test]
    async fn prompt_submission_makes_exactly_one_remote_call() {
        let service = FakeService::default();
        service.script_prompt(
            "Will it rain in Neeloor on September 2nd?",
            0,
            Ok(neeloor_result()),
        );
        let h = harness(service, FakePosition::Unavailable);

        let mut form = InputForm::new();
        form.set_prompt_text("Will it rain in Neeloor on September 2nd?");
        h.orchestrator.submit_prompt(&form).await;

        let state = h.store.snapshot();
        let result = state.request.result().expect("success");
        assert_eq!(result.chance_of_rain, 0.42);
        assert_eq!(result.avg_temp_celsius, 27.5);
        assert_eq!(result.samples_found, 28);
        assert_eq!(result.location_label, "Neeloor");
        assert_eq!(state.map_focus, GeoCoordinate::new(10.0, 76.0));

        assert_eq!(h.service.prompt_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.service.geocode_calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.service.query_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            h.viewport.markers.lock().last(),
            Some(&Some(GeoCoordinate::new(10.0, 76.0)))
        );
    }

    #[tokio::test]
    async fn empty_prompt_fails_locally_without_network() {
        let h = harness(FakeService::default(), FakePosition::Unavailable);
        let form = InputForm::new();

        h.orchestrator.submit_prompt(&form).await;

        let state = h.store.snapshot();
        assert_eq!(state.request.error(), Some("Please enter a prompt."));
        assert_eq!(h.service.prompt_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn prompt_remote_error_surfaces_server_detail() {
        let service = FakeService::default();
        service.script_prompt(
            "what",
            0,
            Err("Could not identify a location and a date in the prompt.".to_string()),
        );
        let h = harness(service, FakePosition::Unavailable);

        let mut form = InputForm::new();
        form.set_prompt_text("what");
        h.orchestrator.submit_prompt(&form).await;

        assert_eq!(
            h.store.snapshot().request.error(),
            Some("Could not identify a location and a date in the prompt.")
        );
    }

    #[tokio::test]
    async fn manual_submission_attaches_geocoded_label_and_entered_date() {
        let service = FakeService::default();
        service.script_geocode(GeocodedPlace {
            coordinate: GeoCoordinate::new(48.8589, 2.32),
            label: "Paris, Ile-de-France, Metropolitan France, France".to_string(),
        });
        service.script_stats(stats_template());
        let h = harness(service, FakePosition::Unavailable);

        let mut form = InputForm::new();
        form.set_location_text("Paris, France");
        form.set_date("2023-09-02");
        h.orchestrator.submit_manual(&form).await;

        let state = h.store.snapshot();
        let result = state.request.result().expect("success");
        assert_eq!(
            result.location_label,
            "Paris, Ile-de-France, Metropolitan France, France"
        );
        assert_eq!(result.date_label, "2023-09-02");
        assert_eq!(result.coordinate, GeoCoordinate::new(48.8589, 2.32));
        assert_eq!(state.map_focus, GeoCoordinate::new(48.8589, 2.32));

        let queries = h.service.queries.lock();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].month, 9);
        assert_eq!(queries[0].day, 2);
    }

    #[tokio::test]
    async fn manual_with_missing_date_issues_zero_network_calls() {
        let h = harness(FakeService::default(), FakePosition::Unavailable);
        let mut form = InputForm::new();
        form.set_location_text("Paris, France");

        h.orchestrator.submit_manual(&form).await;

        let state = h.store.snapshot();
        assert_eq!(
            state.request.error(),
            Some("Please enter a location and select a date.")
        );
        assert_eq!(h.service.geocode_calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.service.query_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn geocode_failure_short_circuits_before_statistics() {
        let service = FakeService::default();
        service.script_stats(stats_template());
        let h = harness(service, FakePosition::Unavailable);

        let mut form = InputForm::new();
        form.set_location_text("Atlantis");
        form.set_date("2023-09-02");
        h.orchestrator.submit_manual(&form).await;

        assert_eq!(h.store.snapshot().request.error(), Some("Location not found."));
        assert_eq!(h.service.geocode_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.service.query_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn statistics_failure_commits_fixed_message() {
        let service = FakeService::default();
        service.script_geocode(GeocodedPlace {
            coordinate: GeoCoordinate::new(48.8589, 2.32),
            label: "Paris".to_string(),
        });
        let h = harness(service, FakePosition::Unavailable);

        let mut form = InputForm::new();
        form.set_location_text("Paris");
        form.set_date("2023-09-02");
        h.orchestrator.submit_manual(&form).await;

        assert_eq!(
            h.store.snapshot().request.error(),
            Some("Could not fetch weather data.")
        );
    }

    #[tokio::test]
    async fn resubmission_reissues_both_calls_and_commits_identically() {
        let service = FakeService::default();
        service.script_geocode(GeocodedPlace {
            coordinate: GeoCoordinate::new(50.45, 30.52),
            label: "Kyiv, Ukraine".to_string(),
        });
        service.script_stats(stats_template());
        let h = harness(service, FakePosition::Unavailable);

        let mut form = InputForm::new();
        form.set_location_text("Kyiv");
        form.set_date("2024-01-15");

        h.orchestrator.submit_manual(&form).await;
        let first = h.store.snapshot();
        h.orchestrator.submit_manual(&form).await;
        let second = h.store.snapshot();

        assert_eq!(first.request.result(), second.request.result());
        assert_eq!(h.service.geocode_calls.load(Ordering::SeqCst), 2);
        assert_eq!(h.service.query_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn calendar_invalid_date_passes_through_to_the_service() {
        let service = FakeService::default();
        service.script_geocode(GeocodedPlace {
            coordinate: GeoCoordinate::new(0.0, 0.0),
            label: "Null Island".to_string(),
        });
        service.script_stats(stats_template());
        let h = harness(service, FakePosition::Unavailable);

        let mut form = InputForm::new();
        form.set_location_text("Null Island");
        form.set_date("2024-02-30");
        h.orchestrator.submit_manual(&form).await;

        let queries = h.service.queries.lock();
        assert_eq!(queries[0].month, 2);
        assert_eq!(queries[0].day, 30);
    }

    #[tokio::test]
    async fn current_location_skips_geocoding_and_switches_mode() {
        let service = FakeService::default();
        service.script_stats(stats_template());
        let h = harness(service, FakePosition::At(GeoCoordinate::new(12.9, 77.6)));

        let mut form = InputForm::new();
        form.set_date("2023-09-02");
        h.orchestrator.submit_current_location(&mut form).await;

        let state = h.store.snapshot();
        assert_eq!(state.mode, SearchMode::Manual);
        assert_eq!(form.location_text(), CURRENT_LOCATION_LABEL);

        let result = state.request.result().expect("success");
        assert_eq!(result.location_label, CURRENT_LOCATION_LABEL);
        assert_eq!(result.date_label, "2023-09-02");
        assert_eq!(result.coordinate, GeoCoordinate::new(12.9, 77.6));

        assert_eq!(h.service.geocode_calls.load(Ordering::SeqCst), 0);
        let queries = h.service.queries.lock();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].coordinate, GeoCoordinate::new(12.9, 77.6));
        assert_eq!(queries[0].month, 9);
        assert_eq!(queries[0].day, 2);
    }

    #[tokio::test]
    async fn current_location_requires_a_date_first() {
        let h = harness(
            FakeService::default(),
            FakePosition::At(GeoCoordinate::new(12.9, 77.6)),
        );

        let mut form = InputForm::new();
        h.orchestrator.submit_current_location(&mut form).await;

        assert_eq!(
            h.store.snapshot().request.error(),
            Some("Please select a date first.")
        );
        assert_eq!(h.service.query_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn denied_position_commits_location_services_message() {
        let h = harness(FakeService::default(), FakePosition::Denied);

        let mut form = InputForm::new();
        form.set_date("2023-09-02");
        h.orchestrator.submit_current_location(&mut form).await;

        assert_eq!(
            h.store.snapshot().request.error(),
            Some("Could not get your location. Please enable location services.")
        );
        assert_eq!(h.service.query_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn slow_superseded_submission_never_overwrites_the_newer_one() {
        let service = FakeService::default();
        let slow = WeatherResult {
            location_label: "Slowtown".to_string(),
            ..neeloor_result()
        };
        let fast = WeatherResult {
            location_label: "Fastville".to_string(),
            ..neeloor_result()
        };
        service.script_prompt("slow question", 80, Ok(slow));
        service.script_prompt("fast question", 10, Ok(fast));
        let h = harness(service, FakePosition::Unavailable);

        let mut first = InputForm::new();
        first.set_prompt_text("slow question");
        let mut second = InputForm::new();
        second.set_prompt_text("fast question");

        // The first submission is still in flight when the second starts;
        // it also resolves later. Its commit must be dropped.
        tokio::join!(
            h.orchestrator.submit_prompt(&first),
            h.orchestrator.submit_prompt(&second),
        );

        let state = h.store.snapshot();
        let result = state.request.result().expect("newer submission won");
        assert_eq!(result.location_label, "Fastville");
        assert_eq!(h.service.prompt_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn stale_failure_is_dropped_too() {
        let service = FakeService::default();
        service.script_prompt("slow failure", 80, Err("Failed to process prompt.".to_string()));
        service.script_prompt("fast question", 10, Ok(neeloor_result()));
        let h = harness(service, FakePosition::Unavailable);

        let mut first = InputForm::new();
        first.set_prompt_text("slow failure");
        let mut second = InputForm::new();
        second.set_prompt_text("fast question");

        tokio::join!(
            h.orchestrator.submit_prompt(&first),
            h.orchestrator.submit_prompt(&second),
        );

        let state = h.store.snapshot();
        assert_eq!(
            state.request.result().map(|r| r.location_label.as_str()),
            Some("Neeloor")
        );
    }
}
