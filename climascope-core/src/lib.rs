//! Core library for the ClimaScope client.
//!
//! This crate defines:
//! - Configuration handling (service endpoint, pinned home coordinate)
//! - A typed client for the ClimaScope service endpoints
//! - The request orchestrator and view-state store that drive the UI
//!
//! It is used by `climascope-cli`, but can also be reused by other
//! frontends that want the same submission semantics.

pub mod config;
pub mod error;
pub mod form;
pub mod geolocate;
pub mod model;
pub mod orchestrator;
pub mod service;
pub mod store;
pub mod viewport;

pub use config::Config;
pub use error::{GeolocationError, SearchError};
pub use form::{CURRENT_LOCATION_LABEL, InputForm};
pub use geolocate::{FixedLocationSource, LocationSource, UnavailableLocationSource};
pub use model::{GeoCoordinate, GeocodedPlace, ManualInput, SearchMode, WeatherQuery, WeatherResult};
pub use orchestrator::RequestOrchestrator;
pub use service::{HttpWeatherService, WeatherService};
pub use store::{RequestState, ViewState, ViewStateStore};
pub use viewport::{FOCUS_ZOOM, MapViewport, NullViewport, WORLD_ZOOM};
