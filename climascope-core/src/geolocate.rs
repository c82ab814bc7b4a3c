use std::fmt::Debug;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::GeolocationError;
use crate::model::GeoCoordinate;

/// Single-shot access to the platform position capability.
///
/// One outstanding request at a time is assumed; callers serialize.
#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    async fn current_position(&self) -> Result<GeoCoordinate, GeolocationError>;
}

/// Position source backed by a coordinate pinned in the config file.
///
/// Terminal sessions have no browser-style geolocation, so the `[home]`
/// table plays that role.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocationSource {
    coordinate: GeoCoordinate,
}

impl FixedLocationSource {
    pub fn new(coordinate: GeoCoordinate) -> Self {
        Self { coordinate }
    }
}

#[async_trait]
impl LocationSource for FixedLocationSource {
    async fn current_position(&self) -> Result<GeoCoordinate, GeolocationError> {
        Ok(self.coordinate)
    }
}

/// Stand-in for a platform with no position capability at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableLocationSource;

#[async_trait]
impl LocationSource for UnavailableLocationSource {
    async fn current_position(&self) -> Result<GeoCoordinate, GeolocationError> {
        Err(GeolocationError::Unavailable)
    }
}

/// Construct the position source the config describes.
pub fn from_config(config: &Config) -> Box<dyn LocationSource> {
    match config.home_coordinate() {
        Some(coordinate) => Box::new(FixedLocationSource::new(coordinate)),
        None => Box::new(UnavailableLocationSource),
    }
}
