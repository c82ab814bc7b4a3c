use std::fmt::Debug;

use crate::model::GeoCoordinate;

/// Zoom used for the initial world view.
pub const WORLD_ZOOM: u8 = 4;
/// Zoom used when focusing a resolved location.
pub const FOCUS_ZOOM: u8 = 10;

/// The external map rendering surface, reduced to the two operations the
/// store needs: recentering and marker placement.
pub trait MapViewport: Send + Sync + Debug {
    fn set_center(&self, center: GeoCoordinate, zoom: u8);
    fn set_marker(&self, marker: Option<GeoCoordinate>);
}

/// Viewport that ignores every update, for frontends without a map.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullViewport;

impl MapViewport for NullViewport {
    fn set_center(&self, _center: GeoCoordinate, _zoom: u8) {}

    fn set_marker(&self, _marker: Option<GeoCoordinate>) {}
}
