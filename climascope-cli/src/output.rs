use climascope_core::{GeoCoordinate, MapViewport, WeatherResult};

/// Print the result panel for a committed success.
pub fn print_result(result: &WeatherResult) {
    let headline = result
        .location_label
        .split(',')
        .next()
        .unwrap_or(&result.location_label);

    println!();
    println!("Weather likelihood for {} on {}", headline, result.date_label);
    println!("  Chance of rain:      {}%", (result.chance_of_rain * 100.0).round());
    println!("  Average temperature: {}°C", result.avg_temp_celsius);
    println!("  At coordinate:       ({:.4}, {:.4})", result.coordinate.lat, result.coordinate.lon);
    println!("  Based on {} samples from the last 30 years.", result.samples_found);
}

/// Terminal rendition of the map surface: updates go to the log rather
/// than a tile layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalViewport;

impl MapViewport for TerminalViewport {
    fn set_center(&self, center: GeoCoordinate, zoom: u8) {
        tracing::debug!(lat = center.lat, lon = center.lon, zoom, "map recentered");
    }

    fn set_marker(&self, marker: Option<GeoCoordinate>) {
        match marker {
            Some(coordinate) => {
                tracing::debug!(lat = coordinate.lat, lon = coordinate.lon, "marker placed");
            }
            None => tracing::debug!("marker removed"),
        }
    }
}
