//! Coordinate projection module
//! Maps latitude/longitude onto pixel positions of a Mercator world map image.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;

/// Vertical offset of the country label above its marker, in pixels
const LABEL_OFFSET_PX: f64 = 30.0;

/// Errors raised for geographic input the projection cannot place
#[derive(Debug, Error, PartialEq)]
pub enum ProjectionError {
    /// Latitude at or beyond a pole, or not a finite number.
    /// The Mercator tangent is undefined at exactly +/-90 degrees.
    #[error("latitude {lat} is outside the open interval (-90, 90)")]
    InvalidGeography { lat: f64 },
    #[error("longitude {lng} is not a finite number")]
    InvalidLongitude { lng: f64 },
}

/// Pixel position on the map image, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

/// Size of the rectangular map image in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapFrame {
    pub width: f64,
    pub height: f64,
}

impl Default for MapFrame {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 480.0,
        }
    }
}

impl MapFrame {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Projects a coordinate pair into this frame
    pub fn project(&self, lat: f64, lng: f64) -> Result<PixelPoint, ProjectionError> {
        project(lat, lng, self.width, self.height)
    }

    /// Projects a coordinate pair and places the label above the marker
    pub fn marker(&self, label: &str, lat: f64, lng: f64) -> Result<MapMarker, ProjectionError> {
        let position = self.project(lat, lng)?;
        Ok(MapMarker {
            label: label.to_string(),
            position,
            label_position: PixelPoint {
                x: position.x,
                y: position.y - LABEL_OFFSET_PX,
            },
        })
    }
}

/// A positioned marker with its text label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub label: String,
    pub position: PixelPoint,
    pub label_position: PixelPoint,
}

/// Converts geographic coordinates to pixel positions.
///
/// Longitude is linear across the width. Latitude goes through the
/// Web-Mercator transform `ln(tan(pi/4 + lat/2))`, so spacing grows towards
/// the poles the way it does on a standard Mercator map image.
///
/// Latitudes at or beyond +/-90 are rejected. Longitude is not clamped; values
/// outside [-180, 180] land outside the frame.
pub fn project(
    lat: f64,
    lng: f64,
    map_width: f64,
    map_height: f64,
) -> Result<PixelPoint, ProjectionError> {
    if !lat.is_finite() || lat.abs() >= 90.0 {
        return Err(ProjectionError::InvalidGeography { lat });
    }
    if !lng.is_finite() {
        return Err(ProjectionError::InvalidLongitude { lng });
    }

    let x = (lng + 180.0) / 360.0;

    let lat_rad = lat.to_radians();
    let mercator_n = (PI / 4.0 + lat_rad / 2.0).tan().ln();
    let y = 0.5 - mercator_n / (2.0 * PI);

    Ok(PixelPoint {
        x: x * map_width,
        y: y * map_height,
    })
}
