//! Ray-marched range sensors.

use geo::Coord;
use serde::{Deserialize, Serialize};

use super::super::geometric_utils::{heading_vector, to_pixel};
use super::super::track::TrackModel;

/// Distance measured along one sensor ray.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadarReading {
    /// Offset of the ray from the vehicle heading, in degrees.
    pub angle: f32,
    /// Distance to the first boundary pixel, capped at the ray length.
    pub distance: f32,
}

impl RadarReading {
    /// A reading that has not been measured yet.
    pub fn unmeasured(angle: f32) -> Self {
        Self {
            angle,
            distance: 0.0,
        }
    }
}

/// Marches a ray from `origin` along `direction` degrees in unit steps.
///
/// The march stops at the first sample whose pixel is a boundary or lies
/// outside the track. The returned distance is the step count at that point,
/// which is the length of the ray up to the stop point. When no sample below
/// `max_length` hits, `max_length` is returned.
///
/// # Arguments
///
/// * `origin` - Start of the ray (vehicle centre)
/// * `direction` - Absolute ray direction in degrees
/// * `max_length` - Hard cap standing in for "nothing detected"
/// * `track` - Occupancy grid to probe
pub fn cast(origin: Coord<f32>, direction: f32, max_length: u32, track: &TrackModel) -> f32 {
    let step = heading_vector(direction);

    for length in 0..max_length {
        let l = length as f32;
        let (x, y) = to_pixel(origin + step * l);
        if track.is_boundary(x, y) {
            return l;
        }
    }

    max_length as f32
}
