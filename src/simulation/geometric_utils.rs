//! Geometric helpers shared by the vehicle kinematics, sensors and collision test.
//!
//! All coordinates are screen coordinates: x grows to the right, y grows
//! downwards. Headings are in degrees and grow counter-clockwise on screen,
//! so a heading of 90 points towards negative y.

use geo::{Coord, coord};

/// Unit vector pointing along `heading` degrees.
///
/// # Arguments
///
/// * `heading` - Heading in degrees
///
/// # Returns
///
/// `(cos h, -sin h)`, the on-screen direction of the heading.
pub fn heading_vector(heading: f32) -> Coord<f32> {
    let rad = heading.to_radians();
    coord! { x: rad.cos(), y: -rad.sin() }
}

/// Maps a world point to the pixel containing it.
pub fn to_pixel(p: Coord<f32>) -> (i32, i32) {
    (p.x.floor() as i32, p.y.floor() as i32)
}

/// Maps a world offset from the vehicle centre into the footprint's local frame.
///
/// The local frame has +x along the heading and +y to the vehicle's right on
/// screen. This is the inverse of placing a local point at `heading`.
pub fn to_local(offset: Coord<f32>, heading: f32) -> Coord<f32> {
    let (sin, cos) = heading.to_radians().sin_cos();
    coord! {
        x: offset.x * cos - offset.y * sin,
        y: offset.x * sin + offset.y * cos,
    }
}
