//! Collision silhouette of a vehicle.
//!
//! The silhouette lives in a local frame centred on the vehicle with +x along
//! the heading. Collision is tested at one-pixel resolution: every pixel of
//! the rotated silhouette's bounding box is mapped back into the local frame
//! and, if covered, checked against the track.

use std::path::{Path, PathBuf};

use geo::{BoundingRect, Coord, Point, Rect, Rotate, Translate, coord};
use ndarray::Array2;
use thiserror::Error;

use super::super::geometric_utils::to_local;
use super::super::track::TrackModel;

/// Alpha above which a sprite pixel is solid.
const ALPHA_THRESHOLD: u8 = 127;

/// Errors raised while deriving a footprint from a sprite.
#[derive(Debug, Error)]
pub enum SpriteLoadError {
    /// The sprite could not be opened or decoded.
    #[error("failed to decode sprite {}: {source}", path.display())]
    Decode {
        /// Path of the sprite.
        path: PathBuf,
        /// Decoder failure.
        #[source]
        source: image::ImageError,
    },
    /// The sprite has no solid pixel.
    #[error("sprite {} has no opaque pixels", path.display())]
    Transparent {
        /// Path of the sprite.
        path: PathBuf,
    },
}

/// Shape tested against the track for collisions.
#[derive(Debug, Clone)]
pub enum Footprint {
    /// Solid rectangle centred on the vehicle.
    Rect {
        /// Extent along the heading.
        length: f32,
        /// Extent across the heading.
        width: f32,
    },
    /// Per-pixel mask, indexed as `[[row, column]]`, with the vehicle facing +x.
    Mask(Array2<bool>),
}

impl Footprint {
    /// Creates a rectangular footprint.
    pub fn rect(length: f32, width: f32) -> Self {
        Footprint::Rect { length, width }
    }

    /// Derives a mask footprint from a sprite's alpha channel.
    pub fn from_sprite(path: impl AsRef<Path>) -> Result<Self, SpriteLoadError> {
        let path = path.as_ref();
        let sprite = image::open(path)
            .map_err(|source| SpriteLoadError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();

        let (w, h) = sprite.dimensions();
        let mask = Array2::from_shape_fn((h as usize, w as usize), |(y, x)| {
            sprite.get_pixel(x as u32, y as u32).0[3] > ALPHA_THRESHOLD
        });

        if !mask.iter().any(|&solid| solid) {
            return Err(SpriteLoadError::Transparent {
                path: path.to_path_buf(),
            });
        }
        Ok(Footprint::Mask(mask))
    }

    /// `(length, width)` of the unrotated silhouette.
    pub fn extent(&self) -> (f32, f32) {
        match self {
            Footprint::Rect { length, width } => (*length, *width),
            Footprint::Mask(mask) => (mask.ncols() as f32, mask.nrows() as f32),
        }
    }

    /// Returns whether a point of the local frame is inside the silhouette.
    pub fn covers(&self, local: Coord<f32>) -> bool {
        let (length, width) = self.extent();
        let (u, v) = (local.x + length / 2.0, local.y + width / 2.0);
        if u < 0.0 || v < 0.0 || u >= length || v >= width {
            return false;
        }
        match self {
            Footprint::Rect { .. } => true,
            Footprint::Mask(mask) => mask[[v as usize, u as usize]],
        }
    }

    /// Axis-aligned bounding box of the silhouette placed at `center` with `heading`.
    pub fn world_bounds(&self, center: Coord<f32>, heading: f32) -> Rect<f32> {
        let (length, width) = self.extent();
        let local = Rect::new(
            coord! { x: -length / 2.0, y: -width / 2.0 },
            coord! { x: length / 2.0, y: width / 2.0 },
        );

        // geo rotates counter-clockwise in a y-up frame, which is clockwise on screen.
        let placed = local
            .to_polygon()
            .rotate_around_point(-heading, Point::new(0.0, 0.0))
            .translate(center.x, center.y);

        placed.bounding_rect().unwrap_or(local)
    }

    /// Returns whether any covered pixel of the placed silhouette is a boundary pixel.
    pub fn overlaps_boundary(&self, center: Coord<f32>, heading: f32, track: &TrackModel) -> bool {
        let bounds = self.world_bounds(center, heading);
        let (min_x, min_y) = (bounds.min().x.floor() as i32, bounds.min().y.floor() as i32);
        let (max_x, max_y) = (bounds.max().x.ceil() as i32, bounds.max().y.ceil() as i32);

        for py in min_y..max_y {
            for px in min_x..max_x {
                let sample = coord! { x: px as f32 + 0.5, y: py as f32 + 0.5 };
                if self.covers(to_local(sample - center, heading)) && track.is_boundary(px, py) {
                    return true;
                }
            }
        }
        false
    }
}
