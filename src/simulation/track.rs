//! Binary occupancy model of the race track.
//!
//! A track image is binarised once at load time into boundary and drivable
//! pixels. Everything outside the image counts as boundary.

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::RgbImage;
use ndarray::Array2;
use thiserror::Error;
use tracing::info;

use super::params::Params;

/// Errors raised while turning a track image into a [`TrackModel`].
#[derive(Debug, Error)]
pub enum TrackLoadError {
    /// The image file could not be opened or decoded.
    #[error("failed to decode track image {}: {source}", path.display())]
    Decode {
        /// Path of the image.
        path: PathBuf,
        /// Decoder failure.
        #[source]
        source: image::ImageError,
    },
    /// The image does not match the simulation bounds.
    #[error("track image is {}x{}, expected {}x{}", actual.0, actual.1, expected.0, expected.1)]
    Dimensions {
        /// Configured `(width, height)`.
        expected: (u32, u32),
        /// `(width, height)` of the image.
        actual: (u32, u32),
    },
}

/// Occupancy grid of the track, indexed as `[[y, x]]`.
#[derive(Debug, Clone)]
pub struct TrackModel {
    boundary: Array2<bool>,
}

impl TrackModel {
    /// Builds a track from a precomputed grid where `true` marks boundary pixels.
    pub fn from_occupancy(boundary: Array2<bool>) -> Self {
        Self { boundary }
    }

    /// Binarises an image that already has the simulation dimensions.
    ///
    /// # Arguments
    ///
    /// * `image` - Track image, `params.width × params.height`
    /// * `params` - Provides bounds, boundary colour and tolerance
    pub fn from_image(image: &RgbImage, params: &Params) -> Result<Self, TrackLoadError> {
        let actual = image.dimensions();
        let expected = (params.width, params.height);
        if actual != expected {
            return Err(TrackLoadError::Dimensions { expected, actual });
        }

        let tolerance = params.boundary_tolerance;
        let color = params.boundary_color;
        let boundary = Array2::from_shape_fn(
            (params.height as usize, params.width as usize),
            |(y, x)| {
                let pixel = image.get_pixel(x as u32, y as u32);
                pixel
                    .0
                    .iter()
                    .zip(color.iter())
                    .all(|(&c, &b)| c.abs_diff(b) <= tolerance)
            },
        );

        Ok(Self { boundary })
    }

    /// Decodes a track image, scales it to the simulation bounds and binarises it.
    pub fn load(path: impl AsRef<Path>, params: &Params) -> Result<Self, TrackLoadError> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| TrackLoadError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let scaled = image
            .resize_exact(params.width, params.height, FilterType::Nearest)
            .to_rgb8();

        let track = Self::from_image(&scaled, params)?;
        info!(
            path = %path.display(),
            width = track.width(),
            height = track.height(),
            boundary_pixels = track.boundary_pixels(),
            "Loaded track",
        );
        Ok(track)
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.boundary.ncols()
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.boundary.nrows()
    }

    /// Returns whether `(x, y)` lies inside the grid.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width() && (y as usize) < self.height()
    }

    /// Returns `true` for boundary pixels and for every point outside the grid.
    #[inline]
    pub fn is_boundary(&self, x: i32, y: i32) -> bool {
        !self.contains(x, y) || self.boundary[[y as usize, x as usize]]
    }

    /// Number of boundary pixels inside the grid.
    pub fn boundary_pixels(&self) -> usize {
        self.boundary.iter().filter(|&&b| b).count()
    }
}
