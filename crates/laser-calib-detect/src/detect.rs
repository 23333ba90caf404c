use laser_calib_core::RgbFrame;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::blob::best_centroid;
use crate::mask::foreground_mask;

/// Tunable constants of the dot detector.
///
/// Both values are empirically tuned and sensitive to the calibration
/// environment (ambient light, camera exposure, laser power); expect to
/// adjust them per installation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DetectorParams {
    /// Binary mask cutoff on 8-bit intensity; pixels strictly above it are
    /// foreground.
    pub luminance_threshold: u8,
    /// Minimum blob area in pixels; smaller blobs are treated as noise.
    pub min_blob_area: f64,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            luminance_threshold: 100,
            min_blob_area: 100.0,
        }
    }
}

/// Locate the laser dot in a camera frame.
///
/// When a background frame (captured with the laser off) is supplied, the
/// frame difference isolates the dot from static scene content. Returns the
/// dot centroid in pixel coordinates, or `None` when no sufficiently large
/// blob is found or when the background dimensions do not match the frame
/// (a camera resolution change mid-run). A miss is not an error: one
/// candidate point simply contributes no correspondence.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(frame, background), fields(width = frame.width, height = frame.height))
)]
pub fn detect_laser_point(
    frame: &RgbFrame,
    background: Option<&RgbFrame>,
    params: &DetectorParams,
) -> Option<Point2<f64>> {
    let mask = foreground_mask(frame, background, params.luminance_threshold)?;
    best_centroid(&mask, params.min_blob_area).map(|(x, y)| Point2::new(x as f64, y as f64))
}
