use log::info;
use nalgebra::Point2;

use laser_calib_core::{estimate_homography, Homography};
use laser_calib_hw::{FrameSource, LaserDac, LaserPoint};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::sampler::{collect_correspondences, wait_for_frame};
use crate::{CalibrationError, CalibrationParams, CancelToken};

/// Run a full calibration and return the camera-to-laser transform.
///
/// Equivalent to [`calibrate_with`] with a token nobody cancels.
pub fn calibrate(
    frames: &dyn FrameSource,
    dac: &mut dyn LaserDac,
    params: &CalibrationParams,
) -> Result<Homography, CalibrationError> {
    calibrate_with(frames, dac, params, &CancelToken::new())
}

/// Run a full calibration with cooperative cancellation.
///
/// Sequence: quiesce the laser, set the detection color, build the candidate
/// grid from the device bounds at the configured offsets, capture a
/// background frame with the laser idle, gather correspondences one point at
/// a time, and fit the homography. The engine holds no state between runs;
/// re-invoke on failure.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(frames, dac, params, cancel))
)]
pub fn calibrate_with(
    frames: &dyn FrameSource,
    dac: &mut dyn LaserDac,
    params: &CalibrationParams,
    cancel: &CancelToken,
) -> Result<Homography, CalibrationError> {
    info!("starting camera-laser calibration");
    dac.stop();
    dac.clear_points();
    dac.set_color(params.color);

    let candidates: Vec<LaserPoint> = params
        .grid_offsets
        .iter()
        .flat_map(|&offset| dac.bounds(offset))
        .collect();
    info!("probing {} candidate laser points", candidates.len());

    // Background reference with the laser idle; without it the detector
    // cannot separate the dot from static scene content.
    let background = wait_for_frame(frames, params.capture_timeout)
        .ok_or(CalibrationError::AcquisitionFailed)?;

    let pairs = collect_correspondences(frames, dac, &candidates, &background, params, cancel)?;
    info!(
        "{} of {} candidate points produced correspondences",
        pairs.len(),
        candidates.len()
    );

    if pairs.len() < params.min_correspondences {
        return Err(CalibrationError::InsufficientCorrespondences {
            got: pairs.len(),
            need: params.min_correspondences,
        });
    }

    let laser: Vec<Point2<f64>> = pairs
        .iter()
        .map(|p| Point2::new(p.laser.x as f64, p.laser.y as f64))
        .collect();
    let camera: Vec<Point2<f64>> = pairs.iter().map(|p| p.camera).collect();

    let transform = estimate_homography(&laser, &camera)?;
    info!("calibration successful");
    Ok(transform)
}
