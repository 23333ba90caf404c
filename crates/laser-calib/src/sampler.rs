use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};
use nalgebra::Point2;

use laser_calib_core::RgbFrame;
use laser_calib_detect::detect_laser_point;
use laser_calib_hw::{FrameSource, LaserDac, LaserPoint};

use crate::{CalibrationError, CalibrationParams, CancelToken};

/// One (laser-space, camera-space) observation of a calibration point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CorrespondencePair {
    pub laser: LaserPoint,
    pub camera: Point2<f64>,
}

/// Poll the latest-frame source until a frame arrives or `timeout` elapses.
pub(crate) fn wait_for_frame(frames: &dyn FrameSource, timeout: Duration) -> Option<RgbFrame> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(frame) = frames.frame() {
            return Some(frame);
        }
        if Instant::now() >= deadline {
            return None;
        }
        thread::sleep(Duration::from_millis(10));
    }
}

/// Project each candidate point in turn and locate it in the camera frame.
///
/// Strictly sequential: one point is rendered, settled, captured and cleared
/// before the next begins, since a frame with several simultaneous dots
/// could not be disambiguated. Detection misses are logged and skipped; a
/// stalled frame source or a cancelled token aborts the run.
pub(crate) fn collect_correspondences(
    frames: &dyn FrameSource,
    dac: &mut dyn LaserDac,
    candidates: &[LaserPoint],
    background: &RgbFrame,
    params: &CalibrationParams,
    cancel: &CancelToken,
) -> Result<Vec<CorrespondencePair>, CalibrationError> {
    let mut pairs = Vec::new();

    for &point in candidates {
        if cancel.is_cancelled() {
            dac.stop();
            dac.clear_points();
            return Err(CalibrationError::Cancelled);
        }

        dac.clear_points();
        dac.add_point(point.x, point.y);
        dac.play();

        thread::sleep(params.settle);
        let frame = wait_for_frame(frames, params.capture_timeout);
        dac.stop();

        let Some(frame) = frame else {
            dac.clear_points();
            return Err(CalibrationError::AcquisitionFailed);
        };

        match detect_laser_point(&frame, Some(background), &params.detector) {
            Some(camera) => {
                info!(
                    "correspondence: laser ({}, {}) -> camera ({:.0}, {:.0})",
                    point.x, point.y, camera.x, camera.y
                );
                pairs.push(CorrespondencePair {
                    laser: point,
                    camera,
                });
            }
            None => {
                warn!(
                    "no dot detected for laser point ({}, {}), skipping",
                    point.x, point.y
                );
            }
        }
    }

    Ok(pairs)
}
