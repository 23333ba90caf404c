use std::time::Duration;

use laser_calib_core::MIN_CORRESPONDENCES;
use laser_calib_detect::DetectorParams;
use laser_calib_hw::Color;
use serde::{Deserialize, Serialize};

/// Configuration of a calibration run.
///
/// The defaults mirror the values tuned on the reference rig; the settle
/// delay and the detector thresholds in particular are environment-sensitive
/// and exposed here instead of being buried in the algorithms.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CalibrationParams {
    /// Wait after commanding the laser before sampling a frame, so the
    /// galvos and the camera exposure settle.
    pub settle: Duration,
    /// Upper bound on waiting for any single frame from the source.
    pub capture_timeout: Duration,
    /// Dot detector thresholds.
    pub detector: DetectorParams,
    /// Beam color while calibrating; dim red keeps the dot compact and
    /// avoids blooming the sensor.
    pub color: Color,
    /// Inset offsets fed to `LaserDac::bounds`; each offset contributes one
    /// rectangle of candidate points, together giving a two-axis spread.
    pub grid_offsets: Vec<i32>,
    /// Minimum surviving correspondences to attempt the solve.
    pub min_correspondences: usize,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(2),
            capture_timeout: Duration::from_secs(5),
            detector: DetectorParams::default(),
            color: Color::new(100, 0, 0, 10),
            grid_offsets: vec![0, 500, 1000],
            min_correspondences: MIN_CORRESPONDENCES,
        }
    }
}
