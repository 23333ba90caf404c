use laser_calib_core::HomographyError;

/// Errors that abort a calibration run.
///
/// Per-point detection misses are not listed here: they are recovered
/// locally by skipping the candidate point. A failed run produces no
/// transform at all, never a near-identity placeholder.
#[derive(thiserror::Error, Debug)]
pub enum CalibrationError {
    #[error("frame source produced no frame within the capture timeout")]
    AcquisitionFailed,
    #[error("only {got} point correspondences survived detection, need at least {need}")]
    InsufficientCorrespondences { got: usize, need: usize },
    #[error("calibration cancelled")]
    Cancelled,
    #[error(transparent)]
    Homography(#[from] HomographyError),
}
