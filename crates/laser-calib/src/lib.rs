//! Camera-laser calibration engine.
//!
//! Determines the projective transform between a camera's image plane and a
//! laser projector's device coordinates: project known laser points one at a
//! time, detect each dot in the camera frame, and fit a 3x3 homography with
//! the normalized DLT. A point picked in the camera view can then be mapped
//! to a laser deflection command through the returned [`Homography`].
//!
//! ## Quickstart
//!
//! ```no_run
//! use laser_calib::{calibrate, CalibrationParams};
//! use laser_calib::hw::{open_dac, DacKind, FrameSlot};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let frames = FrameSlot::new(); // fed by a capture thread
//! let mut dac = open_dac(DacKind::Simulated)?;
//!
//! let transform = calibrate(&frames, dac.as_mut(), &CalibrationParams::default())?;
//! let laser = transform.apply(nalgebra::Point2::new(320.0, 240.0));
//! println!("clicked pixel maps to laser ({:.0}, {:.0})", laser.x, laser.y);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - [`core`](laser_calib_core): homography estimation, image types, logger.
//! - [`detect`](laser_calib_detect): laser dot detection from frames.
//! - [`hw`](laser_calib_hw): DAC capability trait, frame sources.
//! - [`calibrate`] / [`calibrate_with`]: the orchestrated calibration run.

pub use laser_calib_core as core;
pub use laser_calib_detect as detect;
pub use laser_calib_hw as hw;

pub use laser_calib_core::{estimate_homography, Homography, HomographyError};
pub use laser_calib_detect::DetectorParams;

mod cancel;
mod error;
mod orchestrator;
mod params;
mod sampler;

pub use cancel::CancelToken;
pub use error::CalibrationError;
pub use orchestrator::{calibrate, calibrate_with};
pub use params::CalibrationParams;
pub use sampler::CorrespondencePair;
