//! Hardware seams for camera-laser calibration.
//!
//! The calibration engine talks to two collaborators: a laser DAC that
//! renders a point list, and a frame source that hands out the most recent
//! camera frame. Both are traits here; concrete hardware families plug in
//! behind [`open_dac`]. The crate ships one software family,
//! [`SimulatedDac`], which models point-list and playback state without a
//! physical device.

mod camera;
mod dac;
mod simulated;

pub use camera::{FramePublisher, FrameSlot, FrameSource};
pub use dac::{open_dac, Color, DacError, DacKind, LaserDac, LaserPoint};
pub use simulated::SimulatedDac;
