use serde::{Deserialize, Serialize};

use crate::simulated::SimulatedDac;

/// A point in laser-device coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaserPoint {
    pub x: i32,
    pub y: i32,
}

impl LaserPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Beam color and intensity, 8 bits per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub i: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, i: u8) -> Self {
        Self { r, g, b, i }
    }
}

/// Errors from DAC lifecycle and commands.
#[derive(thiserror::Error, Debug)]
pub enum DacError {
    #[error("no devices found")]
    NoDevices,
    #[error("device not initialized")]
    NotInitialized,
}

/// Capability interface over a laser projector DAC.
///
/// One implementation per hardware family; global point-list and playback
/// state is owned by the instance, with an explicit `initialize`/`close`
/// lifecycle. The calibration run requires exclusive access (`&mut`), which
/// also serializes it against any concurrent manual-pointing feature.
pub trait LaserDac {
    /// Open the device. Returns the number of devices found.
    fn initialize(&mut self) -> Result<usize, DacError>;

    fn set_color(&mut self, color: Color);

    /// Append a point to the render list. Out-of-bounds points are ignored.
    fn add_point(&mut self, x: i32, y: i32);

    /// Remove the last added point, if any.
    fn remove_point(&mut self);

    fn clear_points(&mut self);

    /// Start rendering the current point list at the device scan rate.
    fn play(&mut self);

    /// Stop rendering; the point list is retained.
    fn stop(&mut self);

    fn close(&mut self);

    fn in_bounds(&self, x: i32, y: i32) -> bool;

    /// Corners of the device square inset by `offset`, in a fixed order.
    ///
    /// Deterministic; distinct offsets yield spatially distinct rectangles,
    /// which is what gives the calibration point set its two-axis spread.
    fn bounds(&self, offset: i32) -> Vec<LaserPoint>;
}

/// Supported hardware families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DacKind {
    /// In-process software device, for tests and dry runs.
    Simulated,
}

/// Runtime factory: open a DAC of the requested family.
pub fn open_dac(kind: DacKind) -> Result<Box<dyn LaserDac>, DacError> {
    match kind {
        DacKind::Simulated => {
            let mut dac = SimulatedDac::default();
            dac.initialize()?;
            Ok(Box::new(dac))
        }
    }
}
