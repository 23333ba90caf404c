use log::{debug, info, warn};

use crate::dac::{Color, DacError, LaserDac, LaserPoint};

/// Device coordinates are a 12-bit unsigned square, like common galvo DACs.
const XY_MAX: i32 = 4095;

/// In-process laser DAC: models the point list, color and playback state of
/// a real device without touching hardware.
///
/// Useful as the test double for the calibration engine and as the dry-run
/// target when no projector is attached.
#[derive(Clone, Debug)]
pub struct SimulatedDac {
    points: Vec<LaserPoint>,
    color: Color,
    playing: bool,
    initialized: bool,
}

impl Default for SimulatedDac {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            color: Color::new(1, 1, 1, 1),
            playing: false,
            initialized: false,
        }
    }
}

impl SimulatedDac {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current render list.
    pub fn points(&self) -> &[LaserPoint] {
        &self.points
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn color(&self) -> Color {
        self.color
    }
}

impl LaserDac for SimulatedDac {
    fn initialize(&mut self) -> Result<usize, DacError> {
        info!("initializing simulated DAC");
        self.initialized = true;
        Ok(1)
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn add_point(&mut self, x: i32, y: i32) {
        if self.in_bounds(x, y) {
            self.points.push(LaserPoint::new(x, y));
        } else {
            debug!("dropping out-of-bounds point ({x}, {y})");
        }
    }

    fn remove_point(&mut self) {
        self.points.pop();
    }

    fn clear_points(&mut self) {
        self.points.clear();
    }

    fn play(&mut self) {
        if !self.initialized {
            warn!("play() before initialize(), ignoring");
            return;
        }
        self.playing = true;
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn close(&mut self) {
        self.playing = false;
        self.initialized = false;
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        (0..=XY_MAX).contains(&x) && (0..=XY_MAX).contains(&y)
    }

    fn bounds(&self, offset: i32) -> Vec<LaserPoint> {
        vec![
            LaserPoint::new(offset, offset),
            LaserPoint::new(offset, XY_MAX - offset),
            LaserPoint::new(XY_MAX - offset, XY_MAX - offset),
            LaserPoint::new(XY_MAX - offset, offset),
        ]
    }
}
