//! Run a full calibration against an in-process rig.
//!
//! A publisher thread keeps the frame slot fed with synthetic frames: a
//! checkerboard background, plus a bright disc wherever the simulated
//! projector currently points. Useful as a smoke test without hardware:
//!
//! ```sh
//! cargo run --example calibrate_simulated
//! ```

use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use log::{info, LevelFilter};
use nalgebra::{Matrix3, Point2};

use laser_calib::core::{init_with_level, Homography, RgbFrame};
use laser_calib::hw::{Color, DacError, FramePublisher, FrameSlot, LaserDac, LaserPoint};
use laser_calib::{calibrate, CalibrationParams};

const XY_MAX: i32 = 4095;

#[derive(Default)]
struct Scene {
    playing: bool,
    points: Vec<LaserPoint>,
}

struct SceneDac {
    scene: Arc<Mutex<Scene>>,
}

impl LaserDac for SceneDac {
    fn initialize(&mut self) -> Result<usize, DacError> {
        Ok(1)
    }
    fn set_color(&mut self, _color: Color) {}
    fn add_point(&mut self, x: i32, y: i32) {
        if self.in_bounds(x, y) {
            self.scene.lock().unwrap().points.push(LaserPoint::new(x, y));
        }
    }
    fn remove_point(&mut self) {
        self.scene.lock().unwrap().points.pop();
    }
    fn clear_points(&mut self) {
        self.scene.lock().unwrap().points.clear();
    }
    fn play(&mut self) {
        self.scene.lock().unwrap().playing = true;
    }
    fn stop(&mut self) {
        self.scene.lock().unwrap().playing = false;
    }
    fn close(&mut self) {}
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

fn laser_to_camera() -> Homography {
    Homography::new(Matrix3::new(
        0.132, 0.004, 34.0, //
        -0.003, 0.098, 28.0, //
        1.5e-6, -1.0e-6, 1.0,
    ))
}

fn render(scene: &Scene) -> RgbFrame {
    let mut frame = RgbFrame::black(640, 480);
    for y in 0..frame.height {
        for x in 0..frame.width {
            let v = ((x / 40 + y / 40) % 2) as u8 * 90;
            frame.set_pixel(x, y, [v, v, v]);
        }
    }
    if scene.playing {
        for p in &scene.points {
            let c = laser_to_camera().apply(Point2::new(p.x as f64, p.y as f64));
            for y in 0..frame.height {
                for x in 0..frame.width {
                    let dx = x as f64 - c.x;
                    let dy = y as f64 - c.y;
                    if dx * dx + dy * dy <= 64.0 {
                        frame.set_pixel(x, y, [255, 255, 255]);
                    }
                }
            }
        }
    }
    frame
}

fn spawn_capture_thread(scene: Arc<Mutex<Scene>>, publisher: FramePublisher) {
    thread::spawn(move || loop {
        let frame = {
            let scene = scene.lock().unwrap();
            render(&scene)
        };
        publisher.publish(frame);
        thread::sleep(Duration::from_millis(33));
    });
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let level = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|s| LevelFilter::from_str(&s).ok())
        .unwrap_or(LevelFilter::Info);
    init_with_level(level)?;

    let scene = Arc::new(Mutex::new(Scene::default()));
    let slot = FrameSlot::new();
    spawn_capture_thread(Arc::clone(&scene), slot.publisher());

    let mut dac = SceneDac {
        scene: Arc::clone(&scene),
    };
    dac.initialize()?;

    let params = CalibrationParams {
        settle: Duration::from_millis(100), // the simulated galvos are quick
        ..CalibrationParams::default()
    };

    let transform = calibrate(&slot, &mut dac, &params)?;
    info!("recovered camera-to-laser transform:");
    for row in transform.to_array() {
        info!("  [{:12.6} {:12.6} {:12.6}]", row[0], row[1], row[2]);
    }

    let probe = Point2::new(320.0, 240.0);
    let laser = transform.apply(probe);
    info!(
        "camera pixel ({:.0}, {:.0}) maps to laser ({:.0}, {:.0})",
        probe.x, probe.y, laser.x, laser.y
    );
    Ok(())
}
