//! Laser dot detection.
//!
//! Pipeline: (optional) frame differencing against a background frame,
//! luma conversion and fixed-threshold binarization, connected bright
//! blob extraction, circularity scoring and centroid computation. The
//! laser dot is assumed to be the most circular bright blob in the scene.

mod blob;
mod detect;
mod mask;

pub use blob::{best_centroid, find_blobs, Blob};
pub use detect::{detect_laser_point, DetectorParams};
pub use mask::foreground_mask;
