//! Core types and utilities for camera-laser calibration.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any hardware interface or concrete blob detector.

mod homography;
mod image;
mod logger;

pub use homography::{
    estimate_homography, normalize_points, Homography, HomographyError, MIN_CORRESPONDENCES,
};
pub use image::{GrayImage, RgbFrame};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
