use laser_calib_core::{GrayImage, RgbFrame};
use log::warn;

/// Build a binary foreground mask isolating bright scene changes.
///
/// With a background frame the per-channel absolute difference suppresses
/// static scene content before the luma conversion, so only the projected
/// dot survives the cutoff. Pixels whose intensity exceeds `threshold`
/// become 255, everything else 0.
///
/// The threshold is environment-sensitive and may need per-installation
/// tuning; see `DetectorParams::luminance_threshold`.
///
/// Returns `None` when the background frame dimensions differ from the
/// input frame: the difference is meaningless then, and frame sources make
/// no promise of constant dimensions across a run.
pub fn foreground_mask(
    frame: &RgbFrame,
    background: Option<&RgbFrame>,
    threshold: u8,
) -> Option<GrayImage> {
    let gray = match background {
        Some(bg) => {
            if bg.width != frame.width || bg.height != frame.height {
                warn!(
                    "background frame size {}x{} does not match frame size {}x{}",
                    bg.width, bg.height, frame.width, frame.height
                );
                return None;
            }
            let diff: Vec<u8> = frame
                .data
                .iter()
                .zip(bg.data.iter())
                .map(|(&a, &b)| a.abs_diff(b))
                .collect();
            RgbFrame {
                width: frame.width,
                height: frame.height,
                data: diff,
            }
            .to_gray()
        }
        None => frame.to_gray(),
    };

    let data = gray
        .data
        .iter()
        .map(|&v| if v > threshold { 255 } else { 0 })
        .collect();

    Some(GrayImage {
        width: gray.width,
        height: gray.height,
        data,
    })
}
