use laser_calib_core::GrayImage;

use log::debug;

/// Clockwise 8-neighborhood in image coordinates (y grows downward),
/// starting at West.
const NBR: [(i32, i32); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

fn dir_index(d: (i32, i32)) -> usize {
    match d {
        (-1, 0) => 0,
        (-1, -1) => 1,
        (0, -1) => 2,
        (1, -1) => 3,
        (1, 0) => 4,
        (1, 1) => 5,
        (0, 1) => 6,
        (-1, 1) => 7,
        _ => unreachable!("not an 8-neighbor offset"),
    }
}

/// One connected bright region of a binary mask.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blob {
    /// Zeroth image moment: number of foreground pixels.
    pub area: f64,
    /// Length of the traced outer boundary, diagonal steps weighted sqrt(2).
    pub perimeter: f64,
    /// First-order moments divided by the zeroth: (m10/m00, m01/m00).
    pub centroid: (f64, f64),
}

impl Blob {
    /// `4*pi*area / perimeter^2`: 1.0 for a perfect circle, lower for
    /// irregular or elongated shapes. Zero for blobs too small to trace.
    pub fn circularity(&self) -> f64 {
        if self.perimeter <= f64::EPSILON {
            return 0.0;
        }
        4.0 * std::f64::consts::PI * self.area / (self.perimeter * self.perimeter)
    }
}

#[inline]
fn is_fg(mask: &GrayImage, x: i32, y: i32) -> bool {
    x >= 0
        && y >= 0
        && (x as usize) < mask.width
        && (y as usize) < mask.height
        && mask.get(x as usize, y as usize) != 0
}

/// Trace the outer boundary of the component containing `start` with
/// Moore-neighbor tracing and return its length.
///
/// `start` must be the component's first pixel in row-major scan order, so
/// its West neighbor is guaranteed background. The walk stops when it
/// repeats its first directed step.
fn trace_perimeter(mask: &GrayImage, start: (i32, i32), max_steps: usize) -> f64 {
    // Backtrack starts at the known-background West neighbor.
    let mut bdir = 0usize;
    let mut cur = start;
    let mut perimeter = 0.0;
    let mut first_edge = None;

    for _ in 0..max_steps {
        let mut next = None;
        for k in 1..=8 {
            let idx = (bdir + k) % 8;
            let nx = cur.0 + NBR[idx].0;
            let ny = cur.1 + NBR[idx].1;
            if is_fg(mask, nx, ny) {
                // Last background examined before the hit; it is 8-adjacent
                // to the new pixel and becomes its backtrack.
                let qdir = (bdir + k - 1) % 8;
                let q = (cur.0 + NBR[qdir].0, cur.1 + NBR[qdir].1);
                next = Some((idx, (nx, ny), q));
                break;
            }
        }

        let Some((idx, np, q)) = next else {
            return 0.0; // isolated pixel, no boundary to walk
        };

        let edge = (cur, np);
        match first_edge {
            None => first_edge = Some(edge),
            Some(first) if first == edge => return perimeter,
            Some(_) => {}
        }

        perimeter += if NBR[idx].0 != 0 && NBR[idx].1 != 0 {
            std::f64::consts::SQRT_2
        } else {
            1.0
        };
        bdir = dir_index((q.0 - np.0, q.1 - np.1));
        cur = np;
    }

    perimeter
}

/// Extract all 8-connected foreground blobs of a binary mask.
pub fn find_blobs(mask: &GrayImage) -> Vec<Blob> {
    let w = mask.width;
    let h = mask.height;
    let mut visited = vec![false; w * h];
    let mut blobs = Vec::new();
    let mut stack = Vec::new();

    for sy in 0..h {
        for sx in 0..w {
            if visited[sy * w + sx] || mask.get(sx, sy) == 0 {
                continue;
            }

            // Row-major scan order makes (sx, sy) the top-left-most pixel
            // of its component.
            let mut area = 0u64;
            let mut sum_x = 0.0;
            let mut sum_y = 0.0;

            visited[sy * w + sx] = true;
            stack.push((sx, sy));
            while let Some((x, y)) = stack.pop() {
                area += 1;
                sum_x += x as f64;
                sum_y += y as f64;

                for &(dx, dy) in &NBR {
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    if is_fg(mask, nx, ny) && !visited[ny as usize * w + nx as usize] {
                        visited[ny as usize * w + nx as usize] = true;
                        stack.push((nx as usize, ny as usize));
                    }
                }
            }

            let perimeter =
                trace_perimeter(mask, (sx as i32, sy as i32), 8 * area as usize + 16);

            blobs.push(Blob {
                area: area as f64,
                perimeter,
                centroid: (sum_x / area as f64, sum_y / area as f64),
            });
        }
    }

    blobs
}

/// Pick the most circular blob above the area cutoff and return its
/// centroid as integer pixel coordinates.
///
/// The area cutoff rejects sensor noise; it is environment-sensitive, like
/// the luminance threshold. Returns `None` when no blob qualifies.
pub fn best_centroid(mask: &GrayImage, min_area: f64) -> Option<(i32, i32)> {
    let blobs = find_blobs(mask);

    let mut best: Option<&Blob> = None;
    for blob in &blobs {
        if blob.area < min_area {
            continue;
        }
        if best.map_or(true, |b| blob.circularity() > b.circularity()) {
            best = Some(blob);
        }
    }

    debug!(
        "best_centroid: {} blobs, best circularity {:?}",
        blobs.len(),
        best.map(Blob::circularity)
    );

    best.map(|b| (b.centroid.0.round() as i32, b.centroid.1.round() as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disc_mask(w: usize, h: usize, cx: f64, cy: f64, r: f64) -> GrayImage {
        let mut mask = GrayImage::zeros(w, h);
        for y in 0..h {
            for x in 0..w {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                if dx * dx + dy * dy <= r * r {
                    mask.set(x, y, 255);
                }
            }
        }
        mask
    }

    fn rect_mask_into(mask: &mut GrayImage, x0: usize, y0: usize, w: usize, h: usize) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                mask.set(x, y, 255);
            }
        }
    }

    #[test]
    fn disc_centroid_is_within_one_pixel() {
        let mask = disc_mask(64, 64, 30.0, 27.0, 11.0);
        let (cx, cy) = best_centroid(&mask, 100.0).expect("disc found");
        assert!((cx - 30).abs() <= 1, "cx = {cx}");
        assert!((cy - 27).abs() <= 1, "cy = {cy}");
    }

    #[test]
    fn empty_mask_yields_nothing() {
        let mask = GrayImage::zeros(32, 32);
        assert_eq!(best_centroid(&mask, 100.0), None);
    }

    #[test]
    fn blobs_below_min_area_are_rejected() {
        let mask = disc_mask(32, 32, 16.0, 16.0, 4.0); // ~50 px
        assert_eq!(best_centroid(&mask, 100.0), None);
        assert!(best_centroid(&mask, 10.0).is_some());
    }

    #[test]
    fn circle_beats_larger_elongated_blob() {
        let mut mask = disc_mask(128, 64, 25.0, 30.0, 11.0);
        // A long thin bar with much larger area but poor circularity.
        rect_mask_into(&mut mask, 50, 28, 70, 8);

        let (cx, cy) = best_centroid(&mask, 100.0).expect("found");
        assert!((cx - 25).abs() <= 1 && (cy - 30).abs() <= 1, "picked ({cx},{cy})");
    }

    #[test]
    fn disc_circularity_is_near_one() {
        let mask = disc_mask(64, 64, 32.0, 32.0, 12.0);
        let blobs = find_blobs(&mask);
        assert_eq!(blobs.len(), 1);
        let c = blobs[0].circularity();
        assert!(c > 0.75 && c < 1.2, "circularity = {c}");
    }

    #[test]
    fn bar_circularity_is_low() {
        let mut mask = GrayImage::zeros(128, 32);
        rect_mask_into(&mut mask, 4, 14, 100, 4);
        let blobs = find_blobs(&mask);
        assert_eq!(blobs.len(), 1);
        assert!(blobs[0].circularity() < 0.4);
    }

    #[test]
    fn square_geometry_is_consistent() {
        let mut mask = GrayImage::zeros(32, 32);
        rect_mask_into(&mut mask, 8, 8, 10, 10);
        let blobs = find_blobs(&mask);
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].area, 100.0);
        // Boundary of a 10x10 square: 4 sides of 9 steps.
        assert!((blobs[0].perimeter - 36.0).abs() < 1e-9);
        assert_eq!(blobs[0].centroid, (12.5, 12.5));
    }

    #[test]
    fn separate_components_are_kept_apart() {
        let mut mask = GrayImage::zeros(64, 16);
        rect_mask_into(&mut mask, 2, 2, 5, 5);
        rect_mask_into(&mut mask, 40, 6, 6, 6);
        let blobs = find_blobs(&mask);
        assert_eq!(blobs.len(), 2);
    }

    #[test]
    fn single_pixel_blob_has_zero_circularity() {
        let mut mask = GrayImage::zeros(8, 8);
        mask.set(3, 3, 255);
        let blobs = find_blobs(&mask);
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].circularity(), 0.0);
    }

    #[test]
    fn touching_image_border_does_not_panic() {
        let mask = disc_mask(20, 20, 0.0, 0.0, 6.0);
        let blobs = find_blobs(&mask);
        assert_eq!(blobs.len(), 1);
        assert!(blobs[0].perimeter > 0.0);
    }
}
