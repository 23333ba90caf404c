use nalgebra::{DMatrix, Matrix3, Point2, Vector3};

/// Minimum number of point correspondences the DLT solve accepts.
pub const MIN_CORRESPONDENCES: usize = 4;

/// Errors from the homography estimator.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomographyError {
    #[error("need at least {MIN_CORRESPONDENCES} point correspondences, got {got}")]
    NotEnoughPairs { got: usize },
    #[error("correspondence lists differ in length ({laser} laser vs {camera} camera)")]
    LengthMismatch { laser: usize, camera: usize },
    #[error("degenerate point configuration (coincident or collinear)")]
    DegenerateGeometry,
    #[error("numerical failure in the linear solve")]
    NumericalFailure,
}

/// A 3x3 projective transform between two planes, `dst ~ H * src` up to scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn from_array(rows: [[f64; 3]; 3]) -> Self {
        Self::new(Matrix3::from_row_slice(&[
            rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2], rows[2][0],
            rows[2][1], rows[2][2],
        ]))
    }

    pub fn to_array(&self) -> [[f64; 3]; 3] {
        [
            [self.h[(0, 0)], self.h[(0, 1)], self.h[(0, 2)]],
            [self.h[(1, 0)], self.h[(1, 1)], self.h[(1, 2)]],
            [self.h[(2, 0)], self.h[(2, 1)], self.h[(2, 2)]],
        ]
    }

    /// Apply the transform to a 2D point and divide by the third coordinate.
    #[inline]
    pub fn apply(&self, p: Point2<f64>) -> Point2<f64> {
        let v = self.h * Vector3::new(p.x, p.y, 1.0);
        Point2::new(v[0] / v[2], v[1] / v[2])
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }
}

fn similarity_transform(cx: f64, cy: f64, mean_dist: f64) -> Matrix3<f64> {
    let s = (2.0_f64).sqrt() / mean_dist;
    Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0)
}

/// Hartley normalization: translate the centroid to the origin and scale so
/// the mean distance from it becomes sqrt(2).
///
/// Returns the normalized points together with the similarity transform `T`
/// that produced them. Fails with [`HomographyError::DegenerateGeometry`]
/// when all points coincide (zero mean distance).
pub fn normalize_points(
    pts: &[Point2<f64>],
) -> Result<(Vec<Point2<f64>>, Matrix3<f64>), HomographyError> {
    if pts.is_empty() {
        return Err(HomographyError::DegenerateGeometry);
    }

    let n = pts.len() as f64;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for p in pts {
        cx += p.x;
        cy += p.y;
    }
    cx /= n;
    cy /= n;

    let mut mean_dist = 0.0;
    for p in pts {
        let dx = p.x - cx;
        let dy = p.y - cy;
        mean_dist += (dx * dx + dy * dy).sqrt();
    }
    mean_dist /= n;

    if mean_dist < 1e-12 {
        return Err(HomographyError::DegenerateGeometry);
    }

    let t = similarity_transform(cx, cy, mean_dist);

    let mut out = Vec::with_capacity(pts.len());
    for p in pts {
        let v = t * Vector3::new(p.x, p.y, 1.0);
        out.push(Point2::new(v[0], v[1]));
    }
    Ok((out, t))
}

/// Smallest eigenvalue of the 2x2 scatter of a zero-mean point set.
///
/// Near zero for collinear configurations, which leave the DLT system with a
/// null space of dimension > 1.
fn min_scatter_eigenvalue(pts: &[Point2<f64>]) -> f64 {
    let n = pts.len() as f64;
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for p in pts {
        sxx += p.x * p.x;
        sxy += p.x * p.y;
        syy += p.y * p.y;
    }
    sxx /= n;
    sxy /= n;
    syy /= n;

    let tr = sxx + syy;
    let det = sxx * syy - sxy * sxy;
    let disc = (tr * tr - 4.0 * det).max(0.0).sqrt();
    0.5 * (tr - disc)
}

/// Estimate `H` such that `laser ~ H * camera` with the normalized DLT.
///
/// `laser` points live in the projector's device coordinates and `camera`
/// points in pixels; the two slices pair up index-wise. The result is scaled
/// so that `H[2,2] == 1` when that entry is well conditioned; homogeneous
/// transforms are scale-equivalent either way. Callers recover a laser point
/// from a camera point with [`Homography::apply`].
pub fn estimate_homography(
    laser: &[Point2<f64>],
    camera: &[Point2<f64>],
) -> Result<Homography, HomographyError> {
    let n = laser.len();
    if n != camera.len() {
        return Err(HomographyError::LengthMismatch {
            laser: n,
            camera: camera.len(),
        });
    }
    if n < MIN_CORRESPONDENCES {
        return Err(HomographyError::NotEnoughPairs { got: n });
    }

    let (laser_n, t_laser) = normalize_points(laser)?;
    let (camera_n, t_camera) = normalize_points(camera)?;

    // Normalized sets are zero-mean, so the scatter check applies directly.
    if min_scatter_eigenvalue(&laser_n) < 1e-6 || min_scatter_eigenvalue(&camera_n) < 1e-6 {
        return Err(HomographyError::DegenerateGeometry);
    }

    // Each pair contributes two rows of the cross-product formulation; the
    // third possible row is linearly dependent and omitted.
    let rows = (2 * n).max(9);
    let mut a = DMatrix::<f64>::zeros(rows, 9);

    for k in 0..n {
        let x = camera_n[k].x;
        let y = camera_n[k].y;
        let u = laser_n[k].x;
        let v = laser_n[k].y;

        // [ -x -y -1   0  0  0   u*x u*y u ]
        a[(2 * k, 0)] = -x;
        a[(2 * k, 1)] = -y;
        a[(2 * k, 2)] = -1.0;
        a[(2 * k, 6)] = u * x;
        a[(2 * k, 7)] = u * y;
        a[(2 * k, 8)] = u;

        // [ 0  0  0  -x -y -1   v*x v*y v ]
        a[(2 * k + 1, 3)] = -x;
        a[(2 * k + 1, 4)] = -y;
        a[(2 * k + 1, 5)] = -1.0;
        a[(2 * k + 1, 6)] = v * x;
        a[(2 * k + 1, 7)] = v * y;
        a[(2 * k + 1, 8)] = v;
    }
    // With exactly 4 pairs the system is 8x9 and the thin SVD would not
    // expose the full right-singular basis; the zero padding rows above
    // (rows.max(9)) keep the null-space vector reachable as the last row
    // of V^T.

    // Solve A h = 0: right singular vector of the smallest singular value.
    let svd = a.svd(true, true);
    let v_t = svd.v_t.ok_or(HomographyError::NumericalFailure)?;
    let h = v_t.row(v_t.nrows() - 1); // last row of V^T = last column of V

    let p = Matrix3::from_row_slice(&[h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8]]);

    // Denormalize: H = T_laser^{-1} * P * T_camera
    let t_laser_inv = t_laser
        .try_inverse()
        .ok_or(HomographyError::NumericalFailure)?;
    let mut h_mat = t_laser_inv * p * t_camera;

    if !h_mat.iter().all(|v| v.is_finite()) {
        return Err(HomographyError::NumericalFailure);
    }

    let scale = h_mat[(2, 2)];
    if scale.abs() > 1e-9 {
        h_mat /= scale;
    }

    Ok(Homography::new(h_mat))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ground_truth() -> Homography {
        Homography::new(Matrix3::new(
            6.1, 0.35, 210.0, //
            -0.2, 5.8, 145.0, //
            1.1e-4, -0.7e-4, 1.0,
        ))
    }

    fn camera_grid(cols: usize, rows: usize, step: f64) -> Vec<Point2<f64>> {
        (0..rows)
            .flat_map(|j| (0..cols).map(move |i| Point2::new(i as f64 * step, j as f64 * step)))
            .collect()
    }

    fn assert_close(a: Point2<f64>, b: Point2<f64>, tol: f64) {
        assert!(
            (a.x - b.x).abs() < tol && (a.y - b.y).abs() < tol,
            "expected ({:.6},{:.6}) ~ ({:.6},{:.6}) within {}",
            a.x,
            a.y,
            b.x,
            b.y,
            tol
        );
    }

    #[test]
    fn recovers_exact_transform_from_grid() {
        let truth = ground_truth();
        let camera = camera_grid(4, 3, 60.0);
        let laser: Vec<_> = camera.iter().map(|&p| truth.apply(p)).collect();

        let est = estimate_homography(&laser, &camera).expect("estimate");

        // Held-out probes, not part of the fit.
        for p in [
            Point2::new(25.0, 35.0),
            Point2::new(130.0, 90.0),
            Point2::new(205.0, 10.0),
        ] {
            assert_close(est.apply(p), truth.apply(p), 1e-6);
        }
    }

    #[test]
    fn recovers_from_minimal_four_pairs() {
        let truth = ground_truth();
        let camera = vec![
            Point2::new(0.0, 0.0),
            Point2::new(300.0, 10.0),
            Point2::new(280.0, 220.0),
            Point2::new(20.0, 240.0),
        ];
        let laser: Vec<_> = camera.iter().map(|&p| truth.apply(p)).collect();

        let est = estimate_homography(&laser, &camera).expect("estimate");
        for (&c, &l) in camera.iter().zip(laser.iter()) {
            assert_close(est.apply(c), l, 1e-6);
        }
    }

    #[test]
    fn result_is_scale_normalized() {
        let truth = ground_truth();
        let camera = camera_grid(3, 3, 80.0);
        let laser: Vec<_> = camera.iter().map(|&p| truth.apply(p)).collect();

        let est = estimate_homography(&laser, &camera).expect("estimate");
        assert_relative_eq!(est.h[(2, 2)], 1.0, epsilon = 1e-12);
        // Up to that common scale the matrices agree entry-wise.
        for r in 0..3 {
            for c in 0..3 {
                assert_relative_eq!(est.h[(r, c)], truth.h[(r, c)], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn degrades_gracefully_under_noise() {
        let truth = ground_truth();
        let camera_clean = camera_grid(4, 4, 70.0);
        let laser: Vec<_> = camera_clean.iter().map(|&p| truth.apply(p)).collect();

        // Deterministic sub-pixel jitter on the camera observations.
        let camera: Vec<_> = camera_clean
            .iter()
            .enumerate()
            .map(|(k, p)| {
                let phase = k as f64 * 2.399963; // golden-angle increments
                Point2::new(p.x + 0.4 * phase.sin(), p.y + 0.4 * phase.cos())
            })
            .collect();

        let est = estimate_homography(&laser, &camera).expect("estimate");
        assert!(est.h.iter().all(|v| v.is_finite()));

        let mean_residual: f64 = camera_clean
            .iter()
            .zip(laser.iter())
            .map(|(&c, &l)| {
                let q = est.apply(c);
                ((q.x - l.x).powi(2) + (q.y - l.y).powi(2)).sqrt()
            })
            .sum::<f64>()
            / camera_clean.len() as f64;

        // 0.4 px of camera jitter maps to a handful of laser units here.
        assert!(mean_residual < 25.0, "mean residual {mean_residual}");
    }

    #[test]
    fn rejects_too_few_pairs() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ];
        assert_eq!(
            estimate_homography(&pts, &pts),
            Err(HomographyError::NotEnoughPairs { got: 3 })
        );
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let a = vec![Point2::new(0.0, 0.0); 5];
        let b = vec![Point2::new(0.0, 0.0); 4];
        assert_eq!(
            estimate_homography(&a, &b),
            Err(HomographyError::LengthMismatch {
                laser: 5,
                camera: 4
            })
        );
    }

    #[test]
    fn rejects_collinear_points() {
        let camera: Vec<_> = (0..6).map(|k| Point2::new(k as f64 * 10.0, 5.0)).collect();
        let laser: Vec<_> = (0..6)
            .map(|k| Point2::new(k as f64 * 100.0, 50.0))
            .collect();
        assert_eq!(
            estimate_homography(&laser, &camera),
            Err(HomographyError::DegenerateGeometry)
        );
    }

    #[test]
    fn rejects_coincident_points() {
        let pts = vec![Point2::new(3.0, 4.0); 6];
        assert_eq!(
            estimate_homography(&pts, &pts),
            Err(HomographyError::DegenerateGeometry)
        );
    }

    #[test]
    fn normalization_round_trips() {
        let pts = vec![
            Point2::new(12.0, -3.0),
            Point2::new(640.0, 480.0),
            Point2::new(100.0, 370.0),
            Point2::new(-55.0, 20.0),
        ];
        let (normed, t) = normalize_points(&pts).expect("normalize");

        // Mean distance from the origin becomes sqrt(2).
        let mean: f64 =
            normed.iter().map(|p| (p.x * p.x + p.y * p.y).sqrt()).sum::<f64>() / normed.len() as f64;
        assert_relative_eq!(mean, (2.0_f64).sqrt(), epsilon = 1e-12);

        let t_inv = t.try_inverse().expect("invertible");
        for (orig, n) in pts.iter().zip(normed.iter()) {
            let v = t_inv * Vector3::new(n.x, n.y, 1.0);
            assert_close(Point2::new(v[0] / v[2], v[1] / v[2]), *orig, 1e-9);
        }
    }

    #[test]
    fn homography_inverse_round_trips() {
        let h = ground_truth();
        let inv = h.inverse().expect("invertible");
        for p in [Point2::new(0.0, 0.0), Point2::new(150.0, 90.0)] {
            assert_close(inv.apply(h.apply(p)), p, 1e-9);
        }
    }

    #[test]
    fn array_round_trip() {
        let h = ground_truth();
        assert_eq!(Homography::from_array(h.to_array()), h);
    }
}
