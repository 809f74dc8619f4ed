//! Curve mappings and their derived lookup tables.
//!
//! A [`CurveMap`] is the storage the synchronizer writes control points into.
//! Writing points does not refresh the sampled lookup table: the owner has to
//! call [`CurveMap::notify_changed`] (or [`CurveMapping::update`]) afterwards,
//! the same way the host's curve mapping needs an explicit update.
//!
//! Evaluation uses cubic Hermite segments with Fritsch-Carlson tangents, so an
//! ascending set of points never produces an overshooting curve. Points with a
//! [`HandleKind::Vector`] handle make the adjacent segment sides straight.

use crate::{identity_points, ControlPoint, HandleKind};

/// Default number of samples in a lookup table.
pub const DEFAULT_LUT_SIZE: usize = 256;

// ============================================================================
// LUT Type
// ============================================================================

/// Pre-computed lookup table sampled over the x range of a curve.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveLut {
    x_min: f32,
    x_max: f32,
    /// Samples: table[k] = curve(x_min + k * (x_max - x_min) / (len - 1))
    table: Vec<f32>,
}

impl CurveLut {
    /// Sample `points` into a table of `size` entries.
    pub fn from_points(points: &[ControlPoint], size: usize) -> Self {
        let size = size.max(2);
        let (x_min, x_max) = x_range(points).unwrap_or((0.0, 1.0));

        let tangents = compute_monotonic_tangents(points);
        let step = (x_max - x_min) / (size - 1) as f32;
        let table = (0..size)
            .map(|k| evaluate_with_tangents(points, &tangents, x_min + k as f32 * step))
            .collect();

        Self {
            x_min,
            x_max,
            table,
        }
    }

    /// Create the identity table (y = x over 0..1).
    pub fn identity(size: usize) -> Self {
        Self::from_points(&identity_points(), size)
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Look up `x`, linearly interpolating between samples.
    pub fn sample(&self, x: f32) -> f32 {
        let last = self.table.len() - 1;
        let range = self.x_max - self.x_min;
        if range.abs() < f32::EPSILON {
            return self.table[0];
        }

        let t = ((x - self.x_min) / range).clamp(0.0, 1.0) * last as f32;
        let i = (t.floor() as usize).min(last);
        if i == last {
            return self.table[last];
        }
        let frac = t - i as f32;
        self.table[i] + (self.table[i + 1] - self.table[i]) * frac
    }
}

impl Default for CurveLut {
    fn default() -> Self {
        Self::identity(DEFAULT_LUT_SIZE)
    }
}

// ============================================================================
// Curve Storage
// ============================================================================

/// One curve of a mapping: an ordered point list plus its lookup table.
///
/// Always holds at least two points. Writes replace the whole list.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveMap {
    points: Vec<ControlPoint>,
    lut: CurveLut,
    lut_size: usize,
    stale: bool,
}

impl CurveMap {
    /// Create an identity curve whose table holds `lut_size` samples.
    pub fn new(lut_size: usize) -> Self {
        Self {
            points: identity_points(),
            lut: CurveLut::identity(lut_size),
            lut_size: lut_size.max(2),
            stale: false,
        }
    }

    /// Current control points.
    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    /// Check if the curve is in the 2-point identity state.
    pub fn is_identity(&self) -> bool {
        self.points == identity_points()
    }

    /// Whether points changed since the last [`CurveMap::notify_changed`].
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Truncate to two points and move them to (0,0) and (1,1).
    pub fn reset(&mut self) {
        if self.is_identity() {
            return;
        }
        self.points.truncate(2);
        self.points.clone_from_slice(&identity_points());
        self.stale = true;
    }

    /// Replace all points with `points`.
    ///
    /// Lists with fewer than two points, or with a non-finite coordinate,
    /// cannot form a curve and are ignored. Order is kept as given.
    /// Returns whether the curve was written.
    pub fn write(&mut self, points: &[ControlPoint]) -> bool {
        if points.len() < 2 || !points.iter().all(|p| p.x.is_finite() && p.y.is_finite()) {
            return false;
        }
        if self.points != points {
            self.points.clear();
            self.points.extend_from_slice(points);
            self.stale = true;
        }
        true
    }

    /// Recompute the lookup table from the current points.
    pub fn notify_changed(&mut self) {
        self.lut = CurveLut::from_points(&self.points, self.lut_size);
        self.stale = false;
    }

    /// Evaluate through the lookup table, as last refreshed.
    pub fn evaluate(&self, x: f32) -> f32 {
        self.lut.sample(x)
    }

    pub fn lut(&self) -> &CurveLut {
        &self.lut
    }
}

impl Default for CurveMap {
    fn default() -> Self {
        Self::new(DEFAULT_LUT_SIZE)
    }
}

/// A group of curves updated together, e.g. the X/Y/Z curves of a vector
/// mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveMapping {
    curves: Vec<CurveMap>,
    updates: u64,
}

impl CurveMapping {
    pub fn new(curve_count: usize, lut_size: usize) -> Self {
        Self {
            curves: (0..curve_count).map(|_| CurveMap::new(lut_size)).collect(),
            updates: 0,
        }
    }

    pub fn curves(&self) -> &[CurveMap] {
        &self.curves
    }

    pub fn curves_mut(&mut self) -> &mut [CurveMap] {
        &mut self.curves
    }

    pub fn curve(&self, index: usize) -> Option<&CurveMap> {
        self.curves.get(index)
    }

    pub fn curve_mut(&mut self, index: usize) -> Option<&mut CurveMap> {
        self.curves.get_mut(index)
    }

    /// Refresh the lookup data of every curve.
    pub fn update(&mut self) {
        for curve in &mut self.curves {
            curve.notify_changed();
        }
        self.updates += 1;
    }

    /// How many times [`CurveMapping::update`] ran.
    pub fn update_count(&self) -> u64 {
        self.updates
    }
}

// ============================================================================
// Monotonic Cubic Hermite Spline (Fritsch-Carlson)
// ============================================================================

/// Compute monotonic tangents using Fritsch-Carlson algorithm.
fn compute_monotonic_tangents(points: &[ControlPoint]) -> Vec<f32> {
    let n = points.len();
    if n < 2 {
        return vec![0.0; n];
    }

    // Compute secants (slopes between adjacent points)
    let h: Vec<f32> = points.windows(2).map(|w| w[1].x - w[0].x).collect();
    let delta: Vec<f32> = points
        .windows(2)
        .zip(&h)
        .map(|(w, &h)| {
            if h.abs() < f32::EPSILON {
                0.0
            } else {
                (w[1].y - w[0].y) / h
            }
        })
        .collect();

    let mut m: Vec<f32> = vec![0.0; n];

    // Interior points: weighted harmonic mean
    for i in 1..n - 1 {
        if delta[i - 1].signum() != delta[i].signum()
            || delta[i - 1].abs() < f32::EPSILON
            || delta[i].abs() < f32::EPSILON
        {
            m[i] = 0.0;
        } else {
            let w1 = 2.0 * h[i] + h[i - 1];
            let w2 = h[i] + 2.0 * h[i - 1];
            m[i] = (w1 + w2) / (w1 / delta[i - 1] + w2 / delta[i]);
        }
    }

    // Endpoint tangents
    m[0] = delta[0];
    m[n - 1] = delta[n - 2];

    // Enforce monotonicity constraints
    for i in 0..n - 1 {
        if delta[i].abs() < f32::EPSILON {
            m[i] = 0.0;
            m[i + 1] = 0.0;
        } else {
            let alpha = m[i] / delta[i];
            let beta = m[i + 1] / delta[i];
            let norm = alpha * alpha + beta * beta;
            if norm > 9.0 {
                let tau = 3.0 / norm.sqrt();
                m[i] = tau * alpha * delta[i];
                m[i + 1] = tau * beta * delta[i];
            }
        }
    }

    m
}

/// Evaluate curve at x with pre-computed tangents.
fn evaluate_with_tangents(points: &[ControlPoint], tangents: &[f32], x: f32) -> f32 {
    let n = points.len();

    if n == 0 {
        return x;
    }
    if n == 1 {
        return points[0].y;
    }

    // Clamp to the span of the end points, which may come in any order
    let x = match x_range(points) {
        Some((lo, hi)) => x.max(lo).min(hi),
        None => return points[0].y,
    };

    let i = find_interval(points, x);

    let p0 = &points[i];
    let p1 = &points[i + 1];

    let h = p1.x - p0.x;
    if h.abs() < f32::EPSILON {
        return p0.y;
    }
    let secant = (p1.y - p0.y) / h;

    // Vector handles straighten the segment on their side
    let m0 = match p0.handle {
        HandleKind::Vector => secant,
        HandleKind::Auto => tangents[i],
    };
    let m1 = match p1.handle {
        HandleKind::Vector => secant,
        HandleKind::Auto => tangents[i + 1],
    };

    let t = (x - p0.x) / h;
    let t2 = t * t;
    let t3 = t2 * t;

    // Hermite basis functions
    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    h00 * p0.y + h10 * h * m0 + h01 * p1.y + h11 * h * m1
}

/// Finite `(min, max)` span between the first and last x.
fn x_range(points: &[ControlPoint]) -> Option<(f32, f32)> {
    let (first, last) = (points.first()?.x, points.last()?.x);
    if !first.is_finite() || !last.is_finite() {
        return None;
    }
    Some((first.min(last), first.max(last)))
}

/// Binary search for interval containing x.
fn find_interval(points: &[ControlPoint], x: f32) -> usize {
    let n = points.len();
    if n <= 2 {
        return 0;
    }

    let mut low = 0;
    let mut high = n - 2;

    while low < high {
        let mid = (low + high).div_ceil(2);
        if points[mid].x <= x {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    low
}

// ============================================================================
// Direct Evaluation (for previews)
// ============================================================================

/// Evaluate a point list at `x` without building a lookup table.
pub fn evaluate_points(points: &[ControlPoint], x: f32) -> f32 {
    let tangents = compute_monotonic_tangents(points);
    evaluate_with_tangents(points, &tangents, x)
}

// ============================================================================
// Tests
// ============================================================================


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for ascending point lists inside the unit square.
    fn ascending_points_strategy() -> impl Strategy<Value = Vec<ControlPoint>> {
        prop::collection::vec((0.0f32..=1.0, 0.0f32..=1.0, any::<bool>()), 2..8).prop_map(
            |raw| {
                let mut xs: Vec<f32> = raw.iter().map(|(x, _, _)| *x).collect();
                xs.sort_by(|a, b| a.total_cmp(b));
                xs.iter()
                    .zip(&raw)
                    .map(|(&x, &(_, y, sharp))| {
                        if sharp {
                            ControlPoint::vector(x, y)
                        } else {
                            ControlPoint::new(x, y)
                        }
                    })
                    .collect()
            },
        )
    }

    /// Strategy for point lists in any order, with any finite coordinates.
    fn arbitrary_points_strategy() -> impl Strategy<Value = Vec<ControlPoint>> {
        prop::collection::vec((-1.0e3f32..1.0e3, -1.0e3f32..1.0e3, any::<bool>()), 2..8).prop_map(
            |raw| {
                raw.into_iter()
                    .map(|(x, y, sharp)| {
                        if sharp {
                            ControlPoint::vector(x, y)
                        } else {
                            ControlPoint::new(x, y)
                        }
                    })
                    .collect()
            },
        )
    }

    proptest! {
        /// Property: Any finite point list can be written, refreshed and
        /// evaluated.
        #[test]
        fn prop_arbitrary_points_refresh_and_evaluate(
            points in arbitrary_points_strategy(),
            x in -2.0e3f32..2.0e3,
        ) {
            let mut curve = CurveMap::new(32);
            prop_assert!(curve.write(&points));
            curve.notify_changed();
            prop_assert_eq!(curve.lut().len(), 32);
            let _ = curve.evaluate(x);
            let _ = evaluate_points(&points, x);
        }

        /// Property: Evaluation stays within the y range of the points.
        #[test]
        fn prop_evaluation_bounded_by_points(
            points in ascending_points_strategy(),
            x in -0.5f32..=1.5,
        ) {
            let y = evaluate_points(&points, x);
            let lo = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
            let hi = points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
            prop_assert!(y >= lo - 1e-4 && y <= hi + 1e-4, "y={} outside [{}, {}]", y, lo, hi);
        }

        /// Property: A write followed by a reset always lands on identity.
        #[test]
        fn prop_reset_after_write_is_identity(points in ascending_points_strategy()) {
            let mut curve = CurveMap::default();
            prop_assert!(curve.write(&points));
            prop_assert_eq!(curve.points(), points.as_slice());
            curve.reset();
            prop_assert!(curve.is_identity());
        }
    }
}
