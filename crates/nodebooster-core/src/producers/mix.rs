//! Producer blending two upstream interpolations.

use super::InterpolationProducer;
use crate::curve::evaluate_points;
use crate::error::SyncError;
use crate::graph::{NodeId, SocketId};
use crate::sync::Upstream;
use crate::ControlPoint;

/// Blends the curves on inputs A and B by `factor` (0 = A, 1 = B).
///
/// Curves with the same point count blend point by point. Otherwise both are
/// sampled at the union of their x positions and the samples are blended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mix {
    pub factor: f32,
}

impl Mix {
    pub fn new(factor: f32) -> Self {
        Self { factor }
    }
}

impl Default for Mix {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl InterpolationProducer for Mix {
    fn evaluate(
        &self,
        node: NodeId,
        _output: SocketId,
        upstream: &mut Upstream<'_>,
    ) -> Result<Vec<ControlPoint>, SyncError> {
        let inputs = upstream.tree().node(node)?.inputs();
        let (Some(&a), Some(&b)) = (inputs.first(), inputs.get(1)) else {
            return Ok(Vec::new());
        };

        // Both sides are resolved so a bad link on either gets flagged
        let a = upstream.points(a)?.unwrap_or_default();
        let b = upstream.points(b)?.unwrap_or_default();
        if a.is_empty() || b.is_empty() {
            return Ok(Vec::new());
        }

        Ok(blend(&a, &b, self.factor))
    }
}

fn blend(a: &[ControlPoint], b: &[ControlPoint], factor: f32) -> Vec<ControlPoint> {
    let factor = factor.clamp(0.0, 1.0);
    if factor <= 0.0 {
        return a.to_vec();
    }
    if factor >= 1.0 {
        return b.to_vec();
    }

    if a.len() == b.len() {
        return a
            .iter()
            .zip(b)
            .map(|(p, q)| ControlPoint {
                x: lerp(p.x, q.x, factor),
                y: lerp(p.y, q.y, factor),
                handle: if factor < 0.5 { p.handle } else { q.handle },
            })
            .collect();
    }

    let mut xs: Vec<f32> = a.iter().chain(b).map(|p| p.x).collect();
    xs.sort_by(f32::total_cmp);
    xs.dedup_by(|x, prev| (*x - *prev).abs() < 1e-6);
    xs.into_iter()
        .map(|x| {
            let y = lerp(evaluate_points(a, x), evaluate_points(b, x), factor);
            ControlPoint::new(x, y)
        })
        .collect()
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
