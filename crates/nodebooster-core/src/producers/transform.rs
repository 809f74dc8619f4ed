//! Producers transforming an upstream interpolation.

use super::{first_input_points, InterpolationProducer};
use crate::error::SyncError;
use crate::graph::{NodeId, SocketId};
use crate::sync::Upstream;
use crate::ControlPoint;

/// Sorts the upstream points by x so the curve never backtracks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Monotonic;

impl InterpolationProducer for Monotonic {
    fn evaluate(
        &self,
        node: NodeId,
        _output: SocketId,
        upstream: &mut Upstream<'_>,
    ) -> Result<Vec<ControlPoint>, SyncError> {
        let mut points = first_input_points(node, upstream)?;
        points.sort_by(|a, b| a.x.total_cmp(&b.x));
        Ok(points)
    }
}

/// Mirrors the upstream curve horizontally (x -> 1 - x).
#[derive(Debug, Clone, Copy, Default)]
pub struct Reverse;

impl InterpolationProducer for Reverse {
    fn evaluate(
        &self,
        node: NodeId,
        _output: SocketId,
        upstream: &mut Upstream<'_>,
    ) -> Result<Vec<ControlPoint>, SyncError> {
        let points = first_input_points(node, upstream)?;
        Ok(points
            .into_iter()
            .rev()
            .map(|p| ControlPoint { x: 1.0 - p.x, ..p })
            .collect())
    }
}
