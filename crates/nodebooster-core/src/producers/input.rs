//! User-edited interpolation curve.

use super::InterpolationProducer;
use crate::error::SyncError;
use crate::graph::{NodeId, SocketId};
use crate::sync::Upstream;
use crate::{identity_points, ControlPoint};

/// Producer returning a fixed, user-edited point list.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveInput {
    points: Vec<ControlPoint>,
}

impl CurveInput {
    pub fn new(points: Vec<ControlPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }
}

impl Default for CurveInput {
    fn default() -> Self {
        Self::new(identity_points())
    }
}

impl InterpolationProducer for CurveInput {
    fn evaluate(
        &self,
        _node: NodeId,
        _output: SocketId,
        _upstream: &mut Upstream<'_>,
    ) -> Result<Vec<ControlPoint>, SyncError> {
        Ok(self.points.clone())
    }
}
