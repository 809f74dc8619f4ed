//! Interpolation producer nodes
//!
//! A producer is a node that yields a list of control points for one of its
//! output sockets. The synchronizer only talks to producers through the
//! [`InterpolationProducer`] trait; everything else in the graph is an
//! obstacle for the backward walk.
//!
//! ## Producers
//!
//! - **CurveInput**: user-edited points, returned as-is
//! - **Monotonic**: upstream points sorted by x
//! - **Reverse**: upstream points mirrored on the x axis
//! - **Mix**: two upstream curves blended by a factor

pub mod input;
pub mod mix;
pub mod transform;

pub use input::CurveInput;
pub use mix::Mix;
pub use transform::{Monotonic, Reverse};

pub use crate::sync::Upstream;

use std::fmt;

use crate::error::SyncError;
use crate::graph::{NodeId, SocketId};
use crate::ControlPoint;

/// Capability tag of nodes that produce interpolation points.
pub const INTERPOLATION_NODE: &str = "INTERPOLATION_NODE";

/// A node able to produce interpolation control points.
pub trait InterpolationProducer: fmt::Debug {
    /// Capability tags this node declares.
    fn capability_tags(&self) -> &[&'static str] {
        &[INTERPOLATION_NODE]
    }

    /// Compute the points for `output`, a socket of `node`.
    ///
    /// Producers that consume an interpolation themselves resolve it through
    /// `upstream`, which shares the caller's cache. An empty list means no
    /// data is available yet.
    fn evaluate(
        &self,
        node: NodeId,
        output: SocketId,
        upstream: &mut Upstream<'_>,
    ) -> Result<Vec<ControlPoint>, SyncError>;
}

/// Resolve the interpolation feeding the first input of `node`.
///
/// Returns an empty list when nothing usable is connected.
pub(crate) fn first_input_points(
    node: NodeId,
    upstream: &mut Upstream<'_>,
) -> Result<Vec<ControlPoint>, SyncError> {
    let Some(&input) = upstream.tree().node(node)?.inputs().first() else {
        return Ok(Vec::new());
    };
    Ok(upstream.points(input)?.unwrap_or_default())
}
