//! Node Booster Core - Interpolation curve synchronization
//!
//! This crate provides the evaluation side of the "Interpolation Map" node:
//! walking a node graph backward from the node's interpolation sockets,
//! resolving upstream producer nodes into control points, and writing those
//! points into the node's curve mappings.

pub mod curve;
pub mod error;
pub mod graph;
pub mod map_node;
pub mod producers;
pub mod settings;
pub mod sync;

pub use curve::{evaluate_points, CurveLut, CurveMap, CurveMapping};
pub use error::SyncError;
pub use graph::{backward_walk, Collision, LinkId, NodeId, NodeKind, NodeTree, SocketId};
pub use map_node::InterpolationMapNode;
pub use producers::{CurveInput, InterpolationProducer, Mix, Monotonic, Reverse, Upstream, INTERPOLATION_NODE};
pub use settings::{SettingsError, SyncSettings};
pub use sync::{sync_channels, ChannelOutcome, InterpolationChannel, Resolution, SyncReport};

/// Handle type of a curve control point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HandleKind {
    /// Smooth handle, tangent computed from the neighbours.
    #[default]
    Auto,
    /// Sharp corner, segments on both sides are straight near this point.
    Vector,
}

/// Interpolation curve control point
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ControlPoint {
    /// Input value (0.0 to 1.0)
    pub x: f32,
    /// Output value (0.0 to 1.0)
    pub y: f32,
    /// Handle type of this knot
    #[serde(default)]
    pub handle: HandleKind,
}

impl ControlPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            handle: HandleKind::Auto,
        }
    }

    pub fn vector(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            handle: HandleKind::Vector,
        }
    }
}

/// The two points of the identity (linear 0 to 1) curve.
pub fn identity_points() -> Vec<ControlPoint> {
    vec![ControlPoint::new(0.0, 0.0), ControlPoint::new(1.0, 1.0)]
}

/// Which kind of data an Interpolation Map node processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MapMode {
    /// Float interpolation
    #[default]
    Float,
    /// Vector interpolation
    Vector,
    /// Color interpolation
    Color,
}

impl MapMode {
    pub const ALL: [MapMode; 3] = [MapMode::Float, MapMode::Vector, MapMode::Color];
}
