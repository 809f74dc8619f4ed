//! Curve synchronization
//!
//! Resolves each interpolation channel of a node to an upstream producer and
//! writes the produced points into the channel's curve.
//!
//! ## Channel Outcomes
//!
//! | Upstream state                  | Curve            | Link        |
//! |---------------------------------|------------------|-------------|
//! | socket unlinked                 | reset            | -           |
//! | walk reaches nothing            | reset            | -           |
//! | walk reaches a non-producer     | reset            | invalidated |
//! | producer returns points         | replaced         | -           |
//! | producer returns no usable list | left as it was   | -           |
//!
//! A walk reaching more than one socket aborts the call with
//! [`SyncError::MultipleCollisions`].

use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use crate::curve::CurveMap;
use crate::error::SyncError;
use crate::graph::{backward_walk, LinkId, NodeId, NodeTree, SocketId};
use crate::settings::SyncSettings;
use crate::{ControlPoint, MapMode};

/// One named curve slot to synchronize.
#[derive(Debug)]
pub struct InterpolationChannel<'c> {
    pub name: &'static str,
    /// Input socket the channel reads from.
    pub socket: SocketId,
    /// Curve the channel writes to.
    pub curve: &'c mut CurveMap,
}

/// What happened to a channel during one synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelOutcome {
    /// No link on the socket; curve reset.
    Unlinked,
    /// Linked, but the walk found no upstream socket; curve reset.
    NoProducer,
    /// The upstream node is not an interpolation producer; curve reset.
    UnsupportedProducer { node: NodeId, link: Option<LinkId> },
    /// Curve replaced with the producer's points.
    Written { node: NodeId, points: usize },
    /// The producer had no usable points; curve untouched.
    NoData { node: NodeId },
}

/// Result of one synchronization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub mode: MapMode,
    /// Outcome per channel, in processing order.
    pub outcomes: Vec<(&'static str, ChannelOutcome)>,
    /// Number of producer evaluations actually run (cache misses).
    pub evaluations: usize,
    /// Links marked invalid during this pass.
    pub invalidated_links: Vec<LinkId>,
}

impl SyncReport {
    fn new(mode: MapMode) -> Self {
        Self {
            mode,
            outcomes: Vec::new(),
            evaluations: 0,
            invalidated_links: Vec::new(),
        }
    }

    pub fn outcome(&self, channel: &str) -> Option<&ChannelOutcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| *name == channel)
            .map(|(_, outcome)| outcome)
    }
}

/// Where an input socket's interpolation comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Unlinked,
    NoCollision,
    Unsupported { node: NodeId, link: Option<LinkId> },
    Points { node: NodeId, points: Vec<ControlPoint> },
}

/// Upstream resolver scoped to a single synchronization call.
///
/// Caches producer results per (node, output socket) and collects the links
/// to invalidate; the tree itself is only read.
pub struct Upstream<'t> {
    tree: &'t NodeTree,
    settings: &'t SyncSettings,
    cache: HashMap<(NodeId, SocketId), Vec<ControlPoint>>,
    in_progress: HashSet<(NodeId, SocketId)>,
    invalidated: Vec<LinkId>,
    evaluations: usize,
}

impl<'t> Upstream<'t> {
    pub fn new(tree: &'t NodeTree, settings: &'t SyncSettings) -> Self {
        Self {
            tree,
            settings,
            cache: HashMap::new(),
            in_progress: HashSet::new(),
            invalidated: Vec::new(),
            evaluations: 0,
        }
    }

    pub fn tree(&self) -> &'t NodeTree {
        self.tree
    }

    /// Resolve the interpolation arriving at the input `socket`.
    pub fn resolve(&mut self, socket: SocketId) -> Result<Resolution, SyncError> {
        if !self.tree.has_incoming(socket) {
            return Ok(Resolution::Unlinked);
        }

        let mut collisions = backward_walk(self.tree, socket)?;
        if collisions.len() > 1 {
            return Err(SyncError::MultipleCollisions {
                socket,
                count: collisions.len(),
            });
        }
        let Some(collision) = collisions.pop() else {
            return Ok(Resolution::NoCollision);
        };

        let tree = self.tree;
        let node = tree.socket(collision.socket)?.node;
        let Some(producer) = tree.node(node)?.interpolation_producer() else {
            let link = collision.links.first().copied();
            if let Some(link) = link.filter(|_| self.settings.invalidate_unsupported_links) {
                self.invalidated.push(link);
            }
            return Ok(Resolution::Unsupported { node, link });
        };

        let key = (node, collision.socket);
        if let Some(points) = self.cache.get(&key) {
            return Ok(Resolution::Points {
                node,
                points: points.clone(),
            });
        }
        if !self.in_progress.insert(key) {
            warn!("interpolation cycle through {} ({})", node, tree.node(node)?.name);
            return Ok(Resolution::Points {
                node,
                points: Vec::new(),
            });
        }

        let evaluated = producer.evaluate(node, collision.socket, self);
        self.in_progress.remove(&key);
        let points = evaluated?;
        self.evaluations += 1;
        self.cache.insert(key, points.clone());

        Ok(Resolution::Points { node, points })
    }

    /// Resolve `socket` and return the points, if a producer was reached.
    pub fn points(&mut self, socket: SocketId) -> Result<Option<Vec<ControlPoint>>, SyncError> {
        match self.resolve(socket)? {
            Resolution::Points { points, .. } => Ok(Some(points)),
            _ => Ok(None),
        }
    }

    fn finish(self) -> (Vec<LinkId>, usize) {
        (self.invalidated, self.evaluations)
    }
}

/// Resolve every channel and update its curve.
///
/// Channels are processed in order. Link invalidations collected before an
/// error are still applied to the tree.
pub fn sync_channels(
    tree: &mut NodeTree,
    mode: MapMode,
    channels: &mut [InterpolationChannel<'_>],
    settings: &SyncSettings,
) -> Result<SyncReport, SyncError> {
    let mut report = SyncReport::new(mode);
    let mut upstream = Upstream::new(tree, settings);

    let result: Result<(), SyncError> = channels.iter_mut().try_for_each(|channel| {
        let resolution = upstream.resolve(channel.socket)?;
        let outcome = apply(channel.curve, resolution);
        debug!("{:?} channel '{}': {:?}", mode, channel.name, outcome);
        report.outcomes.push((channel.name, outcome));
        Ok(())
    });

    let (invalidated, evaluations) = upstream.finish();
    for &link in &invalidated {
        warn!("{} leads to an unsupported node, marking it invalid", link);
        tree.invalidate_link(link);
    }
    report.evaluations = evaluations;
    report.invalidated_links = invalidated;

    result.map(|()| report)
}

fn apply(curve: &mut CurveMap, resolution: Resolution) -> ChannelOutcome {
    match resolution {
        Resolution::Unlinked => {
            curve.reset();
            ChannelOutcome::Unlinked
        }
        Resolution::NoCollision => {
            curve.reset();
            ChannelOutcome::NoProducer
        }
        Resolution::Unsupported { node, link } => {
            curve.reset();
            ChannelOutcome::UnsupportedProducer { node, link }
        }
        Resolution::Points { node, points } => {
            if curve.write(&points) {
                ChannelOutcome::Written {
                    node,
                    points: points.len(),
                }
            } else {
                ChannelOutcome::NoData { node }
            }
        }
    }
}
