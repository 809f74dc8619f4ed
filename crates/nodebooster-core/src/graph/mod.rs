//! In-memory node tree
//!
//! A minimal model of the host's node graph: nodes own named input and
//! output sockets, links connect an output socket to an input socket and
//! carry a validity flag the host draws as a broken (red) link.
//!
//! ## Node Kinds
//!
//! - **Producer**: yields interpolation control points, see [`crate::producers`]
//! - **Reroute**: pass-through node with one input and one output
//! - **Other**: any other node; opaque to the backward walk

pub mod walk;

pub use walk::{backward_walk, Collision};

use std::fmt;

use crate::error::SyncError;
use crate::producers::{InterpolationProducer, INTERPOLATION_NODE};

macro_rules! index_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(usize);

        impl $name {
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

index_id!(NodeId, "node");
index_id!(SocketId, "socket");
index_id!(LinkId, "link");

/// Which side of a node a socket sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketDirection {
    Input,
    Output,
}

#[derive(Debug)]
pub struct Socket {
    pub node: NodeId,
    pub name: String,
    pub direction: SocketDirection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub from: SocketId,
    pub to: SocketId,
    pub is_valid: bool,
}

/// What a node is, as far as interpolation evaluation cares.
#[derive(Debug)]
pub enum NodeKind {
    Producer(Box<dyn InterpolationProducer>),
    Reroute,
    Other { type_name: String },
}

#[derive(Debug)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    inputs: Vec<SocketId>,
    outputs: Vec<SocketId>,
}

impl Node {
    pub fn inputs(&self) -> &[SocketId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[SocketId] {
        &self.outputs
    }

    /// Capability tags declared by the node. Non-producers declare none.
    pub fn capability_tags(&self) -> &[&'static str] {
        match &self.kind {
            NodeKind::Producer(producer) => producer.capability_tags(),
            NodeKind::Reroute | NodeKind::Other { .. } => &[],
        }
    }

    /// The producer behind this node, if it declares the interpolation tag.
    pub fn interpolation_producer(&self) -> Option<&dyn InterpolationProducer> {
        match &self.kind {
            NodeKind::Producer(producer)
                if producer.capability_tags().contains(&INTERPOLATION_NODE) =>
            {
                Some(producer.as_ref())
            }
            _ => None,
        }
    }

    pub fn is_reroute(&self) -> bool {
        matches!(self.kind, NodeKind::Reroute)
    }
}

/// Nodes, sockets and links of one node tree.
#[derive(Debug, Default)]
pub struct NodeTree {
    nodes: Vec<Node>,
    sockets: Vec<Socket>,
    links: Vec<Option<Link>>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with the given input and output socket names.
    pub fn add_node(
        &mut self,
        name: &str,
        kind: NodeKind,
        inputs: &[&str],
        outputs: &[&str],
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let inputs = inputs
            .iter()
            .map(|n| self.add_socket(id, n, SocketDirection::Input))
            .collect();
        let outputs = outputs
            .iter()
            .map(|n| self.add_socket(id, n, SocketDirection::Output))
            .collect();
        self.nodes.push(Node {
            name: name.to_string(),
            kind,
            inputs,
            outputs,
        });
        id
    }

    /// Add a producer node exposing a single "Interpolation" output.
    pub fn add_producer(
        &mut self,
        name: &str,
        producer: impl InterpolationProducer + 'static,
        inputs: &[&str],
    ) -> NodeId {
        self.add_node(
            name,
            NodeKind::Producer(Box::new(producer)),
            inputs,
            &["Interpolation"],
        )
    }

    /// Add a reroute node ("Input" -> "Output").
    pub fn add_reroute(&mut self, name: &str) -> NodeId {
        self.add_node(name, NodeKind::Reroute, &["Input"], &["Output"])
    }

    fn add_socket(&mut self, node: NodeId, name: &str, direction: SocketDirection) -> SocketId {
        let id = SocketId(self.sockets.len());
        self.sockets.push(Socket {
            node,
            name: name.to_string(),
            direction,
        });
        id
    }

    /// Connect an output socket to an input socket.
    pub fn link(&mut self, from: SocketId, to: SocketId) -> Result<LinkId, SyncError> {
        let from_dir = self.socket(from)?.direction;
        let to_dir = self.socket(to)?.direction;
        if from_dir != SocketDirection::Output || to_dir != SocketDirection::Input {
            return Err(SyncError::InvalidLink { from, to });
        }

        let id = LinkId(self.links.len());
        self.links.push(Some(Link {
            from,
            to,
            is_valid: true,
        }));
        Ok(id)
    }

    /// Remove a link. Ids of other links stay valid.
    pub fn unlink(&mut self, id: LinkId) -> Option<Link> {
        self.links.get_mut(id.0).and_then(Option::take)
    }

    /// Connect `from_node`'s output `from_name` to `to_node`'s input `to_name`.
    pub fn link_by_name(
        &mut self,
        from_node: NodeId,
        from_name: &str,
        to_node: NodeId,
        to_name: &str,
    ) -> Result<LinkId, SyncError> {
        let from = self
            .output(from_node, from_name)
            .ok_or_else(|| SyncError::MissingSocket {
                node: from_node,
                name: from_name.to_string(),
            })?;
        let to = self
            .input(to_node, to_name)
            .ok_or_else(|| SyncError::MissingSocket {
                node: to_node,
                name: to_name.to_string(),
            })?;
        self.link(from, to)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, SyncError> {
        self.nodes.get(id.0).ok_or(SyncError::UnknownNode(id))
    }

    pub fn socket(&self, id: SocketId) -> Result<&Socket, SyncError> {
        self.sockets.get(id.0).ok_or(SyncError::UnknownSocket(id))
    }

    pub fn link_at(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.0).and_then(Option::as_ref)
    }

    /// Input socket of `node` called `name`.
    pub fn input(&self, node: NodeId, name: &str) -> Option<SocketId> {
        self.find_socket(node, name, |n| &n.inputs)
    }

    /// Output socket of `node` called `name`.
    pub fn output(&self, node: NodeId, name: &str) -> Option<SocketId> {
        self.find_socket(node, name, |n| &n.outputs)
    }

    fn find_socket(
        &self,
        node: NodeId,
        name: &str,
        side: impl Fn(&Node) -> &Vec<SocketId>,
    ) -> Option<SocketId> {
        let node = self.nodes.get(node.0)?;
        side(node)
            .iter()
            .copied()
            .find(|&s| self.sockets[s.0].name == name)
    }

    /// Links arriving at `socket`, in creation order.
    pub fn links_to(&self, socket: SocketId) -> impl Iterator<Item = (LinkId, &Link)> + '_ {
        self.links
            .iter()
            .enumerate()
            .filter_map(|(i, l)| Some((LinkId(i), l.as_ref()?)))
            .filter(move |(_, l)| l.to == socket)
    }

    /// Whether any link arrives at `socket`.
    pub fn has_incoming(&self, socket: SocketId) -> bool {
        self.links.iter().flatten().any(|l| l.to == socket)
    }

    /// Mark a link as broken/unsupported.
    pub fn invalidate_link(&mut self, id: LinkId) {
        if let Some(Some(link)) = self.links.get_mut(id.0) {
            link.is_valid = false;
        }
    }

    pub fn is_link_valid(&self, id: LinkId) -> bool {
        self.link_at(id).is_some_and(|l| l.is_valid)
    }
}
