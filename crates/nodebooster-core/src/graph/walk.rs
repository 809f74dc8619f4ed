//! Backward graph walk
//!
//! Travels against link direction from an input socket, passing through
//! reroute nodes, and reports every socket the walk stops at.

use std::collections::{HashSet, VecDeque};

use super::{LinkId, NodeTree, SocketId};
use crate::error::SyncError;

/// A socket the walk stopped at, with the links that reached it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub socket: SocketId,
    pub links: Vec<LinkId>,
}

/// Walk upstream from `start` and collect the colliding sockets.
///
/// Reroute nodes are traversed through their input. A reroute whose input is
/// unlinked is a dead end and its output counts as a collision. Any other
/// node's output socket is a collision. Sockets are visited at most once, so
/// reroute loops end without a collision.
///
/// Collisions are returned in discovery order. The tree is not modified.
pub fn backward_walk(tree: &NodeTree, start: SocketId) -> Result<Vec<Collision>, SyncError> {
    tree.socket(start)?;

    let mut collisions: Vec<Collision> = Vec::new();
    let mut visited: HashSet<SocketId> = HashSet::from([start]);
    let mut queue: VecDeque<SocketId> = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        let incoming: Vec<(LinkId, SocketId)> =
            tree.links_to(current).map(|(id, l)| (id, l.from)).collect();

        for (link, next) in incoming {
            if !visited.insert(next) {
                continue;
            }

            let node = tree.node(tree.socket(next)?.node)?;
            let reroute_input = if node.is_reroute() {
                node.inputs().first().copied()
            } else {
                None
            };

            match reroute_input {
                Some(input) if tree.has_incoming(input) => queue.push_back(input),
                _ => collisions.push(Collision {
                    socket: next,
                    links: vec![link],
                }),
            }
        }
    }

    Ok(collisions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeKind;

    fn add_math(tree: &mut NodeTree) -> crate::graph::NodeId {
        tree.add_node(
            "Math",
            NodeKind::Other {
                type_name: "ShaderNodeMath".to_string(),
            },
            &["Value"],
            &["Value"],
        )
    }

    #[test]
    fn test_unlinked_socket_has_no_collision() {
        let mut tree = NodeTree::new();
        let sink = add_math(&mut tree);
        let start = tree.input(sink, "Value").unwrap();

        assert!(backward_walk(&tree, start).unwrap().is_empty());
    }

    #[test]
    fn test_direct_link_collides_with_source_output() {
        let mut tree = NodeTree::new();
        let source = add_math(&mut tree);
        let sink = add_math(&mut tree);
        let link = tree.link_by_name(source, "Value", sink, "Value").unwrap();

        let start = tree.input(sink, "Value").unwrap();
        let collisions = backward_walk(&tree, start).unwrap();

        assert_eq!(
            collisions,
            vec![Collision {
                socket: tree.output(source, "Value").unwrap(),
                links: vec![link],
            }]
        );
    }

    #[test]
    fn test_walk_passes_through_reroutes() {
        let mut tree = NodeTree::new();
        let source = add_math(&mut tree);
        let r1 = tree.add_reroute("Reroute");
        let r2 = tree.add_reroute("Reroute.001");
        let sink = add_math(&mut tree);

        let first = tree.link_by_name(source, "Value", r1, "Input").unwrap();
        tree.link_by_name(r1, "Output", r2, "Input").unwrap();
        tree.link_by_name(r2, "Output", sink, "Value").unwrap();

        let start = tree.input(sink, "Value").unwrap();
        let collisions = backward_walk(&tree, start).unwrap();

        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].socket, tree.output(source, "Value").unwrap());
        assert_eq!(collisions[0].links, vec![first]);
    }

    #[test]
    fn test_dead_end_reroute_is_a_collision() {
        let mut tree = NodeTree::new();
        let reroute = tree.add_reroute("Reroute");
        let sink = add_math(&mut tree);
        let link = tree.link_by_name(reroute, "Output", sink, "Value").unwrap();

        let start = tree.input(sink, "Value").unwrap();
        let collisions = backward_walk(&tree, start).unwrap();

        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].socket, tree.output(reroute, "Output").unwrap());
        assert_eq!(collisions[0].links, vec![link]);
    }

    #[test]
    fn test_reroute_loop_terminates_without_collision() {
        let mut tree = NodeTree::new();
        let r1 = tree.add_reroute("Reroute");
        let r2 = tree.add_reroute("Reroute.001");
        let sink = add_math(&mut tree);

        tree.link_by_name(r1, "Output", r2, "Input").unwrap();
        tree.link_by_name(r2, "Output", r1, "Input").unwrap();
        tree.link_by_name(r2, "Output", sink, "Value").unwrap();

        let start = tree.input(sink, "Value").unwrap();
        assert!(backward_walk(&tree, start).unwrap().is_empty());
    }

    #[test]
    fn test_multi_input_reports_every_source() {
        let mut tree = NodeTree::new();
        let a = add_math(&mut tree);
        let b = add_math(&mut tree);
        let sink = add_math(&mut tree);
        tree.link_by_name(a, "Value", sink, "Value").unwrap();
        tree.link_by_name(b, "Value", sink, "Value").unwrap();

        let start = tree.input(sink, "Value").unwrap();
        let collisions = backward_walk(&tree, start).unwrap();

        assert_eq!(collisions.len(), 2);
        assert_eq!(collisions[0].socket, tree.output(a, "Value").unwrap());
        assert_eq!(collisions[1].socket, tree.output(b, "Value").unwrap());
    }

    #[test]
    fn test_walk_does_not_touch_links() {
        let mut tree = NodeTree::new();
        let source = add_math(&mut tree);
        let sink = add_math(&mut tree);
        let link = tree.link_by_name(source, "Value", sink, "Value").unwrap();

        let start = tree.input(sink, "Value").unwrap();
        backward_walk(&tree, start).unwrap();
        assert!(tree.is_link_valid(link));
    }
}
