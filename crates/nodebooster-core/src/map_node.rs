//! Interpolation Map node
//!
//! Maps float, vector or color values through interpolation curves. Each
//! mode reads its curves from dedicated "Interpolation" sockets; whatever
//! producer feeds those sockets decides the curve points.
//!
//! ## Channels
//!
//! | Mode   | Sockets                        | Mapping curves |
//! |--------|--------------------------------|----------------|
//! | Float  | Interpolation                  | 0              |
//! | Vector | Interpolation X, Y, Z          | 0, 1, 2        |
//! | Color  | Interpolation C, R, G, B       | 3, 0, 1, 2     |

use log::debug;

use crate::curve::{CurveMap, CurveMapping};
use crate::error::SyncError;
use crate::graph::{NodeId, NodeKind, NodeTree};
use crate::settings::SyncSettings;
use crate::sync::{sync_channels, InterpolationChannel, SyncReport};
use crate::MapMode;

/// Input sockets of the node, in display order.
pub const INPUT_SOCKETS: &[&str] = &[
    "Factor",
    "Float",
    "Vector",
    "Color",
    "Interpolation",
    "Interpolation X",
    "Interpolation Y",
    "Interpolation Z",
    "Interpolation C",
    "Interpolation R",
    "Interpolation G",
    "Interpolation B",
];

/// Output sockets of the node.
pub const OUTPUT_SOCKETS: &[&str] = &["Float", "Vector", "Color"];

/// Index of the combined curve in the color mapping.
const COMBINED: usize = 3;

/// Channel names and their curve index for `mode`, in processing order.
pub fn channels(mode: MapMode) -> &'static [(&'static str, usize)] {
    match mode {
        MapMode::Float => &[("Interpolation", 0)],
        MapMode::Vector => &[
            ("Interpolation X", 0),
            ("Interpolation Y", 1),
            ("Interpolation Z", 2),
        ],
        MapMode::Color => &[
            ("Interpolation C", COMBINED),
            ("Interpolation R", 0),
            ("Interpolation G", 1),
            ("Interpolation B", 2),
        ],
    }
}

#[derive(Debug)]
pub struct InterpolationMapNode {
    node: NodeId,
    mode: MapMode,
    float_map: CurveMapping,
    vector_map: CurveMapping,
    color_map: CurveMapping,
    settings: SyncSettings,
}

impl InterpolationMapNode {
    /// Add an Interpolation Map node to `tree`, with identity curves.
    pub fn add_to(tree: &mut NodeTree, name: &str, settings: SyncSettings) -> Self {
        let node = tree.add_node(
            name,
            NodeKind::Other {
                type_name: "NodeBoosterInterpolationMap".to_string(),
            },
            INPUT_SOCKETS,
            OUTPUT_SOCKETS,
        );
        let lut_size = settings.lut_size;
        Self {
            node,
            mode: MapMode::default(),
            float_map: CurveMapping::new(1, lut_size),
            vector_map: CurveMapping::new(3, lut_size),
            color_map: CurveMapping::new(4, lut_size),
            settings,
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node
    }

    pub fn mode(&self) -> MapMode {
        self.mode
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Switch mode and synchronize the curves of the new mode.
    pub fn set_mode(&mut self, tree: &mut NodeTree, mode: MapMode) -> Result<SyncReport, SyncError> {
        self.mode = mode;
        self.synchronize(tree)
    }

    /// Backing curves of `mode`.
    pub fn mapping(&self, mode: MapMode) -> &CurveMapping {
        match mode {
            MapMode::Float => &self.float_map,
            MapMode::Vector => &self.vector_map,
            MapMode::Color => &self.color_map,
        }
    }

    /// Curve written by the channel called `channel`.
    pub fn channel_curve(&self, channel: &str) -> Option<&CurveMap> {
        MapMode::ALL.into_iter().find_map(|mode| {
            let &(_, index) = channels(mode).iter().find(|(name, _)| *name == channel)?;
            self.mapping(mode).curve(index)
        })
    }

    /// Resolve every channel of the current mode into its curve.
    ///
    /// Runs on every edit of the tree. All mappings get their lookup data
    /// refreshed afterwards, whether resolution succeeded or not.
    pub fn synchronize(&mut self, tree: &mut NodeTree) -> Result<SyncReport, SyncError> {
        let result = {
            let mapping = match self.mode {
                MapMode::Float => &mut self.float_map,
                MapMode::Vector => &mut self.vector_map,
                MapMode::Color => &mut self.color_map,
            };

            let mut slots: Vec<Option<&mut CurveMap>> =
                mapping.curves_mut().iter_mut().map(Some).collect();
            let mut bound = Vec::with_capacity(slots.len());
            for &(name, index) in channels(self.mode) {
                let socket = tree
                    .input(self.node, name)
                    .ok_or_else(|| SyncError::MissingSocket {
                        node: self.node,
                        name: name.to_string(),
                    })?;
                let curve = slots
                    .get_mut(index)
                    .and_then(Option::take)
                    .ok_or(SyncError::MissingCurve {
                        channel: name,
                        index,
                    })?;
                bound.push(InterpolationChannel {
                    name,
                    socket,
                    curve,
                });
            }

            sync_channels(tree, self.mode, &mut bound, &self.settings)
        };

        self.refresh_mappings();
        result
    }

    fn refresh_mappings(&mut self) {
        self.float_map.update();
        self.vector_map.update();
        self.color_map.update();
        debug!("refreshed curve mappings of {}", self.node);
    }

    /// Map a float through the "Interpolation" curve.
    pub fn map_float(&self, value: f32, factor: f32) -> f32 {
        let curve = &self.float_map.curves()[0];
        mix(value, curve.evaluate(value), factor)
    }

    /// Map each component through the X, Y and Z curves.
    pub fn map_vector(&self, value: [f32; 3], factor: f32) -> [f32; 3] {
        let curves = self.vector_map.curves();
        std::array::from_fn(|i| mix(value[i], curves[i].evaluate(value[i]), factor))
    }

    /// Map a color through the combined curve, then the R, G and B curves.
    pub fn map_color(&self, value: [f32; 3], factor: f32) -> [f32; 3] {
        let curves = self.color_map.curves();
        let combined = &curves[COMBINED];
        std::array::from_fn(|i| {
            let mapped = curves[i].evaluate(combined.evaluate(value[i]));
            mix(value[i], mapped, factor)
        })
    }
}

fn mix(a: f32, b: f32, factor: f32) -> f32 {
    let factor = factor.clamp(0.0, 1.0);
    a + (b - a) * factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producers::CurveInput;
    use crate::sync::ChannelOutcome;
    use crate::ControlPoint;

    fn inverted() -> Vec<ControlPoint> {
        vec![ControlPoint::new(0.0, 1.0), ControlPoint::new(1.0, 0.0)]
    }

    fn setup() -> (NodeTree, InterpolationMapNode) {
        let mut tree = NodeTree::new();
        let node = InterpolationMapNode::add_to(&mut tree, "Map Values", SyncSettings::default());
        (tree, node)
    }

    #[test]
    fn test_channel_tables() {
        assert_eq!(channels(MapMode::Float).len(), 1);
        assert_eq!(channels(MapMode::Vector).len(), 3);
        let color: Vec<&str> = channels(MapMode::Color).iter().map(|(n, _)| *n).collect();
        assert_eq!(
            color,
            vec!["Interpolation C", "Interpolation R", "Interpolation G", "Interpolation B"]
        );
    }

    #[test]
    fn test_channel_sockets_exist() {
        let (tree, node) = setup();
        for mode in MapMode::ALL {
            for (name, _) in channels(mode) {
                assert!(tree.input(node.node_id(), name).is_some(), "missing {}", name);
            }
        }
    }

    #[test]
    fn test_new_node_maps_identity() {
        let (_, node) = setup();
        assert_eq!(node.mode(), MapMode::Float);
        assert!((node.map_float(0.3, 1.0) - 0.3).abs() < 1e-4);
        let v = node.map_vector([0.1, 0.5, 0.9], 1.0);
        assert!((v[2] - 0.9).abs() < 1e-4);
    }

    #[test]
    fn test_every_mapping_refreshed_each_call() {
        let (mut tree, mut node) = setup();
        node.synchronize(&mut tree).unwrap();
        node.synchronize(&mut tree).unwrap();

        for mode in MapMode::ALL {
            assert_eq!(node.mapping(mode).update_count(), 2);
        }
    }

    #[test]
    fn test_float_mapping_uses_synchronized_curve() {
        let (mut tree, mut node) = setup();
        let input = tree.add_producer("Curve", CurveInput::new(inverted()), &[]);
        tree.link_by_name(input, "Interpolation", node.node_id(), "Interpolation")
            .unwrap();

        let report = node.synchronize(&mut tree).unwrap();

        assert_eq!(
            report.outcome("Interpolation"),
            Some(&ChannelOutcome::Written {
                node: input,
                points: 2
            })
        );
        assert!((node.map_float(0.25, 1.0) - 0.75).abs() < 1e-3);
        assert!((node.map_float(0.25, 0.5) - 0.5).abs() < 1e-3);
        assert!((node.map_float(0.25, 0.0) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_color_applies_combined_curve_first() {
        let (mut tree, mut node) = setup();
        let half = tree.add_producer(
            "Half",
            CurveInput::new(vec![ControlPoint::new(0.0, 0.0), ControlPoint::new(1.0, 0.5)]),
            &[],
        );
        let invert = tree.add_producer("Invert", CurveInput::new(inverted()), &[]);
        tree.link_by_name(half, "Interpolation", node.node_id(), "Interpolation C")
            .unwrap();
        tree.link_by_name(invert, "Interpolation", node.node_id(), "Interpolation R")
            .unwrap();

        node.set_mode(&mut tree, MapMode::Color).unwrap();

        let [r, g, b] = node.map_color([1.0, 1.0, 0.5], 1.0);
        // R(C(1.0)) = 1 - 0.5
        assert!((r - 0.5).abs() < 1e-3);
        assert!((g - 0.5).abs() < 1e-3);
        assert!((b - 0.25).abs() < 1e-3);
    }

    #[test]
    fn test_mode_switch_leaves_other_mappings_alone() {
        let (mut tree, mut node) = setup();
        let input = tree.add_producer("Curve", CurveInput::new(inverted()), &[]);
        tree.link_by_name(input, "Interpolation", node.node_id(), "Interpolation")
            .unwrap();
        node.synchronize(&mut tree).unwrap();

        let report = node.set_mode(&mut tree, MapMode::Vector).unwrap();

        assert_eq!(report.outcomes.len(), 3);
        assert!(report
            .outcomes
            .iter()
            .all(|(_, outcome)| *outcome == ChannelOutcome::Unlinked));
        let float_curve = node.channel_curve("Interpolation").unwrap();
        assert_eq!(float_curve.points(), inverted().as_slice());
    }

    #[test]
    fn test_channel_curve_lookup() {
        let (_, node) = setup();
        assert!(node.channel_curve("Interpolation C").is_some());
        assert!(node.channel_curve("Interpolation W").is_none());
    }
}
