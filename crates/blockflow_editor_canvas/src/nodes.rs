// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node rendering: one `g.node` element per node id.
//!
//! ```text
//! g.node[transform]
//! ├── g.frame
//! │   ├── path.outline
//! │   ├── rect.header
//! │   ├── text.name
//! │   ├── g.inputs  > circle.port*   (top edge)
//! │   └── g.outputs > circle.port*   (bottom edge)
//! └── foreignObject                  (content box, portal host)
//! ```

use crate::canvas_ref::CanvasRef;
use crate::geometry::{to_pixels, NodeLayout, NODE_HEADER_HEIGHT, PORT_MARGIN, PORT_RADIUS};
use crate::measure::ContentMeasure;
use crate::observer::{ResizeObserver, ResizeSubscription};
use crate::scene::{ElementId, Scene, Tag};
use crate::style::{css_color, StyleProvider};
use blockflow_editor_graph::{Node, NodeId, PortDirection, PortKey, PortRef};
use egui::{Pos2, Vec2};
use indexmap::IndexMap;
use std::sync::Arc;

/// What lies under a pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// A port circle
    Port(PortKey),
    /// A node body
    Node(NodeId),
}

/// Result of one reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeChanges {
    /// Elements created
    pub added: Vec<NodeId>,
    /// Elements whose transform changed
    pub moved: Vec<NodeId>,
    /// Elements removed
    pub removed: Vec<NodeId>,
}

impl NodeChanges {
    /// Check whether the pass touched nothing
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.moved.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug)]
struct NodeView {
    element: ElementId,
    outline: ElementId,
    header: ElementId,
    content: ElementId,
    inputs: Vec<ElementId>,
    outputs: Vec<ElementId>,
    kind: String,
    /// Rendered grid position, live drag position included
    position: [f32; 2],
    _subscription: ResizeSubscription,
}

impl NodeView {
    fn ports(&self, direction: PortDirection) -> &[ElementId] {
        match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        }
    }
}

/// Keeps the `g.nodes` layer in sync with the node snapshot
pub struct NodeRenderer {
    views: IndexMap<NodeId, NodeView>,
    observer: ResizeObserver,
    measure: Box<dyn ContentMeasure>,
}

impl NodeRenderer {
    /// Create a renderer registering nodes with `observer`
    pub fn new(observer: ResizeObserver, measure: Box<dyn ContentMeasure>) -> Self {
        Self {
            views: IndexMap::new(),
            observer,
            measure,
        }
    }

    /// Reconcile the scene with `cref.nodes`.
    ///
    /// `live` overrides one node's position for the duration of a drag.
    pub fn update(
        &mut self,
        cref: &mut CanvasRef,
        style: &dyn StyleProvider,
        live: Option<(NodeId, [f32; 2])>,
    ) -> NodeChanges {
        let mut changes = NodeChanges::default();
        let Some(layers) = cref.layers else {
            return changes;
        };

        // Exit: ids that vanished or changed kind
        let stale: Vec<NodeId> = self
            .views
            .iter()
            .filter(|(id, view)| cref.nodes.get(*id).map_or(true, |n| n.kind != view.kind))
            .map(|(id, _)| *id)
            .collect();
        for id in stale {
            self.remove(cref, id);
            changes.removed.push(id);
        }

        // Enter and update
        let nodes: Vec<Node> = cref.nodes.values().cloned().collect();
        for node in nodes {
            let position = match live {
                Some((id, position)) if id == node.id => position,
                _ => node.position,
            };

            match self.views.get_mut(&node.id) {
                Some(view) => {
                    if view.position != position {
                        view.position = position;
                        cref.scene.set_attr(
                            view.element,
                            "transform",
                            translate(to_pixels(position, cref.unit)),
                        );
                        changes.moved.push(node.id);
                    }
                }
                None => {
                    if let Some(view) = self.create_view(cref, style, layers.nodes, &node, position) {
                        self.views.insert(node.id, view);
                        changes.added.push(node.id);
                    }
                }
            }
        }

        changes
    }

    fn create_view(
        &self,
        cref: &mut CanvasRef,
        style: &dyn StyleProvider,
        layer: ElementId,
        node: &Node,
        position: [f32; 2],
    ) -> Option<NodeView> {
        let schema = Arc::clone(&cref.schema);
        let Some(block) = schema.get(&node.kind) else {
            tracing::warn!("No block for kind {:?}, skipping node {}", node.kind, node.id);
            return None;
        };
        let scene = &mut cref.scene;
        let background = css_color(style.background_color(block));
        let border = css_color(style.border_color());

        let element = scene.append_classed(layer, Tag::Group, "node");
        scene.set_attr(element, "data-id", node.id.0.to_string());
        scene.set_attr(element, "transform", translate(to_pixels(position, cref.unit)));

        let frame = scene.append_classed(element, Tag::Group, "frame");
        let outline = scene.append_classed(frame, Tag::Path, "outline");
        scene.set_attr(outline, "fill", background.clone());
        scene.set_attr(outline, "stroke", border.clone());

        let header = scene.append_classed(frame, Tag::Rect, "header");
        scene.set_attr(header, "height", NODE_HEADER_HEIGHT.to_string());
        scene.set_attr(header, "fill", css_color(style.header_color(block)));

        let label = scene.append_classed(frame, Tag::Text, "name");
        scene.set_attr(label, "x", PORT_MARGIN.to_string());
        scene.set_attr(label, "y", (NODE_HEADER_HEIGHT * 0.7).to_string());
        scene.set_text(label, block.name.clone());

        let mut ports = |class: &str, count: usize| -> Vec<ElementId> {
            let group = scene.append_classed(frame, Tag::Group, class);
            (0..count)
                .map(|index| {
                    let port = scene.append_classed(group, Tag::Circle, "port");
                    scene.set_attr(port, "data-index", index.to_string());
                    scene.set_attr(port, "cx", crate::geometry::port_offset(index).to_string());
                    scene.set_attr(port, "cy", "0");
                    scene.set_attr(port, "r", PORT_RADIUS.to_string());
                    scene.set_attr(port, "fill", background.clone());
                    scene.set_attr(port, "stroke", border.clone());
                    port
                })
                .collect()
        };
        let inputs = ports("inputs", block.inputs.len());
        let outputs = ports("outputs", block.outputs.len());

        let content = scene.append(element, Tag::ForeignObject);
        scene.set_attr(content, "x", "0");
        scene.set_attr(content, "y", NODE_HEADER_HEIGHT.to_string());

        let measured = self.measure.measure(node, block);
        match measured {
            Some(size) => {
                cref.content_dimensions.insert(node.id, size);
            }
            None => tracing::debug!("Node {} has no content box yet", node.id),
        }

        let view = NodeView {
            element,
            outline,
            header,
            content,
            inputs,
            outputs,
            kind: node.kind.clone(),
            position,
            _subscription: self.observer.observe(node.id),
        };

        let layout = NodeLayout::new(
            Pos2::ZERO,
            measured.unwrap_or(Vec2::ZERO),
            view.inputs.len(),
            view.outputs.len(),
        );
        apply_layout(&mut cref.scene, &view, &layout);
        Some(view)
    }

    fn remove(&mut self, cref: &mut CanvasRef, id: NodeId) {
        if let Some(view) = self.views.shift_remove(&id) {
            cref.scene.remove(view.element);
            cref.content_dimensions.remove(&id);
        }
    }

    /// Record a new content box for a node and resize its frame.
    ///
    /// Returns `true` if anything changed; the caller must then recompute
    /// edges touching the node.
    pub fn handle_resize(&mut self, cref: &mut CanvasRef, id: NodeId, size: Vec2) -> bool {
        let Some(view) = self.views.get(&id) else {
            return false;
        };
        if cref.content_dimensions.get(&id) == Some(&size) {
            return false;
        }
        cref.content_dimensions.insert(id, size);
        let layout = NodeLayout::new(Pos2::ZERO, size, view.inputs.len(), view.outputs.len());
        apply_layout(&mut cref.scene, view, &layout);
        true
    }

    /// Layout for a measured node; `None` until a content box is known
    pub fn layout(&self, cref: &CanvasRef, id: NodeId) -> Option<NodeLayout> {
        let content = cref.content_dimensions.get(&id)?;
        self.layout_with(cref, id, *content)
    }

    /// Layout as drawn, treating an unmeasured content box as empty
    pub fn visual_layout(&self, cref: &CanvasRef, id: NodeId) -> Option<NodeLayout> {
        let content = cref.content_dimensions.get(&id).copied().unwrap_or(Vec2::ZERO);
        self.layout_with(cref, id, content)
    }

    fn layout_with(&self, cref: &CanvasRef, id: NodeId, content: Vec2) -> Option<NodeLayout> {
        let view = self.views.get(&id)?;
        Some(NodeLayout::new(
            to_pixels(view.position, cref.unit),
            content,
            view.inputs.len(),
            view.outputs.len(),
        ))
    }

    /// Pixel center of a port, `None` if the node is not positionable yet
    pub fn port_center(&self, cref: &CanvasRef, key: PortKey) -> Option<Pos2> {
        self.layout(cref, key.node())?
            .port_center(key.direction, key.index())
    }

    /// Port under `point`, unless a higher node's body covers it
    pub fn port_at(&self, cref: &CanvasRef, point: Pos2) -> Option<PortKey> {
        match self.hit_test(cref, point)? {
            Hit::Port(port) => Some(port),
            Hit::Node(_) => None,
        }
    }

    /// Topmost node under `point`; within a node, ports win over the body
    pub fn hit_test(&self, cref: &CanvasRef, point: Pos2) -> Option<Hit> {
        self.views.keys().rev().find_map(|id| {
            let layout = self.visual_layout(cref, *id)?;
            if let Some((direction, index)) = layout.port_at(point) {
                return Some(Hit::Port(PortKey {
                    port: PortRef::new(*id, index),
                    direction,
                }));
            }
            layout.contains(point).then_some(Hit::Node(*id))
        })
    }

    /// Mark the selected node
    pub fn set_selected(&self, scene: &mut Scene, selected: Option<NodeId>) {
        for (id, view) in &self.views {
            scene.set_class(view.element, "selected", Some(*id) == selected);
        }
    }

    /// Mark the port an edge drag started from
    pub fn set_dragging(&self, scene: &mut Scene, port: Option<PortKey>) {
        for (id, view) in &self.views {
            for direction in [PortDirection::Input, PortDirection::Output] {
                for (index, element) in view.ports(direction).iter().enumerate() {
                    let dragging = port.is_some_and(|p| {
                        p.node() == *id && p.direction == direction && p.index() == index
                    });
                    scene.set_class(*element, "dragging", dragging);
                }
            }
        }
    }

    /// Root element of a node
    pub fn element(&self, id: NodeId) -> Option<ElementId> {
        self.views.get(&id).map(|v| v.element)
    }

    /// `foreignObject` content box of a node
    pub fn content_element(&self, id: NodeId) -> Option<ElementId> {
        self.views.get(&id).map(|v| v.content)
    }

    /// Port circle element
    pub fn port_element(&self, key: PortKey) -> Option<ElementId> {
        self.views
            .get(&key.node())?
            .ports(key.direction)
            .get(key.index())
            .copied()
    }

    /// Rendered grid position of a node
    pub fn position(&self, id: NodeId) -> Option<[f32; 2]> {
        self.views.get(&id).map(|v| v.position)
    }

    /// Rendered node ids in render order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.views.keys().copied()
    }

    /// Number of rendered nodes
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Check whether nothing is rendered
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

/// Size-dependent attributes, in node-local coordinates
fn apply_layout(scene: &mut Scene, view: &NodeView, layout: &NodeLayout) {
    let Vec2 { x: w, y: h } = layout.size;
    scene.set_attr(view.outline, "d", format!("M 0 0 H {w} V {h} H 0 Z"));
    scene.set_attr(view.header, "width", w.to_string());
    scene.set_attr(view.content, "width", w.to_string());
    scene.set_attr(view.content, "height", layout.content.y.to_string());
    for port in &view.outputs {
        scene.set_attr(*port, "cy", h.to_string());
    }
}

fn translate(p: Pos2) -> String {
    format!("translate({}, {})", p.x, p.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::{FixedContent, Unmeasured};
    use crate::test_support::{attached_ref, PlainStyle};

    fn renderer(observer: &ResizeObserver) -> NodeRenderer {
        NodeRenderer::new(observer.clone(), Box::new(FixedContent(Vec2::new(120.0, 40.0))))
    }

    fn put(cref: &mut CanvasRef, id: u32, kind: &str, position: [f32; 2]) {
        cref.nodes.insert(NodeId(id), Node::new(NodeId(id), kind, position));
    }

    #[test]
    fn test_one_element_per_node() {
        let observer = ResizeObserver::new();
        let mut nodes = renderer(&observer);
        let mut cref = attached_ref();
        put(&mut cref, 1, "add", [0.0, 0.0]);
        put(&mut cref, 2, "number", [5.0, 5.0]);

        let changes = nodes.update(&mut cref, &PlainStyle, None);
        assert_eq!(changes.added, vec![NodeId(1), NodeId(2)]);

        let layer = cref.layers.unwrap().nodes;
        assert_eq!(cref.scene.children(layer).len(), 2);
        assert_eq!(
            cref.scene.attr(nodes.element(NodeId(2)).unwrap(), "transform"),
            Some("translate(100, 100)")
        );
        assert_eq!(observer.observed_count(), 2);
    }

    #[test]
    fn test_rerender_unchanged_is_noop() {
        let observer = ResizeObserver::new();
        let mut nodes = renderer(&observer);
        let mut cref = attached_ref();
        put(&mut cref, 1, "add", [1.0, 1.0]);
        nodes.update(&mut cref, &PlainStyle, None);

        let before = cref.scene.stats();
        let changes = nodes.update(&mut cref, &PlainStyle, None);
        assert!(changes.is_empty());
        assert_eq!(cref.scene.stats(), before);
    }

    #[test]
    fn test_move_updates_transform_only() {
        let observer = ResizeObserver::new();
        let mut nodes = renderer(&observer);
        let mut cref = attached_ref();
        put(&mut cref, 1, "add", [1.0, 1.0]);
        nodes.update(&mut cref, &PlainStyle, None);
        let element = nodes.element(NodeId(1)).unwrap();
        let before = cref.scene.stats();

        put(&mut cref, 1, "add", [3.0, 2.0]);
        let changes = nodes.update(&mut cref, &PlainStyle, None);
        assert_eq!(changes.moved, vec![NodeId(1)]);
        assert_eq!(nodes.element(NodeId(1)), Some(element));
        assert_eq!(cref.scene.stats().structural(), before.structural());
        assert_eq!(cref.scene.stats().attr_writes, before.attr_writes + 1);
        assert_eq!(cref.scene.attr(element, "transform"), Some("translate(60, 40)"));
    }

    #[test]
    fn test_remove_purges_cache_and_subscription() {
        let observer = ResizeObserver::new();
        let mut nodes = renderer(&observer);
        let mut cref = attached_ref();
        put(&mut cref, 1, "add", [0.0, 0.0]);
        nodes.update(&mut cref, &PlainStyle, None);
        let element = nodes.element(NodeId(1)).unwrap();
        assert!(cref.content_dimensions.contains_key(&NodeId(1)));

        cref.nodes.clear();
        let changes = nodes.update(&mut cref, &PlainStyle, None);
        assert_eq!(changes.removed, vec![NodeId(1)]);
        assert!(!cref.scene.contains(element));
        assert!(cref.content_dimensions.is_empty());
        assert!(!observer.is_observed(NodeId(1)));
        assert_eq!(cref.scene.len(), 5);
    }

    #[test]
    fn test_kind_change_recreates() {
        let observer = ResizeObserver::new();
        let mut nodes = renderer(&observer);
        let mut cref = attached_ref();
        put(&mut cref, 1, "add", [0.0, 0.0]);
        nodes.update(&mut cref, &PlainStyle, None);
        let old = nodes.element(NodeId(1)).unwrap();

        put(&mut cref, 1, "number", [0.0, 0.0]);
        let changes = nodes.update(&mut cref, &PlainStyle, None);
        assert_eq!(changes.removed, vec![NodeId(1)]);
        assert_eq!(changes.added, vec![NodeId(1)]);
        assert_ne!(nodes.element(NodeId(1)), Some(old));
        assert!(observer.is_observed(NodeId(1)));
    }

    #[test]
    fn test_live_override() {
        let observer = ResizeObserver::new();
        let mut nodes = renderer(&observer);
        let mut cref = attached_ref();
        put(&mut cref, 1, "add", [0.0, 0.0]);
        nodes.update(&mut cref, &PlainStyle, Some((NodeId(1), [2.5, 1.0])));
        assert_eq!(nodes.position(NodeId(1)), Some([2.5, 1.0]));

        nodes.update(&mut cref, &PlainStyle, None);
        assert_eq!(nodes.position(NodeId(1)), Some([0.0, 0.0]));
    }

    #[test]
    fn test_resize_moves_output_ports() {
        let observer = ResizeObserver::new();
        let mut nodes = renderer(&observer);
        let mut cref = attached_ref();
        put(&mut cref, 1, "add", [0.0, 0.0]);
        nodes.update(&mut cref, &PlainStyle, None);

        let out = PortKey::output(NodeId(1), 0);
        let input = PortKey::input(NodeId(1), 0);
        assert_eq!(nodes.port_center(&cref, out), Some(Pos2::new(24.0, 64.0)));

        assert!(nodes.handle_resize(&mut cref, NodeId(1), Vec2::new(120.0, 80.0)));
        assert!(!nodes.handle_resize(&mut cref, NodeId(1), Vec2::new(120.0, 80.0)));
        assert_eq!(nodes.port_center(&cref, out), Some(Pos2::new(24.0, 104.0)));
        assert_eq!(nodes.port_center(&cref, input), Some(Pos2::new(24.0, 0.0)));
        let circle = nodes.port_element(out).unwrap();
        assert_eq!(cref.scene.attr(circle, "cy"), Some("104"));
    }

    #[test]
    fn test_unmeasured_node_has_no_ports_yet() {
        let observer = ResizeObserver::new();
        let mut nodes = NodeRenderer::new(observer.clone(), Box::new(Unmeasured));
        let mut cref = attached_ref();
        put(&mut cref, 1, "add", [0.0, 0.0]);
        nodes.update(&mut cref, &PlainStyle, None);

        assert!(nodes.layout(&cref, NodeId(1)).is_none());
        assert!(nodes.port_center(&cref, PortKey::input(NodeId(1), 0)).is_none());
        assert!(nodes.visual_layout(&cref, NodeId(1)).is_some());
    }

    #[test]
    fn test_hit_test_prefers_ports() {
        let observer = ResizeObserver::new();
        let mut nodes = renderer(&observer);
        let mut cref = attached_ref();
        put(&mut cref, 1, "add", [0.0, 0.0]);
        nodes.update(&mut cref, &PlainStyle, None);

        assert_eq!(
            nodes.hit_test(&cref, Pos2::new(24.0, 2.0)),
            Some(Hit::Port(PortKey::input(NodeId(1), 0)))
        );
        assert_eq!(
            nodes.hit_test(&cref, Pos2::new(100.0, 30.0)),
            Some(Hit::Node(NodeId(1)))
        );
        assert_eq!(nodes.hit_test(&cref, Pos2::new(300.0, 300.0)), None);
    }

    #[test]
    fn test_higher_body_covers_lower_port() {
        let observer = ResizeObserver::new();
        let mut nodes = renderer(&observer);
        let mut cref = attached_ref();
        put(&mut cref, 1, "add", [0.0, 0.0]);
        put(&mut cref, 2, "number", [0.0, 2.0]);
        nodes.update(&mut cref, &PlainStyle, None);

        // add's output sits at (24, 64), inside number's frame
        let covered = Pos2::new(24.0, 64.0);
        assert_eq!(nodes.hit_test(&cref, covered), Some(Hit::Node(NodeId(2))));
        assert_eq!(nodes.port_at(&cref, covered), None);

        // the uncovered input of the lower node still hits
        assert_eq!(
            nodes.port_at(&cref, Pos2::new(24.0, 2.0)),
            Some(PortKey::input(NodeId(1), 0))
        );
    }

    #[test]
    fn test_selection_and_dragging_classes() {
        let observer = ResizeObserver::new();
        let mut nodes = renderer(&observer);
        let mut cref = attached_ref();
        put(&mut cref, 1, "add", [0.0, 0.0]);
        put(&mut cref, 2, "add", [6.0, 0.0]);
        nodes.update(&mut cref, &PlainStyle, None);

        nodes.set_selected(&mut cref.scene, Some(NodeId(2)));
        assert!(cref.scene.has_class(nodes.element(NodeId(2)).unwrap(), "selected"));
        assert!(!cref.scene.has_class(nodes.element(NodeId(1)).unwrap(), "selected"));

        let key = PortKey::output(NodeId(1), 0);
        nodes.set_dragging(&mut cref.scene, Some(key));
        assert!(cref.scene.has_class(nodes.port_element(key).unwrap(), "dragging"));
        nodes.set_dragging(&mut cref.scene, None);
        assert!(!cref.scene.has_class(nodes.port_element(key).unwrap(), "dragging"));
    }
}
