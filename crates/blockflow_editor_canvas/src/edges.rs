// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edge rendering: one `g.edge > path.curve` per edge id.

use crate::canvas_ref::CanvasRef;
use crate::geometry::CubicCurve;
use crate::nodes::NodeRenderer;
use crate::scene::{ElementId, Tag};
use blockflow_editor_graph::{Edge, EdgeId, PortKey};
use egui::Pos2;
use indexmap::IndexMap;

/// Result of one reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeChanges {
    /// Elements created
    pub added: Vec<EdgeId>,
    /// Elements whose path changed
    pub updated: Vec<EdgeId>,
    /// Elements removed
    pub removed: Vec<EdgeId>,
    /// Edges whose endpoints are not positionable yet
    pub deferred: Vec<EdgeId>,
}

impl EdgeChanges {
    /// Check whether the pass touched the scene
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug)]
struct EdgeView {
    element: ElementId,
    curve: ElementId,
    endpoints: Option<(Pos2, Pos2)>,
    hidden: bool,
}

/// Keeps the `g.edges` layer in sync with the edge snapshot
#[derive(Debug, Default)]
pub struct EdgeRenderer {
    views: IndexMap<EdgeId, EdgeView>,
}

impl EdgeRenderer {
    /// Create a renderer with no views
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile the scene with `cref.edges`.
    ///
    /// Port positions come from `nodes`; an edge whose endpoint nodes have no
    /// content box yet keeps its element but gets no path. `hidden` names an
    /// edge picked up by an edge drag.
    pub fn update(
        &mut self,
        cref: &mut CanvasRef,
        nodes: &NodeRenderer,
        hidden: Option<EdgeId>,
    ) -> EdgeChanges {
        let mut changes = EdgeChanges::default();
        let Some(layers) = cref.layers else {
            return changes;
        };

        let stale: Vec<EdgeId> = self
            .views
            .keys()
            .filter(|id| !cref.edges.contains_key(*id))
            .copied()
            .collect();
        for id in stale {
            if let Some(view) = self.views.shift_remove(&id) {
                cref.scene.remove(view.element);
                changes.removed.push(id);
            }
        }

        let edges: Vec<Edge> = cref.edges.values().copied().collect();
        for edge in edges {
            let endpoints = nodes
                .port_center(cref, PortKey::output(edge.source.node, edge.source.index))
                .zip(nodes.port_center(cref, PortKey::input(edge.target.node, edge.target.index)));

            let scene = &mut cref.scene;
            let added = &mut changes.added;
            let view = self.views.entry(edge.id).or_insert_with(|| {
                let element = scene.append_classed(layers.edges, Tag::Group, "edge");
                scene.set_attr(element, "data-id", edge.id.0.to_string());
                let curve = scene.append_classed(element, Tag::Path, "curve");
                added.push(edge.id);
                EdgeView {
                    element,
                    curve,
                    endpoints: None,
                    hidden: false,
                }
            });

            let is_hidden = hidden == Some(edge.id);
            if view.hidden != is_hidden {
                view.hidden = is_hidden;
                cref.scene.set_class(view.element, "hidden", is_hidden);
            }

            match endpoints {
                Some(points) if view.endpoints != Some(points) => {
                    let curve = CubicCurve::between(points.0, points.1);
                    cref.scene.set_attr(view.curve, "d", curve.to_path());
                    view.endpoints = Some(points);
                    if !changes.added.contains(&edge.id) {
                        changes.updated.push(edge.id);
                    }
                }
                Some(_) => {}
                None => {
                    tracing::trace!("Deferring edge {} until both ends are measured", edge.id);
                    changes.deferred.push(edge.id);
                }
            }
        }

        changes
    }

    /// Group element of an edge
    pub fn element(&self, id: EdgeId) -> Option<ElementId> {
        self.views.get(&id).map(|v| v.element)
    }

    /// Drawn start and end points, `None` while deferred
    pub fn endpoints(&self, id: EdgeId) -> Option<(Pos2, Pos2)> {
        self.views.get(&id)?.endpoints
    }

    /// Check whether an edge is hidden for a re-route
    pub fn is_hidden(&self, id: EdgeId) -> bool {
        self.views.get(&id).is_some_and(|v| v.hidden)
    }

    /// Rendered edge ids in render order
    pub fn ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.views.keys().copied()
    }

    /// Number of rendered edges
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Check whether no edge is rendered
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::FixedContent;
    use crate::observer::ResizeObserver;
    use crate::test_support::{attached_ref, PlainStyle};
    use blockflow_editor_graph::{Node, NodeId, PortRef};
    use egui::Vec2;

    struct Fixture {
        cref: CanvasRef,
        nodes: NodeRenderer,
        edges: EdgeRenderer,
        _observer: ResizeObserver,
    }

    /// number A at (0,0) feeding add B at (0,6) through edge 10
    fn fixture() -> Fixture {
        let observer = ResizeObserver::new();
        let mut cref = attached_ref();
        cref.nodes.insert(NodeId(1), Node::new(NodeId(1), "number", [0.0, 0.0]));
        cref.nodes.insert(NodeId(2), Node::new(NodeId(2), "add", [0.0, 6.0]));
        cref.edges.insert(
            EdgeId(10),
            Edge::new(EdgeId(10), PortRef::new(NodeId(1), 0), PortRef::new(NodeId(2), 0)),
        );
        let mut nodes = NodeRenderer::new(
            observer.clone(),
            Box::new(FixedContent(Vec2::new(100.0, 40.0))),
        );
        nodes.update(&mut cref, &PlainStyle, None);
        Fixture {
            cref,
            nodes,
            edges: EdgeRenderer::new(),
            _observer: observer,
        }
    }

    #[test]
    fn test_edge_path_joins_ports() {
        let mut f = fixture();
        let changes = f.edges.update(&mut f.cref, &f.nodes, None);
        assert_eq!(changes.added, vec![EdgeId(10)]);
        assert!(changes.updated.is_empty());

        let (start, end) = f.edges.endpoints(EdgeId(10)).unwrap();
        assert_eq!(start, Pos2::new(24.0, 64.0));
        assert_eq!(end, Pos2::new(24.0, 120.0));

        let element = f.edges.element(EdgeId(10)).unwrap();
        let curve = f.cref.scene.select(element, Tag::Path, "curve").unwrap();
        assert!(f.cref.scene.attr(curve, "d").unwrap().starts_with("M 24 64 C"));
    }

    #[test]
    fn test_unchanged_endpoints_write_nothing() {
        let mut f = fixture();
        f.edges.update(&mut f.cref, &f.nodes, None);
        let before = f.cref.scene.stats();
        let changes = f.edges.update(&mut f.cref, &f.nodes, None);
        assert!(changes.is_empty());
        assert_eq!(f.cref.scene.stats(), before);
    }

    #[test]
    fn test_moving_source_moves_start_only() {
        let mut f = fixture();
        f.edges.update(&mut f.cref, &f.nodes, None);
        let (_, end) = f.edges.endpoints(EdgeId(10)).unwrap();

        f.nodes
            .update(&mut f.cref, &PlainStyle, Some((NodeId(1), [2.0, 0.0])));
        let changes = f.edges.update(&mut f.cref, &f.nodes, None);
        assert_eq!(changes.updated, vec![EdgeId(10)]);

        let (start, new_end) = f.edges.endpoints(EdgeId(10)).unwrap();
        assert_eq!(start, Pos2::new(64.0, 64.0));
        assert_eq!(new_end, end);
    }

    #[test]
    fn test_removed_edge_drops_element() {
        let mut f = fixture();
        f.edges.update(&mut f.cref, &f.nodes, None);
        let element = f.edges.element(EdgeId(10)).unwrap();

        f.cref.edges.clear();
        let changes = f.edges.update(&mut f.cref, &f.nodes, None);
        assert_eq!(changes.removed, vec![EdgeId(10)]);
        assert!(!f.cref.scene.contains(element));
        assert!(f.edges.is_empty());
    }

    #[test]
    fn test_deferred_until_measured() {
        let mut f = fixture();
        f.cref.content_dimensions.remove(&NodeId(2));
        let changes = f.edges.update(&mut f.cref, &f.nodes, None);
        assert_eq!(changes.deferred, vec![EdgeId(10)]);
        assert!(f.edges.endpoints(EdgeId(10)).is_none());

        f.nodes
            .handle_resize(&mut f.cref, NodeId(2), Vec2::new(100.0, 40.0));
        let changes = f.edges.update(&mut f.cref, &f.nodes, None);
        assert_eq!(changes.updated, vec![EdgeId(10)]);
        assert!(changes.deferred.is_empty());
    }

    #[test]
    fn test_hidden_class_toggles() {
        let mut f = fixture();
        f.edges.update(&mut f.cref, &f.nodes, Some(EdgeId(10)));
        let element = f.edges.element(EdgeId(10)).unwrap();
        assert!(f.edges.is_hidden(EdgeId(10)));
        assert!(f.cref.scene.has_class(element, "hidden"));

        f.edges.update(&mut f.cref, &f.nodes, None);
        assert!(!f.cref.scene.has_class(element, "hidden"));
    }
}
