// SPDX-License-Identifier: MIT OR Apache-2.0
//! Content-box portals: where the host mounts each node's inner UI.

use crate::canvas_ref::CanvasRef;
use crate::nodes::NodeRenderer;
use crate::scene::ElementId;
use blockflow_editor_graph::NodeId;
use egui::Rect;

/// Mount point for one node's content
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Portal {
    /// Owning node
    pub node: NodeId,
    /// The node's `foreignObject`
    pub container: ElementId,
    /// Content box in canvas pixels
    pub rect: Rect,
}

/// One portal per rendered node, in render order
pub fn collect(cref: &CanvasRef, nodes: &NodeRenderer) -> Vec<Portal> {
    nodes
        .ids()
        .filter_map(|node| {
            Some(Portal {
                node,
                container: nodes.content_element(node)?,
                rect: nodes.visual_layout(cref, node)?.content_rect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::FixedContent;
    use crate::observer::ResizeObserver;
    use crate::test_support::{attached_ref, PlainStyle};
    use blockflow_editor_graph::Node;
    use egui::{Pos2, Vec2};

    #[test]
    fn test_portal_per_node() {
        let observer = ResizeObserver::new();
        let mut nodes = NodeRenderer::new(observer, Box::new(FixedContent(Vec2::new(100.0, 30.0))));
        let mut cref = attached_ref();
        cref.nodes.insert(NodeId(1), Node::new(NodeId(1), "add", [2.0, 1.0]));
        cref.nodes.insert(NodeId(2), Node::new(NodeId(2), "display", [8.0, 1.0]));
        nodes.update(&mut cref, &PlainStyle, None);

        let portals = collect(&cref, &nodes);
        assert_eq!(portals.len(), 2);
        assert_eq!(portals[0].node, NodeId(1));
        assert_eq!(portals[0].container, nodes.content_element(NodeId(1)).unwrap());
        assert_eq!(
            portals[0].rect,
            Rect::from_min_size(Pos2::new(40.0, 44.0), Vec2::new(100.0, 30.0))
        );
    }
}
