// SPDX-License-Identifier: MIT OR Apache-2.0
//! Immediate-mode drawing of the current layout through egui.
//!
//! Reads the same layout the scene was built from, so hit-testing and
//! painting always agree.

use crate::canvas::Canvas;
use crate::geometry::{CubicCurve, NodeLayout, PORT_RADIUS};
use blockflow_editor_graph::{PortDirection, Store};
use egui::{Color32, Shape, Stroke, Vec2};

const CURVE_SEGMENTS: usize = 32;
const EDGE_THICKNESS: f32 = 3.0;
const DASH_LENGTH: f32 = 8.0;
const GAP_LENGTH: f32 = 6.0;
const NODE_ROUNDING: f32 = 4.0;

/// Shapes for edges, nodes and the drag preview, back to front, shifted by
/// `offset` (the canvas origin on screen). Labels need fonts and are only
/// drawn by [`paint`].
pub fn shapes<S: Store>(canvas: &Canvas<S>, offset: Vec2) -> Vec<Shape> {
    let cref = canvas.canvas_ref();
    let style = canvas.style();
    let border = style.border_color();
    let mut shapes = Vec::new();

    // Edges
    let edges = canvas.edge_renderer();
    for id in edges.ids() {
        if edges.is_hidden(id) {
            continue;
        }
        if let Some((start, end)) = edges.endpoints(id) {
            let points = CubicCurve::between(start + offset, end + offset).sample(CURVE_SEGMENTS);
            shapes.push(Shape::line(points, Stroke::new(EDGE_THICKNESS, Color32::GRAY)));
        }
    }

    // Nodes
    let nodes = canvas.node_renderer();
    for id in nodes.ids() {
        let Some(block) = cref.nodes.get(&id).and_then(|n| cref.schema.get(&n.kind)) else {
            continue;
        };
        let Some(layout) = nodes.visual_layout(cref, id) else {
            continue;
        };
        let background = style.background_color(block);
        let frame = layout.frame().translate(offset);

        shapes.push(Shape::rect_filled(frame, NODE_ROUNDING, background));
        shapes.push(Shape::rect_filled(
            layout.header().translate(offset),
            NODE_ROUNDING,
            style.header_color(block),
        ));
        let outline = if canvas.selected() == Some(id) { 3.0 } else { 1.0 };
        shapes.push(Shape::rect_stroke(frame, NODE_ROUNDING, Stroke::new(outline, border)));

        for direction in [PortDirection::Input, PortDirection::Output] {
            for index in 0..layout.port_count(direction) {
                if let Some(center) = layout.port_center(direction, index) {
                    shapes.push(Shape::circle_filled(center + offset, PORT_RADIUS, background));
                    shapes.push(Shape::circle_stroke(
                        center + offset,
                        PORT_RADIUS,
                        Stroke::new(2.0, border),
                    ));
                }
            }
        }
    }

    // Preview
    if let Some((start, end)) = canvas.preview().endpoints() {
        let points = CubicCurve::between(start + offset, end + offset).sample(CURVE_SEGMENTS);
        shapes.extend(Shape::dashed_line(
            &points,
            Stroke::new(EDGE_THICKNESS, Color32::GRAY),
            DASH_LENGTH,
            GAP_LENGTH,
        ));
    }

    shapes
}

/// Draw the canvas with node labels
pub fn paint<S: Store>(canvas: &Canvas<S>, painter: &egui::Painter, offset: Vec2) {
    painter.extend(shapes(canvas, offset));

    let cref = canvas.canvas_ref();
    let nodes = canvas.node_renderer();
    for id in nodes.ids() {
        let Some(block) = cref.nodes.get(&id).and_then(|n| cref.schema.get(&n.kind)) else {
            continue;
        };
        if let Some(layout) = nodes.visual_layout(cref, id) {
            label(painter, &layout, offset, &block.name);
        }
    }
}

fn label(painter: &egui::Painter, layout: &NodeLayout, offset: Vec2, text: &str) {
    painter.text(
        layout.header().center() + offset,
        egui::Align2::CENTER_CENTER,
        text,
        egui::FontId::proportional(12.0),
        Color32::WHITE,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CanvasConfig;
    use crate::measure::FixedContent;
    use crate::test_support::PlainStyle;
    use blockflow_editor_graph::presets::arithmetic_schema;
    use blockflow_editor_graph::{Edge, EdgeId, EditorState, EditorStore, Node, NodeId, PortRef};
    use egui::Pos2;
    use std::sync::Arc;

    fn canvas() -> Canvas<EditorStore> {
        let schema = Arc::new(arithmetic_schema());
        let mut state = EditorState::new();
        state.add_node(Node::new(NodeId(1), "number", [0.0, 0.0]));
        state.add_node(Node::new(NodeId(2), "add", [0.0, 6.0]));
        state.add_edge(Edge::new(
            EdgeId(1),
            PortRef::new(NodeId(1), 0),
            PortRef::new(NodeId(2), 0),
        ));
        let store = EditorStore::with_state(Arc::clone(&schema), state);
        let mut canvas = Canvas::new(
            CanvasConfig::default(),
            schema,
            store,
            PlainStyle,
            FixedContent(Vec2::new(100.0, 40.0)),
        )
        .unwrap();
        canvas.attach(Pos2::ZERO, 800.0);
        canvas
    }

    fn count(shapes: &[Shape], pred: impl Fn(&Shape) -> bool) -> usize {
        shapes.iter().filter(|s| pred(s)).count()
    }

    #[test]
    fn test_shapes_cover_layout() {
        let canvas = canvas();
        let shapes = shapes(&canvas, Vec2::ZERO);

        assert_eq!(count(&shapes, |s| matches!(s, Shape::Path(_))), 1);
        assert_eq!(count(&shapes, |s| matches!(s, Shape::Rect(_))), 6);
        // number has one port, add has three; fill plus stroke each
        assert_eq!(count(&shapes, |s| matches!(s, Shape::Circle(_))), 8);
    }

    #[test]
    fn test_offset_applied() {
        let canvas = canvas();
        let shapes = shapes(&canvas, Vec2::new(10.0, 5.0));
        let Some(Shape::Rect(frame)) = shapes.get(1) else {
            panic!("expected the first node frame after the edge");
        };
        assert_eq!(frame.rect.min, Pos2::new(10.0, 5.0));
    }

    #[test]
    fn test_preview_is_dashed() {
        let mut canvas = canvas();
        canvas.pointer_down(Pos2::new(24.0, 64.0));
        canvas.pointer_move(Pos2::new(300.0, 300.0));
        let shapes = shapes(&canvas, Vec2::ZERO);
        assert!(count(&shapes, |s| matches!(s, Shape::LineSegment { .. })) > 1);
    }
}
