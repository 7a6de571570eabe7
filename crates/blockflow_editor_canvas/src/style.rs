// SPDX-License-Identifier: MIT OR Apache-2.0
//! Style interface consumed by the canvas.
//!
//! The canvas owns no colors; the host passes a [`StyleProvider`].

use blockflow_editor_graph::Block;
use egui::Color32;

/// Colors and root styling supplied by the host
pub trait StyleProvider {
    /// Header strip color for a block
    fn header_color(&self, block: &Block) -> Color32;

    /// Body fill for a block
    fn background_color(&self, block: &Block) -> Color32;

    /// Frame, port and preview outline color
    fn border_color(&self) -> Color32;

    /// Inline style for the root `<svg>`, parameterised by the grid unit
    fn svg_style(&self, unit: f32) -> String;
}

/// `#rrggbb` form of a color
pub fn css_color(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

/// Class rules for the scene's `<style>` element
pub fn scene_css(border: Color32) -> String {
    let border = css_color(border);
    format!(
        "g.node > foreignObject {{ overflow: visible }}
g.node > g.frame circle.port {{ cursor: grab }}
g.node > g.frame circle.port.dragging {{ cursor: grabbing }}
g.node.selected > g.frame > path.outline {{ stroke-width: 3 }}
g.edge.hidden {{ display: none }}
g.edge > path.curve {{ stroke: gray; stroke-width: 6px; fill: none }}
g.preview.hidden {{ display: none }}
g.preview > path.curve {{ stroke: gray; stroke-width: 6px; fill: none; stroke-dasharray: 8 6 }}
g.preview > circle {{ stroke: {border}; stroke-width: 4px }}
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_color() {
        assert_eq!(css_color(Color32::from_rgb(255, 16, 0)), "#ff1000");
    }

    #[test]
    fn test_scene_css_uses_border() {
        let css = scene_css(Color32::from_rgb(1, 2, 3));
        assert!(css.contains("stroke: #010203"));
        assert!(css.contains("g.edge.hidden"));
    }
}
