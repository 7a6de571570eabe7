// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canvas for the `BlockFlow` editor.
//!
//! The canvas keeps a retained scene (an SVG-shaped element tree) in sync
//! with the committed editor state and turns pointer gestures into actions:
//! - Node, edge and preview renderers reconcile the scene by ID
//! - A drag controller handles block drops, node moves and edge drawing
//! - A resize observer coalesces content-size notifications
//! - Output goes to SVG markup or to an egui painter
//!
//! ## Architecture
//!
//! [`Canvas`] owns everything. Each render pass validates the store's
//! snapshot, then updates nodes before edges, so edges always read the
//! latest port positions. Transient drag state is rendered without touching
//! the store; only completed gestures dispatch.

pub mod canvas;
pub mod canvas_ref;
pub mod config;
pub mod drag;
pub mod edges;
pub mod geometry;
pub mod measure;
pub mod nodes;
pub mod observer;
pub mod paint;
pub mod portal;
pub mod preview;
pub mod scene;
pub mod style;
pub mod svg;

pub use canvas::{Canvas, OnChange, RenderError};
pub use canvas_ref::{CanvasRef, Layers};
pub use config::{CanvasConfig, ConfigError};
pub use drag::{DragController, DragError, DragState};
pub use geometry::{snap, to_pixels, CubicCurve, NodeLayout};
pub use measure::{ContentMeasure, FixedContent, Unmeasured};
pub use nodes::Hit;
pub use observer::{ResizeObserver, ResizeSubscription};
pub use portal::Portal;
pub use scene::{ElementId, Scene, Tag};
pub use style::StyleProvider;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::canvas_ref::CanvasRef;
    use crate::config::CanvasConfig;
    use crate::style::StyleProvider;
    use blockflow_editor_graph::presets::arithmetic_schema;
    use blockflow_editor_graph::Block;
    use egui::Color32;
    use std::sync::Arc;

    /// Fixed colors
    pub struct PlainStyle;

    impl StyleProvider for PlainStyle {
        fn header_color(&self, block: &Block) -> Color32 {
            let [r, g, b] = block.color.unwrap_or([128, 128, 128]);
            Color32::from_rgb(r, g, b)
        }

        fn background_color(&self, _block: &Block) -> Color32 {
            Color32::WHITE
        }

        fn border_color(&self) -> Color32 {
            Color32::BLACK
        }

        fn svg_style(&self, unit: f32) -> String {
            format!("background-size: {unit}px {unit}px")
        }
    }

    /// Default-config canvas ref over the arithmetic schema, layers built
    pub fn attached_ref() -> CanvasRef {
        let mut cref = CanvasRef::new(&CanvasConfig::default(), Arc::new(arithmetic_schema()));
        cref.attach();
        cref
    }
}
