// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dashed connector shown while an edge is being dragged.

use crate::geometry::{CubicCurve, PORT_RADIUS};
use crate::scene::{ElementId, Scene, Tag};
use egui::Pos2;

/// Preview curve plus a port-sized circle following the pointer
#[derive(Debug, Default)]
pub struct PreviewRenderer {
    elements: Option<(ElementId, ElementId, ElementId)>,
    endpoints: Option<(Pos2, Pos2)>,
}

impl PreviewRenderer {
    /// Create an unattached preview
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the preview elements inside `layer`, hidden
    pub fn attach(&mut self, scene: &mut Scene, layer: ElementId) {
        if self.elements.is_some() {
            return;
        }
        let curve = scene.append_classed(layer, Tag::Path, "curve");
        let circle = scene.append(layer, Tag::Circle);
        scene.set_attr(circle, "r", PORT_RADIUS.to_string());
        scene.add_class(layer, "hidden");
        self.elements = Some((layer, curve, circle));
    }

    /// Draw from the drag anchor to the pointer.
    ///
    /// An output anchor starts the curve; an input anchor ends it, so the
    /// curve always runs output to input.
    pub fn show(&mut self, scene: &mut Scene, anchor: Pos2, pointer: Pos2, anchor_is_output: bool) {
        let Some((layer, curve, circle)) = self.elements else {
            return;
        };
        let endpoints = if anchor_is_output {
            (anchor, pointer)
        } else {
            (pointer, anchor)
        };
        if self.endpoints != Some(endpoints) {
            let path = CubicCurve::between(endpoints.0, endpoints.1).to_path();
            scene.set_attr(curve, "d", path);
            scene.set_attr(circle, "cx", pointer.x.to_string());
            scene.set_attr(circle, "cy", pointer.y.to_string());
            self.endpoints = Some(endpoints);
        }
        scene.remove_class(layer, "hidden");
    }

    /// Fill the pointer marker, usually with the anchor block's background
    pub fn set_fill(&self, scene: &mut Scene, fill: String) {
        if let Some((_, _, circle)) = self.elements {
            scene.set_attr(circle, "fill", fill);
        }
    }

    /// Hide the preview and forget its endpoints
    pub fn hide(&mut self, scene: &mut Scene) {
        if let Some((layer, _, _)) = self.elements {
            scene.add_class(layer, "hidden");
        }
        self.endpoints = None;
    }

    /// Check whether the preview is shown
    pub fn is_visible(&self) -> bool {
        self.endpoints.is_some()
    }

    /// Curve start and end while visible
    pub fn endpoints(&self) -> Option<(Pos2, Pos2)> {
        self.endpoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attached() -> (Scene, ElementId, PreviewRenderer) {
        let mut scene = Scene::new();
        let layer = scene.append_classed(scene.root(), Tag::Group, "preview");
        let mut preview = PreviewRenderer::new();
        preview.attach(&mut scene, layer);
        (scene, layer, preview)
    }

    #[test]
    fn test_starts_hidden() {
        let (scene, layer, preview) = attached();
        assert!(scene.has_class(layer, "hidden"));
        assert!(!preview.is_visible());
        assert_eq!(scene.children(layer).len(), 2);
    }

    #[test]
    fn test_input_anchor_reverses_curve() {
        let (mut scene, layer, mut preview) = attached();
        let anchor = Pos2::new(24.0, 100.0);
        let pointer = Pos2::new(200.0, 10.0);

        preview.show(&mut scene, anchor, pointer, false);
        assert!(!scene.has_class(layer, "hidden"));
        assert_eq!(preview.endpoints(), Some((pointer, anchor)));

        let circle = scene.children(layer)[1];
        assert_eq!(scene.attr(circle, "cx"), Some("200"));
    }

    #[test]
    fn test_hide_after_show() {
        let (mut scene, layer, mut preview) = attached();
        preview.show(&mut scene, Pos2::ZERO, Pos2::new(5.0, 5.0), true);
        preview.hide(&mut scene);
        assert!(scene.has_class(layer, "hidden"));
        assert!(preview.endpoints().is_none());
    }

    #[test]
    fn test_attach_twice_is_noop() {
        let (mut scene, layer, mut preview) = attached();
        preview.attach(&mut scene, layer);
        assert_eq!(scene.children(layer).len(), 2);
    }
}
