// SPDX-License-Identifier: MIT OR Apache-2.0
//! Grid conversion, snapping, node layout and connector curves.
//!
//! All pixel positions are relative to the canvas origin. Rendering and
//! hit-testing share the constants below so drop targets line up with what is
//! drawn.

use blockflow_editor_graph::PortDirection;
use egui::{Pos2, Rect, Vec2};

/// Port circle radius
pub const PORT_RADIUS: f32 = 12.0;
/// Gap between neighbouring ports and between the frame edge and the first port
pub const PORT_MARGIN: f32 = 12.0;
/// Height of the block header strip
pub const NODE_HEADER_HEIGHT: f32 = 24.0;

/// Upper bound on the vertical handle length of a connector
pub const BEZIER_CURVATURE: f32 = 80.0;
const MIN_CURVATURE: f32 = 20.0;

/// Convert a pixel offset to the nearest grid cell, clamped to
/// `[0, dimensions[0]) x [0, dimensions[1])`.
pub fn snap(pixel: Pos2, unit: f32, dimensions: [u32; 2]) -> [f32; 2] {
    [
        snap_axis(pixel.x, unit, dimensions[0]),
        snap_axis(pixel.y, unit, dimensions[1]),
    ]
}

fn snap_axis(pixel: f32, unit: f32, cells: u32) -> f32 {
    let cell = (pixel / unit).round();
    if !cell.is_finite() {
        return 0.0;
    }
    cell.clamp(0.0, cells.saturating_sub(1) as f32)
}

/// Clamp an unsnapped grid position to the grid bounds
pub fn clamp_to_grid(position: [f32; 2], dimensions: [u32; 2]) -> [f32; 2] {
    let clamp = |v: f32, cells: u32| {
        if v.is_finite() {
            v.clamp(0.0, cells.saturating_sub(1) as f32)
        } else {
            0.0
        }
    };
    [
        clamp(position[0], dimensions[0]),
        clamp(position[1], dimensions[1]),
    ]
}

/// Convert a grid position to pixels
pub fn to_pixels(position: [f32; 2], unit: f32) -> Pos2 {
    Pos2::new(position[0] * unit, position[1] * unit)
}

/// Horizontal offset of port `index` from the left edge of its node
pub fn port_offset(index: usize) -> f32 {
    PORT_MARGIN + PORT_RADIUS + index as f32 * (2.0 * PORT_RADIUS + PORT_MARGIN)
}

/// Width needed to fit `count` ports side by side
pub fn ports_width(count: usize) -> f32 {
    if count == 0 {
        0.0
    } else {
        PORT_MARGIN + count as f32 * (2.0 * PORT_RADIUS + PORT_MARGIN)
    }
}

/// Pixel layout of one node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeLayout {
    /// Top-left corner of the frame
    pub origin: Pos2,
    /// Frame size (header included)
    pub size: Vec2,
    /// Measured content box
    pub content: Vec2,
    /// Number of input ports
    pub inputs: usize,
    /// Number of output ports
    pub outputs: usize,
}

impl NodeLayout {
    /// Lay out a node at `origin` around a content box
    pub fn new(origin: Pos2, content: Vec2, inputs: usize, outputs: usize) -> Self {
        let width = content.x.max(ports_width(inputs.max(outputs)));
        Self {
            origin,
            size: Vec2::new(width, NODE_HEADER_HEIGHT + content.y),
            content,
            inputs,
            outputs,
        }
    }

    /// Frame rectangle
    pub fn frame(&self) -> Rect {
        Rect::from_min_size(self.origin, self.size)
    }

    /// Header strip rectangle
    pub fn header(&self) -> Rect {
        Rect::from_min_size(self.origin, Vec2::new(self.size.x, NODE_HEADER_HEIGHT))
    }

    /// Content box rectangle, below the header
    pub fn content_rect(&self) -> Rect {
        Rect::from_min_size(
            self.origin + Vec2::new(0.0, NODE_HEADER_HEIGHT),
            Vec2::new(self.size.x, self.content.y),
        )
    }

    /// Number of ports on one side
    pub fn port_count(&self, direction: PortDirection) -> usize {
        match direction {
            PortDirection::Input => self.inputs,
            PortDirection::Output => self.outputs,
        }
    }

    /// Center of a port in canvas pixels, relative to the node origin
    pub fn local_port_center(&self, direction: PortDirection, index: usize) -> Vec2 {
        let y = match direction {
            PortDirection::Input => 0.0,
            PortDirection::Output => self.size.y,
        };
        Vec2::new(port_offset(index), y)
    }

    /// Center of a port in canvas pixels, `None` if the index is out of range
    pub fn port_center(&self, direction: PortDirection, index: usize) -> Option<Pos2> {
        (index < self.port_count(direction))
            .then(|| self.origin + self.local_port_center(direction, index))
    }

    /// Port under `point`, within [`PORT_RADIUS`] of its center
    pub fn port_at(&self, point: Pos2) -> Option<(PortDirection, usize)> {
        [PortDirection::Input, PortDirection::Output]
            .into_iter()
            .flat_map(|direction| {
                (0..self.port_count(direction)).map(move |index| (direction, index))
            })
            .find(|&(direction, index)| {
                let center = self.origin + self.local_port_center(direction, index);
                center.distance(point) <= PORT_RADIUS
            })
    }

    /// Check whether `point` is inside the frame
    pub fn contains(&self, point: Pos2) -> bool {
        self.frame().contains(point)
    }
}

/// Cubic Bézier connector between two port centers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicCurve {
    /// Start, two control points, end
    pub points: [Pos2; 4],
}

impl CubicCurve {
    /// Connector leaving `from` downwards and entering `to` from above
    pub fn between(from: Pos2, to: Pos2) -> Self {
        let curvature = ((to.y - from.y).abs() * 0.5).clamp(MIN_CURVATURE, BEZIER_CURVATURE);
        Self {
            points: [
                from,
                Pos2::new(from.x, from.y + curvature),
                Pos2::new(to.x, to.y - curvature),
                to,
            ],
        }
    }

    /// Start point
    pub fn start(&self) -> Pos2 {
        self.points[0]
    }

    /// End point
    pub fn end(&self) -> Pos2 {
        self.points[3]
    }

    /// SVG path data (`M x y C ...`)
    pub fn to_path(&self) -> String {
        let [p0, p1, p2, p3] = self.points;
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            p0.x, p0.y, p1.x, p1.y, p2.x, p2.y, p3.x, p3.y
        )
    }

    /// Generate points along the curve
    pub fn sample(&self, segments: usize) -> Vec<Pos2> {
        let [p0, p1, p2, p3] = self.points;
        let segments = segments.max(1);
        let mut points = Vec::with_capacity(segments + 1);
        for i in 0..=segments {
            let t = i as f32 / segments as f32;
            let t2 = t * t;
            let t3 = t2 * t;
            let mt = 1.0 - t;
            let mt2 = mt * mt;
            let mt3 = mt2 * mt;

            let x = mt3 * p0.x + 3.0 * mt2 * t * p1.x + 3.0 * mt * t2 * p2.x + t3 * p3.x;
            let y = mt3 * p0.y + 3.0 * mt2 * t * p1.y + 3.0 * mt * t2 * p2.y + t3 * p3.y;

            points.push(Pos2::new(x, y));
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_snap_rounds_to_nearest_cell() {
        assert_eq!(snap(Pos2::new(123.0, 47.0), 20.0, [40, 20]), [6.0, 2.0]);
        assert_eq!(snap(Pos2::new(130.0, 50.0), 20.0, [40, 20]), [7.0, 3.0]);
    }

    #[test]
    fn test_snap_clamps() {
        assert_eq!(snap(Pos2::new(-50.0, 9000.0), 20.0, [40, 20]), [0.0, 19.0]);
        assert_eq!(snap(Pos2::new(f32::NAN, 10.0), 20.0, [40, 20]), [0.0, 1.0]);
        assert_eq!(snap(Pos2::new(10.0, 10.0), 0.0, [40, 20]), [0.0, 0.0]);
    }

    #[test]
    fn test_port_positions() {
        let layout = NodeLayout::new(Pos2::new(100.0, 40.0), Vec2::new(120.0, 60.0), 2, 1);
        assert_eq!(layout.size, Vec2::new(120.0, 84.0));
        assert_eq!(
            layout.port_center(PortDirection::Input, 1),
            Some(Pos2::new(100.0 + 24.0 + 36.0, 40.0))
        );
        assert_eq!(
            layout.port_center(PortDirection::Output, 0),
            Some(Pos2::new(124.0, 124.0))
        );
        assert_eq!(layout.port_center(PortDirection::Output, 1), None);
    }

    #[test]
    fn test_frame_grows_to_fit_ports() {
        let layout = NodeLayout::new(Pos2::ZERO, Vec2::new(10.0, 10.0), 3, 0);
        assert_eq!(layout.size.x, ports_width(3));
    }

    #[test]
    fn test_port_hit_uses_radius() {
        let layout = NodeLayout::new(Pos2::ZERO, Vec2::new(100.0, 50.0), 1, 1);
        let center = layout.port_center(PortDirection::Output, 0).unwrap();
        assert_eq!(
            layout.port_at(center + Vec2::new(PORT_RADIUS - 1.0, 0.0)),
            Some((PortDirection::Output, 0))
        );
        assert_eq!(layout.port_at(center + Vec2::new(PORT_RADIUS + 1.0, 0.0)), None);
    }

    #[test]
    fn test_curve_endpoints_exact() {
        let from = Pos2::new(24.0, 84.0);
        let to = Pos2::new(124.0, 100.0);
        let curve = CubicCurve::between(from, to);
        let points = curve.sample(16);
        assert_eq!(points.first(), Some(&from));
        assert_eq!(points.last(), Some(&to));
        assert!(curve.to_path().starts_with("M 24 84 C"));
        assert!(curve.to_path().ends_with("124 100"));
    }

    proptest! {
        #[test]
        fn snap_is_idempotent(x in -2000.0f32..4000.0, y in -2000.0f32..4000.0, unit in 1.0f32..64.0) {
            let dims = [40, 20];
            let once = snap(Pos2::new(x, y), unit, dims);
            let twice = snap(to_pixels(once, unit), unit, dims);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn snap_stays_in_bounds(x in proptest::num::f32::ANY, y in proptest::num::f32::ANY, cols in 1u32..100, rows in 1u32..100) {
            let [gx, gy] = snap(Pos2::new(x, y), 20.0, [cols, rows]);
            prop_assert!(gx >= 0.0 && gx < cols as f32);
            prop_assert!(gy >= 0.0 && gy < rows as f32);
            prop_assert_eq!(gx.fract(), 0.0);
        }
    }
}
