// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canvas themes for the demo.

use blockflow_editor_canvas::style::css_color;
use blockflow_editor_canvas::StyleProvider;
use blockflow_editor_graph::Block;
use clap::ValueEnum;
use egui::Color32;

/// Theme presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Theme {
    /// Dark theme (default)
    #[default]
    Dark,
    /// Light theme
    Light,
}

impl Theme {
    fn surface(self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_rgb(30, 30, 30),
            Theme::Light => Color32::from_rgb(245, 245, 245),
        }
    }

    fn grid_dot(self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_gray(70),
            Theme::Light => Color32::from_gray(200),
        }
    }
}

impl StyleProvider for Theme {
    fn header_color(&self, block: &Block) -> Color32 {
        match block.color {
            Some([r, g, b]) => Color32::from_rgb(r, g, b),
            None => Color32::from_rgb(70, 100, 130),
        }
    }

    fn background_color(&self, _block: &Block) -> Color32 {
        match self {
            Theme::Dark => Color32::from_rgb(45, 45, 48),
            Theme::Light => Color32::WHITE,
        }
    }

    fn border_color(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_gray(20),
            Theme::Light => Color32::from_gray(90),
        }
    }

    fn svg_style(&self, unit: f32) -> String {
        // One dot per grid cell
        format!(
            "background-color: {}; background-image: radial-gradient({} 1px, transparent 1px); background-size: {unit}px {unit}px",
            css_color(self.surface()),
            css_color(self.grid_dot()),
        )
    }
}
