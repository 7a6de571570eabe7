// SPDX-License-Identifier: MIT OR Apache-2.0
//! SVG markup export of a [`Scene`].

use crate::scene::{ElementId, Scene, Tag};
use std::fmt::Write;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Serialize the scene to an SVG document
pub fn to_svg(scene: &Scene) -> String {
    let mut out = String::new();
    write_element(scene, scene.root(), 0, &mut out);
    out
}

fn write_element(scene: &Scene, id: ElementId, depth: usize, out: &mut String) {
    let Some(element) = scene.get(id) else {
        return;
    };
    let indent = "  ".repeat(depth);
    let name = element.tag().name();

    let _ = write!(out, "{indent}<{name}");
    if element.tag() == Tag::Svg {
        let _ = write!(out, " xmlns=\"{SVG_NAMESPACE}\"");
    }
    if !element.classes().is_empty() {
        let _ = write!(out, " class=\"{}\"", escape(&element.classes().join(" ")));
    }
    for (key, value) in element.attrs() {
        let _ = write!(out, " {key}=\"{}\"", escape(value));
    }

    let children = element.children();
    match (element.text(), children.is_empty()) {
        (None, true) => out.push_str("/>\n"),
        (Some(text), true) => {
            let _ = writeln!(out, ">{}</{name}>", escape(text));
        }
        (text, false) => {
            out.push_str(">\n");
            if let Some(text) = text {
                let _ = writeln!(out, "{indent}  {}", escape(text));
            }
            for child in children {
                write_element(scene, *child, depth + 1, out);
            }
            let _ = writeln!(out, "{indent}</{name}>");
        }
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export() {
        let mut scene = Scene::new();
        let root = scene.root();
        scene.set_attr(root, "height", "400");
        let g = scene.append_classed(root, Tag::Group, "node");
        scene.set_attr(g, "transform", "translate(20, 40)");
        let label = scene.append(g, Tag::Text);
        scene.set_text(label, "A & B");

        let svg = to_svg(&scene);
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" height=\"400\">"));
        assert!(svg.contains("<g class=\"node\" transform=\"translate(20, 40)\">"));
        assert!(svg.contains("<text>A &amp; B</text>"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
