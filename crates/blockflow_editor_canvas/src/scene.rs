// SPDX-License-Identifier: MIT OR Apache-2.0
//! Retained scene graph.
//!
//! An SVG-shaped element tree the renderers reconcile against. Every write
//! goes through [`Scene`], which skips writes that would not change anything
//! and counts the ones that do, so callers can assert a re-render was a no-op.

use indexmap::IndexMap;
use std::collections::HashMap;

/// Handle to an element in a [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(u32);

/// Element type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Root `<svg>`
    Svg,
    /// `<style>` sheet
    Style,
    /// `<g>` group
    Group,
    /// `<path>`
    Path,
    /// `<rect>`
    Rect,
    /// `<circle>`
    Circle,
    /// `<text>`
    Text,
    /// `<foreignObject>` hosting per-node content
    ForeignObject,
}

impl Tag {
    /// SVG element name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Style => "style",
            Self::Group => "g",
            Self::Path => "path",
            Self::Rect => "rect",
            Self::Circle => "circle",
            Self::Text => "text",
            Self::ForeignObject => "foreignObject",
        }
    }
}

/// A scene element
#[derive(Debug, Clone)]
pub struct Element {
    tag: Tag,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    classes: Vec<String>,
    attrs: IndexMap<String, String>,
    text: Option<String>,
}

impl Element {
    fn new(tag: Tag, parent: Option<ElementId>) -> Self {
        Self {
            tag,
            parent,
            children: Vec::new(),
            classes: Vec::new(),
            attrs: IndexMap::new(),
            text: None,
        }
    }

    /// Element type
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Parent element, `None` for the root
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// Child elements in document order
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// Class list
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Check for a class
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Attributes in insertion order
    pub fn attrs(&self) -> &IndexMap<String, String> {
        &self.attrs
    }

    /// Get an attribute
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Text content
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// Mutation counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStats {
    /// Elements created
    pub created: u64,
    /// Elements removed (subtrees count every element)
    pub removed: u64,
    /// Attribute or text writes that changed a value
    pub attr_writes: u64,
    /// Class additions and removals
    pub class_writes: u64,
}

impl SceneStats {
    /// Number of structural mutations
    pub fn structural(&self) -> u64 {
        self.created + self.removed
    }

    /// Number of mutations of any kind
    pub fn total(&self) -> u64 {
        self.structural() + self.attr_writes + self.class_writes
    }
}

/// Element tree rooted at an `<svg>` element
#[derive(Debug, Clone)]
pub struct Scene {
    elements: HashMap<ElementId, Element>,
    root: ElementId,
    next_id: u32,
    stats: SceneStats,
}

impl Scene {
    /// Create a scene holding only the root element
    pub fn new() -> Self {
        let root = ElementId(0);
        let mut elements = HashMap::new();
        elements.insert(root, Element::new(Tag::Svg, None));
        Self {
            elements,
            root,
            next_id: 1,
            stats: SceneStats::default(),
        }
    }

    /// Root `<svg>` element
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Mutation counters since creation
    pub fn stats(&self) -> SceneStats {
        self.stats
    }

    /// Number of live elements, root included
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Always false: the root cannot be removed
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Get an element
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Check whether an element is still in the scene
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Children of an element (empty if it does not exist)
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.elements.get(&id).map_or(&[], |e| e.children())
    }

    /// Append a new element as the last child of `parent`.
    ///
    /// If `parent` is gone the element is created detached.
    pub fn append(&mut self, parent: ElementId, tag: Tag) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;

        let parent = match self.elements.get_mut(&parent) {
            Some(p) => {
                p.children.push(id);
                Some(parent)
            }
            None => {
                tracing::warn!("Appending {} to missing parent {:?}", tag.name(), parent);
                None
            }
        };
        self.elements.insert(id, Element::new(tag, parent));
        self.stats.created += 1;
        id
    }

    /// Append a new element carrying one class
    pub fn append_classed(&mut self, parent: ElementId, tag: Tag, class: &str) -> ElementId {
        let id = self.append(parent, tag);
        self.add_class(id, class);
        id
    }

    /// Remove an element and its subtree. The root cannot be removed.
    pub fn remove(&mut self, id: ElementId) -> bool {
        if id == self.root {
            return false;
        }
        let Some(element) = self.elements.remove(&id) else {
            return false;
        };
        self.stats.removed += 1;

        if let Some(parent) = element.parent.and_then(|p| self.elements.get_mut(&p)) {
            parent.children.retain(|c| *c != id);
        }

        let mut stack = element.children;
        while let Some(child) = stack.pop() {
            if let Some(removed) = self.elements.remove(&child) {
                self.stats.removed += 1;
                stack.extend(removed.children);
            }
        }
        true
    }

    /// Set an attribute. Returns `true` if the stored value changed.
    pub fn set_attr(&mut self, id: ElementId, name: &str, value: impl Into<String>) -> bool {
        let Some(element) = self.elements.get_mut(&id) else {
            return false;
        };
        let value = value.into();
        if element.attrs.get(name) == Some(&value) {
            return false;
        }
        element.attrs.insert(name.to_string(), value);
        self.stats.attr_writes += 1;
        true
    }

    /// Get an attribute
    pub fn attr(&self, id: ElementId, name: &str) -> Option<&str> {
        self.elements.get(&id)?.attr(name)
    }

    /// Set text content
    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) -> bool {
        let Some(element) = self.elements.get_mut(&id) else {
            return false;
        };
        let text = text.into();
        if element.text.as_ref() == Some(&text) {
            return false;
        }
        element.text = Some(text);
        self.stats.attr_writes += 1;
        true
    }

    /// Add a class if missing
    pub fn add_class(&mut self, id: ElementId, class: &str) -> bool {
        self.set_class(id, class, true)
    }

    /// Remove a class if present
    pub fn remove_class(&mut self, id: ElementId, class: &str) -> bool {
        self.set_class(id, class, false)
    }

    /// Add or remove a class. Returns `true` if the class list changed.
    pub fn set_class(&mut self, id: ElementId, class: &str, on: bool) -> bool {
        let Some(element) = self.elements.get_mut(&id) else {
            return false;
        };
        let present = element.has_class(class);
        if present == on {
            return false;
        }
        if on {
            element.classes.push(class.to_string());
        } else {
            element.classes.retain(|c| c != class);
        }
        self.stats.class_writes += 1;
        true
    }

    /// Check for a class
    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.elements.get(&id).is_some_and(|e| e.has_class(class))
    }

    /// First descendant of `scope` (depth first) with the given tag and class
    pub fn select(&self, scope: ElementId, tag: Tag, class: &str) -> Option<ElementId> {
        self.descendants(scope).into_iter().find(|id| {
            self.elements
                .get(id)
                .is_some_and(|e| e.tag == tag && e.has_class(class))
        })
    }

    /// All descendants with the given tag and class, in document order
    pub fn select_all(&self, scope: ElementId, tag: Tag, class: &str) -> Vec<ElementId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| {
                self.elements
                    .get(id)
                    .is_some_and(|e| e.tag == tag && e.has_class(class))
            })
            .collect()
    }

    /// Descendants of `scope` in document order, `scope` excluded
    pub fn descendants(&self, scope: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(scope).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_select() {
        let mut scene = Scene::new();
        let root = scene.root();
        let edges = scene.append_classed(root, Tag::Group, "edges");
        let nodes = scene.append_classed(root, Tag::Group, "nodes");
        let node = scene.append_classed(nodes, Tag::Group, "node");

        assert_eq!(scene.children(root), &[edges, nodes]);
        assert_eq!(scene.select(root, Tag::Group, "node"), Some(node));
        assert_eq!(scene.select(edges, Tag::Group, "node"), None);
        assert_eq!(scene.get(node).unwrap().parent(), Some(nodes));
    }

    #[test]
    fn test_remove_subtree() {
        let mut scene = Scene::new();
        let root = scene.root();
        let g = scene.append(root, Tag::Group);
        let a = scene.append(g, Tag::Circle);
        let b = scene.append(g, Tag::Path);

        assert!(scene.remove(g));
        assert!(!scene.contains(a));
        assert!(!scene.contains(b));
        assert!(scene.children(root).is_empty());
        assert_eq!(scene.stats().removed, 3);
        assert_eq!(scene.len(), 1);
        assert!(!scene.remove(root));
    }

    #[test]
    fn test_unchanged_writes_are_skipped() {
        let mut scene = Scene::new();
        let g = scene.append(scene.root(), Tag::Group);
        assert!(scene.set_attr(g, "transform", "translate(0, 0)"));
        assert!(scene.add_class(g, "node"));
        let before = scene.stats();

        assert!(!scene.set_attr(g, "transform", "translate(0, 0)"));
        assert!(!scene.add_class(g, "node"));
        assert!(!scene.remove_class(g, "selected"));
        assert_eq!(scene.stats(), before);
    }

    #[test]
    fn test_select_all_document_order() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.append_classed(root, Tag::Circle, "port");
        let g = scene.append(root, Tag::Group);
        let b = scene.append_classed(g, Tag::Circle, "port");
        let c = scene.append_classed(root, Tag::Circle, "port");
        assert_eq!(scene.select_all(root, Tag::Circle, "port"), vec![a, b, c]);
    }
}
