//! Scene document tree and XML serialization
//!
//! A scene document is a small element tree: every node has a tag, an
//! ordered list of attributes and an ordered list of children. Serialization
//! is deterministic, uses four-space indentation and self-closes nodes
//! without children, which is the layout the renderer's scene loader is
//! tested against.

use pcrender_core::{format_triple, CameraPose, Rgb};
use std::fmt;

/// Format version written on the root node
pub const SCENE_FORMAT_VERSION: &str = "0.6.0";

/// Format a scalar the way vector attributes format their components
pub fn format_float(value: f32) -> String {
    format!("{:?}", value)
}

/// One element of a scene document
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// Create a node without attributes or children
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a node with a `type` attribute
    pub fn typed(tag: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::new(tag).with_attr("type", kind)
    }

    /// Add or replace an attribute, returning the node
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Append a child, returning the node
    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append a child
    pub fn push(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    /// Set an attribute, keeping its position if it already exists
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Look up an attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// `<float name=".." value=".."/>`
    pub fn float(name: &str, value: f32) -> Self {
        Self::new("float")
            .with_attr("name", name)
            .with_attr("value", format_float(value))
    }

    /// `<integer name=".." value=".."/>`
    pub fn integer(name: &str, value: i64) -> Self {
        Self::new("integer")
            .with_attr("name", name)
            .with_attr("value", value.to_string())
    }

    /// `<boolean name=".." value=".."/>`
    pub fn boolean(name: &str, value: bool) -> Self {
        Self::new("boolean")
            .with_attr("name", name)
            .with_attr("value", value.to_string())
    }

    /// `<string name=".." value=".."/>`
    pub fn string(name: &str, value: &str) -> Self {
        Self::new("string").with_attr("name", name).with_attr("value", value)
    }

    /// `<rgb name=".." value="r,g,b"/>`
    pub fn rgb(name: &str, color: Rgb) -> Self {
        Self::new("rgb")
            .with_attr("name", name)
            .with_attr("value", format_triple(color[0], color[1], color[2]))
    }

    /// `<lookat origin=".." target=".." up=".."/>`
    pub fn lookat(pose: &CameraPose) -> Self {
        let mut node = Self::new("lookat");
        set_lookat(&mut node, pose);
        node
    }

    /// First child with the given tag
    pub fn child(&self, tag: &str) -> Option<&SceneNode> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// First child with the given tag, mutably
    pub fn child_mut(&mut self, tag: &str) -> Option<&mut SceneNode> {
        self.children.iter_mut().find(|c| c.tag == tag)
    }

    /// Follow a path of tags, taking the first match at every level
    pub fn find(&self, path: &[&str]) -> Option<&SceneNode> {
        path.iter().try_fold(self, |node, tag| node.child(tag))
    }

    /// Mutable variant of [`SceneNode::find`]
    pub fn find_mut(&mut self, path: &[&str]) -> Option<&mut SceneNode> {
        let mut node = self;
        for tag in path {
            node = node.child_mut(tag)?;
        }
        Some(node)
    }

    /// Count this node and its descendants matching a predicate
    pub fn count_matching<F>(&self, predicate: &F) -> usize
    where
        F: Fn(&SceneNode) -> bool,
    {
        let own = usize::from(predicate(self));
        own + self
            .children
            .iter()
            .map(|c| c.count_matching(predicate))
            .sum::<usize>()
    }

    fn write_xml(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str("    ");
        }
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_into(out, value);
            out.push('"');
        }

        if self.children.is_empty() {
            out.push_str("/>\n");
            return;
        }

        out.push_str(">\n");
        for child in &self.children {
            child.write_xml(out, depth + 1);
        }
        for _ in 0..depth {
            out.push_str("    ");
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push_str(">\n");
    }
}

fn set_lookat(node: &mut SceneNode, pose: &CameraPose) {
    node.set_attr("origin", format_triple(pose.origin.x, pose.origin.y, pose.origin.z));
    node.set_attr("target", format_triple(pose.target.x, pose.target.y, pose.target.z));
    node.set_attr("up", format_triple(pose.up.x, pose.up.y, pose.up.z));
}

fn escape_into(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// Path from the root to the camera orientation node
const CAMERA_LOOKAT_PATH: [&str; 3] = ["sensor", "transform", "lookat"];

/// A complete scene description for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDocument {
    pub root: SceneNode,
}

impl SceneDocument {
    /// An empty `<scene>` root carrying the format version
    pub fn new() -> Self {
        Self {
            root: SceneNode::new("scene").with_attr("version", SCENE_FORMAT_VERSION),
        }
    }

    /// Append a top-level node
    pub fn push(&mut self, node: SceneNode) {
        self.root.push(node);
    }

    /// Serialize to XML text
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.root.write_xml(&mut out, 0);
        out
    }

    /// The camera orientation node, if the document has a sensor
    pub fn camera_lookat(&self) -> Option<&SceneNode> {
        self.root.find(&CAMERA_LOOKAT_PATH)
    }

    /// Overwrite the camera orientation in place.
    ///
    /// Returns `false` when the document has no camera orientation node.
    pub fn update_camera(&mut self, pose: &CameraPose) -> bool {
        match self.root.find_mut(&CAMERA_LOOKAT_PATH) {
            Some(lookat) => {
                set_lookat(lookat, pose);
                true
            }
            None => false,
        }
    }

    /// A copy of this document with only the camera orientation replaced.
    ///
    /// A document without a camera is returned unchanged, with a warning.
    pub fn with_camera(&self, pose: &CameraPose) -> Self {
        let mut patched = self.clone();
        if !patched.update_camera(pose) {
            tracing::warn!("scene document has no camera lookat node, leaving it unchanged");
        }
        patched
    }
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SceneDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml())
    }
}
