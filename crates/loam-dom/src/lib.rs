//! DOM tree implementation for the loam HTML toolkit.
//!
//! This crate provides an arena-based DOM tree structure following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/), together with the
//! output settings and serialization that turn a tree back into markup.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all
//! relationships: the [`Document`] owns every node, children are ordered
//! id sequences, and the parent link is a non-owning back-reference used
//! only for navigation. A detached subtree's root simply has no parent.

use std::collections::HashSet;

pub mod attributes;
pub mod entities;
pub mod output;
mod serialize;

pub use attributes::{Attribute, Attributes};
pub use output::{EscapeMode, OutputSettings};

/// A type-safe index into the DOM tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
/// "Each node has an associated node document..."
///
/// `NodeId` provides O(1) access to any node in the tree without borrowing
/// issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
/// "Each node has an associated node document... and parent (null or an
/// element)."
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    ///
    /// Navigation only - the arena owns the node, never the parent link.
    pub parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    ///
    /// Order is document order; serialization and selection rely on it.
    pub children: Vec<NodeId>,
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    /// "A document whose type is "html" is known as an HTML document."
    Document,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    /// "Element nodes are simply known as elements."
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    /// "Text nodes are known as text."
    Text(String),
    /// [§ 4.7 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    /// "Comment nodes are known as comments."
    Comment(String),
    /// Raw character data inside `<script>` and `<style>` elements. Data is
    /// serialized verbatim (no entity escaping) and excluded from `text()`.
    Data(String),
    /// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)
    /// "Doctypes have an associated name, public ID, and system ID."
    DocumentType(DoctypeData),
}

/// Payload of a [`NodeType::DocumentType`] node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctypeData {
    /// "An associated name"
    pub name: String,
    /// "public ID" (empty when missing)
    pub public_id: String,
    /// "system ID" (empty when missing)
    pub system_id: String,
}

/// Element-specific data.
///
/// Per [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element):
/// "When an element is created, its local name is always given." The tag name
/// is immutable after creation; only attributes may change.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// "An element's local name", ASCII-lowercased at creation.
    tag_name: String,
    /// "An element has an associated attribute list"
    pub attrs: Attributes,
}

impl ElementData {
    /// Create element data with a (lowercased) tag name and attributes.
    #[must_use]
    pub fn new(tag_name: &str, attrs: Attributes) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs,
        }
    }

    /// The element's local name.
    #[must_use]
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Returns the element's id attribute value if present.
    ///
    /// Per [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes):
    /// "The id attribute specifies its element's unique identifier (ID)."
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attrs.get("id")
    }

    /// Returns the set of class names from the class attribute.
    ///
    /// Per [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes):
    /// "The class attribute, if specified, must have a value that is a set of
    /// space-separated tokens."
    #[must_use]
    pub fn classes(&self) -> HashSet<&str> {
        match self.attrs.get("class") {
            Some(list) => list.split_ascii_whitespace().collect(),
            None => HashSet::new(),
        }
    }

    /// Whether the class attribute contains the given token (case-sensitive).
    #[must_use]
    pub fn has_class(&self, name: &str) -> bool {
        self.attrs
            .get("class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == name))
    }
}

/// [§ 13.1.2 Elements / void elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
///
/// "Void elements only have a start tag; end tags must not be specified."
#[must_use]
pub fn is_void_tag(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Elements that establish visual blocks. Used for whitespace handling in
/// [`Document::text`] and for pretty-printed serialization; never affects
/// tree construction.
#[must_use]
pub fn is_block_tag(name: &str) -> bool {
    matches!(
        name,
        "html"
            | "body"
            | "head"
            | "address"
            | "article"
            | "aside"
            | "blockquote"
            | "caption"
            | "center"
            | "col"
            | "colgroup"
            | "dd"
            | "details"
            | "dir"
            | "div"
            | "dl"
            | "dt"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hgroup"
            | "hr"
            | "li"
            | "main"
            | "menu"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "summary"
            | "table"
            | "tbody"
            | "td"
            | "tfoot"
            | "th"
            | "thead"
            | "tr"
            | "ul"
    )
}

/// Elements whose text content is whitespace-significant; pretty-printing
/// never reformats inside them.
#[must_use]
pub fn preserves_whitespace(name: &str) -> bool {
    matches!(name, "pre" | "textarea")
}

/// Arena-based DOM document with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// "The DOM represents a document as a tree. A tree is a finite hierarchical
/// tree structure."
///
/// All nodes live in a contiguous vector, with indices for all
/// relationships. The document additionally owns the base URI it was parsed
/// against and the [`OutputSettings`] governing serialization.
#[derive(Debug, Clone)]
pub struct Document {
    /// All nodes in the tree, indexed by `NodeId`.
    /// The Document node is always at index 0 (`NodeId::ROOT`).
    nodes: Vec<Node>,
    /// The URI this document was loaded from; anchor for `abs_url`.
    base_uri: String,
    /// Serialization configuration.
    settings: OutputSettings,
    /// Whether a DOCTYPE token forced quirks mode. Recorded for callers;
    /// tree construction here does not branch on it.
    quirks_mode: bool,
}

impl Document {
    /// Create a new document with just the Document node.
    #[must_use]
    pub fn new(base_uri: &str) -> Self {
        let document = Node {
            node_type: NodeType::Document,
            parent: None,
            children: Vec::new(),
        };
        Document {
            nodes: vec![document],
            base_uri: base_uri.to_string(),
            settings: OutputSettings::default(),
            quirks_mode: false,
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// The URI this document was parsed against.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Replace the document base URI.
    pub fn set_base_uri(&mut self, base_uri: &str) {
        self.base_uri = base_uri.to_string();
    }

    /// The serialization settings.
    #[must_use]
    pub const fn output_settings(&self) -> &OutputSettings {
        &self.settings
    }

    /// Mutable access to the serialization settings.
    pub const fn output_settings_mut(&mut self) -> &mut OutputSettings {
        &mut self.settings
    }

    /// Whether a DOCTYPE forced quirks mode during parsing.
    #[must_use]
    pub const fn quirks_mode(&self) -> bool {
        self.quirks_mode
    }

    /// Record the quirks-mode flag (set by the tree builder).
    pub const fn set_quirks_mode(&mut self, quirks: bool) {
        self.quirks_mode = quirks;
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Get the number of nodes in the arena (including detached ones).
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the arena is empty (should always have at least the Document).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before
    /// null."
    ///
    /// Appends `child` as the last child of `parent`. A child already
    /// attached elsewhere is detached first, so the parent back-reference
    /// never has two owners.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// [§ 4.2.1 Pre-insert](https://dom.spec.whatwg.org/#concept-node-pre-insert)
    ///
    /// Insert `child` into `parent`'s children immediately before
    /// `reference`. Falls back to appending when `reference` is not a child
    /// of `parent` (the caller's reference went stale).
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        self.detach(child);
        let position = self.nodes[parent.0]
            .children
            .iter()
            .position(|&id| id == reference);
        match position {
            Some(index) => self.nodes[parent.0].children.insert(index, child),
            None => self.nodes[parent.0].children.push(child),
        }
        self.nodes[child.0].parent = Some(parent);
    }

    /// [§ 4.2.3 Remove](https://dom.spec.whatwg.org/#concept-node-remove)
    ///
    /// Remove `child` from `parent`'s child list and clear its parent link.
    /// The node (and its subtree) stays in the arena, detached.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.retain(|&id| id != child);
        if self.nodes[child.0].parent == Some(parent) {
            self.nodes[child.0].parent = None;
        }
    }

    /// Detach a node from whatever parent currently holds it, if any.
    pub fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.nodes[child.0].parent {
            self.remove_child(parent, child);
        }
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    ///
    /// "An object A's next sibling is the object immediately following A in
    /// the children of A's parent."
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|&s| s == id)?;
        siblings.get(index + 1).copied()
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    ///
    /// "An object A's previous sibling is the object immediately preceding A
    /// in the children of A's parent."
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|&s| s == id)?;
        index.checked_sub(1).and_then(|i| siblings.get(i)).copied()
    }

    /// [§ 4.2.6 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// "An object A is called a descendant of an object B, if either A is a
    /// child of B or A is a child of an object C that is a descendant of B."
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.parent(descendant);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            doc: self,
            current: self.parent(id),
        }
    }

    /// Iterate over preceding siblings (from immediately before to first
    /// child).
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> PrecedingSiblingIterator<'_> {
        PrecedingSiblingIterator {
            doc: self,
            current: self.prev_sibling(id),
        }
    }

    /// Iterate over the subtree below `id` in document order (pre-order),
    /// excluding `id` itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        DescendantIterator { doc: self, stack }
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get mutable element data if this node is an element.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| match &mut n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// The tag name of a node, when it is an element.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.as_element(id).map(ElementData::tag_name)
    }

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// "The document element of a document is the element whose parent is
    /// that document, if it exists; otherwise null."
    ///
    /// In practice for HTML documents, this is the `<html>` element.
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .find(|&&id| self.as_element(id).is_some())
            .copied()
    }

    /// [§ 3.1.3 The body element](https://html.spec.whatwg.org/multipage/dom.html#the-body-element-2)
    ///
    /// "The body element of a document is the first of the html element's
    /// children that is either a body element or a frameset element."
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .find(|&&id| {
                self.tag_name(id)
                    .is_some_and(|tag| tag == "body" || tag == "frameset")
            })
            .copied()
    }

    /// The `<head>` element, if the tree has one.
    #[must_use]
    pub fn head(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .find(|&&id| self.tag_name(id) == Some("head"))
            .copied()
    }

    /// [§ 4.2.2 The title element](https://html.spec.whatwg.org/multipage/semantics.html#the-title-element)
    ///
    /// The normalized text of the first `<title>` element, or an empty
    /// string when the document has none.
    #[must_use]
    pub fn title(&self) -> String {
        let mut walk = self.descendants(NodeId::ROOT);
        walk.find(|&id| self.tag_name(id) == Some("title"))
            .map(|id| self.text(id))
            .unwrap_or_default()
    }

    /// Get an attribute value on an element (ASCII-case-insensitive name).
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.as_element(id).and_then(|data| data.attrs.get(name))
    }

    /// Set an attribute on an element. No-op on non-element nodes.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(data) = self.as_element_mut(id) {
            data.attrs.set(name, value);
        }
    }

    /// [§ 2.5 URLs](https://html.spec.whatwg.org/multipage/urls-and-fetching.html#resolving-urls)
    ///
    /// Resolve the (possibly relative) value of `attr_name` on element `id`
    /// against the effective base URI: the first `<base href>` in the tree
    /// when present and itself resolvable, otherwise the document base URI.
    /// Missing attributes and unresolvable URLs yield an empty string,
    /// never an error.
    #[must_use]
    pub fn abs_url(&self, id: NodeId, attr_name: &str) -> String {
        let Some(value) = self.attr(id, attr_name) else {
            return String::new();
        };
        if value.trim().is_empty() {
            return String::new();
        }
        let base = self.effective_base_uri();
        loam_common::url::resolve(value, base.as_deref()).unwrap_or_default()
    }

    /// [§ 4.2.3 The base element](https://html.spec.whatwg.org/multipage/semantics.html#the-base-element)
    ///
    /// "The href content attribute, if specified, must contain a valid URL
    /// potentially surrounded by spaces." The first `<base>` with an `href`
    /// wins; its value is resolved against the document base URI so a
    /// relative `<base href>` still anchors correctly.
    #[must_use]
    pub fn effective_base_uri(&self) -> Option<String> {
        let document_base = (!self.base_uri.trim().is_empty()).then(|| self.base_uri.clone());

        let mut walk = self.descendants(NodeId::ROOT);
        let base_element = walk.find(|&id| {
            self.tag_name(id) == Some("base")
                && self
                    .attr(id, "href")
                    .is_some_and(|href| !href.trim().is_empty())
        });

        if let Some(base_id) = base_element {
            let href = self.attr(base_id, "href").unwrap_or_default();
            if let Some(resolved) = loam_common::url::resolve(href, document_base.as_deref()) {
                return Some(resolved);
            }
        }
        document_base
    }

    /// Concatenated, whitespace-normalized text of the subtree rooted at
    /// `id`.
    ///
    /// Runs of whitespace collapse to single spaces, boundaries between
    /// block-level elements read as a space, and `Data` payloads
    /// (script/style) contribute nothing.
    #[must_use]
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut pending_space = false;
        self.collect_text(id, &mut out, &mut pending_space);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String, pending_space: &mut bool) {
        let Some(node) = self.get(id) else { return };
        match &node.node_type {
            NodeType::Text(data) => append_normalized(out, data, pending_space),
            NodeType::Element(data) => {
                // A block boundary (or <br>) separates the runs on either
                // side with a single space.
                if is_block_tag(data.tag_name()) || data.tag_name() == "br" {
                    *pending_space = !out.is_empty();
                }
                for &child in &node.children {
                    self.collect_text(child, out, pending_space);
                }
                if is_block_tag(data.tag_name()) {
                    *pending_space = !out.is_empty();
                }
            }
            NodeType::Document => {
                for &child in &node.children {
                    self.collect_text(child, out, pending_space);
                }
            }
            NodeType::Comment(_) | NodeType::Data(_) | NodeType::DocumentType(_) => {}
        }
    }

    /// Normalized text of the immediate text-node children of `id` only.
    #[must_use]
    pub fn own_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut pending_space = false;
        for &child in self.children(id) {
            if let Some(data) = self.as_text(child) {
                append_normalized(&mut out, data, &mut pending_space);
            }
        }
        out
    }
}

/// Append `data` to `out`, collapsing whitespace runs into single spaces and
/// trimming the leading edge.
fn append_normalized(out: &mut String, data: &str, pending_space: &mut bool) {
    for c in data.chars() {
        if c.is_whitespace() {
            if !out.is_empty() {
                *pending_space = true;
            }
        } else {
            if *pending_space {
                out.push(' ');
                *pending_space = false;
            }
            out.push(c);
        }
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    doc: &'a Document,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.doc.parent(id);
        Some(id)
    }
}

/// Iterator over preceding siblings of a node.
pub struct PrecedingSiblingIterator<'a> {
    doc: &'a Document,
    current: Option<NodeId>,
}

impl Iterator for PrecedingSiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.doc.prev_sibling(id);
        Some(id)
    }
}

/// Pre-order (document order) iterator over a subtree, excluding its root.
pub struct DescendantIterator<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let children = self.doc.children(id);
        for &child in children.iter().rev() {
            self.stack.push(child);
        }
        Some(id)
    }
}
