//! HTML serialization.
//!
//! [§ 13.3 Serializing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)
//!
//! Markup is emitted according to the owning document's [`OutputSettings`]
//! at call time: the escape mode picks the named-entity table, the target
//! charset decides which characters must fall back to numeric references,
//! and pretty-printing inserts whitespace without ever changing semantics.

use crate::entities;
use crate::output::{EscapeMode, OutputSettings};
use crate::{Document, NodeId, NodeType, is_block_tag, is_void_tag, preserves_whitespace};

impl Document {
    /// Serialize the node and its subtree to markup.
    ///
    /// "The HTML fragment serialization algorithm... consists of the
    /// following steps" - realized here as a recursive walk emitting tags,
    /// escaped text, comments, and doctypes in document order.
    #[must_use]
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.serialize_node(id, &mut out, 0, false);
        out
    }

    /// Serialize only the children of the node, in document order.
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        let preserve = self
            .tag_name(id)
            .is_some_and(preserves_whitespace);
        self.serialize_children(id, &mut out, 0, preserve);
        out
    }

    fn serialize_children(&self, id: NodeId, out: &mut String, depth: usize, preserve: bool) {
        for &child in self.children(id) {
            self.serialize_node(child, out, depth, preserve);
        }
    }

    fn serialize_node(&self, id: NodeId, out: &mut String, depth: usize, preserve: bool) {
        let Some(node) = self.get(id) else { return };
        match &node.node_type {
            NodeType::Document => self.serialize_children(id, out, depth, preserve),
            NodeType::Element(_) => self.serialize_element(id, out, depth, preserve),
            NodeType::Text(data) => {
                escape_into(out, data, self.output_settings(), false);
            }
            NodeType::Comment(data) => {
                self.maybe_break(out, depth, preserve);
                out.push_str("<!--");
                out.push_str(data);
                out.push_str("-->");
            }
            NodeType::Data(data) => out.push_str(data),
            NodeType::DocumentType(doctype) => {
                out.push_str("<!DOCTYPE");
                if !doctype.name.is_empty() {
                    out.push(' ');
                    out.push_str(&doctype.name);
                }
                // "If the node has a public identifier..." - PUBLIC takes the
                // system id along; SYSTEM stands alone.
                if !doctype.public_id.is_empty() {
                    out.push_str(" PUBLIC \"");
                    out.push_str(&doctype.public_id);
                    out.push('"');
                    if !doctype.system_id.is_empty() {
                        out.push_str(" \"");
                        out.push_str(&doctype.system_id);
                        out.push('"');
                    }
                } else if !doctype.system_id.is_empty() {
                    out.push_str(" SYSTEM \"");
                    out.push_str(&doctype.system_id);
                    out.push('"');
                }
                out.push('>');
            }
        }
    }

    fn serialize_element(&self, id: NodeId, out: &mut String, depth: usize, preserve: bool) {
        let Some(data) = self.as_element(id) else {
            return;
        };
        let name = data.tag_name();
        let settings = self.output_settings();

        if is_block_tag(name) {
            self.maybe_break(out, depth, preserve);
        }

        out.push('<');
        out.push_str(name);
        for attr in &data.attrs {
            out.push(' ');
            out.push_str(&attr.name);
            // A bare name round-trips to an empty value, so empty values
            // serialize without `=""`.
            if !attr.value.is_empty() {
                out.push_str("=\"");
                escape_into(out, &attr.value, settings, true);
                out.push('"');
            }
        }
        out.push('>');

        // "Void elements only have a start tag; end tags must not be
        //  specified."
        if is_void_tag(name) {
            return;
        }

        let child_preserve = preserve || preserves_whitespace(name);
        self.serialize_children(id, out, depth + 1, child_preserve);

        if self.has_element_child(id) && is_block_tag(name) {
            self.maybe_break(out, depth, child_preserve);
        }
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }

    fn has_element_child(&self, id: NodeId) -> bool {
        self.children(id)
            .iter()
            .any(|&child| self.as_element(child).is_some())
    }

    /// Emit a line break plus indentation when pretty-printing is on and the
    /// position allows it. Whitespace only - never emitted inside
    /// whitespace-preserving elements.
    fn maybe_break(&self, out: &mut String, depth: usize, preserve: bool) {
        let settings = self.output_settings();
        if !settings.pretty_print() || preserve || out.is_empty() {
            return;
        }
        if !out.ends_with('\n') {
            out.push('\n');
        }
        for _ in 0..(depth * settings.indent_amount()) {
            out.push(' ');
        }
    }
}

/// Escape `text` into `out` under the given settings.
///
/// Escaping policy, per character:
/// 1. the markup-significant core (`&`, `<`, `>`, and `"` inside attribute
///    values) always escapes;
/// 2. U+00A0 always escapes (`&nbsp;` when the mode knows the name, else a
///    numeric reference) - literal non-breaking spaces are indistinguishable
///    from ordinary spaces in source;
/// 3. anything the target charset can represent is emitted literally;
/// 4. otherwise a named entity from the mode's table, falling back to a
///    decimal numeric character reference.
pub(crate) fn escape_into(
    out: &mut String,
    text: &str,
    settings: &OutputSettings,
    in_attribute: bool,
) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            '\u{00A0}' => {
                if settings.escape_mode() == EscapeMode::Xhtml {
                    out.push_str("&#xa0;");
                } else {
                    out.push_str("&nbsp;");
                }
            }
            _ if settings.can_encode(c) => out.push(c),
            _ => match entities::escape_name(c, settings.escape_mode()) {
                Some(name) => {
                    out.push('&');
                    out.push_str(name);
                    out.push(';');
                }
                None => {
                    out.push_str("&#");
                    out.push_str(&(c as u32).to_string());
                    out.push(';');
                }
            },
        }
    }
}
