//! Tests for HTML serialization: escaping modes, charset-driven entity
//! fallback, void elements, doctypes, and pretty-printing.

use loam_dom::{Attributes, DoctypeData, Document, ElementData, EscapeMode, NodeId, NodeType};

fn alloc_element(doc: &mut Document, tag: &str) -> NodeId {
    doc.alloc(NodeType::Element(ElementData::new(tag, Attributes::new())))
}

fn alloc_text(doc: &mut Document, data: &str) -> NodeId {
    doc.alloc(NodeType::Text(data.to_string()))
}

// ========== basic structure ==========

#[test]
fn test_element_with_text() {
    let mut doc = Document::new("");
    let p = alloc_element(&mut doc, "p");
    doc.append_child(NodeId::ROOT, p);
    let t = alloc_text(&mut doc, "Hello");
    doc.append_child(p, t);

    assert_eq!(doc.outer_html(p), "<p>Hello</p>");
    assert_eq!(doc.inner_html(p), "Hello");
}

#[test]
fn test_attributes_in_insertion_order() {
    let mut doc = Document::new("");
    let a = alloc_element(&mut doc, "a");
    doc.append_child(NodeId::ROOT, a);
    doc.set_attr(a, "href", "/x");
    doc.set_attr(a, "title", "a \"quoted\" title");
    doc.set_attr(a, "download", "");

    // Empty values serialize as a bare name; quotes in values escape.
    assert_eq!(
        doc.outer_html(a),
        "<a href=\"/x\" title=\"a &quot;quoted&quot; title\" download></a>"
    );
}

#[test]
fn test_void_elements_have_no_end_tag() {
    let mut doc = Document::new("");
    let div = alloc_element(&mut doc, "div");
    doc.append_child(NodeId::ROOT, div);
    let br = alloc_element(&mut doc, "br");
    let img = alloc_element(&mut doc, "img");
    doc.append_child(div, br);
    doc.append_child(div, img);
    doc.set_attr(img, "src", "a.png");

    assert_eq!(doc.outer_html(div), "<div><br><img src=\"a.png\"></div>");
}

#[test]
fn test_comment_and_doctype() {
    let mut doc = Document::new("");
    let doctype = doc.alloc(NodeType::DocumentType(DoctypeData {
        name: "html".to_string(),
        public_id: String::new(),
        system_id: String::new(),
    }));
    doc.append_child(NodeId::ROOT, doctype);
    let comment = doc.alloc(NodeType::Comment(" hi ".to_string()));
    doc.append_child(NodeId::ROOT, comment);

    assert_eq!(doc.outer_html(doc.root()), "<!DOCTYPE html><!-- hi -->");
}

#[test]
fn test_data_nodes_are_verbatim() {
    let mut doc = Document::new("");
    let script = alloc_element(&mut doc, "script");
    doc.append_child(NodeId::ROOT, script);
    let payload = doc.alloc(NodeType::Data("if (a < b) { run(\"&\"); }".to_string()));
    doc.append_child(script, payload);

    // No entity escaping inside script data.
    assert_eq!(
        doc.outer_html(script),
        "<script>if (a < b) { run(\"&\"); }</script>"
    );
}

// ========== escaping ==========

#[test]
fn test_core_escapes_in_text() {
    let mut doc = Document::new("");
    let p = alloc_element(&mut doc, "p");
    doc.append_child(NodeId::ROOT, p);
    let t = alloc_text(&mut doc, "1 < 2 & 3 > 2");
    doc.append_child(p, t);

    assert_eq!(doc.outer_html(p), "<p>1 &lt; 2 &amp; 3 &gt; 2</p>");
}

#[test]
fn test_nbsp_always_escapes() {
    let mut doc = Document::new("");
    let p = alloc_element(&mut doc, "p");
    doc.append_child(NodeId::ROOT, p);
    let t = alloc_text(&mut doc, "a\u{00A0}b");
    doc.append_child(p, t);

    assert_eq!(doc.outer_html(p), "<p>a&nbsp;b</p>");

    doc.output_settings_mut().set_escape_mode(EscapeMode::Xhtml);
    assert_eq!(doc.outer_html(p), "<p>a&#xa0;b</p>");
}

#[test]
fn test_unicode_stays_literal_in_utf8() {
    let mut doc = Document::new("");
    let p = alloc_element(&mut doc, "p");
    doc.append_child(NodeId::ROOT, p);
    let t = alloc_text(&mut doc, "café — 百度");
    doc.append_child(p, t);

    assert_eq!(doc.outer_html(p), "<p>café — 百度</p>");
}

#[test]
fn test_unencodable_falls_back_to_numeric_reference() {
    let mut doc = Document::new("");
    let title = alloc_element(&mut doc, "title");
    doc.append_child(NodeId::ROOT, title);
    let t = alloc_text(&mut doc, "百度一下");
    doc.append_child(title, t);

    assert!(doc.output_settings_mut().set_charset_name("ascii"));
    assert_eq!(
        doc.outer_html(title),
        "<title>&#30334;&#24230;&#19968;&#19979;</title>"
    );
}

#[test]
fn test_named_entity_when_charset_lacks_character() {
    let mut doc = Document::new("");
    let p = alloc_element(&mut doc, "p");
    doc.append_child(NodeId::ROOT, p);
    let t = alloc_text(&mut doc, "café");
    doc.append_child(p, t);

    // Greek charset cannot represent é; base mode knows the name for it.
    assert!(doc.output_settings_mut().set_charset_name("iso-8859-7"));
    assert_eq!(doc.outer_html(p), "<p>caf&eacute;</p>");
}

#[test]
fn test_extended_mode_uses_typographic_names() {
    let mut doc = Document::new("");
    let p = alloc_element(&mut doc, "p");
    doc.append_child(NodeId::ROOT, p);
    let t = alloc_text(&mut doc, "a\u{2014}b");
    doc.append_child(p, t);

    // Greek has no em dash. Base mode has no name for it either, so
    // numeric; extended mode knows &mdash;.
    assert!(doc.output_settings_mut().set_charset_name("iso-8859-7"));
    assert_eq!(doc.outer_html(p), "<p>a&#8212;b</p>");

    doc.output_settings_mut()
        .set_escape_mode(EscapeMode::Extended);
    assert_eq!(doc.outer_html(p), "<p>a&mdash;b</p>");
}

#[test]
fn test_encoding_switch_requires_no_reparse() {
    let mut doc = Document::new("");
    let p = alloc_element(&mut doc, "p");
    doc.append_child(NodeId::ROOT, p);
    let t = alloc_text(&mut doc, "新");
    doc.append_child(p, t);

    assert_eq!(doc.outer_html(p), "<p>新</p>");
    assert!(doc.output_settings_mut().set_charset_name("ascii"));
    assert_eq!(doc.outer_html(p), "<p>&#26032;</p>");
    assert!(doc.output_settings_mut().set_charset_name("utf-8"));
    assert_eq!(doc.outer_html(p), "<p>新</p>");
}

// ========== pretty printing ==========

#[test]
fn test_pretty_print_indents_blocks() {
    let mut doc = Document::new("");
    let div = alloc_element(&mut doc, "div");
    doc.append_child(NodeId::ROOT, div);
    let p = alloc_element(&mut doc, "p");
    doc.append_child(div, p);
    let t = alloc_text(&mut doc, "x");
    doc.append_child(p, t);

    doc.output_settings_mut().set_pretty_print(true);
    doc.output_settings_mut().set_indent_amount(2);

    assert_eq!(doc.outer_html(div), "<div>\n  <p>x</p>\n</div>");
}

#[test]
fn test_pretty_print_leaves_pre_alone() {
    let mut doc = Document::new("");
    let div = alloc_element(&mut doc, "div");
    doc.append_child(NodeId::ROOT, div);
    let pre = alloc_element(&mut doc, "pre");
    doc.append_child(div, pre);
    let t = alloc_text(&mut doc, "line1\nline2");
    doc.append_child(pre, t);

    doc.output_settings_mut().set_pretty_print(true);
    let pretty = doc.outer_html(div);
    assert!(pretty.contains("line1\nline2"));
}

#[test]
fn test_pretty_print_never_changes_text_semantics() {
    let mut doc = Document::new("");
    let p = alloc_element(&mut doc, "p");
    doc.append_child(NodeId::ROOT, p);
    let t = alloc_text(&mut doc, "inline text");
    doc.append_child(p, t);

    doc.output_settings_mut().set_pretty_print(true);
    assert_eq!(doc.outer_html(p), "<p>inline text</p>");
}
