//! Tests for DOM tree mutation methods: append_child, insert_before,
//! remove_child, detach, and the derived navigation accessors.

use loam_dom::{Attributes, Document, ElementData, NodeId, NodeType};

/// Helper to create an element node and return its NodeId.
fn alloc_element(doc: &mut Document, tag: &str) -> NodeId {
    doc.alloc(NodeType::Element(ElementData::new(tag, Attributes::new())))
}

fn alloc_text(doc: &mut Document, data: &str) -> NodeId {
    doc.alloc(NodeType::Text(data.to_string()))
}

// ========== append_child / remove_child ==========

#[test]
fn test_remove_child_single_child() {
    let mut doc = Document::new("");
    let parent = alloc_element(&mut doc, "div");
    doc.append_child(NodeId::ROOT, parent);

    let child = alloc_element(&mut doc, "p");
    doc.append_child(parent, child);

    assert_eq!(doc.children(parent).len(), 1);

    doc.remove_child(parent, child);

    assert_eq!(doc.children(parent).len(), 0);
    assert_eq!(doc.parent(child), None);
    assert_eq!(doc.prev_sibling(child), None);
    assert_eq!(doc.next_sibling(child), None);
}

#[test]
fn test_remove_child_first_of_three() {
    let mut doc = Document::new("");
    let parent = alloc_element(&mut doc, "div");
    doc.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut doc, "a");
    let b = alloc_element(&mut doc, "b");
    let c = alloc_element(&mut doc, "c");
    doc.append_child(parent, a);
    doc.append_child(parent, b);
    doc.append_child(parent, c);

    doc.remove_child(parent, a);

    // b is now first child, c is second
    assert_eq!(doc.children(parent), &[b, c]);
    assert_eq!(doc.prev_sibling(b), None);
    assert_eq!(doc.next_sibling(b), Some(c));
    assert_eq!(doc.prev_sibling(c), Some(b));
}

#[test]
fn test_append_reparents_attached_node() {
    let mut doc = Document::new("");
    let first = alloc_element(&mut doc, "div");
    let second = alloc_element(&mut doc, "section");
    doc.append_child(NodeId::ROOT, first);
    doc.append_child(NodeId::ROOT, second);

    let child = alloc_element(&mut doc, "p");
    doc.append_child(first, child);
    doc.append_child(second, child);

    // One owner at a time: the move must have removed the old link.
    assert_eq!(doc.children(first), &[] as &[NodeId]);
    assert_eq!(doc.children(second), &[child]);
    assert_eq!(doc.parent(child), Some(second));
}

// ========== insert_before ==========

#[test]
fn test_insert_before_middle() {
    let mut doc = Document::new("");
    let parent = alloc_element(&mut doc, "ul");
    doc.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut doc, "li");
    let c = alloc_element(&mut doc, "li");
    doc.append_child(parent, a);
    doc.append_child(parent, c);

    let b = alloc_element(&mut doc, "li");
    doc.insert_before(parent, b, c);

    assert_eq!(doc.children(parent), &[a, b, c]);
    assert_eq!(doc.next_sibling(a), Some(b));
    assert_eq!(doc.prev_sibling(c), Some(b));
    assert_eq!(doc.parent(b), Some(parent));
}

#[test]
fn test_insert_before_stale_reference_appends() {
    let mut doc = Document::new("");
    let parent = alloc_element(&mut doc, "div");
    doc.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut doc, "p");
    doc.append_child(parent, a);

    // `stale` was never attached to `parent`.
    let stale = alloc_element(&mut doc, "span");
    let b = alloc_element(&mut doc, "p");
    doc.insert_before(parent, b, stale);

    assert_eq!(doc.children(parent), &[a, b]);
}

// ========== detach ==========

#[test]
fn test_detach_keeps_subtree() {
    let mut doc = Document::new("");
    let parent = alloc_element(&mut doc, "div");
    doc.append_child(NodeId::ROOT, parent);
    let child = alloc_element(&mut doc, "p");
    doc.append_child(parent, child);
    let grandchild = alloc_text(&mut doc, "hello");
    doc.append_child(child, grandchild);

    doc.detach(child);

    // The detached subtree's root has no parent, but keeps its children.
    assert_eq!(doc.parent(child), None);
    assert_eq!(doc.children(child), &[grandchild]);
    assert!(doc.is_descendant_of(grandchild, child));
    assert!(!doc.is_descendant_of(grandchild, parent));
}

// ========== navigation ==========

#[test]
fn test_ancestors_walks_to_root() {
    let mut doc = Document::new("");
    let html = alloc_element(&mut doc, "html");
    let body = alloc_element(&mut doc, "body");
    let p = alloc_element(&mut doc, "p");
    doc.append_child(NodeId::ROOT, html);
    doc.append_child(html, body);
    doc.append_child(body, p);

    let ancestors: Vec<NodeId> = doc.ancestors(p).collect();
    assert_eq!(ancestors, vec![body, html, NodeId::ROOT]);
}

#[test]
fn test_descendants_in_document_order() {
    let mut doc = Document::new("");
    let html = alloc_element(&mut doc, "html");
    let head = alloc_element(&mut doc, "head");
    let body = alloc_element(&mut doc, "body");
    let p = alloc_element(&mut doc, "p");
    let text = alloc_text(&mut doc, "x");
    doc.append_child(NodeId::ROOT, html);
    doc.append_child(html, head);
    doc.append_child(html, body);
    doc.append_child(body, p);
    doc.append_child(p, text);

    let order: Vec<NodeId> = doc.descendants(NodeId::ROOT).collect();
    assert_eq!(order, vec![html, head, body, p, text]);
}

// ========== attributes ==========

#[test]
fn test_attr_case_insensitive_get_set() {
    let mut doc = Document::new("");
    let a = alloc_element(&mut doc, "a");
    doc.append_child(NodeId::ROOT, a);

    doc.set_attr(a, "HREF", "/x");
    assert_eq!(doc.attr(a, "href"), Some("/x"));
    assert_eq!(doc.attr(a, "Href"), Some("/x"));

    doc.set_attr(a, "href", "/y");
    assert_eq!(doc.attr(a, "href"), Some("/y"));
    assert_eq!(doc.as_element(a).map(|e| e.attrs.len()), Some(1));
}

#[test]
fn test_element_id_and_classes() {
    let mut doc = Document::new("");
    let div = alloc_element(&mut doc, "div");
    doc.append_child(NodeId::ROOT, div);
    doc.set_attr(div, "id", "main");
    doc.set_attr(div, "class", "btn  active");

    let data = doc.as_element(div).unwrap();
    assert_eq!(data.id(), Some("main"));
    assert!(data.has_class("btn"));
    assert!(data.has_class("active"));
    assert!(!data.has_class("Active"));
}

// ========== text extraction ==========

#[test]
fn test_text_normalizes_whitespace() {
    let mut doc = Document::new("");
    let p = alloc_element(&mut doc, "p");
    doc.append_child(NodeId::ROOT, p);
    let t = alloc_text(&mut doc, "  Hello \n\t world  ");
    doc.append_child(p, t);

    assert_eq!(doc.text(p), "Hello world");
}

#[test]
fn test_text_separates_blocks() {
    let mut doc = Document::new("");
    let body = alloc_element(&mut doc, "body");
    doc.append_child(NodeId::ROOT, body);
    let p1 = alloc_element(&mut doc, "p");
    let p2 = alloc_element(&mut doc, "p");
    doc.append_child(body, p1);
    doc.append_child(body, p2);
    let t1 = alloc_text(&mut doc, "Hello");
    let t2 = alloc_text(&mut doc, "World");
    doc.append_child(p1, t1);
    doc.append_child(p2, t2);

    assert_eq!(doc.text(body), "Hello World");
}

#[test]
fn test_text_skips_data_nodes() {
    let mut doc = Document::new("");
    let body = alloc_element(&mut doc, "body");
    doc.append_child(NodeId::ROOT, body);
    let script = alloc_element(&mut doc, "script");
    doc.append_child(body, script);
    let payload = doc.alloc(NodeType::Data("var x = 1;".to_string()));
    doc.append_child(script, payload);
    let t = alloc_text(&mut doc, "visible");
    doc.append_child(body, t);

    assert_eq!(doc.text(body), "visible");
}

#[test]
fn test_own_text_ignores_children() {
    let mut doc = Document::new("");
    let p = alloc_element(&mut doc, "p");
    doc.append_child(NodeId::ROOT, p);
    let t1 = alloc_text(&mut doc, "Hello ");
    doc.append_child(p, t1);
    let b = alloc_element(&mut doc, "b");
    doc.append_child(p, b);
    let t2 = alloc_text(&mut doc, "there");
    doc.append_child(b, t2);
    let t3 = alloc_text(&mut doc, " now");
    doc.append_child(p, t3);

    assert_eq!(doc.own_text(p), "Hello now");
    assert_eq!(doc.text(p), "Hello there now");
}

// ========== URL resolution ==========

#[test]
fn test_abs_url_against_document_base() {
    let mut doc = Document::new("http://example.com/");
    let a = alloc_element(&mut doc, "a");
    doc.append_child(NodeId::ROOT, a);
    doc.set_attr(a, "href", "/x");

    assert_eq!(doc.abs_url(a, "href"), "http://example.com/x");
}

#[test]
fn test_abs_url_prefers_base_element() {
    let mut doc = Document::new("http://example.com/");
    let html = alloc_element(&mut doc, "html");
    let head = alloc_element(&mut doc, "head");
    let base = alloc_element(&mut doc, "base");
    let body = alloc_element(&mut doc, "body");
    let a = alloc_element(&mut doc, "a");
    doc.append_child(NodeId::ROOT, html);
    doc.append_child(html, head);
    doc.append_child(head, base);
    doc.append_child(html, body);
    doc.append_child(body, a);
    doc.set_attr(base, "href", "http://www.example.org/dir/");
    doc.set_attr(a, "href", "a.html");

    assert_eq!(doc.abs_url(a, "href"), "http://www.example.org/dir/a.html");
}

#[test]
fn test_abs_url_unresolvable_is_empty() {
    let mut doc = Document::new("");
    let a = alloc_element(&mut doc, "a");
    doc.append_child(NodeId::ROOT, a);
    doc.set_attr(a, "href", "/x");

    // No base anywhere: nothing to resolve against.
    assert_eq!(doc.abs_url(a, "href"), "");
    // Missing attribute is also the empty string, never an error.
    assert_eq!(doc.abs_url(a, "src"), "");
}

#[test]
fn test_abs_url_absolute_passthrough() {
    let mut doc = Document::new("http://example.com/");
    let a = alloc_element(&mut doc, "a");
    doc.append_child(NodeId::ROOT, a);
    doc.set_attr(a, "href", "http://news.example.org/story");

    assert_eq!(doc.abs_url(a, "href"), "http://news.example.org/story");
}

// ========== document accessors ==========

#[test]
fn test_document_element_body_head_title() {
    let mut doc = Document::new("");
    let html = alloc_element(&mut doc, "html");
    let head = alloc_element(&mut doc, "head");
    let title = alloc_element(&mut doc, "title");
    let body = alloc_element(&mut doc, "body");
    doc.append_child(NodeId::ROOT, html);
    doc.append_child(html, head);
    doc.append_child(head, title);
    doc.append_child(html, body);
    let t = alloc_text(&mut doc, "  My Page  ");
    doc.append_child(title, t);

    assert_eq!(doc.document_element(), Some(html));
    assert_eq!(doc.head(), Some(head));
    assert_eq!(doc.body(), Some(body));
    assert_eq!(doc.title(), "My Page");
}
