//! Tests for selector evaluation against parsed documents: matching
//! semantics, document order, deduplication, and subtree scoping.

use loam_dom::{Document, NodeId};
use loam_html::parse;
use loam_select::{Selector, query, query_from, select_from};

/// Helper to run a selector and return the matched tag names in order.
fn tags_for(doc: &Document, selector: &str) -> Vec<String> {
    query(doc, selector)
        .expect("selector compiles")
        .iter()
        .filter_map(|&id| doc.tag_name(id).map(str::to_string))
        .collect()
}

/// Helper to run a selector expecting exactly one match.
fn one(doc: &Document, selector: &str) -> NodeId {
    let matches = query(doc, selector).expect("selector compiles");
    assert_eq!(matches.len(), 1, "expected one match for {selector}");
    matches[0]
}

// ========== simple selectors ==========

#[test]
fn test_select_by_tag() {
    let doc = parse("<div><p>a</p><p>b</p></div>", "");
    assert_eq!(tags_for(&doc, "p"), vec!["p", "p"]);
}

#[test]
fn test_select_by_id() {
    let doc = parse("<input id=su value=go><input id=other>", "");
    let el = one(&doc, "#su");
    assert_eq!(doc.attr(el, "value"), Some("go"));
}

#[test]
fn test_select_by_class() {
    let doc = parse(
        "<p class=\"lead story\">a</p><p class=\"story\">b</p><p>c</p>",
        "",
    );
    assert_eq!(query(&doc, ".story").unwrap().len(), 2);
    assert_eq!(query(&doc, ".lead.story").unwrap().len(), 1);
    // Class matching is case-sensitive.
    assert!(query(&doc, ".Story").unwrap().is_empty());
}

#[test]
fn test_select_universal_is_every_element() {
    let doc = parse("<p>x</p>", "");
    // html, head, body, p
    assert_eq!(query(&doc, "*").unwrap().len(), 4);
}

#[test]
fn test_tag_match_is_case_insensitive() {
    let doc = parse("<DIV>x</DIV>", "");
    assert_eq!(query(&doc, "div").unwrap().len(), 1);
    assert_eq!(query(&doc, "DIV").unwrap().len(), 1);
}

// ========== attribute selectors ==========

#[test]
fn test_attribute_exact_match_non_ascii() {
    let doc = parse("<input value=\"百度一下\" id=su><input value=other>", "");
    let el = one(&doc, "input[value=百度一下]");
    assert_eq!(doc.attr(el, "id"), Some("su"));
}

#[test]
fn test_attribute_operators() {
    let doc = parse(
        "<a href=\"https://example.com/pic.png\" lang=\"en-US\" class=\"x y\" id=a1>x</a>\
         <a href=\"http://example.com/page.html\" lang=\"enx\" id=a2>y</a>",
        "",
    );
    assert_eq!(one(&doc, "a[href^=https]"), one(&doc, "#a1"));
    assert_eq!(one(&doc, "a[href$=.png]"), one(&doc, "#a1"));
    assert_eq!(query(&doc, "a[href*=example]").unwrap().len(), 2);
    assert_eq!(one(&doc, "a[class~=y]"), one(&doc, "#a1"));
    assert_eq!(one(&doc, "a[lang|=en]"), one(&doc, "#a1"));
    assert_eq!(query(&doc, "a[href]").unwrap().len(), 2);
}

#[test]
fn test_attribute_substring_in_url() {
    let doc = parse(
        "<a href=\"http://example.com/naughty-corners-are-a-bad-idea/story\">x</a>\
         <a href=\"http://example.com/other\">y</a>",
        "",
    );
    assert_eq!(
        query(&doc, "a[href*=naughty-corners-are-a-bad-idea]")
            .unwrap()
            .len(),
        1
    );
}

// ========== pseudo-classes ==========

#[test]
fn test_structural_pseudo_classes() {
    let doc = parse(
        "<ul><li id=a>1</li><li id=b>2</li><li id=c>3</li></ul>",
        "",
    );
    assert_eq!(doc.attr(one(&doc, "li:first-child"), "id"), Some("a"));
    assert_eq!(doc.attr(one(&doc, "li:last-child"), "id"), Some("c"));
    assert_eq!(
        query(&doc, "li:nth-child(odd)").unwrap().len(),
        2 // a and c
    );
    assert_eq!(doc.attr(one(&doc, "li:nth-child(2)"), "id"), Some("b"));
}

#[test]
fn test_nth_child_counts_elements_not_text() {
    // Text nodes between the items must not shift the indices.
    let doc = parse("<ul> <li id=a>1</li> <li id=b>2</li> </ul>", "");
    assert_eq!(doc.attr(one(&doc, "li:nth-child(1)"), "id"), Some("a"));
    assert_eq!(doc.attr(one(&doc, "li:nth-child(2)"), "id"), Some("b"));
}

#[test]
fn test_only_child_and_empty() {
    let doc = parse(
        "<div id=solo><p id=only>x</p></div><div id=pair><p>a</p><p>b</p></div>\
         <span id=blank></span>",
        "",
    );
    assert_eq!(doc.attr(one(&doc, "p:only-child"), "id"), Some("only"));
    assert_eq!(doc.attr(one(&doc, "span:empty"), "id"), Some("blank"));
}

#[test]
fn test_first_and_last_of_type() {
    let doc = parse("<div><span>s</span><p id=p1>a</p><p id=p2>b</p></div>", "");
    assert_eq!(doc.attr(one(&doc, "p:first-of-type"), "id"), Some("p1"));
    assert_eq!(doc.attr(one(&doc, "p:last-of-type"), "id"), Some("p2"));
}

#[test]
fn test_root_matches_html() {
    let doc = parse("<p>x</p>", "");
    assert_eq!(tags_for(&doc, ":root"), vec!["html"]);
}

#[test]
fn test_contains_substring_of_text() {
    let doc = parse(
        "<a href=\"http://news.example.com\">新闻</a><a href=\"http://other\">other</a>",
        "",
    );
    let el = one(&doc, "a:contains(新)");
    assert_eq!(doc.attr(el, "href"), Some("http://news.example.com"));
}

#[test]
fn test_contains_is_case_insensitive() {
    let doc = parse("<p>The Nissan Leaf.</p><p>unrelated</p>", "");
    assert_eq!(query(&doc, "p:contains(nissan leaf)").unwrap().len(), 1);
}

#[test]
fn test_not_excludes_matches() {
    let doc = parse("<p class=skip>a</p><p>b</p><p>c</p>", "");
    assert_eq!(query(&doc, "p:not(.skip)").unwrap().len(), 2);
}

// ========== combinators ==========

#[test]
fn test_descendant_combinator() {
    let doc = parse(
        "<div class=articleBody><p>in</p><span><p>deep</p></span></div><p>out</p>",
        "",
    );
    assert_eq!(query(&doc, ".articleBody p").unwrap().len(), 2);
}

#[test]
fn test_child_combinator() {
    let doc = parse(
        "<div class=articleBody><p>direct</p><span><p>nested</p></span></div>",
        "",
    );
    // "> *" style: only the direct children.
    assert_eq!(query(&doc, ".articleBody > p").unwrap().len(), 1);
    assert_eq!(query(&doc, ".articleBody > *").unwrap().len(), 2);
}

#[test]
fn test_adjacent_sibling_combinator() {
    let doc = parse("<h1>t</h1><p id=first>a</p><p id=second>b</p>", "");
    assert_eq!(doc.attr(one(&doc, "h1 + p"), "id"), Some("first"));
}

#[test]
fn test_general_sibling_combinator() {
    let doc = parse("<h1>t</h1><p>a</p><div>x</div><p>b</p>", "");
    assert_eq!(query(&doc, "h1 ~ p").unwrap().len(), 2);
}

#[test]
fn test_chained_combinators() {
    let doc = parse(
        "<div id=wrap><ul class=nav><li><a id=yes>x</a></li></ul></div>\
         <a id=no>y</a>",
        "",
    );
    let el = one(&doc, "div ul.nav li a");
    assert_eq!(doc.attr(el, "id"), Some("yes"));
}

#[test]
fn test_selector_reuse_across_documents() {
    // A compiled selector is immutable and reusable.
    let selector = Selector::parse("p.story").unwrap();
    let doc1 = parse("<p class=story>a</p>", "");
    let doc2 = parse("<div><p class=story>b</p><p>c</p></div>", "");
    assert_eq!(loam_select::select(&doc1, &selector).len(), 1);
    assert_eq!(loam_select::select(&doc2, &selector).len(), 1);
}

// ========== lists, order, deduplication ==========

#[test]
fn test_results_in_document_order() {
    let doc = parse("<h1>one</h1><p>two</p><h2>three</h2><p>four</p>", "");
    assert_eq!(tags_for(&doc, "p, h2, h1"), vec!["h1", "p", "h2", "p"]);
}

#[test]
fn test_union_deduplicates() {
    let doc = parse("<p class=story id=only>x</p>", "");
    // Both alternatives match the same element; it is reported once.
    let matches = query(&doc, "p, .story").unwrap();
    assert_eq!(matches.len(), 1);
}

// ========== subtree scoping ==========

#[test]
fn test_select_from_scopes_to_subtree() {
    let doc = parse(
        "<div id=inner><p>in</p></div><p>out</p>",
        "",
    );
    let inner = one(&doc, "#inner");
    let matches = query_from(&doc, inner, "p").unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(doc.text(matches[0]), "in");
}

#[test]
fn test_select_from_includes_scope_root() {
    let doc = parse("<div id=inner class=x></div>", "");
    let inner = one(&doc, "#inner");
    let selector = Selector::parse("div.x").unwrap();
    assert_eq!(select_from(&doc, inner, &selector), vec![inner]);
}

#[test]
fn test_select_from_combinators_do_not_escape_subtree() {
    let doc = parse("<div id=outer><div id=inner><p>x</p></div></div>", "");
    let inner = one(&doc, "#inner");
    // #outer is above the query root, so the descendant clause cannot use it.
    assert!(query_from(&doc, inner, "#outer p").unwrap().is_empty());
    // But the clause can match the query root itself.
    assert_eq!(query_from(&doc, inner, "#inner p").unwrap().len(), 1);
}

#[test]
fn test_every_result_is_within_subtree() {
    let doc = parse(
        "<section id=s><p>a</p><div><p>b</p></div></section><p>c</p>",
        "",
    );
    let section = one(&doc, "#s");
    for id in query_from(&doc, section, "p, div, section").unwrap() {
        assert!(
            id == section || doc.is_descendant_of(id, section),
            "match escaped the subtree"
        );
    }
}
