//! Integration tests for the HTML tree builder.

use loam_dom::{Document, NodeId, NodeType};
use loam_html::parse;

/// Helper to get the first element with the given tag name (depth-first).
fn find_element(doc: &Document, from: NodeId, tag: &str) -> Option<NodeId> {
    if doc.tag_name(from) == Some(tag) {
        return Some(from);
    }
    for &child in doc.children(from) {
        if let Some(found) = find_element(doc, child, tag) {
            return Some(found);
        }
    }
    None
}

/// Helper to collect the element children of a node as tag names.
fn child_tags(doc: &Document, id: NodeId) -> Vec<String> {
    doc.children(id)
        .iter()
        .filter_map(|&child| doc.tag_name(child).map(str::to_string))
        .collect()
}

// ========== document structure ==========

#[test]
fn test_document_structure() {
    let doc = parse(
        "<!DOCTYPE html><html><head><title>T</title></head><body><p>x</p></body></html>",
        "",
    );

    assert!(matches!(
        doc.get(NodeId::ROOT).map(|n| &n.node_type),
        Some(NodeType::Document)
    ));
    let html = doc.document_element().expect("html element");
    assert_eq!(doc.tag_name(html), Some("html"));
    assert_eq!(child_tags(&doc, html), vec!["head", "body"]);
    assert_eq!(doc.title(), "T");
    assert!(!doc.quirks_mode());
}

#[test]
fn test_implied_html_head_body() {
    let doc = parse("Hello", "");

    let html = doc.document_element().expect("implied html");
    assert_eq!(child_tags(&doc, html), vec!["head", "body"]);
    let body = doc.body().expect("implied body");
    assert_eq!(doc.text(body), "Hello");
}

#[test]
fn test_missing_doctype_is_quirks() {
    let doc = parse("<html><body></body></html>", "");
    assert!(doc.quirks_mode());
}

#[test]
fn test_head_content_goes_to_head() {
    let doc = parse("<meta charset=utf-8><title>T</title><p>body starts</p>", "");
    let head = doc.head().expect("head");
    assert_eq!(child_tags(&doc, head), vec!["meta", "title"]);
    let body = doc.body().expect("body");
    assert_eq!(child_tags(&doc, body), vec!["p"]);
}

// ========== implicit closing ==========

#[test]
fn test_consecutive_li_are_siblings() {
    let doc = parse("<ul><li>One<li>Two</ul>", "");
    let ul = find_element(&doc, NodeId::ROOT, "ul").expect("ul");
    assert_eq!(child_tags(&doc, ul), vec!["li", "li"]);

    let items = doc.children(ul);
    assert_eq!(doc.text(items[0]), "One");
    assert_eq!(doc.text(items[1]), "Two");
}

#[test]
fn test_dt_dd_close_each_other() {
    let doc = parse("<dl><dt>Term<dd>Definition</dl>", "");
    let dl = find_element(&doc, NodeId::ROOT, "dl").expect("dl");
    assert_eq!(child_tags(&doc, dl), vec!["dt", "dd"]);
}

#[test]
fn test_p_closes_p() {
    let doc = parse("<p>One<p>Two", "");
    let body = doc.body().expect("body");
    assert_eq!(child_tags(&doc, body), vec!["p", "p"]);
}

#[test]
fn test_block_closes_open_p() {
    let doc = parse("<p>intro<div>block</div>", "");
    let body = doc.body().expect("body");
    assert_eq!(child_tags(&doc, body), vec!["p", "div"]);
}

#[test]
fn test_heading_closes_heading() {
    let doc = parse("<h1>A<h2>B", "");
    let body = doc.body().expect("body");
    assert_eq!(child_tags(&doc, body), vec!["h1", "h2"]);
}

// ========== adoption agency ==========

#[test]
fn test_adoption_agency_misnested_formatting() {
    let doc = parse("<b>1<i>2</b>3</i>", "");
    let body = doc.body().expect("body");

    // Document order of the text is preserved.
    assert_eq!(doc.text(body), "123");

    // <b> keeps its text and the first <i>; the run after </b> continues in
    // a second, well-formed <i>.
    assert_eq!(child_tags(&doc, body), vec!["b", "i"]);
    let b = doc.children(body)[0];
    let i_after = doc.children(body)[1];
    assert_eq!(doc.text(b), "12");
    assert_eq!(doc.text(i_after), "3");

    let i_inside = find_element(&doc, b, "i").expect("i cloned into b");
    assert_eq!(doc.text(i_inside), "2");
}

#[test]
fn test_adoption_agency_with_block() {
    // The classic <a> split: the block gets a fresh copy of the formatting
    // element.
    let doc = parse("<a>1<div>2</div></a>", "");
    let body = doc.body().expect("body");
    let div = find_element(&doc, NodeId::ROOT, "div").expect("div");
    // The div is a block boundary, so normalized text reads "1 2".
    assert_eq!(doc.text(body), "1 2");
    assert_eq!(doc.text(div), "2");
}

#[test]
fn test_reconstruct_formatting_across_paragraphs() {
    let doc = parse("<p><b>one<p>two", "");
    let body = doc.body().expect("body");
    let paragraphs: Vec<NodeId> = doc
        .children(body)
        .iter()
        .copied()
        .filter(|&id| doc.tag_name(id) == Some("p"))
        .collect();
    assert_eq!(paragraphs.len(), 2);
    // The <b> is reconstructed inside the second paragraph.
    assert!(find_element(&doc, paragraphs[0], "b").is_some());
    assert!(find_element(&doc, paragraphs[1], "b").is_some());
    assert_eq!(doc.text(paragraphs[1]), "two");
}

// ========== tables and foster parenting ==========

#[test]
fn test_table_gets_implied_tbody() {
    let doc = parse("<table><tr><td>One</td><td>Two</td></tr></table>", "");
    let table = find_element(&doc, NodeId::ROOT, "table").expect("table");
    assert_eq!(child_tags(&doc, table), vec!["tbody"]);
    let tbody = doc.children(table)[0];
    assert_eq!(child_tags(&doc, tbody), vec!["tr"]);
    let tr = doc.children(tbody)[0];
    assert_eq!(child_tags(&doc, tr), vec!["td", "td"]);
}

#[test]
fn test_foster_parenting_moves_stray_text_before_table() {
    let doc = parse("<table>oops<tr><td>A</td></tr></table>", "");
    let body = doc.body().expect("body");

    // The stray text lands before the table in its parent.
    let children = doc.children(body);
    assert_eq!(doc.as_text(children[0]), Some("oops"));
    assert_eq!(doc.tag_name(children[1]), Some("table"));

    // The table itself is intact.
    let td = find_element(&doc, NodeId::ROOT, "td").expect("td");
    assert_eq!(doc.text(td), "A");
}

#[test]
fn test_whitespace_between_rows_stays_in_table() {
    let doc = parse("<table> <tr><td>A</td></tr> </table>", "");
    let body = doc.body().expect("body");
    // Whitespace-only runs are not fostered out.
    assert_eq!(doc.tag_name(doc.children(body)[0]), Some("table"));
}

#[test]
fn test_caption_and_colgroup() {
    let doc = parse(
        "<table><caption>Cap</caption><colgroup><col><col></colgroup><tr><td>x</td></tr></table>",
        "",
    );
    let table = find_element(&doc, NodeId::ROOT, "table").expect("table");
    assert_eq!(child_tags(&doc, table), vec!["caption", "colgroup", "tbody"]);
    let caption = doc.children(table)[0];
    assert_eq!(doc.text(caption), "Cap");
    let colgroup = doc.children(table)[1];
    assert_eq!(child_tags(&doc, colgroup), vec!["col", "col"]);
}

#[test]
fn test_implied_cell_and_row_closing() {
    let doc = parse("<table><tr><td>One<td>Two<tr><td>Three</table>", "");
    let table = find_element(&doc, NodeId::ROOT, "table").expect("table");
    let tbody = doc.children(table)[0];
    assert_eq!(child_tags(&doc, tbody), vec!["tr", "tr"]);
    let first_row = doc.children(tbody)[0];
    assert_eq!(child_tags(&doc, first_row), vec!["td", "td"]);
}

// ========== select ==========

#[test]
fn test_select_with_unclosed_options() {
    let doc = parse("<select><option>A<option>B</select>", "");
    let select = find_element(&doc, NodeId::ROOT, "select").expect("select");
    assert_eq!(child_tags(&doc, select), vec!["option", "option"]);
    let options = doc.children(select);
    assert_eq!(doc.text(options[0]), "A");
    assert_eq!(doc.text(options[1]), "B");
}

#[test]
fn test_table_tag_breaks_out_of_select() {
    let doc = parse("<table><tr><td><select><option>x<td>next</table>", "");
    // The second <td> forces the select closed instead of nesting inside it.
    let select = find_element(&doc, NodeId::ROOT, "select").expect("select");
    assert!(find_element(&doc, select, "td").is_none());
}

// ========== frameset ==========

#[test]
fn test_frameset_document() {
    let doc = parse(
        "<html><frameset><frame src=a.html><frame src=b.html></frameset></html>",
        "",
    );
    let html = doc.document_element().expect("html");
    assert_eq!(child_tags(&doc, html), vec!["head", "frameset"]);
    let frameset = find_element(&doc, NodeId::ROOT, "frameset").expect("frameset");
    assert_eq!(child_tags(&doc, frameset), vec!["frame", "frame"]);
}

// ========== raw text elements ==========

#[test]
fn test_script_content_is_data_node() {
    let doc = parse("<script>var a = 1 < 2;</script><p>text</p>", "");
    let script = find_element(&doc, NodeId::ROOT, "script").expect("script");
    let payload = doc.children(script)[0];
    assert!(matches!(
        doc.get(payload).map(|n| &n.node_type),
        Some(NodeType::Data(data)) if data == "var a = 1 < 2;"
    ));
    // Script payloads are invisible to text().
    assert_eq!(doc.text(NodeId::ROOT), "text");
    // But serialize verbatim.
    assert_eq!(doc.outer_html(script), "<script>var a = 1 < 2;</script>");
}

#[test]
fn test_textarea_leading_newline_skipped() {
    let doc = parse("<textarea>\nline</textarea>", "");
    let textarea = find_element(&doc, NodeId::ROOT, "textarea").expect("textarea");
    assert_eq!(doc.text(textarea), "line");
}

#[test]
fn test_pre_leading_newline_skipped() {
    let doc = parse("<pre>\ncode</pre>", "");
    let pre = find_element(&doc, NodeId::ROOT, "pre").expect("pre");
    assert_eq!(doc.text(pre), "code");
}

// ========== tolerant parsing ==========

#[test]
fn test_unknown_elements_are_kept() {
    let doc = parse("<nyt_headline version=1.0>As BP Lays Out Future</nyt_headline>", "");
    let headline = find_element(&doc, NodeId::ROOT, "nyt_headline").expect("custom tag");
    assert_eq!(doc.attr(headline, "version"), Some("1.0"));
    assert_eq!(doc.text(headline), "As BP Lays Out Future");
}

#[test]
fn test_binary_garbage_does_not_panic() {
    let garbage = "\u{1}\u{2}ÿØÿà\u{10}JFIF gd-jpeg v1.0 \u{3}<\u{4}>\u{0}gar<bage";
    let doc = parse(garbage, "");
    assert!(doc.text(NodeId::ROOT).contains("gd-jpeg"));
}

#[test]
fn test_second_html_tag_merges_attributes() {
    let doc = parse("<html lang=en><body>x</body></html><html dir=ltr>", "");
    let html = doc.document_element().expect("html");
    assert_eq!(doc.attr(html, "lang"), Some("en"));
    assert_eq!(doc.attr(html, "dir"), Some("ltr"));
}

#[test]
fn test_comment_after_html_attaches_to_document() {
    let doc = parse("<html><body>x</body></html><!--trailer-->", "");
    let last = *doc.children(NodeId::ROOT).last().expect("children");
    assert!(matches!(
        doc.get(last).map(|n| &n.node_type),
        Some(NodeType::Comment(data)) if data == "trailer"
    ));
}

#[test]
fn test_parse_issues_are_collected() {
    let (_, issues) = loam_html::parse_with_issues("<p><b>1</i></p>", "");
    assert!(!issues.is_empty());
}

// ========== base and URLs ==========

#[test]
fn test_base_href_rebases_document() {
    let doc = parse(
        "<head><base href=\"http://www.example.org/dir/\"></head>\
         <body><a href=\"x\">link</a></body>",
        "http://example.com/",
    );
    let a = find_element(&doc, NodeId::ROOT, "a").expect("a");
    assert_eq!(doc.abs_url(a, "href"), "http://www.example.org/dir/x");
}

#[test]
fn test_first_base_wins() {
    let doc = parse(
        "<base href=\"http://one.example/\"><base href=\"http://two.example/\">\
         <a href=\"x\">l</a>",
        "",
    );
    let a = find_element(&doc, NodeId::ROOT, "a").expect("a");
    assert_eq!(doc.abs_url(a, "href"), "http://one.example/x");
}

// ========== round-trip ==========

/// Serialization is a fixpoint: parsing serialized output and serializing
/// again reproduces the same markup.
#[test]
fn test_round_trip_is_idempotent() {
    let inputs = [
        "<!DOCTYPE html><html><head><title>T</title></head>\
         <body><p class=\"a b\">One</p><p>Two &amp; three</p></body></html>",
        "<ul><li>One<li>Two</ul>",
        "<b>1<i>2</b>3</i>",
        "<table>oops<tr><td>A</td></tr></table>",
        "<div><img src=\"a.png\"><br>text</div>",
        "<p>caf\u{e9} \u{767e}\u{5ea6}</p>",
    ];
    for input in inputs {
        let first = parse(input, "");
        let once = first.outer_html(first.root());
        let second = parse(&once, "");
        let twice = second.outer_html(second.root());
        assert_eq!(once, twice, "round-trip diverged for {input:?}");
    }
}
