//! Integration tests for the HTML tokenizer.

use loam_html::{TagAttribute, Token, Tokenizer};

/// Helper to run the tokenizer and return the token stream.
fn tokenize(html: &str) -> Vec<Token> {
    Tokenizer::new(html).run().0
}

/// Helper to collect the character tokens between two indices as a string.
fn char_run(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter_map(|t| match t {
            Token::Character { data } => Some(*data),
            _ => None,
        })
        .collect()
}

// ========== tags and attributes ==========

#[test]
fn test_simple_element() {
    let tokens = tokenize("<p>Hi</p>");
    assert_eq!(
        tokens,
        vec![
            Token::StartTag {
                name: "p".to_string(),
                self_closing: false,
                attributes: vec![],
            },
            Token::Character { data: 'H' },
            Token::Character { data: 'i' },
            Token::EndTag {
                name: "p".to_string()
            },
            Token::EndOfFile,
        ]
    );
}

#[test]
fn test_tag_names_lowercased() {
    let tokens = tokenize("<DIV></DIV>");
    assert!(tokens[0].is_start_tag("div"));
    assert!(tokens[1].is_end_tag("div"));
}

#[test]
fn test_attributes_quoted_unquoted_and_bare() {
    let tokens = tokenize("<a href=\"/x\" TITLE='t' checked data-x=5>");
    let Token::StartTag { attributes, .. } = &tokens[0] else {
        panic!("expected start tag, got {:?}", tokens[0]);
    };
    assert_eq!(
        attributes,
        &vec![
            TagAttribute {
                name: "href".to_string(),
                value: "/x".to_string()
            },
            TagAttribute {
                name: "title".to_string(),
                value: "t".to_string()
            },
            TagAttribute {
                name: "checked".to_string(),
                value: String::new()
            },
            TagAttribute {
                name: "data-x".to_string(),
                value: "5".to_string()
            },
        ]
    );
}

#[test]
fn test_duplicate_attribute_dropped() {
    let (tokens, errors) = Tokenizer::new("<a id=a ID=b>").run();
    let Token::StartTag { attributes, .. } = &tokens[0] else {
        panic!("expected start tag");
    };
    assert_eq!(attributes.len(), 1);
    assert_eq!(attributes[0].value, "a");
    assert!(errors.iter().any(|e| e.message == "duplicate-attribute"));
}

#[test]
fn test_self_closing_flag() {
    let tokens = tokenize("<br/>");
    assert!(matches!(
        &tokens[0],
        Token::StartTag { name, self_closing: true, .. } if name == "br"
    ));
}

#[test]
fn test_end_tag_attributes_are_dropped() {
    let (tokens, errors) = Tokenizer::new("</p class=x>").run();
    assert_eq!(
        tokens[0],
        Token::EndTag {
            name: "p".to_string()
        }
    );
    assert!(
        errors
            .iter()
            .any(|e| e.message == "end-tag-with-attributes")
    );
}

#[test]
fn test_non_ascii_attribute_value() {
    let tokens = tokenize("<input value=百度一下 id=su>");
    let Token::StartTag { attributes, .. } = &tokens[0] else {
        panic!("expected start tag");
    };
    assert_eq!(attributes[0].value, "百度一下");
    assert_eq!(attributes[1].value, "su");
}

// ========== recovery ==========

#[test]
fn test_stray_less_than_is_text() {
    let tokens = tokenize("1 < 2");
    assert_eq!(char_run(&tokens), "1 < 2");
}

#[test]
fn test_empty_end_tag_is_skipped() {
    let tokens = tokenize("a</>b");
    assert_eq!(char_run(&tokens), "ab");
}

#[test]
fn test_processing_instruction_becomes_comment() {
    let tokens = tokenize("<?xml version=\"1.0\"?>");
    assert!(matches!(
        &tokens[0],
        Token::Comment { data } if data == "?xml version=\"1.0\"?"
    ));
}

#[test]
fn test_eof_inside_tag_drops_tag() {
    let (tokens, errors) = Tokenizer::new("<a href=").run();
    assert_eq!(tokens, vec![Token::EndOfFile]);
    assert!(errors.iter().any(|e| e.message == "eof-in-tag"));
}

#[test]
fn test_crlf_normalized() {
    let tokens = tokenize("a\r\nb\rc");
    assert_eq!(char_run(&tokens), "a\nb\nc");
}

// ========== comments ==========

#[test]
fn test_comment() {
    let tokens = tokenize("<!--hello-->");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: "hello".to_string()
        }
    );
}

#[test]
fn test_comment_with_inner_dashes() {
    let tokens = tokenize("<!-- a -- b -->");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: " a -- b ".to_string()
        }
    );
}

#[test]
fn test_abrupt_empty_comment() {
    let (tokens, errors) = Tokenizer::new("<!-->").run();
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: String::new()
        }
    );
    assert!(
        errors
            .iter()
            .any(|e| e.message == "abrupt-closing-of-empty-comment")
    );
}

#[test]
fn test_unterminated_comment_emitted_at_eof() {
    let tokens = tokenize("<!--dangling");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: "dangling".to_string()
        }
    );
}

// ========== doctype ==========

#[test]
fn test_simple_doctype() {
    let tokens = tokenize("<!DOCTYPE html>");
    assert_eq!(
        tokens[0],
        Token::Doctype {
            name: Some("html".to_string()),
            public_identifier: None,
            system_identifier: None,
            force_quirks: false,
        }
    );
}

#[test]
fn test_doctype_with_public_and_system() {
    let tokens = tokenize(
        "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01//EN\" \
         \"http://www.w3.org/TR/html4/strict.dtd\">",
    );
    assert_eq!(
        tokens[0],
        Token::Doctype {
            name: Some("html".to_string()),
            public_identifier: Some("-//W3C//DTD HTML 4.01//EN".to_string()),
            system_identifier: Some("http://www.w3.org/TR/html4/strict.dtd".to_string()),
            force_quirks: false,
        }
    );
}

#[test]
fn test_bogus_doctype_forces_quirks() {
    let tokens = tokenize("<!DOCTYPE html BOGUS>");
    assert!(matches!(
        &tokens[0],
        Token::Doctype { force_quirks: true, .. }
    ));
}

// ========== character references ==========

#[test]
fn test_named_reference() {
    assert_eq!(char_run(&tokenize("a&amp;b")), "a&b");
    assert_eq!(char_run(&tokenize("&lt;tag&gt;")), "<tag>");
}

#[test]
fn test_numeric_references() {
    assert_eq!(char_run(&tokenize("&#65;&#x42;&#X43;")), "ABC");
    assert_eq!(char_run(&tokenize("&#30334;")), "百");
}

#[test]
fn test_legacy_reference_without_semicolon() {
    let (tokens, errors) = Tokenizer::new("&copy 2024").run();
    assert_eq!(char_run(&tokens), "\u{00A9} 2024");
    assert!(
        errors
            .iter()
            .any(|e| e.message == "missing-semicolon-after-character-reference")
    );
}

#[test]
fn test_unknown_reference_is_literal() {
    assert_eq!(char_run(&tokenize("&bogus;")), "&bogus;");
}

#[test]
fn test_bare_ampersand_is_literal() {
    assert_eq!(char_run(&tokenize("fish & chips")), "fish & chips");
}

#[test]
fn test_legacy_reference_in_query_string_stays_literal() {
    // Historical quirk: "&amp" followed by '=' inside an attribute is NOT a
    // character reference, so query strings survive.
    let tokens = tokenize("<a href=\"?a=b&amp=c\">");
    let Token::StartTag { attributes, .. } = &tokens[0] else {
        panic!("expected start tag");
    };
    assert_eq!(attributes[0].value, "?a=b&amp=c");
}

#[test]
fn test_reference_in_attribute_value() {
    let tokens = tokenize("<a title=\"Tom &amp; Jerry\">");
    let Token::StartTag { attributes, .. } = &tokens[0] else {
        panic!("expected start tag");
    };
    assert_eq!(attributes[0].value, "Tom & Jerry");
}

#[test]
fn test_null_and_out_of_range_references() {
    assert_eq!(char_run(&tokenize("&#0;")), "\u{FFFD}");
    assert_eq!(char_run(&tokenize("&#xD800;")), "\u{FFFD}");
    assert_eq!(char_run(&tokenize("&#x110000;")), "\u{FFFD}");
    // C1 controls remap through windows-1252.
    assert_eq!(char_run(&tokenize("&#128;")), "\u{20AC}");
}

// ========== content models ==========

#[test]
fn test_rcdata_title() {
    let tokens = tokenize("<title>a<b>&amp;</title>");
    // Inside RCDATA "<b>" is text and character references still resolve.
    assert_eq!(char_run(&tokens), "a<b>&");
    assert!(tokens.iter().any(|t| t.is_end_tag("title")));
    assert!(!tokens.iter().any(|t| t.is_start_tag("b")));
}

#[test]
fn test_rawtext_style() {
    let tokens = tokenize("<style>a:before { content: '</div>' }</style>");
    assert!(char_run(&tokens).contains("</div>"));
    assert!(!tokens.iter().any(|t| t.is_end_tag("div")));
    assert!(tokens.iter().any(|t| t.is_end_tag("style")));
}

#[test]
fn test_script_data_with_comment_like_region() {
    let tokens = tokenize("<script><!-- if (a < b) --></script>");
    assert_eq!(char_run(&tokens), "<!-- if (a < b) -->");
    assert!(tokens.iter().any(|t| t.is_end_tag("script")));
}

#[test]
fn test_script_end_tag_case_insensitive() {
    let tokens = tokenize("<script>x</SCRIPT>");
    assert_eq!(char_run(&tokens), "x");
    assert!(tokens.iter().any(|t| t.is_end_tag("script")));
}

#[test]
fn test_plaintext_consumes_everything() {
    let tokens = tokenize("<plaintext>a<b></plaintext>");
    assert_eq!(char_run(&tokens), "a<b></plaintext>");
}

#[test]
fn test_cdata_section_reads_as_text() {
    let (tokens, errors) = Tokenizer::new("<![CDATA[x]]>").run();
    assert_eq!(char_run(&tokens), "x");
    assert!(errors.iter().any(|e| e.message == "cdata-in-html-content"));
}

#[test]
fn test_textarea_keeps_markup_as_text() {
    let tokens = tokenize("<textarea><p>not a tag</p></textarea>");
    assert_eq!(char_run(&tokens), "<p>not a tag</p>");
    assert!(tokens.iter().any(|t| t.is_end_tag("textarea")));
}
