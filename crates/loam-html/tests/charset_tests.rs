//! Integration tests for charset resolution: BOM sniffing, declared
//! charsets, the meta prescan, and the fallback chain.

use encoding_rs::{GBK, UTF_8, UTF_16LE};
use loam_html::charset::resolve;
use loam_html::parse_bytes;

/// Helper to encode a string as GBK bytes appended to an ASCII prefix.
fn gbk_document(prefix: &str, cjk: &str, suffix: &str) -> Vec<u8> {
    let mut bytes = prefix.as_bytes().to_vec();
    let (encoded, _, had_errors) = GBK.encode(cjk);
    assert!(!had_errors, "test fixture must be GBK-encodable");
    bytes.extend_from_slice(&encoded);
    bytes.extend_from_slice(suffix.as_bytes());
    bytes
}

// ========== BOM sniffing ==========

#[test]
fn test_utf8_bom_wins() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice("新".as_bytes());
    let (text, encoding) = resolve(&bytes, None);
    assert_eq!(encoding, UTF_8);
    assert_eq!(text, "新");
}

#[test]
fn test_bom_beats_conflicting_meta() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(b"<meta charset=\"gb2312\"><p>x</p>");
    let (_, encoding) = resolve(&bytes, None);
    assert_eq!(encoding, UTF_8);
}

#[test]
fn test_utf16le_bom() {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "hi".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    let (text, encoding) = resolve(&bytes, None);
    assert_eq!(encoding, UTF_16LE);
    assert_eq!(text, "hi");
}

// ========== declared charset ==========

#[test]
fn test_declared_charset_is_used() {
    let bytes = gbk_document("<p>", "百度", "</p>");
    let (text, encoding) = resolve(&bytes, Some("gb2312"));
    assert_eq!(encoding, GBK);
    assert!(text.contains("百度"));
}

#[test]
fn test_unknown_declared_charset_falls_through() {
    let (text, encoding) = resolve("新".as_bytes(), Some("martian-9"));
    assert_eq!(encoding, UTF_8);
    assert_eq!(text, "新");
}

// ========== meta prescan ==========

#[test]
fn test_html5_meta_charset() {
    let bytes = gbk_document("<html><head><meta charset=\"gbk\"><title>", "百度一下", "</title>");
    let (text, encoding) = resolve(&bytes, None);
    assert_eq!(encoding, GBK);
    assert!(text.contains("百度一下"));
}

#[test]
fn test_html4_http_equiv_charset() {
    let bytes = gbk_document(
        "<head><meta http-equiv=\"Content-Type\" content=\"text/html;charset=gb2312\">\
         <title>",
        "百度一下",
        "</title></head>",
    );
    let (text, encoding) = resolve(&bytes, None);
    assert_eq!(encoding, GBK);
    assert!(text.contains("百度一下"));
}

#[test]
fn test_meta_after_another_meta() {
    let bytes = gbk_document(
        "<head><meta name=\"viewport\" content=\"width=device-width\">\
         <meta charset=\"gbk\"><title>",
        "百度一下",
        "</title>",
    );
    let (_, encoding) = resolve(&bytes, None);
    assert_eq!(encoding, GBK);
}

#[test]
fn test_meta_outside_prescan_window_is_ignored() {
    let mut prefix = String::from("<html><head>");
    // Push the meta declaration past the 1024-byte window.
    prefix.push_str(&"<!-- padding -->".repeat(80));
    prefix.push_str("<meta charset=\"gbk\">");
    let (_, encoding) = resolve(prefix.as_bytes(), None);
    assert_eq!(encoding, UTF_8);
}

// ========== fallback ==========

#[test]
fn test_fallback_is_utf8() {
    let (text, encoding) = resolve(b"<p>plain</p>", None);
    assert_eq!(encoding, UTF_8);
    assert_eq!(text, "<p>plain</p>");
}

#[test]
fn test_invalid_utf8_never_fails() {
    // Lone continuation bytes decode lossily rather than erroring.
    let (text, encoding) = resolve(&[b'<', b'p', b'>', 0x80, 0xFF], None);
    assert_eq!(encoding, UTF_8);
    assert!(text.starts_with("<p>"));
}

// ========== end-to-end ==========

#[test]
fn test_parse_bytes_records_resolved_charset() {
    // The classic scenario: GB2312 bytes, no transport charset, an
    // http-equiv declaration, and CJK text in both an element and an
    // attribute value.
    let mut bytes = Vec::new();
    bytes.extend_from_slice(
        b"<html><head>\
          <meta http-equiv=\"Content-Type\" content=\"text/html;charset=gb2312\">\
          <title>",
    );
    let (title, _, _) = GBK.encode("\u{767e}\u{5ea6}\u{4e00}\u{4e0b}");
    bytes.extend_from_slice(&title);
    bytes.extend_from_slice(b"</title></head><body><input id=\"su\" value=\"");
    let (value, _, _) = GBK.encode("\u{767e}\u{5ea6}\u{4e00}\u{4e0b}");
    bytes.extend_from_slice(&value);
    bytes.extend_from_slice(b"\"></body></html>");

    let mut doc = parse_bytes(&bytes, None, "http://www.baidu.com/");
    assert_eq!(doc.output_settings().charset(), GBK);
    assert_eq!(doc.title(), "\u{767e}\u{5ea6}\u{4e00}\u{4e0b}");

    // Re-targeting the output charset changes serialization only.
    let title_id = doc
        .descendants(doc.root())
        .find(|&id| doc.tag_name(id) == Some("title"))
        .expect("title element");
    assert!(doc.output_settings_mut().set_charset_name("ascii"));
    assert_eq!(
        doc.outer_html(title_id),
        "<title>&#30334;&#24230;&#19968;&#19979;</title>"
    );
}

#[test]
fn test_parse_reader_surfaces_io_error() {
    struct FailingReader;
    impl std::io::Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("boom"))
        }
    }

    let result = loam_html::parse_reader(FailingReader, None, "");
    assert!(result.is_err());
}

#[test]
fn test_parse_reader_ok() {
    let html = b"<p>hello</p>".to_vec();
    let doc = loam_html::parse_reader(&html[..], None, "").expect("readable");
    assert_eq!(doc.text(doc.root()), "hello");
}
