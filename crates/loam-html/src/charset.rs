//! Character encoding resolution for raw document bytes.
//!
//! [§ 13.2.3.2 Determining the character encoding](https://html.spec.whatwg.org/multipage/parsing.html#determining-the-character-encoding)
//!
//! Real-world documents arrive with mislabeled, self-declared, or absent
//! encodings. Resolution runs the spec's priority chain, first match wins:
//!
//! 1. a byte order mark (UTF-8 / UTF-16LE / UTF-16BE);
//! 2. a transport-layer charset supplied by the caller;
//! 3. a `<meta charset>` / `<meta http-equiv>` declaration sniffed from a
//!    bounded prefix of the bytes;
//! 4. UTF-8.
//!
//! Resolution never fails: unknown labels simply fall through to the next
//! step. The whole byte buffer is re-decoded with the winning encoding, so
//! a prefix scanned under the ASCII-compatible fallback is never trusted
//! for the document body.

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use memchr::memchr;

/// "To give authors a chance to include the character encoding declaration
/// within the first 1024 bytes of their documents" - the prefix window the
/// meta sniffer examines.
const SNIFF_WINDOW: usize = 1024;

/// Decode `bytes` into text, resolving the encoding per the priority chain.
///
/// `declared` is the transport-layer charset (e.g. from a Content-Type
/// header); `None` means "sniff only". Returns the decoded text and the
/// encoding that won, which callers record in the document's
/// [`OutputSettings`](loam_dom::OutputSettings).
#[must_use]
pub fn resolve(bytes: &[u8], declared: Option<&str>) -> (String, &'static Encoding) {
    // STEP 1: "If the result of BOM sniffing is an encoding, return that
    //          encoding" - a byte order mark outranks everything, including
    //          a conflicting meta tag.
    if let Some((encoding, _bom_length)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_with_bom_removal(bytes);
        return (text.into_owned(), encoding);
    }

    // STEP 2: The transport layer's declaration, when it names a real
    //         encoding. Unknown labels fall through rather than fail.
    if let Some(label) = declared
        && let Some(encoding) = Encoding::for_label(label.trim().as_bytes())
    {
        let (text, _) = encoding.decode_with_bom_removal(bytes);
        return (text.into_owned(), encoding);
    }

    // STEP 3: "Optionally prescan the byte stream to determine its
    //          encoding" - scan a bounded prefix for a meta declaration,
    //          then re-decode the entire stream with the discovered
    //          encoding.
    let window = &bytes[..bytes.len().min(SNIFF_WINDOW)];
    if let Some(encoding) = sniff_meta_charset(window) {
        let (text, _) = encoding.decode_with_bom_removal(bytes);
        return (text.into_owned(), encoding);
    }

    // STEP 4: "Otherwise, return an implementation-defined or
    //          user-specified default character encoding" - UTF-8.
    let (text, _) = UTF_8.decode_with_bom_removal(bytes);
    (text.into_owned(), UTF_8)
}

/// [§ 13.2.3.2 Prescan a byte stream to determine its encoding](https://html.spec.whatwg.org/multipage/parsing.html#prescan-a-byte-stream-to-determine-its-encoding)
///
/// Scan a byte prefix for `<meta charset="...">` (the HTML5 form) or
/// `<meta http-equiv="Content-Type" content="...;charset=...">` (the HTML4
/// form). The prefix is decoded with windows-1252, a safe ASCII-compatible
/// superset, since the real encoding is the thing being determined.
///
/// Self-referential or unsupported labels yield `None` so the caller's
/// fallback chain applies.
#[must_use]
pub fn sniff_meta_charset(window: &[u8]) -> Option<&'static Encoding> {
    let (prefix, _, _) = WINDOWS_1252.decode(window);
    let prefix = prefix.as_ref();
    let lower = prefix.to_ascii_lowercase();
    let bytes = lower.as_bytes();

    let mut at = 0;
    while at < bytes.len() {
        // "Let position be a pointer into input, initially pointing at the
        //  start of the stream" - jump between tag opens.
        let open = memchr(b'<', &bytes[at..])? + at;

        // "If the next bytes match '<!--', advance to the first '-->'" -
        // skip comments so a commented-out meta cannot win.
        if lower[open..].starts_with("<!--") {
            match lower[open + 4..].find("-->") {
                Some(end) => {
                    at = open + 4 + end + 3;
                    continue;
                }
                None => return None,
            }
        }

        let close = match memchr(b'>', &bytes[open..]) {
            Some(offset) => open + offset,
            None => return None,
        };
        let tag = &lower[open + 1..close];

        if let Some(rest) = tag.strip_prefix("meta")
            && rest.starts_with([' ', '\t', '\n', '\x0C', '\r', '/'])
        {
            if let Some(encoding) = charset_from_meta(rest) {
                return Some(encoding);
            }
        }

        at = close + 1;
    }
    None
}

/// Extract the winning charset label from the inside of a `<meta>` tag
/// (already lowercased, name stripped).
fn charset_from_meta(meta_body: &str) -> Option<&'static Encoding> {
    // HTML5 form: charset="label"
    if let Some(label) = attr_value(meta_body, "charset") {
        return Encoding::for_label(label.trim().as_bytes());
    }

    // HTML4 form: http-equiv="content-type" content="text/html; charset=label"
    let http_equiv = attr_value(meta_body, "http-equiv")?;
    if http_equiv.trim() != "content-type" {
        return None;
    }
    let content = attr_value(meta_body, "content")?;
    let charset_at = content.find("charset=")?;
    let label = content[charset_at + "charset=".len()..]
        .trim_start()
        .trim_start_matches(['"', '\''])
        .split([';', '"', '\'', ' '])
        .next()?;
    Encoding::for_label(label.trim().as_bytes())
}

/// Pull a named attribute's value out of a tag body. Tolerates quoted and
/// unquoted forms; only precise enough for the prescan, the real tokenizer
/// handles attributes properly.
fn attr_value<'a>(tag_body: &'a str, name: &str) -> Option<&'a str> {
    let mut search_from = 0;
    while let Some(found) = tag_body[search_from..].find(name) {
        let at = search_from + found;
        // Must be a standalone attribute name, not a substring of another.
        let before_ok = at == 0
            || tag_body[..at]
                .ends_with([' ', '\t', '\n', '\x0C', '\r', '/', '"', '\'']);
        let after = &tag_body[at + name.len()..];
        if !before_ok {
            search_from = at + name.len();
            continue;
        }
        let after = after.trim_start();
        let Some(after) = after.strip_prefix('=') else {
            search_from = at + name.len();
            continue;
        };
        let after = after.trim_start();
        return Some(match after.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let inner = &after[1..];
                match inner.find(quote) {
                    Some(end) => &inner[..end],
                    None => inner,
                }
            }
            _ => after
                .split([' ', '\t', '\n', '\x0C', '\r', '/'])
                .next()
                .unwrap_or(""),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html5_meta_form() {
        let html = b"<html><head><meta charset=\"utf-8\"></head></html>";
        assert_eq!(sniff_meta_charset(html), Some(UTF_8));
    }

    #[test]
    fn html4_meta_form() {
        let html =
            b"<head><meta http-equiv=\"Content-Type\" content=\"text/html;charset=gb2312\">";
        assert_eq!(
            sniff_meta_charset(html).map(Encoding::name),
            Some("GBK")
        );
    }

    #[test]
    fn commented_meta_is_ignored() {
        let html = b"<!-- <meta charset=\"koi8-r\"> --><meta charset=\"utf-8\">";
        assert_eq!(sniff_meta_charset(html), Some(UTF_8));
    }

    #[test]
    fn unknown_label_is_skipped() {
        let html = b"<meta charset=\"martian\">";
        assert_eq!(sniff_meta_charset(html), None);
    }
}
