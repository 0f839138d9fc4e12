//! HTML tokenizer and tree builder for the loam toolkit.
//!
//! # Scope
//!
//! This crate implements the byte-to-tree half of the system:
//!
//! - **Charset Resolution** ([WHATWG § 13.2.3.2](https://html.spec.whatwg.org/multipage/parsing.html#determining-the-character-encoding))
//!   - BOM sniffing, transport-declared charsets, bounded `<meta>` prescan,
//!     UTF-8 fallback
//!
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Data, RCDATA, RAWTEXT, script data, PLAINTEXT, and tag states
//!   - DOCTYPE, comment, CDATA, and character reference handling
//!   - Attribute parsing with duplicate detection
//!
//! - **HTML Parser / Tree Builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - The full insertion-mode state machine, from Initial through
//!     AfterAfterFrameset
//!   - Implicit tag closing, foster parenting, and the adoption agency
//!     algorithm
//!
//! Malformed markup never fails a parse; problems are recorded as
//! [`ParseIssue`]s and recovery continues. The only fatal error on the
//! parsing path is an unreadable byte source in [`parse_reader`].

use std::io::Read;

use loam_dom::Document;

/// Charset resolution for raw document bytes.
pub mod charset;
/// HTML parser and tree construction.
pub mod parser;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

pub use parser::{InsertionMode, TreeBuilder};
pub use tokenizer::{TagAttribute, Token, Tokenizer, TokenizerState};

/// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
///
/// "The handling of parse errors is well-defined." A recovered problem in
/// the input, recorded for diagnostics and never fatal.
#[derive(Debug, Clone)]
pub struct ParseIssue {
    /// Description of the parse error per the spec's error definitions.
    pub message: String,
    /// Position in the token stream where the issue was noticed (the count
    /// of tokens emitted when the tokenizer saw it, or the index of the
    /// token the tree builder was processing).
    pub token_index: usize,
}

/// Parse already-decoded HTML into a [`Document`].
///
/// Never fails: malformed markup is recovered per the WHATWG rules.
#[must_use]
pub fn parse(html: &str, base_uri: &str) -> Document {
    let (doc, _) = parse_with_issues(html, base_uri);
    doc
}

/// Parse already-decoded HTML, returning the document together with every
/// [`ParseIssue`] the tokenizer and tree builder recorded.
#[must_use]
pub fn parse_with_issues(html: &str, base_uri: &str) -> (Document, Vec<ParseIssue>) {
    let (tokens, mut issues) = Tokenizer::new(html).run();
    let builder = TreeBuilder::new(tokens, base_uri);
    let (doc, tree_issues) = builder.run_with_issues();
    issues.extend(tree_issues);
    issues.sort_by_key(|issue| issue.token_index);
    (doc, issues)
}

/// Parse raw bytes, resolving the character encoding first.
///
/// `declared_charset` is the transport-layer label (e.g. from a
/// `Content-Type` header); `None` means "sniff only". The resolved encoding
/// is recorded in the document's output settings so serialization targets
/// the same charset the input carried.
#[must_use]
pub fn parse_bytes(bytes: &[u8], declared_charset: Option<&str>, base_uri: &str) -> Document {
    let (text, encoding) = charset::resolve(bytes, declared_charset);
    let mut doc = parse(&text, base_uri);
    doc.output_settings_mut().set_charset(encoding);
    doc
}

/// Parse from a byte source.
///
/// # Errors
///
/// Returns the underlying I/O error when the source cannot be read; no
/// partial document is produced. Markup problems never surface here.
pub fn parse_reader<R: Read>(
    mut reader: R,
    declared_charset: Option<&str>,
    base_uri: &str,
) -> std::io::Result<Document> {
    let mut bytes = Vec::new();
    let _ = reader.read_to_end(&mut bytes)?;
    Ok(parse_bytes(&bytes, declared_charset, base_uri))
}
