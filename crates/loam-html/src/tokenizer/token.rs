//! Token types produced by the tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! "The output of the tokenization step is a series of zero or more of the
//! following tokens: DOCTYPE, start tag, end tag, comment, character,
//! end-of-file."
//!
//! Tokens are transient: the tree builder consumes them in order and they do
//! not outlive tree construction.

/// An attribute on a start tag token.
///
/// Per [§ 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization):
/// "a list of attributes, each of which has a name and a value". Names are
/// ASCII-lowercased as they are accumulated, mirroring the spec's
/// tag-name/attribute-name character handling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagAttribute {
    /// "each of which has a name"
    pub name: String,
    /// "and a value"
    pub value: String,
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// The tokenizer emits tokens of these types to the tree construction stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// "DOCTYPE tokens have a name, a public identifier, a system identifier,
    /// and a force-quirks flag. When a DOCTYPE token is created, its name,
    /// public identifier, and system identifier must be marked as missing
    /// (which is a distinct state from the empty string)."
    Doctype {
        /// "a name"
        name: Option<String>,
        /// "a public identifier"
        public_identifier: Option<String>,
        /// "a system identifier"
        system_identifier: Option<String>,
        /// "a force-quirks flag"
        force_quirks: bool,
    },

    /// "Start and end tag tokens have a tag name, a self-closing flag, and a
    /// list of attributes."
    StartTag {
        /// "a tag name", ASCII-lowercased
        name: String,
        /// "a self-closing flag"
        self_closing: bool,
        /// "a list of attributes"
        attributes: Vec<TagAttribute>,
    },

    /// End tag token. Attributes and a self-closing flag on an end tag are
    /// parse errors and are dropped before the token is emitted, so the
    /// variant carries the name alone.
    EndTag {
        /// "a tag name", ASCII-lowercased
        name: String,
    },

    /// "Comment and character tokens have data."
    Comment {
        /// "data"
        data: String,
    },

    /// "Comment and character tokens have data."
    Character {
        /// "data"
        data: char,
    },

    /// End-of-file token signals the end of input.
    EndOfFile,
}

impl Token {
    /// The tag name when this is a start or end tag token.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Token::StartTag { name, .. } | Token::EndTag { name } => Some(name),
            _ => None,
        }
    }

    /// Whether this is a start tag with the given name.
    #[must_use]
    pub fn is_start_tag(&self, tag: &str) -> bool {
        matches!(self, Token::StartTag { name, .. } if name == tag)
    }

    /// Whether this is an end tag with the given name.
    #[must_use]
    pub fn is_end_tag(&self, tag: &str) -> bool {
        matches!(self, Token::EndTag { name } if name == tag)
    }

    /// Whether this is a whitespace character token.
    ///
    /// [§ 12.1.4 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
    /// "ASCII whitespace is U+0009 TAB, U+000A LF, U+000C FF, U+000D CR, or
    /// U+0020 SPACE."
    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(
            self,
            Token::Character {
                data: '\t' | '\n' | '\x0C' | '\r' | ' '
            }
        )
    }
}
