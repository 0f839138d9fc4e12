//! Serialization settings attached to a [`Document`](crate::Document).
//!
//! The settings control which charset the serialized markup targets (and
//! therefore which characters must be escaped), how aggressively named
//! entities are used, and whitespace-only pretty-printing. Changing them on a
//! built document affects only subsequent serialization - never the tree.

use encoding_rs::{Encoding, UTF_8};

/// How aggressively characters are escaped to named entities on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapeMode {
    /// Escape only the XML-safe core (`&lt;`, `&gt;`, `&amp;`, `&quot;`).
    Xhtml,
    /// The core plus the Latin-1 named entities (`&nbsp;`, `&eacute;`, ...).
    #[default]
    Base,
    /// The base set plus typographic, math, and Greek names (`&mdash;`,
    /// `&euro;`, `&alpha;`, ...).
    Extended,
}

/// Per-document output configuration.
///
/// A fresh document targets UTF-8 with [`EscapeMode::Base`] and compact
/// output. Parsing replaces the charset with whatever the charset resolver
/// settled on, so re-serializing reproduces the input encoding's reach.
#[derive(Debug, Clone)]
pub struct OutputSettings {
    charset: &'static Encoding,
    escape_mode: EscapeMode,
    pretty_print: bool,
    indent_amount: usize,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            charset: UTF_8,
            escape_mode: EscapeMode::Base,
            pretty_print: false,
            indent_amount: 4,
        }
    }
}

impl OutputSettings {
    /// The target charset consulted during escaping.
    #[must_use]
    pub const fn charset(&self) -> &'static Encoding {
        self.charset
    }

    /// Set the target charset directly.
    pub const fn set_charset(&mut self, charset: &'static Encoding) {
        self.charset = charset;
    }

    /// Set the target charset by label (e.g. `"ascii"`, `"gb2312"`).
    ///
    /// Returns `false` and leaves the settings untouched when the label is
    /// not a known encoding.
    pub fn set_charset_name(&mut self, label: &str) -> bool {
        match Encoding::for_label(label.trim().as_bytes()) {
            Some(charset) => {
                self.charset = charset;
                true
            }
            None => false,
        }
    }

    /// The current escape mode.
    #[must_use]
    pub const fn escape_mode(&self) -> EscapeMode {
        self.escape_mode
    }

    /// Set the escape mode.
    pub const fn set_escape_mode(&mut self, mode: EscapeMode) {
        self.escape_mode = mode;
    }

    /// Whether serialization inserts indentation whitespace.
    #[must_use]
    pub const fn pretty_print(&self) -> bool {
        self.pretty_print
    }

    /// Enable or disable pretty-printing.
    pub const fn set_pretty_print(&mut self, on: bool) {
        self.pretty_print = on;
    }

    /// Spaces per indent level when pretty-printing.
    #[must_use]
    pub const fn indent_amount(&self) -> usize {
        self.indent_amount
    }

    /// Set the spaces per indent level.
    pub const fn set_indent_amount(&mut self, amount: usize) {
        self.indent_amount = amount;
    }

    /// Whether the target charset can represent `c` directly.
    ///
    /// Probes the encoder: `encoding_rs` reports unmappable characters via
    /// the `had_errors` flag rather than failing.
    #[must_use]
    pub fn can_encode(&self, c: char) -> bool {
        let mut buf = [0_u8; 4];
        let (_, _, had_errors) = self.charset.encode(c.encode_utf8(&mut buf));
        !had_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_encodes_everything() {
        let settings = OutputSettings::default();
        assert!(settings.can_encode('百'));
        assert!(settings.can_encode('é'));
    }

    #[test]
    fn ascii_rejects_non_ascii() {
        let mut settings = OutputSettings::default();
        assert!(settings.set_charset_name("ascii"));
        assert!(settings.can_encode('a'));
        assert!(!settings.can_encode('百'));
    }

    #[test]
    fn unknown_label_is_rejected() {
        let mut settings = OutputSettings::default();
        assert!(!settings.set_charset_name("not-a-charset"));
        assert_eq!(settings.charset(), UTF_8);
    }
}
