//! Named character reference tables.
//!
//! [§ 13.5 Named character references](https://html.spec.whatwg.org/multipage/named-characters.html)
//!
//! The full spec defines 2,231 entities; this module carries a curated table
//! covering the XML core set, the Latin-1 names, and the common typographic,
//! math, and Greek names. Characters with no named entry serialize as decimal
//! numeric references when the output charset cannot represent them, and any
//! numeric reference decodes regardless of the tables here.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::output::EscapeMode;

/// The XML-safe core. This is the entire escape table for
/// [`EscapeMode::Xhtml`].
const CORE_ENTITIES: &[(&str, char)] = &[
    ("quot", '"'),
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
];

/// The Latin-1 range (U+00A0 through U+00FF), escaped by
/// [`EscapeMode::Base`] and above.
const LATIN1_ENTITIES: &[(&str, char)] = &[
    ("nbsp", '\u{00A0}'),
    ("iexcl", '\u{00A1}'),
    ("cent", '\u{00A2}'),
    ("pound", '\u{00A3}'),
    ("curren", '\u{00A4}'),
    ("yen", '\u{00A5}'),
    ("brvbar", '\u{00A6}'),
    ("sect", '\u{00A7}'),
    ("uml", '\u{00A8}'),
    ("copy", '\u{00A9}'),
    ("ordf", '\u{00AA}'),
    ("laquo", '\u{00AB}'),
    ("not", '\u{00AC}'),
    ("shy", '\u{00AD}'),
    ("reg", '\u{00AE}'),
    ("macr", '\u{00AF}'),
    ("deg", '\u{00B0}'),
    ("plusmn", '\u{00B1}'),
    ("sup2", '\u{00B2}'),
    ("sup3", '\u{00B3}'),
    ("acute", '\u{00B4}'),
    ("micro", '\u{00B5}'),
    ("para", '\u{00B6}'),
    ("middot", '\u{00B7}'),
    ("cedil", '\u{00B8}'),
    ("sup1", '\u{00B9}'),
    ("ordm", '\u{00BA}'),
    ("raquo", '\u{00BB}'),
    ("frac14", '\u{00BC}'),
    ("frac12", '\u{00BD}'),
    ("frac34", '\u{00BE}'),
    ("iquest", '\u{00BF}'),
    ("Agrave", '\u{00C0}'),
    ("Aacute", '\u{00C1}'),
    ("Acirc", '\u{00C2}'),
    ("Atilde", '\u{00C3}'),
    ("Auml", '\u{00C4}'),
    ("Aring", '\u{00C5}'),
    ("AElig", '\u{00C6}'),
    ("Ccedil", '\u{00C7}'),
    ("Egrave", '\u{00C8}'),
    ("Eacute", '\u{00C9}'),
    ("Ecirc", '\u{00CA}'),
    ("Euml", '\u{00CB}'),
    ("Igrave", '\u{00CC}'),
    ("Iacute", '\u{00CD}'),
    ("Icirc", '\u{00CE}'),
    ("Iuml", '\u{00CF}'),
    ("ETH", '\u{00D0}'),
    ("Ntilde", '\u{00D1}'),
    ("Ograve", '\u{00D2}'),
    ("Oacute", '\u{00D3}'),
    ("Ocirc", '\u{00D4}'),
    ("Otilde", '\u{00D5}'),
    ("Ouml", '\u{00D6}'),
    ("times", '\u{00D7}'),
    ("Oslash", '\u{00D8}'),
    ("Ugrave", '\u{00D9}'),
    ("Uacute", '\u{00DA}'),
    ("Ucirc", '\u{00DB}'),
    ("Uuml", '\u{00DC}'),
    ("Yacute", '\u{00DD}'),
    ("THORN", '\u{00DE}'),
    ("szlig", '\u{00DF}'),
    ("agrave", '\u{00E0}'),
    ("aacute", '\u{00E1}'),
    ("acirc", '\u{00E2}'),
    ("atilde", '\u{00E3}'),
    ("auml", '\u{00E4}'),
    ("aring", '\u{00E5}'),
    ("aelig", '\u{00E6}'),
    ("ccedil", '\u{00E7}'),
    ("egrave", '\u{00E8}'),
    ("eacute", '\u{00E9}'),
    ("ecirc", '\u{00EA}'),
    ("euml", '\u{00EB}'),
    ("igrave", '\u{00EC}'),
    ("iacute", '\u{00ED}'),
    ("icirc", '\u{00EE}'),
    ("iuml", '\u{00EF}'),
    ("eth", '\u{00F0}'),
    ("ntilde", '\u{00F1}'),
    ("ograve", '\u{00F2}'),
    ("oacute", '\u{00F3}'),
    ("ocirc", '\u{00F4}'),
    ("otilde", '\u{00F5}'),
    ("ouml", '\u{00F6}'),
    ("divide", '\u{00F7}'),
    ("oslash", '\u{00F8}'),
    ("ugrave", '\u{00F9}'),
    ("uacute", '\u{00FA}'),
    ("ucirc", '\u{00FB}'),
    ("uuml", '\u{00FC}'),
    ("yacute", '\u{00FD}'),
    ("thorn", '\u{00FE}'),
    ("yuml", '\u{00FF}'),
];

/// Typographic, math, and Greek names, escaped only by
/// [`EscapeMode::Extended`].
const EXTENDED_ENTITIES: &[(&str, char)] = &[
    ("OElig", '\u{0152}'),
    ("oelig", '\u{0153}'),
    ("Scaron", '\u{0160}'),
    ("scaron", '\u{0161}'),
    ("Yuml", '\u{0178}'),
    ("fnof", '\u{0192}'),
    ("circ", '\u{02C6}'),
    ("tilde", '\u{02DC}'),
    ("Alpha", '\u{0391}'),
    ("Beta", '\u{0392}'),
    ("Gamma", '\u{0393}'),
    ("Delta", '\u{0394}'),
    ("Epsilon", '\u{0395}'),
    ("Zeta", '\u{0396}'),
    ("Eta", '\u{0397}'),
    ("Theta", '\u{0398}'),
    ("Iota", '\u{0399}'),
    ("Kappa", '\u{039A}'),
    ("Lambda", '\u{039B}'),
    ("Mu", '\u{039C}'),
    ("Nu", '\u{039D}'),
    ("Xi", '\u{039E}'),
    ("Omicron", '\u{039F}'),
    ("Pi", '\u{03A0}'),
    ("Rho", '\u{03A1}'),
    ("Sigma", '\u{03A3}'),
    ("Tau", '\u{03A4}'),
    ("Upsilon", '\u{03A5}'),
    ("Phi", '\u{03A6}'),
    ("Chi", '\u{03A7}'),
    ("Psi", '\u{03A8}'),
    ("Omega", '\u{03A9}'),
    ("alpha", '\u{03B1}'),
    ("beta", '\u{03B2}'),
    ("gamma", '\u{03B3}'),
    ("delta", '\u{03B4}'),
    ("epsilon", '\u{03B5}'),
    ("zeta", '\u{03B6}'),
    ("eta", '\u{03B7}'),
    ("theta", '\u{03B8}'),
    ("iota", '\u{03B9}'),
    ("kappa", '\u{03BA}'),
    ("lambda", '\u{03BB}'),
    ("mu", '\u{03BC}'),
    ("nu", '\u{03BD}'),
    ("xi", '\u{03BE}'),
    ("omicron", '\u{03BF}'),
    ("pi", '\u{03C0}'),
    ("rho", '\u{03C1}'),
    ("sigmaf", '\u{03C2}'),
    ("sigma", '\u{03C3}'),
    ("tau", '\u{03C4}'),
    ("upsilon", '\u{03C5}'),
    ("phi", '\u{03C6}'),
    ("chi", '\u{03C7}'),
    ("psi", '\u{03C8}'),
    ("omega", '\u{03C9}'),
    ("ensp", '\u{2002}'),
    ("emsp", '\u{2003}'),
    ("thinsp", '\u{2009}'),
    ("zwnj", '\u{200C}'),
    ("zwj", '\u{200D}'),
    ("lrm", '\u{200E}'),
    ("rlm", '\u{200F}'),
    ("ndash", '\u{2013}'),
    ("mdash", '\u{2014}'),
    ("lsquo", '\u{2018}'),
    ("rsquo", '\u{2019}'),
    ("sbquo", '\u{201A}'),
    ("ldquo", '\u{201C}'),
    ("rdquo", '\u{201D}'),
    ("bdquo", '\u{201E}'),
    ("dagger", '\u{2020}'),
    ("Dagger", '\u{2021}'),
    ("bull", '\u{2022}'),
    ("hellip", '\u{2026}'),
    ("permil", '\u{2030}'),
    ("prime", '\u{2032}'),
    ("Prime", '\u{2033}'),
    ("lsaquo", '\u{2039}'),
    ("rsaquo", '\u{203A}'),
    ("oline", '\u{203E}'),
    ("frasl", '\u{2044}'),
    ("euro", '\u{20AC}'),
    ("trade", '\u{2122}'),
    ("larr", '\u{2190}'),
    ("uarr", '\u{2191}'),
    ("rarr", '\u{2192}'),
    ("darr", '\u{2193}'),
    ("harr", '\u{2194}'),
    ("minus", '\u{2212}'),
    ("radic", '\u{221A}'),
    ("infin", '\u{221E}'),
    ("asymp", '\u{2248}'),
    ("ne", '\u{2260}'),
    ("equiv", '\u{2261}'),
    ("le", '\u{2264}'),
    ("ge", '\u{2265}'),
];

/// Decode-only names: accepted on input, never produced on output.
const DECODE_ONLY_ENTITIES: &[(&str, char)] = &[("apos", '\'')];

/// Names that legacy content may write without the terminating semicolon.
///
/// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
/// "If the character reference was consumed as part of an attribute, and the
/// last character matched is not a U+003B SEMICOLON..."
const LEGACY_BARE_NAMES: &[&str] = &["amp", "lt", "gt", "quot", "nbsp", "copy", "reg"];

static ESCAPE_XHTML: LazyLock<HashMap<char, &'static str>> =
    LazyLock::new(|| CORE_ENTITIES.iter().map(|&(name, c)| (c, name)).collect());

static ESCAPE_BASE: LazyLock<HashMap<char, &'static str>> = LazyLock::new(|| {
    CORE_ENTITIES
        .iter()
        .chain(LATIN1_ENTITIES)
        .map(|&(name, c)| (c, name))
        .collect()
});

static ESCAPE_EXTENDED: LazyLock<HashMap<char, &'static str>> = LazyLock::new(|| {
    CORE_ENTITIES
        .iter()
        .chain(LATIN1_ENTITIES)
        .chain(EXTENDED_ENTITIES)
        .map(|&(name, c)| (c, name))
        .collect()
});

static DECODE_BY_NAME: LazyLock<HashMap<&'static str, char>> = LazyLock::new(|| {
    CORE_ENTITIES
        .iter()
        .chain(LATIN1_ENTITIES)
        .chain(EXTENDED_ENTITIES)
        .chain(DECODE_ONLY_ENTITIES)
        .map(|&(name, c)| (name, c))
        .collect()
});

/// The longest name in the decode table; bounds the tokenizer's scan.
pub const MAX_NAMED_LEN: usize = 8;

/// Look up the entity name (without `&` and `;`) that escapes `c` under the
/// given mode, if the mode's table has one.
#[must_use]
pub fn escape_name(c: char, mode: EscapeMode) -> Option<&'static str> {
    let table = match mode {
        EscapeMode::Xhtml => &ESCAPE_XHTML,
        EscapeMode::Base => &ESCAPE_BASE,
        EscapeMode::Extended => &ESCAPE_EXTENDED,
    };
    table.get(&c).copied()
}

/// Look up a named character reference.
///
/// The `name` must not include the leading `&` or the trailing `;`.
#[must_use]
pub fn lookup_named(name: &str) -> Option<char> {
    DECODE_BY_NAME.get(name).copied()
}

/// Whether `name` may appear without a terminating semicolon.
#[must_use]
pub fn is_legacy_name(name: &str) -> bool {
    LEGACY_BARE_NAMES.contains(&name)
}

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// "If the number is one of the numbers in the first column of the following
/// table, then find the row with that number in the first column, and set the
/// character reference code to the number in the second column of that row."
///
/// The C1 control range decodes as the corresponding windows-1252 characters.
#[must_use]
pub const fn remap_windows_1252(code: u32) -> Option<char> {
    Some(match code {
        0x80 => '\u{20AC}',
        0x82 => '\u{201A}',
        0x83 => '\u{0192}',
        0x84 => '\u{201E}',
        0x85 => '\u{2026}',
        0x86 => '\u{2020}',
        0x87 => '\u{2021}',
        0x88 => '\u{02C6}',
        0x89 => '\u{2030}',
        0x8A => '\u{0160}',
        0x8B => '\u{2039}',
        0x8C => '\u{0152}',
        0x8E => '\u{017D}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}',
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        0x98 => '\u{02DC}',
        0x99 => '\u{2122}',
        0x9A => '\u{0161}',
        0x9B => '\u{203A}',
        0x9C => '\u{0153}',
        0x9E => '\u{017E}',
        0x9F => '\u{0178}',
        _ => return None,
    })
}

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// Convert a numeric character reference code to the character it decodes to,
/// applying the null / surrogate / out-of-range / C1-control replacements.
#[must_use]
pub fn decode_numeric(code: u32) -> char {
    if code == 0 || code > 0x0010_FFFF || (0xD800..=0xDFFF).contains(&code) {
        // "a null-character-reference / character-reference-outside-unicode-range
        //  / surrogate-character-reference parse error. Set the character
        //  reference code to 0xFFFD REPLACEMENT CHARACTER."
        return '\u{FFFD}';
    }
    if let Some(remapped) = remap_windows_1252(code) {
        return remapped;
    }
    char::from_u32(code).unwrap_or('\u{FFFD}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_names_round_trip() {
        assert_eq!(escape_name('<', EscapeMode::Xhtml), Some("lt"));
        assert_eq!(lookup_named("lt"), Some('<'));
        assert_eq!(lookup_named("apos"), Some('\''));
    }

    #[test]
    fn mode_tables_are_nested() {
        // xhtml does not know nbsp, base does; base does not know mdash,
        // extended does.
        assert_eq!(escape_name('\u{00A0}', EscapeMode::Xhtml), None);
        assert_eq!(escape_name('\u{00A0}', EscapeMode::Base), Some("nbsp"));
        assert_eq!(escape_name('\u{2014}', EscapeMode::Base), None);
        assert_eq!(escape_name('\u{2014}', EscapeMode::Extended), Some("mdash"));
    }

    #[test]
    fn numeric_replacements() {
        assert_eq!(decode_numeric(0x41), 'A');
        assert_eq!(decode_numeric(0), '\u{FFFD}');
        assert_eq!(decode_numeric(0xD800), '\u{FFFD}');
        assert_eq!(decode_numeric(0x0011_0000), '\u{FFFD}');
        assert_eq!(decode_numeric(0x80), '\u{20AC}');
    }
}
