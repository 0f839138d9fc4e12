//! HTML tokenizer module.
//!
//! Implements [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//! of the WHATWG HTML Living Standard: an explicit state machine over the
//! decoded character stream, emitting a finite forward-only sequence of
//! tokens ending in [`Token::EndOfFile`]. Malformed markup never aborts -
//! every error case has a recovery transition, and the problems seen along
//! the way are recorded as [`ParseIssue`](crate::ParseIssue)s.

/// Character reference resolution per § 13.2.5.72-80.
mod charref;
/// The tokenizer state machine core and tag/attribute states.
mod machine;
/// Comment, DOCTYPE, and CDATA states per § 13.2.5.41-71.
mod markup;
/// RCDATA, RAWTEXT, script data, and PLAINTEXT states per § 13.2.5.2-31.
mod raw_text;
/// The state enumeration.
mod state;
/// Token types produced by the tokenizer.
mod token;

pub use machine::Tokenizer;
pub use state::TokenizerState;
pub use token::{TagAttribute, Token};
