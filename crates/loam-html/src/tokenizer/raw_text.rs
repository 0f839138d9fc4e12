//! RCDATA, RAWTEXT, script data, and PLAINTEXT states.
//!
//! [§ 13.2.5.2-31](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state)
//!
//! These content models suppress normal tag recognition: inside `<title>`,
//! `<textarea>` (RCDATA), `<style>` and friends (RAWTEXT), and `<script>`
//! (script data), only the *appropriate* end tag - one matching the last
//! emitted start tag - closes the element. RCDATA still resolves character
//! references; the others are literal. PLAINTEXT consumes everything to EOF.

use super::Tokenizer;
use super::state::TokenizerState;

impl Tokenizer {
    pub(super) fn step_raw_text(&mut self) {
        match self.state {
            TokenizerState::Rcdata => self.handle_rcdata_state(),
            TokenizerState::Rawtext => self.handle_rawtext_state(),
            TokenizerState::ScriptData => self.handle_script_data_state(),
            TokenizerState::Plaintext => self.handle_plaintext_state(),
            TokenizerState::RcdataLessThanSign => {
                self.handle_raw_less_than_sign(
                    TokenizerState::RcdataEndTagOpen,
                    TokenizerState::Rcdata,
                );
            }
            TokenizerState::RcdataEndTagOpen => {
                self.handle_raw_end_tag_open(
                    TokenizerState::RcdataEndTagName,
                    TokenizerState::Rcdata,
                );
            }
            TokenizerState::RcdataEndTagName => {
                self.handle_raw_end_tag_name(TokenizerState::Rcdata);
            }
            TokenizerState::RawtextLessThanSign => {
                self.handle_raw_less_than_sign(
                    TokenizerState::RawtextEndTagOpen,
                    TokenizerState::Rawtext,
                );
            }
            TokenizerState::RawtextEndTagOpen => {
                self.handle_raw_end_tag_open(
                    TokenizerState::RawtextEndTagName,
                    TokenizerState::Rawtext,
                );
            }
            TokenizerState::RawtextEndTagName => {
                self.handle_raw_end_tag_name(TokenizerState::Rawtext);
            }
            TokenizerState::ScriptDataLessThanSign => self.handle_script_data_less_than_sign(),
            TokenizerState::ScriptDataEndTagOpen => {
                self.handle_raw_end_tag_open(
                    TokenizerState::ScriptDataEndTagName,
                    TokenizerState::ScriptData,
                );
            }
            TokenizerState::ScriptDataEndTagName => {
                self.handle_raw_end_tag_name(TokenizerState::ScriptData);
            }
            TokenizerState::ScriptDataEscapeStart => self.handle_script_data_escape_start(),
            TokenizerState::ScriptDataEscapeStartDash => {
                self.handle_script_data_escape_start_dash();
            }
            TokenizerState::ScriptDataEscaped => self.handle_script_data_escaped(),
            TokenizerState::ScriptDataEscapedDash => self.handle_script_data_escaped_dash(),
            TokenizerState::ScriptDataEscapedDashDash => {
                self.handle_script_data_escaped_dash_dash();
            }
            TokenizerState::ScriptDataEscapedLessThanSign => {
                self.handle_script_data_escaped_less_than_sign();
            }
            TokenizerState::ScriptDataEscapedEndTagOpen => {
                self.handle_raw_end_tag_open(
                    TokenizerState::ScriptDataEscapedEndTagName,
                    TokenizerState::ScriptDataEscaped,
                );
            }
            TokenizerState::ScriptDataEscapedEndTagName => {
                self.handle_raw_end_tag_name(TokenizerState::ScriptDataEscaped);
            }
            _ => unreachable!("step_raw_text dispatched with a non-raw-text state"),
        }
    }

    /// [§ 13.2.5.2 RCDATA state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state)
    fn handle_rcdata_state(&mut self) {
        match self.current {
            // "Set the return state to the RCDATA state. Switch to the
            //  character reference state."
            Some('&') => {
                self.return_state = Some(TokenizerState::Rcdata);
                self.switch_to(TokenizerState::CharacterReference);
            }
            // "Switch to the RCDATA less-than sign state."
            Some('<') => self.switch_to(TokenizerState::RcdataLessThanSign),
            // "Emit a U+FFFD REPLACEMENT CHARACTER character token."
            Some('\0') => {
                self.parse_error("unexpected-null-character");
                self.emit_char('\u{FFFD}');
            }
            None => self.emit_eof(),
            Some(c) => self.emit_char(c),
        }
    }

    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    fn handle_rawtext_state(&mut self) {
        match self.current {
            Some('<') => self.switch_to(TokenizerState::RawtextLessThanSign),
            Some('\0') => {
                self.parse_error("unexpected-null-character");
                self.emit_char('\u{FFFD}');
            }
            None => self.emit_eof(),
            Some(c) => self.emit_char(c),
        }
    }

    /// [§ 13.2.5.4 Script data state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-state)
    fn handle_script_data_state(&mut self) {
        match self.current {
            Some('<') => self.switch_to(TokenizerState::ScriptDataLessThanSign),
            Some('\0') => {
                self.parse_error("unexpected-null-character");
                self.emit_char('\u{FFFD}');
            }
            None => self.emit_eof(),
            Some(c) => self.emit_char(c),
        }
    }

    /// [§ 13.2.5.5 PLAINTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#plaintext-state)
    ///
    /// "There is no way to switch out of the PLAINTEXT state."
    fn handle_plaintext_state(&mut self) {
        match self.current {
            Some('\0') => {
                self.parse_error("unexpected-null-character");
                self.emit_char('\u{FFFD}');
            }
            None => self.emit_eof(),
            Some(c) => self.emit_char(c),
        }
    }

    /// [§ 13.2.5.9 / 13.2.5.12](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-less-than-sign-state)
    ///
    /// Shared RCDATA / RAWTEXT less-than handling: only `</` can begin an
    /// end tag, anything else is literal text.
    fn handle_raw_less_than_sign(
        &mut self,
        end_tag_open: TokenizerState,
        raw_state: TokenizerState,
    ) {
        match self.current {
            // "Set the temporary buffer to the empty string. Switch to the
            //  ... end tag open state."
            Some('/') => {
                self.temp_buffer.clear();
                self.switch_to(end_tag_open);
            }
            // "Emit a U+003C LESS-THAN SIGN character token. Reconsume."
            _ => {
                self.emit_char('<');
                self.reconsume_in(raw_state);
            }
        }
    }

    /// [§ 13.2.5.10 / 13.2.5.13 / 13.2.5.16 / 13.2.5.24](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-open-state)
    fn handle_raw_end_tag_open(
        &mut self,
        end_tag_name: TokenizerState,
        raw_state: TokenizerState,
    ) {
        match self.current {
            // "Create a new end tag token... Reconsume in the ... end tag
            //  name state."
            Some(c) if c.is_ascii_alphabetic() => {
                self.new_end_tag();
                self.reconsume_in(end_tag_name);
            }
            // "Emit a U+003C LESS-THAN SIGN character token and a U+002F
            //  SOLIDUS character token. Reconsume."
            _ => {
                self.emit_char('<');
                self.emit_char('/');
                self.reconsume_in(raw_state);
            }
        }
    }

    /// [§ 13.2.5.11 / 13.2.5.14 / 13.2.5.17 / 13.2.5.25](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    ///
    /// "If the current end tag token is an appropriate end tag token" the
    /// tag proceeds like a normal end tag; otherwise everything consumed so
    /// far was literal text.
    fn handle_raw_end_tag_name(&mut self, raw_state: TokenizerState) {
        match self.current {
            Some(c) if Self::is_whitespace(c) && self.is_appropriate_end_tag() => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') if self.is_appropriate_end_tag() => {
                self.switch_to(TokenizerState::SelfClosingStartTag);
            }
            Some('>') if self.is_appropriate_end_tag() => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_tag();
            }
            // "Append the lowercase version of the current input character to
            //  the current tag token's tag name. Append the current input
            //  character to the temporary buffer."
            Some(c) if c.is_ascii_alphabetic() => {
                self.tag_name.push(c.to_ascii_lowercase());
                self.temp_buffer.push(c);
            }
            // "Emit a U+003C LESS-THAN SIGN character token, a U+002F SOLIDUS
            //  character token, and a character token for each of the
            //  characters in the temporary buffer. Reconsume."
            _ => {
                self.emit_char('<');
                self.emit_char('/');
                let buffered = std::mem::take(&mut self.temp_buffer);
                self.emit_str(&buffered);
                self.reconsume_in(raw_state);
            }
        }
    }

    /// "An appropriate end tag token is an end tag token whose tag name
    /// matches the tag name of the last start tag to have been emitted from
    /// this tokenizer."
    fn is_appropriate_end_tag(&self) -> bool {
        self.last_start_tag
            .as_deref()
            .is_some_and(|last| last == self.tag_name)
    }

    /// [§ 13.2.5.15 Script data less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-less-than-sign-state)
    fn handle_script_data_less_than_sign(&mut self) {
        match self.current {
            Some('/') => {
                self.temp_buffer.clear();
                self.switch_to(TokenizerState::ScriptDataEndTagOpen);
            }
            // "Set the temporary buffer to the empty string. Emit a U+003C
            //  LESS-THAN SIGN character token and a U+0021 EXCLAMATION MARK
            //  character token. Switch to the script data escape start state."
            Some('!') => {
                self.emit_char('<');
                self.emit_char('!');
                self.switch_to(TokenizerState::ScriptDataEscapeStart);
            }
            _ => {
                self.emit_char('<');
                self.reconsume_in(TokenizerState::ScriptData);
            }
        }
    }

    /// [§ 13.2.5.18 Script data escape start state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escape-start-state)
    fn handle_script_data_escape_start(&mut self) {
        match self.current {
            Some('-') => {
                self.emit_char('-');
                self.switch_to(TokenizerState::ScriptDataEscapeStartDash);
            }
            _ => self.reconsume_in(TokenizerState::ScriptData),
        }
    }

    /// [§ 13.2.5.19 Script data escape start dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escape-start-dash-state)
    fn handle_script_data_escape_start_dash(&mut self) {
        match self.current {
            Some('-') => {
                self.emit_char('-');
                self.switch_to(TokenizerState::ScriptDataEscapedDashDash);
            }
            _ => self.reconsume_in(TokenizerState::ScriptData),
        }
    }

    /// [§ 13.2.5.20 Script data escaped state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-state)
    ///
    /// Inside `<script>/* <!-- */` the parser must not mistake `-->` for
    /// markup nor close on tags other than the appropriate `</script>`.
    fn handle_script_data_escaped(&mut self) {
        match self.current {
            Some('-') => {
                self.emit_char('-');
                self.switch_to(TokenizerState::ScriptDataEscapedDash);
            }
            Some('<') => self.switch_to(TokenizerState::ScriptDataEscapedLessThanSign),
            Some('\0') => {
                self.parse_error("unexpected-null-character");
                self.emit_char('\u{FFFD}');
            }
            None => {
                self.parse_error("eof-in-script-html-comment-like-text");
                self.emit_eof();
            }
            Some(c) => self.emit_char(c),
        }
    }

    /// [§ 13.2.5.21 Script data escaped dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-dash-state)
    fn handle_script_data_escaped_dash(&mut self) {
        match self.current {
            Some('-') => {
                self.emit_char('-');
                self.switch_to(TokenizerState::ScriptDataEscapedDashDash);
            }
            Some('<') => self.switch_to(TokenizerState::ScriptDataEscapedLessThanSign),
            Some('\0') => {
                self.parse_error("unexpected-null-character");
                self.emit_char('\u{FFFD}');
                self.switch_to(TokenizerState::ScriptDataEscaped);
            }
            None => {
                self.parse_error("eof-in-script-html-comment-like-text");
                self.emit_eof();
            }
            Some(c) => {
                self.emit_char(c);
                self.switch_to(TokenizerState::ScriptDataEscaped);
            }
        }
    }

    /// [§ 13.2.5.22 Script data escaped dash dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-dash-dash-state)
    fn handle_script_data_escaped_dash_dash(&mut self) {
        match self.current {
            Some('-') => self.emit_char('-'),
            Some('<') => self.switch_to(TokenizerState::ScriptDataEscapedLessThanSign),
            // "Emit a U+003E GREATER-THAN SIGN character token. Switch to the
            //  script data state." - the comment-like region ended.
            Some('>') => {
                self.emit_char('>');
                self.switch_to(TokenizerState::ScriptData);
            }
            Some('\0') => {
                self.parse_error("unexpected-null-character");
                self.emit_char('\u{FFFD}');
                self.switch_to(TokenizerState::ScriptDataEscaped);
            }
            None => {
                self.parse_error("eof-in-script-html-comment-like-text");
                self.emit_eof();
            }
            Some(c) => {
                self.emit_char(c);
                self.switch_to(TokenizerState::ScriptDataEscaped);
            }
        }
    }

    /// [§ 13.2.5.23 Script data escaped less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-less-than-sign-state)
    ///
    /// The double-escape family (`<script>` nested inside the comment-like
    /// region) is not modeled; a nested open tag reads as escaped text,
    /// which still recovers at the real `</script>`.
    fn handle_script_data_escaped_less_than_sign(&mut self) {
        match self.current {
            Some('/') => {
                self.temp_buffer.clear();
                self.switch_to(TokenizerState::ScriptDataEscapedEndTagOpen);
            }
            _ => {
                self.emit_char('<');
                self.reconsume_in(TokenizerState::ScriptDataEscaped);
            }
        }
    }
}
