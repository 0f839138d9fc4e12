//! Character reference resolution.
//!
//! [§ 13.2.5.72-80](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
//!
//! `&name;`, `&#123;`, and `&#x1F4A9;` forms, with the legacy
//! no-semicolon names accepted where history demands it. The named tables
//! live in [`loam_dom::entities`]; the numeric-character-reference-end step
//! is realized as [`Tokenizer::finish_numeric_reference`] since it consumes
//! no input.

use loam_dom::entities;

use super::Tokenizer;
use super::state::TokenizerState;

impl Tokenizer {
    pub(super) fn step_charref(&mut self) {
        match self.state {
            TokenizerState::CharacterReference => self.handle_character_reference_state(),
            TokenizerState::NamedCharacterReference => {
                self.handle_named_character_reference_state();
            }
            TokenizerState::AmbiguousAmpersand => self.handle_ambiguous_ampersand_state(),
            TokenizerState::NumericCharacterReference => {
                self.handle_numeric_character_reference_state();
            }
            TokenizerState::HexadecimalCharacterReferenceStart => {
                self.handle_numeric_start_state(true);
            }
            TokenizerState::DecimalCharacterReferenceStart => {
                self.handle_numeric_start_state(false);
            }
            TokenizerState::HexadecimalCharacterReference => {
                self.handle_hexadecimal_character_reference_state();
            }
            TokenizerState::DecimalCharacterReference => {
                self.handle_decimal_character_reference_state();
            }
            _ => unreachable!("step_charref dispatched with a non-charref state"),
        }
    }

    /// [§ 13.2.5.72](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    /// "consumed as part of an attribute" - whether the return state is an
    /// attribute value state.
    const fn is_in_attribute(&self) -> bool {
        matches!(
            self.return_state,
            Some(
                TokenizerState::AttributeValueDoubleQuoted
                    | TokenizerState::AttributeValueSingleQuoted
                    | TokenizerState::AttributeValueUnquoted
            )
        )
    }

    /// "Flush code points consumed as a character reference"
    ///
    /// "If the character reference was consumed as part of an attribute,
    /// then append each character to the current attribute's value.
    /// Otherwise, emit each character as a character token."
    fn flush_temp_buffer(&mut self) {
        let buffered = std::mem::take(&mut self.temp_buffer);
        if self.is_in_attribute() {
            self.attr_value.push_str(&buffered);
        } else {
            self.emit_str(&buffered);
        }
    }

    /// Return to the state that initiated the reference.
    fn return_to_origin(&mut self) {
        let state = self.return_state.take().unwrap_or(TokenizerState::Data);
        self.switch_to(state);
    }

    /// Like [`Self::return_to_origin`] but reprocessing the current
    /// character there.
    fn reconsume_at_origin(&mut self) {
        let state = self.return_state.take().unwrap_or(TokenizerState::Data);
        self.reconsume_in(state);
    }

    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    fn handle_character_reference_state(&mut self) {
        // "Set the temporary buffer to the empty string. Append a U+0026
        //  AMPERSAND (&) character to the temporary buffer."
        self.temp_buffer.clear();
        self.temp_buffer.push('&');
        match self.current {
            // "ASCII alphanumeric - Reconsume in the named character
            //  reference state."
            Some(c) if c.is_ascii_alphanumeric() => {
                self.reconsume_in(TokenizerState::NamedCharacterReference);
            }
            // "U+0023 NUMBER SIGN (#) - Append the current input character to
            //  the temporary buffer. Switch to the numeric character
            //  reference state."
            Some('#') => {
                self.temp_buffer.push('#');
                self.switch_to(TokenizerState::NumericCharacterReference);
            }
            // "Anything else - Flush code points consumed as a character
            //  reference. Reconsume in the return state."
            _ => {
                self.flush_temp_buffer();
                self.reconsume_at_origin();
            }
        }
    }

    /// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
    ///
    /// "Consume the maximum number of characters possible, where the
    /// consumed characters are one of the identifiers of the named character
    /// references table."
    ///
    /// Realized as a bounded lookahead over the alphanumeric run starting at
    /// the current character, longest table match wins. Semicolon-terminated
    /// names always resolve; the legacy set resolves bare unless the
    /// historical attribute guard applies.
    fn handle_named_character_reference_state(&mut self) {
        // Collect the candidate run: the current char plus lookahead, capped
        // at the longest name in the table.
        let mut run = String::new();
        if let Some(c) = self.current {
            run.push(c);
        }
        let mut offset = 0;
        while run.len() < entities::MAX_NAMED_LEN {
            match self.peek_codepoint(offset) {
                Some(c) if c.is_ascii_alphanumeric() => {
                    run.push(c);
                    offset += 1;
                }
                _ => break,
            }
        }

        for len in (1..=run.len()).rev() {
            let name = &run[..len];
            let Some(decoded) = entities::lookup_named(name) else {
                continue;
            };
            // `len - 1` characters beyond the current one make up the name.
            let next_after = self.peek_codepoint(len - 1);
            let has_semicolon = next_after == Some(';');

            if !has_semicolon {
                if !entities::is_legacy_name(name) {
                    continue;
                }
                // "If the character reference was consumed as part of an
                //  attribute, and the last character matched is not a
                //  SEMICOLON, and the next input character is either a U+003D
                //  EQUALS SIGN or an ASCII alphanumeric, then... flush and
                //  switch to the return state" - i.e. treat it literally.
                if self.is_in_attribute()
                    && next_after.is_some_and(|c| c == '=' || c.is_ascii_alphanumeric())
                {
                    continue;
                }
                self.parse_error("missing-semicolon-after-character-reference");
            }

            self.advance_by(len - 1 + usize::from(has_semicolon));
            self.temp_buffer.clear();
            self.temp_buffer.push(decoded);
            self.flush_temp_buffer();
            self.return_to_origin();
            return;
        }

        // "Otherwise - Flush code points consumed as a character reference.
        //  Switch to the ambiguous ampersand state."
        self.flush_temp_buffer();
        self.reconsume_in(TokenizerState::AmbiguousAmpersand);
    }

    /// [§ 13.2.5.74 Ambiguous ampersand state](https://html.spec.whatwg.org/multipage/parsing.html#ambiguous-ampersand-state)
    fn handle_ambiguous_ampersand_state(&mut self) {
        match self.current {
            // "ASCII alphanumeric - If the character reference was consumed
            //  as part of an attribute, then append the current input
            //  character to the current attribute's value. Otherwise, emit
            //  the current input character as a character token."
            Some(c) if c.is_ascii_alphanumeric() => {
                if self.is_in_attribute() {
                    self.attr_value.push(c);
                } else {
                    self.emit_char(c);
                }
            }
            // "U+003B SEMICOLON (;) - This is an
            //  unknown-named-character-reference parse error. Reconsume in
            //  the return state."
            Some(';') => {
                self.parse_error("unknown-named-character-reference");
                self.reconsume_at_origin();
            }
            _ => self.reconsume_at_origin(),
        }
    }

    /// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
    fn handle_numeric_character_reference_state(&mut self) {
        // "Set the character reference code to zero (0)."
        self.char_ref_code = 0;
        match self.current {
            // "U+0078 (x) / U+0058 (X) - Append the current input character
            //  to the temporary buffer. Switch to the hexadecimal character
            //  reference start state."
            Some(c @ ('x' | 'X')) => {
                self.temp_buffer.push(c);
                self.switch_to(TokenizerState::HexadecimalCharacterReferenceStart);
            }
            _ => self.reconsume_in(TokenizerState::DecimalCharacterReferenceStart),
        }
    }

    /// [§ 13.2.5.76 / 13.2.5.77 Numeric reference start states](https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-start-state)
    fn handle_numeric_start_state(&mut self, hex: bool) {
        let is_digit = self.current.is_some_and(|c| {
            if hex {
                c.is_ascii_hexdigit()
            } else {
                c.is_ascii_digit()
            }
        });
        if is_digit {
            let next = if hex {
                TokenizerState::HexadecimalCharacterReference
            } else {
                TokenizerState::DecimalCharacterReference
            };
            self.reconsume_in(next);
        } else {
            // "This is an absence-of-digits-in-numeric-character-reference
            //  parse error. Flush code points consumed as a character
            //  reference. Reconsume in the return state."
            self.parse_error("absence-of-digits-in-numeric-character-reference");
            self.flush_temp_buffer();
            self.reconsume_at_origin();
        }
    }

    /// [§ 13.2.5.78 Hexadecimal character reference state](https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-state)
    fn handle_hexadecimal_character_reference_state(&mut self) {
        match self.current {
            Some(c) if c.is_ascii_hexdigit() => {
                self.accumulate_reference_code(16, c.to_digit(16).unwrap_or(0));
            }
            // "Switch to the numeric character reference end state."
            Some(';') => self.finish_numeric_reference(false),
            // "This is a missing-semicolon-after-character-reference parse
            //  error. Reconsume in the numeric character reference end state."
            _ => {
                self.parse_error("missing-semicolon-after-character-reference");
                self.finish_numeric_reference(true);
            }
        }
    }

    /// [§ 13.2.5.79 Decimal character reference state](https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-state)
    fn handle_decimal_character_reference_state(&mut self) {
        match self.current {
            Some(c) if c.is_ascii_digit() => {
                self.accumulate_reference_code(10, c.to_digit(10).unwrap_or(0));
            }
            Some(';') => self.finish_numeric_reference(false),
            _ => {
                self.parse_error("missing-semicolon-after-character-reference");
                self.finish_numeric_reference(true);
            }
        }
    }

    /// "Multiply the character reference code by [base]. Add a numeric
    /// version of the current input character to the character reference
    /// code." Saturates above the Unicode range; the end step replaces
    /// out-of-range codes anyway.
    const fn accumulate_reference_code(&mut self, base: u32, digit: u32) {
        self.char_ref_code = match self.char_ref_code.checked_mul(base) {
            Some(scaled) => scaled.saturating_add(digit),
            None => u32::MAX,
        };
    }

    /// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
    ///
    /// Consumes no input, so it is an action rather than a state: validate
    /// the accumulated code, apply the replacement rules, flush, and return
    /// to the originating state (reprocessing the terminator when the
    /// semicolon was missing).
    fn finish_numeric_reference(&mut self, reprocess_current: bool) {
        let code = self.char_ref_code;
        if code == 0 {
            self.parse_error("null-character-reference");
        } else if code > 0x0010_FFFF {
            self.parse_error("character-reference-outside-unicode-range");
        } else if (0xD800..=0xDFFF).contains(&code) {
            self.parse_error("surrogate-character-reference");
        } else if entities::remap_windows_1252(code).is_some() {
            self.parse_error("control-character-reference");
        }
        let decoded = entities::decode_numeric(code);

        self.temp_buffer.clear();
        self.temp_buffer.push(decoded);
        self.flush_temp_buffer();
        if reprocess_current {
            self.reconsume_at_origin();
        } else {
            self.return_to_origin();
        }
    }
}
