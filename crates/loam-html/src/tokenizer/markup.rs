//! Comment, DOCTYPE, and CDATA section states.
//!
//! [§ 13.2.5.41-71](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)

use super::Tokenizer;
use super::state::TokenizerState;

impl Tokenizer {
    pub(super) fn step_markup(&mut self) {
        match self.state {
            TokenizerState::BogusComment => self.handle_bogus_comment_state(),
            TokenizerState::MarkupDeclarationOpen => self.handle_markup_declaration_open_state(),
            TokenizerState::CommentStart => self.handle_comment_start_state(),
            TokenizerState::CommentStartDash => self.handle_comment_start_dash_state(),
            TokenizerState::Comment => self.handle_comment_state(),
            TokenizerState::CommentLessThanSign => self.handle_comment_less_than_sign_state(),
            TokenizerState::CommentLessThanSignBang => {
                self.handle_comment_less_than_sign_bang_state();
            }
            TokenizerState::CommentLessThanSignBangDash => {
                self.handle_comment_less_than_sign_bang_dash_state();
            }
            TokenizerState::CommentLessThanSignBangDashDash => {
                self.handle_comment_less_than_sign_bang_dash_dash_state();
            }
            TokenizerState::CommentEndDash => self.handle_comment_end_dash_state(),
            TokenizerState::CommentEnd => self.handle_comment_end_state(),
            TokenizerState::CommentEndBang => self.handle_comment_end_bang_state(),
            TokenizerState::Doctype => self.handle_doctype_state(),
            TokenizerState::BeforeDoctypeName => self.handle_before_doctype_name_state(),
            TokenizerState::DoctypeName => self.handle_doctype_name_state(),
            TokenizerState::AfterDoctypeName => self.handle_after_doctype_name_state(),
            TokenizerState::AfterDoctypePublicKeyword => {
                self.handle_after_doctype_public_keyword_state();
            }
            TokenizerState::BeforeDoctypePublicIdentifier => {
                self.handle_before_doctype_public_identifier_state();
            }
            TokenizerState::DoctypePublicIdentifierDoubleQuoted => {
                self.handle_doctype_public_identifier_state('"');
            }
            TokenizerState::DoctypePublicIdentifierSingleQuoted => {
                self.handle_doctype_public_identifier_state('\'');
            }
            TokenizerState::AfterDoctypePublicIdentifier => {
                self.handle_after_doctype_public_identifier_state();
            }
            TokenizerState::BetweenDoctypePublicAndSystemIdentifiers => {
                self.handle_between_doctype_public_and_system_identifiers_state();
            }
            TokenizerState::AfterDoctypeSystemKeyword => {
                self.handle_after_doctype_system_keyword_state();
            }
            TokenizerState::BeforeDoctypeSystemIdentifier => {
                self.handle_before_doctype_system_identifier_state();
            }
            TokenizerState::DoctypeSystemIdentifierDoubleQuoted => {
                self.handle_doctype_system_identifier_state('"');
            }
            TokenizerState::DoctypeSystemIdentifierSingleQuoted => {
                self.handle_doctype_system_identifier_state('\'');
            }
            TokenizerState::AfterDoctypeSystemIdentifier => {
                self.handle_after_doctype_system_identifier_state();
            }
            TokenizerState::BogusDoctype => self.handle_bogus_doctype_state(),
            TokenizerState::CdataSection => self.handle_cdata_section_state(),
            TokenizerState::CdataSectionBracket => self.handle_cdata_section_bracket_state(),
            TokenizerState::CdataSectionEnd => self.handle_cdata_section_end_state(),
            _ => unreachable!("step_markup dispatched with a non-markup state"),
        }
    }

    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    fn handle_bogus_comment_state(&mut self) {
        match self.current {
            // "Switch to the data state. Emit the current comment token."
            Some('>') => {
                self.emit_current_comment();
                self.switch_to(TokenizerState::Data);
            }
            // "Emit the comment. Emit an end-of-file token."
            None => {
                self.emit_current_comment();
                self.emit_eof();
            }
            Some('\0') => {
                self.parse_error("unexpected-null-character");
                self.comment.push('\u{FFFD}');
            }
            // "Append the current input character to the comment token's data."
            Some(c) => self.comment.push(c),
        }
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    fn handle_markup_declaration_open_state(&mut self) {
        // "If the next few characters are:
        //  Two U+002D HYPHEN-MINUS characters (-) - Consume those two
        //  characters, create a comment token whose data is the empty string,
        //  and switch to the comment start state."
        if self.lookahead_matches_ci("--") {
            self.advance_by(1);
            self.comment.clear();
            self.switch_to(TokenizerState::CommentStart);
            return;
        }
        // "ASCII case-insensitive match for the word 'DOCTYPE' - Consume
        //  those characters and switch to the DOCTYPE state."
        if self.lookahead_matches_ci("doctype") {
            self.advance_by("doctype".len() - 1);
            self.switch_to(TokenizerState::Doctype);
            return;
        }
        // "The string '[CDATA[' - Consume those characters" - with no
        // foreign-content tracking every CDATA section reads as text, which
        // is the tolerant outcome for XML-ish input.
        if self.lookahead_matches_ci("[CDATA[") {
            self.advance_by("[CDATA[".len() - 1);
            self.parse_error("cdata-in-html-content");
            self.switch_to(TokenizerState::CdataSection);
            return;
        }
        // "Anything else - This is an incorrectly-opened-comment parse
        //  error. Create a comment token whose data is the empty string.
        //  Switch to the bogus comment state (don't consume anything in the
        //  current state)."
        self.parse_error("incorrectly-opened-comment");
        self.comment.clear();
        self.reconsume_in(TokenizerState::BogusComment);
    }

    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    fn handle_comment_start_state(&mut self) {
        match self.current {
            Some('-') => self.switch_to(TokenizerState::CommentStartDash),
            // "This is an abrupt-closing-of-empty-comment parse error. Switch
            //  to the data state. Emit the current comment token."
            Some('>') => {
                self.parse_error("abrupt-closing-of-empty-comment");
                self.emit_current_comment();
                self.switch_to(TokenizerState::Data);
            }
            _ => self.reconsume_in(TokenizerState::Comment),
        }
    }

    /// [§ 13.2.5.44 Comment start dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-dash-state)
    fn handle_comment_start_dash_state(&mut self) {
        match self.current {
            Some('-') => self.switch_to(TokenizerState::CommentEnd),
            Some('>') => {
                self.parse_error("abrupt-closing-of-empty-comment");
                self.emit_current_comment();
                self.switch_to(TokenizerState::Data);
            }
            None => {
                self.parse_error("eof-in-comment");
                self.emit_current_comment();
                self.emit_eof();
            }
            // "Append a U+002D HYPHEN-MINUS character (-) to the comment
            //  token's data. Reconsume in the comment state."
            Some(_) => {
                self.comment.push('-');
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    fn handle_comment_state(&mut self) {
        match self.current {
            // "Append the current input character to the comment token's
            //  data. Switch to the comment less-than sign state."
            Some('<') => {
                self.comment.push('<');
                self.switch_to(TokenizerState::CommentLessThanSign);
            }
            Some('-') => self.switch_to(TokenizerState::CommentEndDash),
            Some('\0') => {
                self.parse_error("unexpected-null-character");
                self.comment.push('\u{FFFD}');
            }
            None => {
                self.parse_error("eof-in-comment");
                self.emit_current_comment();
                self.emit_eof();
            }
            Some(c) => self.comment.push(c),
        }
    }

    /// [§ 13.2.5.46 Comment less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-state)
    fn handle_comment_less_than_sign_state(&mut self) {
        match self.current {
            Some('!') => {
                self.comment.push('!');
                self.switch_to(TokenizerState::CommentLessThanSignBang);
            }
            Some('<') => self.comment.push('<'),
            _ => self.reconsume_in(TokenizerState::Comment),
        }
    }

    /// [§ 13.2.5.47 Comment less-than sign bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-state)
    fn handle_comment_less_than_sign_bang_state(&mut self) {
        match self.current {
            Some('-') => self.switch_to(TokenizerState::CommentLessThanSignBangDash),
            _ => self.reconsume_in(TokenizerState::Comment),
        }
    }

    /// [§ 13.2.5.48 Comment less-than sign bang dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-state)
    fn handle_comment_less_than_sign_bang_dash_state(&mut self) {
        match self.current {
            Some('-') => self.switch_to(TokenizerState::CommentLessThanSignBangDashDash),
            _ => self.reconsume_in(TokenizerState::CommentEndDash),
        }
    }

    /// [§ 13.2.5.49 Comment less-than sign bang dash dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-dash-state)
    fn handle_comment_less_than_sign_bang_dash_dash_state(&mut self) {
        match self.current {
            Some('>') | None => self.reconsume_in(TokenizerState::CommentEnd),
            // "This is a nested-comment parse error. Reconsume in the comment
            //  end state."
            Some(_) => {
                self.parse_error("nested-comment");
                self.reconsume_in(TokenizerState::CommentEnd);
            }
        }
    }

    /// [§ 13.2.5.50 Comment end dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state)
    fn handle_comment_end_dash_state(&mut self) {
        match self.current {
            Some('-') => self.switch_to(TokenizerState::CommentEnd),
            None => {
                self.parse_error("eof-in-comment");
                self.emit_current_comment();
                self.emit_eof();
            }
            Some(_) => {
                self.comment.push('-');
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.51 Comment end state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state)
    fn handle_comment_end_state(&mut self) {
        match self.current {
            // "Switch to the data state. Emit the current comment token."
            Some('>') => {
                self.emit_current_comment();
                self.switch_to(TokenizerState::Data);
            }
            Some('!') => self.switch_to(TokenizerState::CommentEndBang),
            // "Append a U+002D HYPHEN-MINUS character (-) to the comment
            //  token's data."
            Some('-') => self.comment.push('-'),
            None => {
                self.parse_error("eof-in-comment");
                self.emit_current_comment();
                self.emit_eof();
            }
            // "Append two U+002D HYPHEN-MINUS characters (-) to the comment
            //  token's data. Reconsume in the comment state."
            Some(_) => {
                self.comment.push_str("--");
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.52 Comment end bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state)
    fn handle_comment_end_bang_state(&mut self) {
        match self.current {
            Some('-') => {
                self.comment.push_str("--!");
                self.switch_to(TokenizerState::CommentEndDash);
            }
            // "This is an incorrectly-closed-comment parse error. Switch to
            //  the data state. Emit the current comment token."
            Some('>') => {
                self.parse_error("incorrectly-closed-comment");
                self.emit_current_comment();
                self.switch_to(TokenizerState::Data);
            }
            None => {
                self.parse_error("eof-in-comment");
                self.emit_current_comment();
                self.emit_eof();
            }
            Some(_) => {
                self.comment.push_str("--!");
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    fn handle_doctype_state(&mut self) {
        match self.current {
            Some(c) if Self::is_whitespace(c) => {
                self.switch_to(TokenizerState::BeforeDoctypeName);
            }
            Some('>') => self.reconsume_in(TokenizerState::BeforeDoctypeName),
            None => {
                self.parse_error("eof-in-doctype");
                self.doctype_force_quirks = true;
                self.emit_current_doctype();
                self.emit_eof();
            }
            Some(_) => {
                self.parse_error("missing-whitespace-before-doctype-name");
                self.reconsume_in(TokenizerState::BeforeDoctypeName);
            }
        }
    }

    /// [§ 13.2.5.54 Before DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state)
    fn handle_before_doctype_name_state(&mut self) {
        match self.current {
            Some(c) if Self::is_whitespace(c) => {}
            // "Create a new DOCTYPE token. Set the token's name to the
            //  lowercase version of the current input character."
            Some(c) if c.is_ascii_uppercase() => {
                self.doctype_name = Some(c.to_ascii_lowercase().to_string());
                self.switch_to(TokenizerState::DoctypeName);
            }
            Some('\0') => {
                self.parse_error("unexpected-null-character");
                self.doctype_name = Some('\u{FFFD}'.to_string());
                self.switch_to(TokenizerState::DoctypeName);
            }
            // "This is a missing-doctype-name parse error. Create a new
            //  DOCTYPE token. Set its force-quirks flag to on. Switch to the
            //  data state. Emit the current token."
            Some('>') => {
                self.parse_error("missing-doctype-name");
                self.doctype_force_quirks = true;
                self.emit_current_doctype();
                self.switch_to(TokenizerState::Data);
            }
            None => {
                self.parse_error("eof-in-doctype");
                self.doctype_force_quirks = true;
                self.emit_current_doctype();
                self.emit_eof();
            }
            Some(c) => {
                self.doctype_name = Some(c.to_string());
                self.switch_to(TokenizerState::DoctypeName);
            }
        }
    }

    /// [§ 13.2.5.55 DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state)
    fn handle_doctype_name_state(&mut self) {
        match self.current {
            Some(c) if Self::is_whitespace(c) => {
                self.switch_to(TokenizerState::AfterDoctypeName);
            }
            Some('>') => {
                self.emit_current_doctype();
                self.switch_to(TokenizerState::Data);
            }
            Some(c) if c.is_ascii_uppercase() => {
                if let Some(name) = self.doctype_name.as_mut() {
                    name.push(c.to_ascii_lowercase());
                }
            }
            Some('\0') => {
                self.parse_error("unexpected-null-character");
                if let Some(name) = self.doctype_name.as_mut() {
                    name.push('\u{FFFD}');
                }
            }
            None => {
                self.parse_error("eof-in-doctype");
                self.doctype_force_quirks = true;
                self.emit_current_doctype();
                self.emit_eof();
            }
            Some(c) => {
                if let Some(name) = self.doctype_name.as_mut() {
                    name.push(c);
                }
            }
        }
    }

    /// [§ 13.2.5.56 After DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-name-state)
    fn handle_after_doctype_name_state(&mut self) {
        match self.current {
            Some(c) if Self::is_whitespace(c) => {}
            Some('>') => {
                self.emit_current_doctype();
                self.switch_to(TokenizerState::Data);
            }
            None => {
                self.parse_error("eof-in-doctype");
                self.doctype_force_quirks = true;
                self.emit_current_doctype();
                self.emit_eof();
            }
            // "If the six characters starting from the current input
            //  character are an ASCII case-insensitive match for the word
            //  'PUBLIC' / 'SYSTEM'..."
            Some(_) if self.lookahead_matches_ci("public") => {
                self.advance_by("public".len() - 1);
                self.switch_to(TokenizerState::AfterDoctypePublicKeyword);
            }
            Some(_) if self.lookahead_matches_ci("system") => {
                self.advance_by("system".len() - 1);
                self.switch_to(TokenizerState::AfterDoctypeSystemKeyword);
            }
            Some(_) => {
                self.parse_error("invalid-character-sequence-after-doctype-name");
                self.doctype_force_quirks = true;
                self.reconsume_in(TokenizerState::BogusDoctype);
            }
        }
    }

    /// [§ 13.2.5.57 After DOCTYPE public keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-keyword-state)
    fn handle_after_doctype_public_keyword_state(&mut self) {
        match self.current {
            Some(c) if Self::is_whitespace(c) => {
                self.switch_to(TokenizerState::BeforeDoctypePublicIdentifier);
            }
            Some('"') => {
                self.parse_error("missing-whitespace-after-doctype-public-keyword");
                self.doctype_public = Some(String::new());
                self.switch_to(TokenizerState::DoctypePublicIdentifierDoubleQuoted);
            }
            Some('\'') => {
                self.parse_error("missing-whitespace-after-doctype-public-keyword");
                self.doctype_public = Some(String::new());
                self.switch_to(TokenizerState::DoctypePublicIdentifierSingleQuoted);
            }
            Some('>') => {
                self.parse_error("missing-doctype-public-identifier");
                self.doctype_force_quirks = true;
                self.emit_current_doctype();
                self.switch_to(TokenizerState::Data);
            }
            None => {
                self.parse_error("eof-in-doctype");
                self.doctype_force_quirks = true;
                self.emit_current_doctype();
                self.emit_eof();
            }
            Some(_) => {
                self.parse_error("missing-quote-before-doctype-public-identifier");
                self.doctype_force_quirks = true;
                self.reconsume_in(TokenizerState::BogusDoctype);
            }
        }
    }

    /// [§ 13.2.5.58 Before DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-public-identifier-state)
    fn handle_before_doctype_public_identifier_state(&mut self) {
        match self.current {
            Some(c) if Self::is_whitespace(c) => {}
            Some('"') => {
                self.doctype_public = Some(String::new());
                self.switch_to(TokenizerState::DoctypePublicIdentifierDoubleQuoted);
            }
            Some('\'') => {
                self.doctype_public = Some(String::new());
                self.switch_to(TokenizerState::DoctypePublicIdentifierSingleQuoted);
            }
            Some('>') => {
                self.parse_error("missing-doctype-public-identifier");
                self.doctype_force_quirks = true;
                self.emit_current_doctype();
                self.switch_to(TokenizerState::Data);
            }
            None => {
                self.parse_error("eof-in-doctype");
                self.doctype_force_quirks = true;
                self.emit_current_doctype();
                self.emit_eof();
            }
            Some(_) => {
                self.parse_error("missing-quote-before-doctype-public-identifier");
                self.doctype_force_quirks = true;
                self.reconsume_in(TokenizerState::BogusDoctype);
            }
        }
    }

    /// [§ 13.2.5.59 / 13.2.5.60 DOCTYPE public identifier (quoted) states](https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(double-quoted)-state)
    fn handle_doctype_public_identifier_state(&mut self, quote: char) {
        match self.current {
            Some(c) if c == quote => {
                self.switch_to(TokenizerState::AfterDoctypePublicIdentifier);
            }
            Some('\0') => {
                self.parse_error("unexpected-null-character");
                if let Some(public) = self.doctype_public.as_mut() {
                    public.push('\u{FFFD}');
                }
            }
            // "This is an abrupt-doctype-public-identifier parse error."
            Some('>') => {
                self.parse_error("abrupt-doctype-public-identifier");
                self.doctype_force_quirks = true;
                self.emit_current_doctype();
                self.switch_to(TokenizerState::Data);
            }
            None => {
                self.parse_error("eof-in-doctype");
                self.doctype_force_quirks = true;
                self.emit_current_doctype();
                self.emit_eof();
            }
            Some(c) => {
                if let Some(public) = self.doctype_public.as_mut() {
                    public.push(c);
                }
            }
        }
    }

    /// [§ 13.2.5.61 After DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-identifier-state)
    fn handle_after_doctype_public_identifier_state(&mut self) {
        match self.current {
            Some(c) if Self::is_whitespace(c) => {
                self.switch_to(TokenizerState::BetweenDoctypePublicAndSystemIdentifiers);
            }
            Some('>') => {
                self.emit_current_doctype();
                self.switch_to(TokenizerState::Data);
            }
            Some('"') => {
                self.parse_error(
                    "missing-whitespace-between-doctype-public-and-system-identifiers",
                );
                self.doctype_system = Some(String::new());
                self.switch_to(TokenizerState::DoctypeSystemIdentifierDoubleQuoted);
            }
            Some('\'') => {
                self.parse_error(
                    "missing-whitespace-between-doctype-public-and-system-identifiers",
                );
                self.doctype_system = Some(String::new());
                self.switch_to(TokenizerState::DoctypeSystemIdentifierSingleQuoted);
            }
            None => {
                self.parse_error("eof-in-doctype");
                self.doctype_force_quirks = true;
                self.emit_current_doctype();
                self.emit_eof();
            }
            Some(_) => {
                self.parse_error("missing-quote-before-doctype-system-identifier");
                self.doctype_force_quirks = true;
                self.reconsume_in(TokenizerState::BogusDoctype);
            }
        }
    }

    /// [§ 13.2.5.62 Between DOCTYPE public and system identifiers state](https://html.spec.whatwg.org/multipage/parsing.html#between-doctype-public-and-system-identifiers-state)
    fn handle_between_doctype_public_and_system_identifiers_state(&mut self) {
        match self.current {
            Some(c) if Self::is_whitespace(c) => {}
            Some('>') => {
                self.emit_current_doctype();
                self.switch_to(TokenizerState::Data);
            }
            Some('"') => {
                self.doctype_system = Some(String::new());
                self.switch_to(TokenizerState::DoctypeSystemIdentifierDoubleQuoted);
            }
            Some('\'') => {
                self.doctype_system = Some(String::new());
                self.switch_to(TokenizerState::DoctypeSystemIdentifierSingleQuoted);
            }
            None => {
                self.parse_error("eof-in-doctype");
                self.doctype_force_quirks = true;
                self.emit_current_doctype();
                self.emit_eof();
            }
            Some(_) => {
                self.parse_error("missing-quote-before-doctype-system-identifier");
                self.doctype_force_quirks = true;
                self.reconsume_in(TokenizerState::BogusDoctype);
            }
        }
    }

    /// [§ 13.2.5.63 After DOCTYPE system keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-keyword-state)
    fn handle_after_doctype_system_keyword_state(&mut self) {
        match self.current {
            Some(c) if Self::is_whitespace(c) => {
                self.switch_to(TokenizerState::BeforeDoctypeSystemIdentifier);
            }
            Some('"') => {
                self.parse_error("missing-whitespace-after-doctype-system-keyword");
                self.doctype_system = Some(String::new());
                self.switch_to(TokenizerState::DoctypeSystemIdentifierDoubleQuoted);
            }
            Some('\'') => {
                self.parse_error("missing-whitespace-after-doctype-system-keyword");
                self.doctype_system = Some(String::new());
                self.switch_to(TokenizerState::DoctypeSystemIdentifierSingleQuoted);
            }
            Some('>') => {
                self.parse_error("missing-doctype-system-identifier");
                self.doctype_force_quirks = true;
                self.emit_current_doctype();
                self.switch_to(TokenizerState::Data);
            }
            None => {
                self.parse_error("eof-in-doctype");
                self.doctype_force_quirks = true;
                self.emit_current_doctype();
                self.emit_eof();
            }
            Some(_) => {
                self.parse_error("missing-quote-before-doctype-system-identifier");
                self.doctype_force_quirks = true;
                self.reconsume_in(TokenizerState::BogusDoctype);
            }
        }
    }

    /// [§ 13.2.5.64 Before DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-system-identifier-state)
    fn handle_before_doctype_system_identifier_state(&mut self) {
        match self.current {
            Some(c) if Self::is_whitespace(c) => {}
            Some('"') => {
                self.doctype_system = Some(String::new());
                self.switch_to(TokenizerState::DoctypeSystemIdentifierDoubleQuoted);
            }
            Some('\'') => {
                self.doctype_system = Some(String::new());
                self.switch_to(TokenizerState::DoctypeSystemIdentifierSingleQuoted);
            }
            Some('>') => {
                self.parse_error("missing-doctype-system-identifier");
                self.doctype_force_quirks = true;
                self.emit_current_doctype();
                self.switch_to(TokenizerState::Data);
            }
            None => {
                self.parse_error("eof-in-doctype");
                self.doctype_force_quirks = true;
                self.emit_current_doctype();
                self.emit_eof();
            }
            Some(_) => {
                self.parse_error("missing-quote-before-doctype-system-identifier");
                self.doctype_force_quirks = true;
                self.reconsume_in(TokenizerState::BogusDoctype);
            }
        }
    }

    /// [§ 13.2.5.65 / 13.2.5.66 DOCTYPE system identifier (quoted) states](https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(double-quoted)-state)
    fn handle_doctype_system_identifier_state(&mut self, quote: char) {
        match self.current {
            Some(c) if c == quote => {
                self.switch_to(TokenizerState::AfterDoctypeSystemIdentifier);
            }
            Some('\0') => {
                self.parse_error("unexpected-null-character");
                if let Some(system) = self.doctype_system.as_mut() {
                    system.push('\u{FFFD}');
                }
            }
            Some('>') => {
                self.parse_error("abrupt-doctype-system-identifier");
                self.doctype_force_quirks = true;
                self.emit_current_doctype();
                self.switch_to(TokenizerState::Data);
            }
            None => {
                self.parse_error("eof-in-doctype");
                self.doctype_force_quirks = true;
                self.emit_current_doctype();
                self.emit_eof();
            }
            Some(c) => {
                if let Some(system) = self.doctype_system.as_mut() {
                    system.push(c);
                }
            }
        }
    }

    /// [§ 13.2.5.67 After DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-identifier-state)
    fn handle_after_doctype_system_identifier_state(&mut self) {
        match self.current {
            Some(c) if Self::is_whitespace(c) => {}
            Some('>') => {
                self.emit_current_doctype();
                self.switch_to(TokenizerState::Data);
            }
            None => {
                self.parse_error("eof-in-doctype");
                self.doctype_force_quirks = true;
                self.emit_current_doctype();
                self.emit_eof();
            }
            // "This is an unexpected-character-after-doctype-system-identifier
            //  parse error... (This does not set the current DOCTYPE token's
            //  force-quirks flag to on.)"
            Some(_) => {
                self.parse_error("unexpected-character-after-doctype-system-identifier");
                self.reconsume_in(TokenizerState::BogusDoctype);
            }
        }
    }

    /// [§ 13.2.5.68 Bogus DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state)
    fn handle_bogus_doctype_state(&mut self) {
        match self.current {
            Some('>') => {
                self.emit_current_doctype();
                self.switch_to(TokenizerState::Data);
            }
            Some('\0') => self.parse_error("unexpected-null-character"),
            None => {
                self.emit_current_doctype();
                self.emit_eof();
            }
            // "Ignore the character."
            Some(_) => {}
        }
    }

    /// [§ 13.2.5.69 CDATA section state](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-state)
    fn handle_cdata_section_state(&mut self) {
        match self.current {
            Some(']') => self.switch_to(TokenizerState::CdataSectionBracket),
            None => {
                self.parse_error("eof-in-cdata");
                self.emit_eof();
            }
            Some(c) => self.emit_char(c),
        }
    }

    /// [§ 13.2.5.70 CDATA section bracket state](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-bracket-state)
    fn handle_cdata_section_bracket_state(&mut self) {
        match self.current {
            Some(']') => self.switch_to(TokenizerState::CdataSectionEnd),
            _ => {
                self.emit_char(']');
                self.reconsume_in(TokenizerState::CdataSection);
            }
        }
    }

    /// [§ 13.2.5.71 CDATA section end state](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-end-state)
    fn handle_cdata_section_end_state(&mut self) {
        match self.current {
            Some(']') => self.emit_char(']'),
            Some('>') => self.switch_to(TokenizerState::Data),
            _ => {
                self.emit_char(']');
                self.emit_char(']');
                self.reconsume_in(TokenizerState::CdataSection);
            }
        }
    }
}
