//! The per-insertion-mode token handlers.
//!
//! [§ 13.2.6.4 The rules for parsing tokens in HTML content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhtml)
//!
//! One handler per insertion mode, dispatched from `process_token`. The
//! table-related modes fall back to the "in body" rules for anything they
//! do not handle, per the spec's "process the token using the rules for"
//! delegation; the "anything else" entry of "in table" additionally
//! enables foster parenting around the delegation.

use loam_dom::NodeId;

use super::InsertionMode;
use super::builder::{FormattingEntry, TreeBuilder};
use crate::tokenizer::Token;

impl TreeBuilder {
    /// [§ 13.2.6 Tree construction dispatcher](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    pub(super) fn process_token(&mut self, token: &Token) {
        match self.mode {
            InsertionMode::Initial => self.handle_initial_mode(token),
            InsertionMode::BeforeHtml => self.handle_before_html_mode(token),
            InsertionMode::BeforeHead => self.handle_before_head_mode(token),
            InsertionMode::InHead => self.handle_in_head_mode(token),
            InsertionMode::InHeadNoscript => self.handle_in_head_noscript_mode(token),
            InsertionMode::AfterHead => self.handle_after_head_mode(token),
            InsertionMode::InBody => self.handle_in_body_mode(token),
            InsertionMode::Text => self.handle_text_mode(token),
            InsertionMode::InTable => self.handle_in_table_mode(token),
            InsertionMode::InTableText => self.handle_in_table_text_mode(token),
            InsertionMode::InCaption => self.handle_in_caption_mode(token),
            InsertionMode::InColumnGroup => self.handle_in_column_group_mode(token),
            InsertionMode::InTableBody => self.handle_in_table_body_mode(token),
            InsertionMode::InRow => self.handle_in_row_mode(token),
            InsertionMode::InCell => self.handle_in_cell_mode(token),
            InsertionMode::InSelect => self.handle_in_select_mode(token),
            InsertionMode::InSelectInTable => self.handle_in_select_in_table_mode(token),
            InsertionMode::AfterBody => self.handle_after_body_mode(token),
            InsertionMode::InFrameset => self.handle_in_frameset_mode(token),
            InsertionMode::AfterFrameset => self.handle_after_frameset_mode(token),
            InsertionMode::AfterAfterBody => self.handle_after_after_body_mode(token),
            InsertionMode::AfterAfterFrameset => self.handle_after_after_frameset_mode(token),
        }
    }

    /// "Reprocess the token" - process the same token again after a mode
    /// switch.
    fn reprocess_token(&mut self, token: &Token) {
        self.process_token(token);
    }

    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    fn handle_initial_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009, U+000A, U+000C,
            //  U+000D, or U+0020 - Ignore the token."
            _ if token.is_whitespace() => {}
            // "A comment token - Insert a comment as the last child of the
            //  Document object."
            Token::Comment { data } => self.insert_comment_into(NodeId::ROOT, data),
            // "A DOCTYPE token - ... Append a DocumentType node to the
            //  Document node... Then switch the insertion mode to 'before
            //  html'."
            Token::Doctype { .. } => {
                self.insert_doctype(token);
                self.mode = InsertionMode::BeforeHtml;
            }
            // "Anything else - ... set the Document to quirks mode... switch
            //  the insertion mode to 'before html', then reprocess the token."
            _ => {
                self.doc.set_quirks_mode(true);
                self.mode = InsertionMode::BeforeHtml;
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    fn handle_before_html_mode(&mut self, token: &Token) {
        match token {
            Token::Doctype { .. } => self.parse_error("unexpected-doctype"),
            Token::Comment { data } => self.insert_comment_into(NodeId::ROOT, data),
            _ if token.is_whitespace() => {}
            // "A start tag whose tag name is 'html' - Create an element for
            //  the token... Append it to the Document object. Put this
            //  element in the stack of open elements."
            Token::StartTag { name, .. } if name == "html" => {
                let html_id = self.create_element_for_token(token);
                self.doc.append_child(NodeId::ROOT, html_id);
                self.open_elements.push(html_id);
                self.mode = InsertionMode::BeforeHead;
            }
            // "An end tag whose tag name is one of: 'head', 'body', 'html',
            //  'br' - Act as described in the 'anything else' entry below."
            Token::EndTag { name } if matches!(name.as_str(), "head" | "body" | "html" | "br") => {
                self.before_html_anything_else(token);
            }
            // "Any other end tag - Parse error. Ignore the token."
            Token::EndTag { .. } => self.parse_error("unexpected-end-tag-before-html"),
            _ => self.before_html_anything_else(token),
        }
    }

    /// "Create an html element whose node document is the Document object.
    /// Append it to the Document object... Switch the insertion mode to
    /// 'before head', then reprocess the token."
    fn before_html_anything_else(&mut self, token: &Token) {
        let html_id = self.create_element("html", &[]);
        self.doc.append_child(NodeId::ROOT, html_id);
        self.open_elements.push(html_id);
        self.mode = InsertionMode::BeforeHead;
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    fn handle_before_head_mode(&mut self, token: &Token) {
        match token {
            _ if token.is_whitespace() => {}
            Token::Comment { data } => self.insert_comment(data),
            Token::Doctype { .. } => self.parse_error("unexpected-doctype"),
            Token::StartTag { name, .. } if name == "html" => {
                self.handle_in_body_mode(token);
            }
            // "A start tag whose tag name is 'head' - Insert an HTML element
            //  for the token. Set the head element pointer to the newly
            //  created head element. Switch the insertion mode to 'in head'."
            Token::StartTag { name, .. } if name == "head" => {
                let head_id = self.insert_html_element(token);
                self.head_element = Some(head_id);
                self.mode = InsertionMode::InHead;
            }
            Token::EndTag { name } if matches!(name.as_str(), "head" | "body" | "html" | "br") => {
                self.before_head_anything_else(token);
            }
            Token::EndTag { .. } => self.parse_error("unexpected-end-tag-before-head"),
            _ => self.before_head_anything_else(token),
        }
    }

    /// "Insert an HTML element for a 'head' start tag token with no
    /// attributes... Switch the insertion mode to 'in head'. Reprocess the
    /// current token."
    fn before_head_anything_else(&mut self, token: &Token) {
        let head_id = self.insert_phantom_element("head");
        self.head_element = Some(head_id);
        self.mode = InsertionMode::InHead;
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    fn handle_in_head_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } if token.is_whitespace() => self.insert_character(*data),
            Token::Comment { data } => self.insert_comment(data),
            Token::Doctype { .. } => self.parse_error("unexpected-doctype"),
            Token::StartTag { name, .. } if name == "html" => {
                self.handle_in_body_mode(token);
            }
            // "A start tag whose tag name is one of: 'base', 'basefont',
            //  'bgsound', 'link' - Insert an HTML element for the token.
            //  Immediately pop the current node off the stack of open
            //  elements."
            Token::StartTag { name, .. }
                if matches!(name.as_str(), "base" | "basefont" | "bgsound" | "link") =>
            {
                let _ = self.insert_empty_element(token);
                if name == "base" {
                    self.maybe_rebase(token);
                }
            }
            // "A start tag whose tag name is 'meta' - Insert... Immediately
            //  pop." The charset attribute was already honored by the
            //  charset resolver's prescan.
            Token::StartTag { name, .. } if name == "meta" => {
                let _ = self.insert_empty_element(token);
            }
            // "A start tag whose tag name is 'title' - Follow the generic
            //  RCDATA element parsing algorithm."
            Token::StartTag { name, .. } if name == "title" => {
                self.parse_text_element(token);
            }
            // Scripting is disabled here, so: "A start tag whose tag name is
            //  'noscript', if the scripting flag is disabled - Insert an
            //  HTML element for the token. Switch the insertion mode to 'in
            //  head noscript'."
            Token::StartTag { name, .. } if name == "noscript" => {
                let _ = self.insert_html_element(token);
                self.mode = InsertionMode::InHeadNoscript;
            }
            // "A start tag whose tag name is one of: 'noframes', 'style' -
            //  Follow the generic raw text element parsing algorithm."
            Token::StartTag { name, .. } if matches!(name.as_str(), "noframes" | "style") => {
                self.parse_text_element(token);
            }
            // "A start tag whose tag name is 'script'" - the tokenizer is
            // already in script data; build the element and collect its text.
            Token::StartTag { name, .. } if name == "script" => {
                self.parse_text_element(token);
            }
            // "An end tag whose tag name is 'head' - Pop the current node
            //  (which will be the head element) off the stack of open
            //  elements. Switch the insertion mode to 'after head'."
            Token::EndTag { name } if name == "head" => {
                let _ = self.open_elements.pop();
                self.mode = InsertionMode::AfterHead;
            }
            Token::EndTag { name } if matches!(name.as_str(), "body" | "html" | "br") => {
                self.in_head_anything_else(token);
            }
            // "A start tag whose tag name is 'head' - Parse error. Ignore."
            Token::StartTag { name, .. } if name == "head" => {
                self.parse_error("unexpected-start-tag-head-in-head");
            }
            // "Any other end tag - Parse error. Ignore the token."
            Token::EndTag { .. } => self.parse_error("unexpected-end-tag-in-head"),
            _ => self.in_head_anything_else(token),
        }
    }

    /// "Pop the current node (which will be the head element) off the stack
    /// of open elements. Switch the insertion mode to 'after head'.
    /// Reprocess the token."
    fn in_head_anything_else(&mut self, token: &Token) {
        let _ = self.open_elements.pop();
        self.mode = InsertionMode::AfterHead;
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.2 Generic RCDATA / raw text element parsing](https://html.spec.whatwg.org/multipage/parsing.html#generic-rcdata-element-parsing-algorithm)
    ///
    /// "Insert an HTML element for the token... Let the original insertion
    /// mode be the current insertion mode. Then, switch the insertion mode
    /// to 'text'." The tokenizer switched its own content model when it
    /// emitted the start tag.
    fn parse_text_element(&mut self, token: &Token) {
        let _ = self.insert_html_element(token);
        self.original_mode = Some(self.mode);
        self.mode = InsertionMode::Text;
    }

    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    fn handle_in_head_noscript_mode(&mut self, token: &Token) {
        match token {
            Token::Doctype { .. } => self.parse_error("unexpected-doctype"),
            Token::StartTag { name, .. } if name == "html" => {
                self.handle_in_body_mode(token);
            }
            // "An end tag whose tag name is 'noscript' - Pop the current
            //  node... Switch the insertion mode to 'in head'."
            Token::EndTag { name } if name == "noscript" => {
                let _ = self.open_elements.pop();
                self.mode = InsertionMode::InHead;
            }
            // Whitespace, comments, and head-level metadata are processed
            // "using the rules for the 'in head' insertion mode".
            _ if token.is_whitespace() => self.handle_in_head_mode(token),
            Token::Comment { .. } => self.handle_in_head_mode(token),
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "basefont" | "bgsound" | "link" | "meta" | "noframes" | "style"
                ) =>
            {
                self.handle_in_head_mode(token);
            }
            Token::EndTag { name } if name == "br" => self.in_head_noscript_anything_else(token),
            Token::StartTag { name, .. } if matches!(name.as_str(), "head" | "noscript") => {
                self.parse_error("unexpected-start-tag-in-head-noscript");
            }
            Token::EndTag { .. } => self.parse_error("unexpected-end-tag-in-head-noscript"),
            _ => self.in_head_noscript_anything_else(token),
        }
    }

    /// "Parse error. Pop the current node (which will be a noscript
    /// element)... Switch the insertion mode to 'in head'. Reprocess."
    fn in_head_noscript_anything_else(&mut self, token: &Token) {
        self.parse_error("unexpected-token-in-head-noscript");
        let _ = self.open_elements.pop();
        self.mode = InsertionMode::InHead;
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    fn handle_after_head_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } if token.is_whitespace() => self.insert_character(*data),
            Token::Comment { data } => self.insert_comment(data),
            Token::Doctype { .. } => self.parse_error("unexpected-doctype"),
            Token::StartTag { name, .. } if name == "html" => {
                self.handle_in_body_mode(token);
            }
            // "A start tag whose tag name is 'body' - Insert an HTML element
            //  for the token. Set the frameset-ok flag to 'not ok'. Switch
            //  the insertion mode to 'in body'."
            Token::StartTag { name, .. } if name == "body" => {
                let _ = self.insert_html_element(token);
                self.frameset_ok = false;
                self.mode = InsertionMode::InBody;
            }
            // "A start tag whose tag name is 'frameset' - Insert an HTML
            //  element for the token. Switch the insertion mode to 'in
            //  frameset'."
            Token::StartTag { name, .. } if name == "frameset" => {
                let _ = self.insert_html_element(token);
                self.mode = InsertionMode::InFrameset;
            }
            // "A start tag whose tag name is one of: 'base', 'basefont',
            //  'bgsound', 'link', 'meta', 'noframes', 'script', 'style',
            //  'title' - Parse error. Push the node pointed to by the head
            //  element pointer onto the stack of open elements. Process the
            //  token using the rules for the 'in head' insertion mode.
            //  Remove the node... from the stack."
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "base"
                        | "basefont"
                        | "bgsound"
                        | "link"
                        | "meta"
                        | "noframes"
                        | "script"
                        | "style"
                        | "title"
                ) =>
            {
                self.parse_error("unexpected-head-content-after-head");
                if let Some(head_id) = self.head_element {
                    self.open_elements.push(head_id);
                    self.handle_in_head_mode(token);
                    self.open_elements.retain(|&id| id != head_id);
                } else {
                    self.handle_in_head_mode(token);
                }
            }
            Token::EndTag { name } if matches!(name.as_str(), "body" | "html" | "br") => {
                self.after_head_anything_else(token);
            }
            Token::StartTag { name, .. } if name == "head" => {
                self.parse_error("unexpected-start-tag-head-after-head");
            }
            Token::EndTag { .. } => self.parse_error("unexpected-end-tag-after-head"),
            _ => self.after_head_anything_else(token),
        }
    }

    /// "Insert an HTML element for a 'body' start tag token with no
    /// attributes. Switch the insertion mode to 'in body'. Reprocess."
    fn after_head_anything_else(&mut self, token: &Token) {
        let _ = self.insert_phantom_element("body");
        self.mode = InsertionMode::InBody;
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    #[allow(clippy::cognitive_complexity)]
    pub(super) fn handle_in_body_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is U+0000 NULL - Parse error. Ignore."
            // "A DOCTYPE token - Parse error. Ignore the token."
            Token::Character { data: '\0' } => self.parse_error("unexpected-null-character"),
            Token::Doctype { .. } => self.parse_error("unexpected-doctype"),

            // "Any other character token - Reconstruct the active formatting
            //  elements, if any. Insert the token's character." Non-space
            //  text also sets frameset-ok to "not ok".
            Token::Character { data } => {
                self.reconstruct_active_formatting();
                self.insert_character(*data);
                if !token.is_whitespace() {
                    self.frameset_ok = false;
                }
            }

            Token::Comment { data } => self.insert_comment(data),

            // "A start tag whose tag name is 'html' - Parse error... for
            //  each attribute on the token, check to see if the attribute is
            //  already present on the top element of the stack... If it is
            //  not, add the attribute."
            Token::StartTag {
                name, attributes, ..
            } if name == "html" => {
                self.parse_error("unexpected-start-tag-html-in-body");
                if let Some(&html_id) = self.open_elements.first() {
                    for attr in attributes {
                        if self.doc.attr(html_id, &attr.name).is_none() {
                            self.doc.set_attr(html_id, &attr.name, &attr.value);
                        }
                    }
                }
            }

            // Head-level metadata in body: "Process the token using the
            // rules for the 'in head' insertion mode."
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "base"
                        | "basefont"
                        | "bgsound"
                        | "link"
                        | "meta"
                        | "noframes"
                        | "script"
                        | "style"
                        | "title"
                ) =>
            {
                self.handle_in_head_mode(token);
            }

            // "A start tag whose tag name is 'body' - Parse error... add
            //  any absent attributes to the existing body element."
            Token::StartTag {
                name, attributes, ..
            } if name == "body" => {
                self.parse_error("unexpected-start-tag-body-in-body");
                if let Some(body_id) = self.doc.body() {
                    for attr in attributes {
                        if self.doc.attr(body_id, &attr.name).is_none() {
                            self.doc.set_attr(body_id, &attr.name, &attr.value);
                        }
                    }
                }
            }

            // "A start tag whose tag name is 'frameset' - Parse error. If
            //  the frameset-ok flag is set to 'not ok', ignore the token.
            //  Otherwise: remove the body element, pop all the nodes from
            //  the bottom of the stack... insert... switch to 'in frameset'."
            Token::StartTag { name, .. } if name == "frameset" => {
                self.parse_error("unexpected-start-tag-frameset-in-body");
                if self.frameset_ok {
                    if let Some(body_id) = self.doc.body() {
                        self.doc.detach(body_id);
                    }
                    self.open_elements.truncate(1);
                    let _ = self.insert_html_element(token);
                    self.mode = InsertionMode::InFrameset;
                }
            }

            // "An end-of-file token - Stop parsing."
            Token::EndOfFile => self.stopped = true,

            // "An end tag whose tag name is 'body' - If the stack of open
            //  elements does not have a body element in scope, this is a
            //  parse error; ignore the token. Otherwise... switch the
            //  insertion mode to 'after body'."
            Token::EndTag { name } if name == "body" => {
                if self.has_in_scope("body") {
                    self.mode = InsertionMode::AfterBody;
                } else {
                    self.parse_error("unexpected-end-tag-body");
                }
            }

            // "An end tag whose tag name is 'html' - Act as above, then
            //  reprocess the token."
            Token::EndTag { name } if name == "html" => {
                if self.has_in_scope("body") {
                    self.mode = InsertionMode::AfterBody;
                    self.reprocess_token(token);
                } else {
                    self.parse_error("unexpected-end-tag-html");
                }
            }

            // Block-level start tags: "If the stack of open elements has a p
            // element in button scope, then close a p element. Insert an
            // HTML element for the token."
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "address"
                        | "article"
                        | "aside"
                        | "blockquote"
                        | "center"
                        | "details"
                        | "dialog"
                        | "dir"
                        | "div"
                        | "dl"
                        | "fieldset"
                        | "figcaption"
                        | "figure"
                        | "footer"
                        | "header"
                        | "hgroup"
                        | "main"
                        | "menu"
                        | "nav"
                        | "ol"
                        | "p"
                        | "search"
                        | "section"
                        | "summary"
                        | "ul"
                ) =>
            {
                self.close_element_if_in_scope("p");
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is one of: 'h1'...'h6' - close p;
            //  if the current node is a heading, parse error, pop it; insert."
            Token::StartTag { name, .. }
                if matches!(name.as_str(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6") =>
            {
                self.close_element_if_in_scope("p");
                if self
                    .current_node()
                    .and_then(|id| self.tag_name(id))
                    .is_some_and(|tag| matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6"))
                {
                    self.parse_error("nested-heading");
                    let _ = self.open_elements.pop();
                }
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is one of: 'pre', 'listing' -
            //  close p; insert; skip an immediately following LF; set
            //  frameset-ok to 'not ok'."
            Token::StartTag { name, .. } if matches!(name.as_str(), "pre" | "listing") => {
                self.close_element_if_in_scope("p");
                let _ = self.insert_html_element(token);
                self.skip_next_token_if_newline();
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is 'form' - If the form element
            //  pointer is not null... parse error; ignore. Otherwise close
            //  p, insert, and point the form element pointer at it."
            Token::StartTag { name, .. } if name == "form" => {
                if self.form_element.is_some() {
                    self.parse_error("unexpected-start-tag-form-in-form");
                } else {
                    self.close_element_if_in_scope("p");
                    let form_id = self.insert_html_element(token);
                    self.form_element = Some(form_id);
                }
            }

            // "A start tag whose tag name is 'li'" - implicit closing of an
            //  open list item, per the loop over the stack.
            Token::StartTag { name, .. } if name == "li" => {
                self.frameset_ok = false;
                self.close_open_list_item(&["li"]);
                self.close_element_if_in_scope("p");
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is one of: 'dd', 'dt'" - same
            //  shape as li, closing either open definition-list item.
            Token::StartTag { name, .. } if matches!(name.as_str(), "dd" | "dt") => {
                self.frameset_ok = false;
                self.close_open_list_item(&["dd", "dt"]);
                self.close_element_if_in_scope("p");
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is 'plaintext' - close p; insert.
            //  (The tokenizer is already in the PLAINTEXT state.)"
            Token::StartTag { name, .. } if name == "plaintext" => {
                self.close_element_if_in_scope("p");
                let _ = self.insert_html_element(token);
            }

            // "A start tag whose tag name is 'button' - If the stack has a
            //  button element in scope: parse error, generate implied end
            //  tags, pop until button. Reconstruct; insert; frameset-ok off."
            Token::StartTag { name, .. } if name == "button" => {
                if self.has_in_scope("button") {
                    self.parse_error("unexpected-start-tag-button-in-button");
                    self.generate_implied_end_tags();
                    self.pop_until_tag("button");
                }
                self.reconstruct_active_formatting();
                let _ = self.insert_html_element(token);
                self.frameset_ok = false;
            }

            // Block-level end tags: "If the stack of open elements does not
            //  have an element in scope with the same tag name... parse
            //  error; ignore. Otherwise: generate implied end tags; if the
            //  current node is not an element with the same tag name, parse
            //  error; pop until the element has been popped."
            Token::EndTag { name }
                if matches!(
                    name.as_str(),
                    "address"
                        | "article"
                        | "aside"
                        | "blockquote"
                        | "button"
                        | "center"
                        | "details"
                        | "dialog"
                        | "dir"
                        | "div"
                        | "dl"
                        | "fieldset"
                        | "figcaption"
                        | "figure"
                        | "footer"
                        | "header"
                        | "hgroup"
                        | "listing"
                        | "main"
                        | "menu"
                        | "nav"
                        | "ol"
                        | "pre"
                        | "search"
                        | "section"
                        | "summary"
                        | "ul"
                ) =>
            {
                if self.has_in_scope(name) {
                    self.generate_implied_end_tags();
                    if !self.current_is(name) {
                        self.parse_error("end-tag-too-early");
                    }
                    self.pop_until_tag(name);
                } else {
                    self.parse_error("unexpected-end-tag");
                }
            }

            // "An end tag whose tag name is 'form'" - clear the pointer and
            //  remove that specific element from the stack.
            Token::EndTag { name } if name == "form" => {
                let node = self.form_element.take();
                match node {
                    Some(form_id) if self.has_in_scope("form") => {
                        self.generate_implied_end_tags();
                        if self.current_node() != Some(form_id) {
                            self.parse_error("end-tag-too-early-form");
                        }
                        self.open_elements.retain(|&id| id != form_id);
                    }
                    _ => self.parse_error("unexpected-end-tag-form"),
                }
            }

            // "An end tag whose tag name is 'p' - If the stack of open
            //  elements does not have a p element in button scope, then this
            //  is a parse error; insert an HTML element for a 'p' start tag
            //  token with no attributes. Close a p element."
            Token::EndTag { name } if name == "p" => {
                if !self.has_in_button_scope("p") {
                    self.parse_error("unexpected-end-tag-p");
                    let _ = self.insert_phantom_element("p");
                }
                self.close_element_if_in_scope("p");
            }

            // "An end tag whose tag name is 'li' - If the stack does not
            //  have an li element in list item scope... parse error; ignore."
            Token::EndTag { name } if name == "li" => {
                if self.has_in_list_item_scope("li") {
                    self.generate_implied_end_tags_excluding(Some("li"));
                    if !self.current_is("li") {
                        self.parse_error("end-tag-too-early-li");
                    }
                    self.pop_until_tag("li");
                } else {
                    self.parse_error("unexpected-end-tag-li");
                }
            }

            Token::EndTag { name } if matches!(name.as_str(), "dd" | "dt") => {
                if self.has_in_scope(name) {
                    self.generate_implied_end_tags_excluding(Some(name));
                    if !self.current_is(name) {
                        self.parse_error("end-tag-too-early");
                    }
                    self.pop_until_tag(name);
                } else {
                    self.parse_error("unexpected-end-tag");
                }
            }

            // "An end tag whose tag name is one of: 'h1'...'h6' - pop until
            //  any heading has been popped."
            Token::EndTag { name }
                if matches!(name.as_str(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6") =>
            {
                const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];
                if HEADINGS.iter().any(|h| self.has_in_scope(h)) {
                    self.generate_implied_end_tags();
                    if !self.current_is(name) {
                        self.parse_error("end-tag-too-early-heading");
                    }
                    self.pop_until_one_of(HEADINGS);
                } else {
                    self.parse_error("unexpected-end-tag-heading");
                }
            }

            // "A start tag whose tag name is 'a' - If the list of active
            //  formatting elements contains an a element between the end of
            //  the list and the last marker... parse error; run the
            //  adoption agency algorithm, then remove that element from the
            //  list and the stack."
            Token::StartTag { name, .. } if name == "a" => {
                let existing = self
                    .active_formatting
                    .iter()
                    .rev()
                    .take_while(|entry| !matches!(entry, FormattingEntry::Marker))
                    .find_map(|entry| match entry {
                        FormattingEntry::Element { node_id, token } if token.is_start_tag("a") => {
                            Some(*node_id)
                        }
                        _ => None,
                    });
                if let Some(existing_id) = existing {
                    self.parse_error("unexpected-start-tag-a-in-a");
                    self.run_adoption_agency("a");
                    self.active_formatting.retain(|entry| {
                        !matches!(entry, FormattingEntry::Element { node_id, .. } if *node_id == existing_id)
                    });
                    self.open_elements.retain(|&id| id != existing_id);
                }
                self.reconstruct_active_formatting();
                let element_id = self.insert_html_element(token);
                self.push_active_formatting(element_id, token);
            }

            // "A start tag whose tag name is 'nobr' - Reconstruct; if the
            //  stack has a nobr element in scope, parse error, run the
            //  adoption agency, reconstruct again. Insert; push onto the
            //  list of active formatting elements."
            Token::StartTag { name, .. } if name == "nobr" => {
                self.reconstruct_active_formatting();
                if self.has_in_scope("nobr") {
                    self.parse_error("unexpected-start-tag-nobr-in-nobr");
                    self.run_adoption_agency("nobr");
                    self.reconstruct_active_formatting();
                }
                let element_id = self.insert_html_element(token);
                self.push_active_formatting(element_id, token);
            }

            // Formatting start tags: "Reconstruct the active formatting
            //  elements, if any. Insert an HTML element for the token. Push
            //  onto the list of active formatting elements that element."
            Token::StartTag { name, .. } if Self::is_formatting_element(name) => {
                self.reconstruct_active_formatting();
                let element_id = self.insert_html_element(token);
                self.push_active_formatting(element_id, token);
            }

            // Formatting end tags: "Run the adoption agency algorithm for
            //  the token."
            Token::EndTag { name } if Self::is_formatting_element(name) => {
                self.run_adoption_agency(name);
            }

            // "A start tag whose tag name is one of: 'applet', 'marquee',
            //  'object' - Reconstruct; insert; insert a marker at the end of
            //  the list of active formatting elements; frameset-ok off."
            Token::StartTag { name, .. }
                if matches!(name.as_str(), "applet" | "marquee" | "object") =>
            {
                self.reconstruct_active_formatting();
                let _ = self.insert_html_element(token);
                self.active_formatting.push(FormattingEntry::Marker);
                self.frameset_ok = false;
            }

            // "An end tag token whose tag name is one of: 'applet',
            //  'marquee', 'object' - pop until the name; clear the list of
            //  active formatting elements up to the last marker."
            Token::EndTag { name } if matches!(name.as_str(), "applet" | "marquee" | "object") => {
                if self.has_in_scope(name) {
                    self.generate_implied_end_tags();
                    if !self.current_is(name) {
                        self.parse_error("end-tag-too-early");
                    }
                    self.pop_until_tag(name);
                    self.clear_formatting_to_last_marker();
                } else {
                    self.parse_error("unexpected-end-tag");
                }
            }

            // "A start tag whose tag name is 'table' - If the Document is
            //  not in quirks mode and the stack has a p element in button
            //  scope, close a p element. Insert; frameset-ok off; switch
            //  the insertion mode to 'in table'."
            Token::StartTag { name, .. } if name == "table" => {
                if !self.doc.quirks_mode() {
                    self.close_element_if_in_scope("p");
                }
                let _ = self.insert_html_element(token);
                self.frameset_ok = false;
                self.mode = InsertionMode::InTable;
            }

            // "An end tag whose tag name is 'br' - Parse error. Act as
            //  described in the 'br' start tag entry." (drops any
            //  attributes by construction, since end tags carry none)
            Token::EndTag { name } if name == "br" => {
                self.parse_error("unexpected-end-tag-br");
                self.reconstruct_active_formatting();
                let _ = self.insert_phantom_element("br");
                let _ = self.open_elements.pop();
                self.frameset_ok = false;
            }

            // Void-level start tags: "Reconstruct; insert; immediately pop;
            //  acknowledge the self-closing flag; frameset-ok off."
            Token::StartTag { name, .. }
                if matches!(name.as_str(), "area" | "br" | "embed" | "img" | "keygen" | "wbr") =>
            {
                self.reconstruct_active_formatting();
                let _ = self.insert_empty_element(token);
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is 'input' - ... if the token
            //  does not have an attribute with the name 'type', or if it
            //  does, but that attribute's value is not an ASCII
            //  case-insensitive match for the string 'hidden', then: set
            //  the frameset-ok flag to 'not ok'."
            Token::StartTag {
                name, attributes, ..
            } if name == "input" => {
                self.reconstruct_active_formatting();
                let _ = self.insert_empty_element(token);
                let hidden = attributes
                    .iter()
                    .find(|attr| attr.name == "type")
                    .is_some_and(|attr| attr.value.eq_ignore_ascii_case("hidden"));
                if !hidden {
                    self.frameset_ok = false;
                }
            }

            // "A start tag whose tag name is one of: 'param', 'source',
            //  'track' - Insert; immediately pop."
            Token::StartTag { name, .. }
                if matches!(name.as_str(), "param" | "source" | "track") =>
            {
                let _ = self.insert_empty_element(token);
            }

            // "A start tag whose tag name is 'hr' - close p; insert;
            //  immediately pop; frameset-ok off."
            Token::StartTag { name, .. } if name == "hr" => {
                self.close_element_if_in_scope("p");
                let _ = self.insert_empty_element(token);
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is 'image' - Parse error. Change
            //  the token's tag name to 'img' and reprocess it. (Don't ask.)"
            Token::StartTag {
                attributes,
                self_closing,
                name,
            } if name == "image" => {
                self.parse_error("unexpected-start-tag-image");
                let img = Token::StartTag {
                    name: "img".to_string(),
                    self_closing: *self_closing,
                    attributes: attributes.clone(),
                };
                self.reprocess_token(&img);
            }

            // "A start tag whose tag name is 'textarea'" - skip a leading
            //  LF; the tokenizer is already in RCDATA.
            Token::StartTag { name, .. } if name == "textarea" => {
                let _ = self.insert_html_element(token);
                self.skip_next_token_if_newline();
                self.frameset_ok = false;
                self.original_mode = Some(self.mode);
                self.mode = InsertionMode::Text;
            }

            // "A start tag whose tag name is 'xmp' - close p; reconstruct;
            //  frameset-ok off; generic raw text."
            Token::StartTag { name, .. } if name == "xmp" => {
                self.close_element_if_in_scope("p");
                self.reconstruct_active_formatting();
                self.frameset_ok = false;
                self.parse_text_element(token);
            }

            // "A start tag whose tag name is 'iframe' - frameset-ok off;
            //  generic raw text."
            Token::StartTag { name, .. } if name == "iframe" => {
                self.frameset_ok = false;
                self.parse_text_element(token);
            }

            // "A start tag whose tag name is 'noembed'" (and 'noscript'
            //  would join it only with scripting enabled).
            Token::StartTag { name, .. } if name == "noembed" => {
                self.parse_text_element(token);
            }

            // "A start tag whose tag name is 'select' - Reconstruct;
            //  insert; frameset-ok off; switch to 'in select' (or 'in
            //  select in table' from a table-related mode)."
            Token::StartTag { name, .. } if name == "select" => {
                self.reconstruct_active_formatting();
                let _ = self.insert_html_element(token);
                self.frameset_ok = false;
                self.mode = match self.mode {
                    InsertionMode::InTable
                    | InsertionMode::InCaption
                    | InsertionMode::InTableBody
                    | InsertionMode::InRow
                    | InsertionMode::InCell => InsertionMode::InSelectInTable,
                    _ => InsertionMode::InSelect,
                };
            }

            // "A start tag whose tag name is one of: 'optgroup', 'option' -
            //  If the current node is an option element, pop it.
            //  Reconstruct; insert."
            Token::StartTag { name, .. } if matches!(name.as_str(), "optgroup" | "option") => {
                if self.current_is("option") {
                    let _ = self.open_elements.pop();
                }
                self.reconstruct_active_formatting();
                let _ = self.insert_html_element(token);
            }

            // Table-structure tags loose in body: "Parse error. Ignore."
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "frame" | "head" | "tbody" | "td" | "tfoot"
                        | "th" | "thead" | "tr"
                ) =>
            {
                self.parse_error("unexpected-start-tag-ignored");
            }

            // "Any other start tag - Reconstruct the active formatting
            //  elements, if any. Insert an HTML element for the token."
            //  A self-closed unknown element stays empty.
            Token::StartTag { self_closing, .. } => {
                self.reconstruct_active_formatting();
                if *self_closing {
                    let _ = self.insert_empty_element(token);
                } else {
                    let _ = self.insert_html_element(token);
                }
            }

            // "Any other end tag" - the walk-and-match fallback.
            Token::EndTag { name } => self.any_other_end_tag(name),
        }
    }

    /// [§ 13.2.6.4.7 "in body" - Start tag li / dd / dt](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    ///
    /// "Initialize node to be the current node. Loop: If node is an
    /// [li/dd/dt] element, then run these substeps: generate implied end
    /// tags, except for [the tag]... pop elements until [it] has been
    /// popped. If node is in the special category, but is not an address,
    /// div, or p element, then jump to the step labeled done."
    fn close_open_list_item(&mut self, targets: &[&str]) {
        for &node_id in self.open_elements.clone().iter().rev() {
            let Some(tag) = self.tag_name(node_id).map(str::to_string) else {
                continue;
            };
            if targets.contains(&tag.as_str()) {
                self.generate_implied_end_tags_excluding(Some(&tag));
                if !self.current_is(&tag) {
                    self.parse_error("unexpected-implicitly-closed-element");
                }
                self.pop_until_tag(&tag);
                return;
            }
            if Self::is_special_element(&tag) && !matches!(tag.as_str(), "address" | "div" | "p") {
                return;
            }
        }
    }

    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    fn handle_text_mode(&mut self, token: &Token) {
        // Script and style payloads become Data nodes (serialized verbatim,
        // excluded from text()); RCDATA payloads are ordinary text.
        let in_data_element = self
            .current_node()
            .and_then(|id| self.tag_name(id))
            .is_some_and(|tag| {
                matches!(tag, "script" | "style" | "xmp" | "iframe" | "noembed" | "noframes")
            });
        match token {
            // "A character token - Insert the token's character."
            Token::Character { data } => {
                if in_data_element {
                    self.insert_data_character(*data);
                } else {
                    self.insert_character(*data);
                }
            }
            // "An end-of-file token - Parse error... Pop the current node
            //  off the stack of open elements. Switch the insertion mode to
            //  the original insertion mode and reprocess the token."
            Token::EndOfFile => {
                self.parse_error("eof-in-text-element");
                let _ = self.open_elements.pop();
                self.mode = self.original_mode.take().unwrap_or(InsertionMode::InBody);
                self.reprocess_token(token);
            }
            // "Any other end tag - Pop the current node off the stack of
            //  open elements. Switch the insertion mode to the original
            //  insertion mode."
            _ => {
                let _ = self.open_elements.pop();
                self.mode = self.original_mode.take().unwrap_or(InsertionMode::InBody);
            }
        }
    }

    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    fn handle_in_table_mode(&mut self, token: &Token) {
        match token {
            // "A character token, if the current node is table, tbody,
            //  tfoot, thead, or tr element - Let the pending table character
            //  tokens be an empty list... switch the insertion mode to 'in
            //  table text' and reprocess the token."
            Token::Character { .. }
                if self
                    .current_node()
                    .and_then(|id| self.tag_name(id))
                    .is_some_and(|tag| {
                        matches!(tag, "table" | "tbody" | "tfoot" | "thead" | "tr")
                    }) =>
            {
                self.pending_table_text.clear();
                self.original_mode = Some(self.mode);
                self.mode = InsertionMode::InTableText;
                self.reprocess_token(token);
            }
            Token::Comment { data } => self.insert_comment(data),
            Token::Doctype { .. } => self.parse_error("unexpected-doctype"),
            // "A start tag whose tag name is 'caption' - Clear the stack
            //  back to a table context. Insert a marker at the end of the
            //  list of active formatting elements. Insert an HTML element
            //  for the token, then switch the insertion mode to 'in
            //  caption'."
            Token::StartTag { name, .. } if name == "caption" => {
                self.clear_stack_to_table_context();
                self.active_formatting.push(FormattingEntry::Marker);
                let _ = self.insert_html_element(token);
                self.mode = InsertionMode::InCaption;
            }
            // "A start tag whose tag name is 'colgroup' - Clear the stack
            //  back to a table context. Insert... switch to 'in column
            //  group'."
            Token::StartTag { name, .. } if name == "colgroup" => {
                self.clear_stack_to_table_context();
                let _ = self.insert_html_element(token);
                self.mode = InsertionMode::InColumnGroup;
            }
            // "A start tag whose tag name is 'col' - ... act as if a
            //  'colgroup' start tag had been seen, then reprocess."
            Token::StartTag { name, .. } if name == "col" => {
                self.clear_stack_to_table_context();
                let _ = self.insert_phantom_element("colgroup");
                self.mode = InsertionMode::InColumnGroup;
                self.reprocess_token(token);
            }
            // "A start tag whose tag name is one of: 'tbody', 'tfoot',
            //  'thead' - Clear the stack back to a table context. Insert...
            //  switch to 'in table body'."
            Token::StartTag { name, .. }
                if matches!(name.as_str(), "tbody" | "tfoot" | "thead") =>
            {
                self.clear_stack_to_table_context();
                let _ = self.insert_html_element(token);
                self.mode = InsertionMode::InTableBody;
            }
            // "A start tag whose tag name is one of: 'td', 'th', 'tr' -
            //  ... act as if a 'tbody' start tag had been seen, then
            //  reprocess."
            Token::StartTag { name, .. } if matches!(name.as_str(), "td" | "th" | "tr") => {
                self.clear_stack_to_table_context();
                let _ = self.insert_phantom_element("tbody");
                self.mode = InsertionMode::InTableBody;
                self.reprocess_token(token);
            }
            // "A start tag whose tag name is 'table' - Parse error. If the
            //  stack... does not have a table element in table scope, ignore
            //  the token. Otherwise: pop elements until a table element has
            //  been popped; reset the insertion mode appropriately;
            //  reprocess."
            Token::StartTag { name, .. } if name == "table" => {
                self.parse_error("unexpected-start-tag-table-in-table");
                if self.has_in_table_scope("table") {
                    self.pop_until_tag("table");
                    self.reset_insertion_mode();
                    self.reprocess_token(token);
                }
            }
            // "An end tag whose tag name is 'table'"
            Token::EndTag { name } if name == "table" => {
                if self.has_in_table_scope("table") {
                    self.pop_until_tag("table");
                    self.reset_insertion_mode();
                } else {
                    self.parse_error("unexpected-end-tag-table");
                }
            }
            // "An end tag whose tag name is one of: 'body', 'caption',
            //  'col', 'colgroup', 'html', 'tbody', 'td', 'tfoot', 'th',
            //  'thead', 'tr' - Parse error. Ignore the token."
            Token::EndTag { name }
                if matches!(
                    name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot"
                        | "th" | "thead" | "tr"
                ) =>
            {
                self.parse_error("unexpected-end-tag-in-table");
            }
            // "A start tag whose tag name is one of: 'style', 'script' -
            //  Process the token using the rules for the 'in head' insertion
            //  mode."
            Token::StartTag { name, .. } if matches!(name.as_str(), "style" | "script") => {
                self.handle_in_head_mode(token);
            }
            // "A start tag whose tag name is 'input', with a type attribute
            //  whose value is 'hidden' - Parse error. Insert; immediately
            //  pop."
            Token::StartTag {
                name, attributes, ..
            } if name == "input"
                && attributes
                    .iter()
                    .find(|attr| attr.name == "type")
                    .is_some_and(|attr| attr.value.eq_ignore_ascii_case("hidden")) =>
            {
                self.parse_error("unexpected-hidden-input-in-table");
                let _ = self.insert_empty_element(token);
            }
            // "A start tag whose tag name is 'form' - Parse error. If the
            //  form element pointer is not null, ignore. Otherwise insert,
            //  set the pointer, and pop."
            Token::StartTag { name, .. } if name == "form" => {
                self.parse_error("unexpected-start-tag-form-in-table");
                if self.form_element.is_none() {
                    let form_id = self.insert_empty_element(token);
                    self.form_element = Some(form_id);
                }
            }
            // "An end-of-file token - Process the token using the rules for
            //  the 'in body' insertion mode."
            Token::EndOfFile => self.handle_in_body_mode(token),
            // "Anything else - Parse error. Enable foster parenting, process
            //  the token using the rules for the 'in body' insertion mode,
            //  and then disable foster parenting."
            _ => self.in_table_anything_else(token),
        }
    }

    /// The foster-parenting delegation shared by "in table" and the pending
    /// character flush of "in table text".
    fn in_table_anything_else(&mut self, token: &Token) {
        self.parse_error("unexpected-token-in-table");
        self.foster_parenting = true;
        self.handle_in_body_mode(token);
        self.foster_parenting = false;
    }

    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    fn handle_in_table_text_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data: '\0' } => self.parse_error("unexpected-null-character"),
            // "Any other character token - Append the character token to the
            //  pending table character tokens list."
            Token::Character { data } => self.pending_table_text.push(*data),
            // "Anything else - If any of the tokens in the pending table
            //  character tokens list are character tokens that are not ASCII
            //  whitespace, then this is a parse error: reprocess [them]
            //  using the 'anything else' entry of 'in table'. Otherwise,
            //  insert the characters. Then switch the insertion mode back to
            //  the original insertion mode and reprocess the token."
            _ => {
                let pending: Vec<char> = std::mem::take(&mut self.pending_table_text);
                let all_whitespace = pending
                    .iter()
                    .all(|c| matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' '));
                if all_whitespace {
                    for c in pending {
                        self.insert_character(c);
                    }
                } else {
                    for c in pending {
                        let char_token = Token::Character { data: c };
                        self.in_table_anything_else(&char_token);
                    }
                }
                self.mode = self.original_mode.take().unwrap_or(InsertionMode::InTable);
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    fn handle_in_caption_mode(&mut self, token: &Token) {
        match token {
            // "An end tag whose tag name is 'caption'"
            Token::EndTag { name } if name == "caption" => {
                if self.has_in_table_scope("caption") {
                    self.generate_implied_end_tags();
                    if !self.current_is("caption") {
                        self.parse_error("end-tag-too-early-caption");
                    }
                    self.pop_until_tag("caption");
                    self.clear_formatting_to_last_marker();
                    self.mode = InsertionMode::InTable;
                } else {
                    self.parse_error("unexpected-end-tag-caption");
                }
            }
            // "A start tag whose tag name is one of: 'caption', 'col',
            //  'colgroup', 'tbody', 'td', 'tfoot', 'th', 'thead', 'tr', or
            //  an end tag whose tag name is 'table' - Parse error; close the
            //  caption (if in scope) and reprocess."
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead"
                        | "tr"
                ) =>
            {
                self.close_caption_and_reprocess(token);
            }
            Token::EndTag { name } if name == "table" => {
                self.close_caption_and_reprocess(token);
            }
            // "An end tag whose tag name is one of: 'body', 'col',
            //  'colgroup', 'html', 'tbody', 'td', 'tfoot', 'th', 'thead',
            //  'tr' - Parse error. Ignore the token."
            Token::EndTag { name }
                if matches!(
                    name.as_str(),
                    "body" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot" | "th"
                        | "thead" | "tr"
                ) =>
            {
                self.parse_error("unexpected-end-tag-in-caption");
            }
            // "Anything else - Process the token using the rules for the
            //  'in body' insertion mode."
            _ => self.handle_in_body_mode(token),
        }
    }

    fn close_caption_and_reprocess(&mut self, token: &Token) {
        self.parse_error("unexpected-table-structure-in-caption");
        if self.has_in_table_scope("caption") {
            self.generate_implied_end_tags();
            self.pop_until_tag("caption");
            self.clear_formatting_to_last_marker();
            self.mode = InsertionMode::InTable;
            self.reprocess_token(token);
        }
    }

    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolumngroup)
    fn handle_in_column_group_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } if token.is_whitespace() => self.insert_character(*data),
            Token::Comment { data } => self.insert_comment(data),
            Token::Doctype { .. } => self.parse_error("unexpected-doctype"),
            Token::StartTag { name, .. } if name == "html" => {
                self.handle_in_body_mode(token);
            }
            // "A start tag whose tag name is 'col' - Insert an HTML element
            //  for the token. Immediately pop."
            Token::StartTag { name, .. } if name == "col" => {
                let _ = self.insert_empty_element(token);
            }
            // "An end tag whose tag name is 'colgroup' - If the current node
            //  is not a colgroup element, parse error; ignore. Otherwise pop
            //  and switch to 'in table'."
            Token::EndTag { name } if name == "colgroup" => {
                if self.current_is("colgroup") {
                    let _ = self.open_elements.pop();
                    self.mode = InsertionMode::InTable;
                } else {
                    self.parse_error("unexpected-end-tag-colgroup");
                }
            }
            // "An end tag whose tag name is 'col' - Parse error. Ignore."
            Token::EndTag { name } if name == "col" => {
                self.parse_error("unexpected-end-tag-col");
            }
            Token::EndOfFile => self.handle_in_body_mode(token),
            // "Anything else - If the current node is not a colgroup
            //  element, parse error; ignore. Otherwise pop, switch to 'in
            //  table', and reprocess."
            _ => {
                if self.current_is("colgroup") {
                    let _ = self.open_elements.pop();
                    self.mode = InsertionMode::InTable;
                    self.reprocess_token(token);
                } else {
                    self.parse_error("unexpected-token-in-column-group");
                }
            }
        }
    }

    /// "Clear the stack back to a table context": "pop elements from the
    /// stack of open elements until the current node is a table, template,
    /// or html element."
    fn clear_stack_to_table_context(&mut self) {
        while let Some(current) = self.current_node() {
            if self
                .tag_name(current)
                .is_some_and(|tag| matches!(tag, "table" | "template" | "html"))
            {
                break;
            }
            let _ = self.open_elements.pop();
        }
    }

    /// "Clear the stack back to a table body context": stop at tbody,
    /// tfoot, thead, template, or html.
    fn clear_stack_to_table_body_context(&mut self) {
        while let Some(current) = self.current_node() {
            if self
                .tag_name(current)
                .is_some_and(|tag| matches!(tag, "tbody" | "tfoot" | "thead" | "template" | "html"))
            {
                break;
            }
            let _ = self.open_elements.pop();
        }
    }

    /// "Clear the stack back to a table row context": stop at tr, template,
    /// or html.
    fn clear_stack_to_table_row_context(&mut self) {
        while let Some(current) = self.current_node() {
            if self
                .tag_name(current)
                .is_some_and(|tag| matches!(tag, "tr" | "template" | "html"))
            {
                break;
            }
            let _ = self.open_elements.pop();
        }
    }

    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intablebody)
    fn handle_in_table_body_mode(&mut self, token: &Token) {
        match token {
            // "A start tag whose tag name is 'tr' - Clear the stack back to
            //  a table body context. Insert... switch to 'in row'."
            Token::StartTag { name, .. } if name == "tr" => {
                self.clear_stack_to_table_body_context();
                let _ = self.insert_html_element(token);
                self.mode = InsertionMode::InRow;
            }
            // "A start tag whose tag name is one of: 'th', 'td' - Parse
            //  error... act as if a 'tr' start tag had been seen, then
            //  reprocess."
            Token::StartTag { name, .. } if matches!(name.as_str(), "th" | "td") => {
                self.parse_error("unexpected-cell-in-table-body");
                self.clear_stack_to_table_body_context();
                let _ = self.insert_phantom_element("tr");
                self.mode = InsertionMode::InRow;
                self.reprocess_token(token);
            }
            // "An end tag whose tag name is one of: 'tbody', 'tfoot',
            //  'thead'"
            Token::EndTag { name } if matches!(name.as_str(), "tbody" | "tfoot" | "thead") => {
                if self.has_in_table_scope(name) {
                    self.clear_stack_to_table_body_context();
                    let _ = self.open_elements.pop();
                    self.mode = InsertionMode::InTable;
                } else {
                    self.parse_error("unexpected-end-tag-in-table-body");
                }
            }
            // "A start tag whose tag name is one of: 'caption', 'col',
            //  'colgroup', 'tbody', 'tfoot', 'thead', or an end tag whose
            //  tag name is 'table'"
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead"
                ) =>
            {
                self.close_table_body_and_reprocess(token);
            }
            Token::EndTag { name } if name == "table" => {
                self.close_table_body_and_reprocess(token);
            }
            // "An end tag whose tag name is one of: 'body', 'caption',
            //  'col', 'colgroup', 'html', 'td', 'th', 'tr' - Parse error.
            //  Ignore the token."
            Token::EndTag { name }
                if matches!(
                    name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" | "tr"
                ) =>
            {
                self.parse_error("unexpected-end-tag-in-table-body");
            }
            // "Anything else - Process the token using the rules for the
            //  'in table' insertion mode."
            _ => self.handle_in_table_mode(token),
        }
    }

    fn close_table_body_and_reprocess(&mut self, token: &Token) {
        // "If the stack of open elements does not have a tbody, thead, or
        //  tfoot element in table scope, this is a parse error; ignore."
        if ["tbody", "thead", "tfoot"]
            .iter()
            .any(|tag| self.has_in_table_scope(tag))
        {
            self.clear_stack_to_table_body_context();
            let _ = self.open_elements.pop();
            self.mode = InsertionMode::InTable;
            self.reprocess_token(token);
        } else {
            self.parse_error("unexpected-table-structure");
        }
    }

    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inrow)
    fn handle_in_row_mode(&mut self, token: &Token) {
        match token {
            // "A start tag whose tag name is one of: 'th', 'td' - Clear the
            //  stack back to a table row context. Insert... switch to 'in
            //  cell'. Insert a marker at the end of the list of active
            //  formatting elements."
            Token::StartTag { name, .. } if matches!(name.as_str(), "th" | "td") => {
                self.clear_stack_to_table_row_context();
                let _ = self.insert_html_element(token);
                self.mode = InsertionMode::InCell;
                self.active_formatting.push(FormattingEntry::Marker);
            }
            // "An end tag whose tag name is 'tr'"
            Token::EndTag { name } if name == "tr" => {
                if self.has_in_table_scope("tr") {
                    self.clear_stack_to_table_row_context();
                    let _ = self.open_elements.pop();
                    self.mode = InsertionMode::InTableBody;
                } else {
                    self.parse_error("unexpected-end-tag-tr");
                }
            }
            // "A start tag whose tag name is one of: 'caption', 'col',
            //  'colgroup', 'tbody', 'tfoot', 'thead', 'tr', or an end tag
            //  whose tag name is 'table' - If the stack has a tr element in
            //  table scope: close the row and reprocess. Otherwise parse
            //  error; ignore."
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" | "tr"
                ) =>
            {
                self.close_row_and_reprocess(token);
            }
            Token::EndTag { name } if name == "table" => self.close_row_and_reprocess(token),
            // "An end tag whose tag name is one of: 'tbody', 'tfoot',
            //  'thead' - If the stack does not have [name] in table scope,
            //  parse error; ignore. If it has no tr in table scope, ignore.
            //  Otherwise close the row and reprocess."
            Token::EndTag { name } if matches!(name.as_str(), "tbody" | "tfoot" | "thead") => {
                if self.has_in_table_scope(name) {
                    self.close_row_and_reprocess(token);
                } else {
                    self.parse_error("unexpected-end-tag-in-row");
                }
            }
            // "An end tag whose tag name is one of: 'body', 'caption',
            //  'col', 'colgroup', 'html', 'td', 'th' - Parse error. Ignore."
            Token::EndTag { name }
                if matches!(
                    name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th"
                ) =>
            {
                self.parse_error("unexpected-end-tag-in-row");
            }
            _ => self.handle_in_table_mode(token),
        }
    }

    fn close_row_and_reprocess(&mut self, token: &Token) {
        if self.has_in_table_scope("tr") {
            self.clear_stack_to_table_row_context();
            let _ = self.open_elements.pop();
            self.mode = InsertionMode::InTableBody;
            self.reprocess_token(token);
        } else {
            self.parse_error("unexpected-token-in-row");
        }
    }

    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incell)
    fn handle_in_cell_mode(&mut self, token: &Token) {
        match token {
            // "An end tag whose tag name is one of: 'td', 'th'"
            Token::EndTag { name } if matches!(name.as_str(), "td" | "th") => {
                if self.has_in_table_scope(name) {
                    self.generate_implied_end_tags();
                    if !self.current_is(name) {
                        self.parse_error("end-tag-too-early-cell");
                    }
                    self.pop_until_tag(name);
                    self.clear_formatting_to_last_marker();
                    self.mode = InsertionMode::InRow;
                } else {
                    self.parse_error("unexpected-end-tag-cell");
                }
            }
            // "A start tag whose tag name is one of: 'caption', 'col',
            //  'colgroup', 'tbody', 'td', 'tfoot', 'th', 'thead', 'tr' - If
            //  the stack... has a td or th element in table scope, then
            //  close the cell and reprocess. Otherwise parse error; ignore."
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead"
                        | "tr"
                ) =>
            {
                if self.has_in_table_scope("td") || self.has_in_table_scope("th") {
                    self.close_the_cell();
                    self.reprocess_token(token);
                } else {
                    self.parse_error("unexpected-table-structure-in-cell");
                }
            }
            // "An end tag whose tag name is one of: 'body', 'caption',
            //  'col', 'colgroup', 'html' - Parse error. Ignore."
            Token::EndTag { name }
                if matches!(name.as_str(), "body" | "caption" | "col" | "colgroup" | "html") =>
            {
                self.parse_error("unexpected-end-tag-in-cell");
            }
            // "An end tag whose tag name is one of: 'table', 'tbody',
            //  'tfoot', 'thead', 'tr' - If the stack does not have [name] in
            //  table scope, parse error; ignore. Otherwise close the cell
            //  and reprocess."
            Token::EndTag { name }
                if matches!(name.as_str(), "table" | "tbody" | "tfoot" | "thead" | "tr") =>
            {
                if self.has_in_table_scope(name) {
                    self.close_the_cell();
                    self.reprocess_token(token);
                } else {
                    self.parse_error("unexpected-end-tag-in-cell");
                }
            }
            // "Anything else - Process the token using the rules for the
            //  'in body' insertion mode."
            _ => self.handle_in_body_mode(token),
        }
    }

    /// [§ 13.2.6.4.15 Close the cell](https://html.spec.whatwg.org/multipage/parsing.html#close-the-cell)
    ///
    /// "Generate implied end tags. If the current node is not now a td
    /// element or a th element, then this is a parse error. Pop elements
    /// from the stack of open elements until a td or th element has been
    /// popped. Clear the list of active formatting elements up to the last
    /// marker. Switch the insertion mode to 'in row'."
    fn close_the_cell(&mut self) {
        self.generate_implied_end_tags();
        if !self.current_is("td") && !self.current_is("th") {
            self.parse_error("cell-closed-too-early");
        }
        self.pop_until_one_of(&["td", "th"]);
        self.clear_formatting_to_last_marker();
        self.mode = InsertionMode::InRow;
    }

    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    fn handle_in_select_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data: '\0' } => self.parse_error("unexpected-null-character"),
            Token::Character { data } => self.insert_character(*data),
            Token::Comment { data } => self.insert_comment(data),
            Token::Doctype { .. } => self.parse_error("unexpected-doctype"),
            Token::StartTag { name, .. } if name == "html" => {
                self.handle_in_body_mode(token);
            }
            // "A start tag whose tag name is 'option' - If the current node
            //  is an option element, pop that node. Insert an HTML element
            //  for the token."
            Token::StartTag { name, .. } if name == "option" => {
                if self.current_is("option") {
                    let _ = self.open_elements.pop();
                }
                let _ = self.insert_html_element(token);
            }
            // "A start tag whose tag name is 'optgroup' - pop an open option
            //  and an open optgroup first."
            Token::StartTag { name, .. } if name == "optgroup" => {
                if self.current_is("option") {
                    let _ = self.open_elements.pop();
                }
                if self.current_is("optgroup") {
                    let _ = self.open_elements.pop();
                }
                let _ = self.insert_html_element(token);
            }
            // "An end tag whose tag name is 'optgroup' - First, if the
            //  current node is an option element, and the node immediately
            //  before it... is an optgroup element, then pop the current
            //  node. If the current node is an optgroup element, then pop
            //  that node. Otherwise, this is a parse error; ignore."
            Token::EndTag { name } if name == "optgroup" => {
                if self.current_is("option")
                    && self.open_elements.len() >= 2
                    && self
                        .tag_name(self.open_elements[self.open_elements.len() - 2])
                        .is_some_and(|tag| tag == "optgroup")
                {
                    let _ = self.open_elements.pop();
                }
                if self.current_is("optgroup") {
                    let _ = self.open_elements.pop();
                } else {
                    self.parse_error("unexpected-end-tag-optgroup");
                }
            }
            // "An end tag whose tag name is 'option'"
            Token::EndTag { name } if name == "option" => {
                if self.current_is("option") {
                    let _ = self.open_elements.pop();
                } else {
                    self.parse_error("unexpected-end-tag-option");
                }
            }
            // "An end tag whose tag name is 'select' - If the stack... does
            //  not have a select element in select scope, parse error;
            //  ignore. Otherwise pop until a select has been popped and
            //  reset the insertion mode appropriately."
            Token::EndTag { name } if name == "select" => {
                if self.has_in_select_scope("select") {
                    self.pop_until_tag("select");
                    self.reset_insertion_mode();
                } else {
                    self.parse_error("unexpected-end-tag-select");
                }
            }
            // "A start tag whose tag name is 'select' - Parse error; act as
            //  if an end tag 'select' had been seen."
            Token::StartTag { name, .. } if name == "select" => {
                self.parse_error("unexpected-start-tag-select-in-select");
                if self.has_in_select_scope("select") {
                    self.pop_until_tag("select");
                    self.reset_insertion_mode();
                }
            }
            // "A start tag whose tag name is one of: 'input', 'keygen',
            //  'textarea' - Parse error. If the stack has no select in
            //  select scope, ignore. Otherwise pop until select, reset the
            //  mode, and reprocess."
            Token::StartTag { name, .. }
                if matches!(name.as_str(), "input" | "keygen" | "textarea") =>
            {
                self.parse_error("unexpected-input-in-select");
                if self.has_in_select_scope("select") {
                    self.pop_until_tag("select");
                    self.reset_insertion_mode();
                    self.reprocess_token(token);
                }
            }
            // "A start tag whose tag name is 'script' - Process the token
            //  using the rules for the 'in head' insertion mode."
            Token::StartTag { name, .. } if name == "script" => {
                self.handle_in_head_mode(token);
            }
            Token::EndOfFile => self.handle_in_body_mode(token),
            // "Anything else - Parse error. Ignore the token."
            _ => self.parse_error("unexpected-token-in-select"),
        }
    }

    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    fn handle_in_select_in_table_mode(&mut self, token: &Token) {
        match token {
            // "A start tag whose tag name is one of: 'caption', 'table',
            //  'tbody', 'tfoot', 'thead', 'tr', 'td', 'th' - Parse error.
            //  Pop until a select has been popped, reset the mode, and
            //  reprocess."
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "table" | "tbody" | "tfoot" | "thead" | "tr" | "td" | "th"
                ) =>
            {
                self.parse_error("unexpected-table-structure-in-select");
                self.pop_until_tag("select");
                self.reset_insertion_mode();
                self.reprocess_token(token);
            }
            // "An end tag whose tag name is one of [the same list] - Parse
            //  error. If the stack does not have an element in table scope
            //  with the same tag name, ignore. Otherwise pop until select,
            //  reset, reprocess."
            Token::EndTag { name }
                if matches!(
                    name.as_str(),
                    "caption" | "table" | "tbody" | "tfoot" | "thead" | "tr" | "td" | "th"
                ) =>
            {
                self.parse_error("unexpected-end-tag-in-select");
                if self.has_in_table_scope(name) {
                    self.pop_until_tag("select");
                    self.reset_insertion_mode();
                    self.reprocess_token(token);
                }
            }
            // "Anything else - Process the token using the rules for the
            //  'in select' insertion mode."
            _ => self.handle_in_select_mode(token),
        }
    }

    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    fn handle_after_body_mode(&mut self, token: &Token) {
        match token {
            _ if token.is_whitespace() => self.handle_in_body_mode(token),
            // "A comment token - Insert a comment as the last child of the
            //  first element in the stack of open elements (the html
            //  element)."
            Token::Comment { data } => {
                let target = self.open_elements.first().copied().unwrap_or(NodeId::ROOT);
                self.insert_comment_into(target, data);
            }
            Token::Doctype { .. } => self.parse_error("unexpected-doctype"),
            Token::StartTag { name, .. } if name == "html" => {
                self.handle_in_body_mode(token);
            }
            // "An end tag whose tag name is 'html' - ... switch the
            //  insertion mode to 'after after body'."
            Token::EndTag { name } if name == "html" => {
                self.mode = InsertionMode::AfterAfterBody;
            }
            Token::EndOfFile => self.stopped = true,
            // "Anything else - Parse error. Switch the insertion mode to
            //  'in body' and reprocess the token."
            _ => {
                self.parse_error("unexpected-token-after-body");
                self.mode = InsertionMode::InBody;
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    fn handle_in_frameset_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } if token.is_whitespace() => self.insert_character(*data),
            Token::Comment { data } => self.insert_comment(data),
            Token::Doctype { .. } => self.parse_error("unexpected-doctype"),
            Token::StartTag { name, .. } if name == "html" => {
                self.handle_in_body_mode(token);
            }
            // "A start tag whose tag name is 'frameset' - Insert an HTML
            //  element for the token."
            Token::StartTag { name, .. } if name == "frameset" => {
                let _ = self.insert_html_element(token);
            }
            // "An end tag whose tag name is 'frameset' - If the current node
            //  is the root html element, then this is a parse error; ignore.
            //  Otherwise, pop the current node. If... the current node is no
            //  longer a frameset element, then switch the insertion mode to
            //  'after frameset'."
            Token::EndTag { name } if name == "frameset" => {
                if self.current_is("html") {
                    self.parse_error("unexpected-end-tag-frameset");
                } else {
                    let _ = self.open_elements.pop();
                    if !self.current_is("frameset") {
                        self.mode = InsertionMode::AfterFrameset;
                    }
                }
            }
            // "A start tag whose tag name is 'frame' - Insert; immediately
            //  pop."
            Token::StartTag { name, .. } if name == "frame" => {
                let _ = self.insert_empty_element(token);
            }
            Token::StartTag { name, .. } if name == "noframes" => {
                self.handle_in_head_mode(token);
            }
            Token::EndOfFile => {
                if !self.current_is("html") {
                    self.parse_error("eof-in-frameset");
                }
                self.stopped = true;
            }
            _ => self.parse_error("unexpected-token-in-frameset"),
        }
    }

    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    fn handle_after_frameset_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } if token.is_whitespace() => self.insert_character(*data),
            Token::Comment { data } => self.insert_comment(data),
            Token::Doctype { .. } => self.parse_error("unexpected-doctype"),
            Token::StartTag { name, .. } if name == "html" => {
                self.handle_in_body_mode(token);
            }
            // "An end tag whose tag name is 'html' - Switch the insertion
            //  mode to 'after after frameset'."
            Token::EndTag { name } if name == "html" => {
                self.mode = InsertionMode::AfterAfterFrameset;
            }
            Token::StartTag { name, .. } if name == "noframes" => {
                self.handle_in_head_mode(token);
            }
            Token::EndOfFile => self.stopped = true,
            _ => self.parse_error("unexpected-token-after-frameset"),
        }
    }

    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    fn handle_after_after_body_mode(&mut self, token: &Token) {
        match token {
            // "A comment token - Insert a comment as the last child of the
            //  Document object."
            Token::Comment { data } => self.insert_comment_into(NodeId::ROOT, data),
            Token::Doctype { .. } => self.handle_in_body_mode(token),
            _ if token.is_whitespace() => self.handle_in_body_mode(token),
            Token::StartTag { name, .. } if name == "html" => {
                self.handle_in_body_mode(token);
            }
            Token::EndOfFile => self.stopped = true,
            // "Anything else - Parse error. Switch the insertion mode to 'in
            //  body' and reprocess the token."
            _ => {
                self.parse_error("unexpected-token-after-after-body");
                self.mode = InsertionMode::InBody;
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    fn handle_after_after_frameset_mode(&mut self, token: &Token) {
        match token {
            Token::Comment { data } => self.insert_comment_into(NodeId::ROOT, data),
            Token::Doctype { .. } => self.handle_in_body_mode(token),
            _ if token.is_whitespace() => self.handle_in_body_mode(token),
            Token::StartTag { name, .. } if name == "html" => {
                self.handle_in_body_mode(token);
            }
            Token::StartTag { name, .. } if name == "noframes" => {
                self.handle_in_head_mode(token);
            }
            Token::EndOfFile => self.stopped = true,
            _ => self.parse_error("unexpected-token-after-after-frameset"),
        }
    }
}
