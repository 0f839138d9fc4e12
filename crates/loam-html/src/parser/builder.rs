//! The tree builder core.
//!
//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//!
//! Owns the stack of open elements, the list of active formatting elements,
//! the element pointers, and the document under construction. The
//! per-insertion-mode token handlers live in `modes.rs`; this file carries
//! the machinery they share: node insertion (with foster parenting), scope
//! predicates, implied end tags, and the two formatting-element algorithms
//! (reconstruction and the adoption agency).

use loam_common::warning::warn_once;
use loam_dom::{Attributes, DoctypeData, Document, ElementData, NodeId, NodeType};

use super::InsertionMode;
use crate::ParseIssue;
use crate::tokenizer::{TagAttribute, Token};

/// [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
///
/// "The list of active formatting elements... is used to handle mis-nested
/// formatting element tags."
#[derive(Debug, Clone)]
pub enum FormattingEntry {
    /// A formatting element entry.
    ///
    /// "The list contains elements in the formatting category": a, b, big,
    /// code, em, font, i, nobr, s, small, strike, strong, tt, u.
    Element {
        /// The `NodeId` of the element in the arena.
        node_id: NodeId,
        /// The original token, kept to recreate the element during the
        /// adoption agency algorithm or reconstruction.
        token: Token,
    },
    /// A marker entry.
    ///
    /// "A marker is an entry in the list of active formatting elements that
    /// is distinct from any element." Pushed when entering applet, object,
    /// marquee, td, th, and caption; scopes the list so formatting from
    /// outside those elements does not leak inside.
    Marker,
}

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// The HTML tree builder: consumes a token stream and produces a
/// [`Document`].
pub struct TreeBuilder {
    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
    pub(super) mode: InsertionMode,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#original-insertion-mode)
    /// "The original insertion mode" - where Text and InTableText return to.
    pub(super) original_mode: Option<InsertionMode>,

    /// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    ///
    /// Stores `NodeId`s into the arena; top of stack = current node.
    pub(super) open_elements: Vec<NodeId>,

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
    pub(super) active_formatting: Vec<FormattingEntry>,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#the-element-pointers)
    pub(super) head_element: Option<NodeId>,

    /// "The form element pointer points to the last form element that was
    /// opened and whose end tag has not yet been seen."
    pub(super) form_element: Option<NodeId>,

    /// [§ 13.2.4.5](https://html.spec.whatwg.org/multipage/parsing.html#frameset-ok-flag)
    /// "The frameset-ok flag is set to 'ok' when the parser is created."
    pub(super) frameset_ok: bool,

    /// [§ 13.2.6.1 Foster parenting](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    pub(super) foster_parenting: bool,

    /// [§ 13.2.6.4.10](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    /// "The pending table character tokens list"
    pub(super) pending_table_text: Vec<char>,

    /// The document under construction.
    pub(super) doc: Document,

    /// Input tokens from the tokenizer.
    pub(super) tokens: Vec<Token>,
    /// Current position in the token stream.
    pub(super) index: usize,
    /// Whether parsing has stopped.
    pub(super) stopped: bool,

    /// Whether a `<base href>` has already rebased the document (first one
    /// wins).
    pub(super) base_seen: bool,

    /// Parse issues encountered during tree construction.
    pub(super) issues: Vec<ParseIssue>,
}

impl TreeBuilder {
    /// Create a new builder over a token stream. `base_uri` seeds the
    /// document's URL resolution anchor.
    #[must_use]
    pub fn new(tokens: Vec<Token>, base_uri: &str) -> Self {
        Self {
            mode: InsertionMode::Initial,
            original_mode: None,
            open_elements: Vec::new(),
            active_formatting: Vec::new(),
            head_element: None,
            form_element: None,
            frameset_ok: true,
            foster_parenting: false,
            pending_table_text: Vec::new(),
            doc: Document::new(base_uri),
            tokens,
            index: 0,
            stopped: false,
            base_seen: false,
            issues: Vec::new(),
        }
    }

    /// Run the builder and return the document.
    #[must_use]
    pub fn run(self) -> Document {
        self.run_with_issues().0
    }

    /// Run the builder and return both the document and any parse issues.
    #[must_use]
    pub fn run_with_issues(mut self) -> (Document, Vec<ParseIssue>) {
        while !self.stopped && self.index < self.tokens.len() {
            let token = self.tokens[self.index].clone();
            self.process_token(&token);
            self.index += 1;
        }
        let issues = std::mem::take(&mut self.issues);
        (self.doc, issues)
    }

    /// Record a parse error. Construction always continues.
    pub(super) fn parse_error(&mut self, message: &str) {
        warn_once("Parser", message);
        self.issues.push(ParseIssue {
            message: message.to_string(),
            token_index: self.index,
        });
    }

    /// Peek at the token after the current one. Used for the "skip a
    /// newline immediately after `<pre>` / `<textarea>`" rule.
    pub(super) fn skip_next_token_if_newline(&mut self) {
        // "If the next token is a U+000A LINE FEED (LF) character token,
        //  then ignore that token and move on to the next one."
        if matches!(
            self.tokens.get(self.index + 1),
            Some(Token::Character { data: '\n' })
        ) {
            self.index += 1;
        }
    }

    // =========================================================================
    // Stack of open elements
    // =========================================================================

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#current-node)
    /// "The current node is the bottommost node in this stack of open
    /// elements."
    pub(super) fn current_node(&self) -> Option<NodeId> {
        self.open_elements.last().copied()
    }

    /// The tag name of a node (local name of the element).
    pub(super) fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.doc.tag_name(id)
    }

    /// Whether the current node has the given tag name.
    pub(super) fn current_is(&self, tag: &str) -> bool {
        self.current_node()
            .and_then(|id| self.tag_name(id))
            .is_some_and(|name| name == tag)
    }

    /// Pop elements from the stack of open elements until one with the
    /// given tag name has been popped (inclusive).
    pub(super) fn pop_until_tag(&mut self, tag: &str) {
        while let Some(id) = self.open_elements.pop() {
            if self.tag_name(id) == Some(tag) {
                break;
            }
        }
    }

    /// Pop elements until one of the given tag names has been popped.
    ///
    /// Per spec for headings: "pop elements from the stack of open elements
    /// until an h1, h2, h3, h4, h5, or h6 element has been popped."
    pub(super) fn pop_until_one_of(&mut self, tags: &[&str]) {
        while let Some(id) = self.open_elements.pop() {
            if self.tag_name(id).is_some_and(|name| tags.contains(&name)) {
                break;
            }
        }
    }

    // =========================================================================
    // Scope predicates
    // =========================================================================

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
    ///
    /// "The stack of open elements is said to have an element target node
    /// in a specific scope consisting of a list of element types list when
    /// the following algorithm terminates in a match state:"
    ///
    /// STEP 1: "Initialize node to be the current node."
    /// STEP 2: "If node is the target node, terminate in a match state."
    /// STEP 3: "Otherwise, if node is one of the element types in list,
    ///          terminate in a failure state."
    /// STEP 4: "Otherwise, set node to the previous entry... and return to
    ///          step 2."
    fn has_element_in_specific_scope(&self, tag: &str, scope_markers: &[&str]) -> bool {
        for &node_id in self.open_elements.iter().rev() {
            if let Some(node_tag) = self.tag_name(node_id) {
                if node_tag == tag {
                    return true;
                }
                if scope_markers.contains(&node_tag) {
                    return false;
                }
            }
        }
        false
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-scope)
    ///
    /// "has an element in scope" (default scope). Scope markers: applet,
    /// caption, html, table, td, th, marquee, object, template.
    pub(super) fn has_in_scope(&self, tag: &str) -> bool {
        const DEFAULT_SCOPE: &[&str] = &[
            "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template",
        ];
        self.has_element_in_specific_scope(tag, DEFAULT_SCOPE)
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-button-scope)
    ///
    /// "has an element in button scope" - default scope markers plus button.
    pub(super) fn has_in_button_scope(&self, tag: &str) -> bool {
        const BUTTON_SCOPE: &[&str] = &[
            "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template",
            "button",
        ];
        self.has_element_in_specific_scope(tag, BUTTON_SCOPE)
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-list-item-scope)
    ///
    /// "has an element in list item scope" - default scope plus ol, ul.
    pub(super) fn has_in_list_item_scope(&self, tag: &str) -> bool {
        const LIST_ITEM_SCOPE: &[&str] = &[
            "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template",
            "ol", "ul",
        ];
        self.has_element_in_specific_scope(tag, LIST_ITEM_SCOPE)
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-table-scope)
    ///
    /// "has an element in table scope" - scope markers: html, table,
    /// template.
    pub(super) fn has_in_table_scope(&self, tag: &str) -> bool {
        const TABLE_SCOPE: &[&str] = &["html", "table", "template"];
        self.has_element_in_specific_scope(tag, TABLE_SCOPE)
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-select-scope)
    ///
    /// "has an element in select scope" - the list is inverted: everything
    /// except optgroup and option terminates the walk.
    pub(super) fn has_in_select_scope(&self, tag: &str) -> bool {
        for &node_id in self.open_elements.iter().rev() {
            if let Some(node_tag) = self.tag_name(node_id) {
                if node_tag == tag {
                    return true;
                }
                if !matches!(node_tag, "optgroup" | "option") {
                    return false;
                }
            }
        }
        false
    }

    // =========================================================================
    // Creating and inserting nodes
    // =========================================================================

    /// Convert token attributes to the [`Attributes`] list used by
    /// [`ElementData`]. Names fold to lowercase; the first occurrence of a
    /// name wins (the tokenizer has already dropped exact duplicates).
    pub(super) fn attributes_from_token(attributes: &[TagAttribute]) -> Attributes {
        attributes
            .iter()
            .map(|attr| (attr.name.clone(), attr.value.clone()))
            .collect()
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#create-an-element-for-the-token)
    ///
    /// "Create an element for a token" - allocates the element in the
    /// arena without inserting it into the tree or pushing the stack.
    pub(super) fn create_element(&mut self, tag: &str, attributes: &[TagAttribute]) -> NodeId {
        self.doc.alloc(NodeType::Element(ElementData::new(
            tag,
            Self::attributes_from_token(attributes),
        )))
    }

    /// Create an element for a start tag token.
    pub(super) fn create_element_for_token(&mut self, token: &Token) -> NodeId {
        match token {
            Token::StartTag {
                name, attributes, ..
            } => self.create_element(name, attributes),
            // Only reachable through a builder bug; recover with a
            // placeholder element rather than abort the parse.
            _ => self.create_element("unknown", &[]),
        }
    }

    /// [§ 13.2.6.1 Foster parenting](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    ///
    /// "If the foster parenting flag is set and the adjusted insertion
    /// location is inside a table, tbody, tfoot, thead, or tr element..."
    ///
    /// Returns `(parent_id, Option<before_id>)`. When `before_id` is
    /// `Some`, the caller must use `insert_before` instead of
    /// `append_child`.
    fn foster_parent_location(&self) -> (NodeId, Option<NodeId>) {
        // STEP 1: "Let last table be the last table element in the stack of
        //          open elements, if any."
        let last_table_pos = self
            .open_elements
            .iter()
            .rposition(|&id| self.tag_name(id) == Some("table"));

        if let Some(table_pos) = last_table_pos {
            let table_id = self.open_elements[table_pos];

            // STEP 2: "If last table has a parent node, then let adjusted
            //          insertion location be before last table in its
            //          parent node."
            if let Some(parent_id) = self.doc.parent(table_id) {
                (parent_id, Some(table_id))
            } else if table_pos > 0 {
                // "Otherwise, let adjusted insertion location be inside the
                //  element immediately above last table in the stack."
                (self.open_elements[table_pos - 1], None)
            } else {
                (NodeId::ROOT, None)
            }
        } else {
            // STEP 3: "If there is no last table element... the adjusted
            //          insertion location is inside the first element in the
            //          stack of open elements (the html element)."
            let first = self.open_elements.first().copied().unwrap_or(NodeId::ROOT);
            (first, None)
        }
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-place-for-inserting-a-node)
    ///
    /// "The appropriate place for inserting a node." Delegates to the
    /// foster parent location when foster parenting applies.
    pub(super) fn adjusted_insertion_location(&self) -> (NodeId, Option<NodeId>) {
        let target = self.current_node().unwrap_or(NodeId::ROOT);

        // "If foster parenting is enabled and the target is a table, tbody,
        //  tfoot, thead, or tr element..."
        if self.foster_parenting
            && let Some(tag) = self.tag_name(target)
            && matches!(tag, "table" | "tbody" | "tfoot" | "thead" | "tr")
        {
            return self.foster_parent_location();
        }

        (target, None)
    }

    /// Insert an already-allocated node at the adjusted insertion location.
    pub(super) fn insert_at_appropriate_place(&mut self, node: NodeId) {
        let (parent_id, before_id) = self.adjusted_insertion_location();
        match before_id {
            Some(reference) => self.doc.insert_before(parent_id, node, reference),
            None => self.doc.append_child(parent_id, node),
        }
    }

    /// [§ 13.2.6.1 Insert an HTML element](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    ///
    /// "When the steps below require the user agent to insert an HTML
    /// element for a token": create, insert at the adjusted location, push
    /// onto the stack of open elements.
    pub(super) fn insert_html_element(&mut self, token: &Token) -> NodeId {
        let element_id = self.create_element_for_token(token);
        self.insert_at_appropriate_place(element_id);
        self.open_elements.push(element_id);
        element_id
    }

    /// Insert an element for a synthetic start tag (no source token), used
    /// where the spec says "insert an HTML element for a ... token with no
    /// attributes" (implied html/head/body/tbody/colgroup/tr).
    pub(super) fn insert_phantom_element(&mut self, tag: &str) -> NodeId {
        let element_id = self.create_element(tag, &[]);
        self.insert_at_appropriate_place(element_id);
        self.open_elements.push(element_id);
        element_id
    }

    /// Insert an element and immediately pop it: void elements and other
    /// "insert... then pop the current node" steps. Acknowledges the
    /// token's self-closing flag by construction.
    pub(super) fn insert_empty_element(&mut self, token: &Token) -> NodeId {
        let element_id = self.insert_html_element(token);
        let _ = self.open_elements.pop();
        element_id
    }

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    ///
    /// "If there is a Text node immediately before the adjusted insertion
    /// location, then append data to that Text node's data... Otherwise,
    /// create a new Text node."
    pub(super) fn insert_character(&mut self, c: char) {
        let (parent_id, before_id) = self.adjusted_insertion_location();

        let adjacent = match before_id {
            Some(reference) => {
                let children = self.doc.children(parent_id);
                children
                    .iter()
                    .position(|&id| id == reference)
                    .and_then(|pos| pos.checked_sub(1))
                    .map(|pos| self.doc.children(parent_id)[pos])
            }
            None => self.doc.children(parent_id).last().copied(),
        };

        if let Some(text_id) = adjacent
            && let Some(node) = self.doc.get_mut(text_id)
            && let NodeType::Text(ref mut data) = node.node_type
        {
            data.push(c);
            return;
        }

        let text_id = self.doc.alloc(NodeType::Text(String::from(c)));
        match before_id {
            Some(reference) => self.doc.insert_before(parent_id, text_id, reference),
            None => self.doc.append_child(parent_id, text_id),
        }
    }

    /// Insert raw character data for `<script>` / `<style>` content: the
    /// payload lands in a `Data` node (serialized verbatim, excluded from
    /// `text()`), appended to the current node.
    pub(super) fn insert_data_character(&mut self, c: char) {
        let parent_id = self.current_node().unwrap_or(NodeId::ROOT);
        if let Some(&last) = self.doc.children(parent_id).last()
            && let Some(node) = self.doc.get_mut(last)
            && let NodeType::Data(ref mut data) = node.node_type
        {
            data.push(c);
            return;
        }
        let data_id = self.doc.alloc(NodeType::Data(String::from(c)));
        self.doc.append_child(parent_id, data_id);
    }

    /// [§ 13.2.6.1 Insert a comment](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    pub(super) fn insert_comment(&mut self, data: &str) {
        let comment_id = self.doc.alloc(NodeType::Comment(data.to_string()));
        self.insert_at_appropriate_place(comment_id);
    }

    /// Insert a comment as the last child of a specific node (the Document
    /// before/after the root, or the `<html>` element in AfterBody).
    pub(super) fn insert_comment_into(&mut self, target: NodeId, data: &str) {
        let comment_id = self.doc.alloc(NodeType::Comment(data.to_string()));
        self.doc.append_child(target, comment_id);
    }

    /// Append a DocumentType node for a DOCTYPE token and record quirks.
    pub(super) fn insert_doctype(&mut self, token: &Token) {
        if let Token::Doctype {
            name,
            public_identifier,
            system_identifier,
            force_quirks,
        } = token
        {
            let doctype_id = self.doc.alloc(NodeType::DocumentType(DoctypeData {
                name: name.clone().unwrap_or_default(),
                public_id: public_identifier.clone().unwrap_or_default(),
                system_id: system_identifier.clone().unwrap_or_default(),
            }));
            self.doc.append_child(NodeId::ROOT, doctype_id);

            // "Then, if the DOCTYPE token matches one of the conditions in
            //  the following list, then set the Document to quirks mode" -
            // reduced to the force-quirks flag and a non-html name; the
            // legacy public-identifier list is not consulted.
            let quirks = *force_quirks || name.as_deref() != Some("html");
            self.doc.set_quirks_mode(quirks);
        }
    }

    /// [§ 4.2.3 The base element](https://html.spec.whatwg.org/multipage/semantics.html#the-base-element)
    ///
    /// "The first base element with an href content attribute in the
    /// document" rebases the document; later ones are ignored.
    pub(super) fn maybe_rebase(&mut self, token: &Token) {
        if self.base_seen {
            return;
        }
        if let Token::StartTag { attributes, .. } = token
            && let Some(href) = attributes
                .iter()
                .find(|attr| attr.name == "href")
                .map(|attr| attr.value.as_str())
            && !href.trim().is_empty()
        {
            let base = self.doc.base_uri().to_string();
            let anchor = (!base.trim().is_empty()).then_some(base.as_str());
            if let Some(resolved) = loam_common::url::resolve(href, anchor) {
                self.doc.set_base_uri(&resolved);
            }
            self.base_seen = true;
        }
    }

    // =========================================================================
    // Implied end tags and element categories
    // =========================================================================

    /// [§ 13.2.6.3 Closing elements that have implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    ///
    /// "When the steps below require the UA to generate implied end tags,
    /// then, while the current node is a dd, dt, li, optgroup, option, p,
    /// rb, rp, rt, or rtc element, the UA must pop the current node off the
    /// stack of open elements."
    pub(super) fn generate_implied_end_tags(&mut self) {
        self.generate_implied_end_tags_excluding(None);
    }

    /// "If a step requires the UA to generate implied end tags but lists an
    /// element to exclude from the process, then... if the current node is
    /// not an element with the same tag name as that element."
    pub(super) fn generate_implied_end_tags_excluding(&mut self, exclude: Option<&str>) {
        const IMPLIED: &[&str] = &[
            "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc",
        ];
        while let Some(current) = self.current_node() {
            let Some(tag) = self.tag_name(current) else {
                break;
            };
            if !IMPLIED.contains(&tag) || exclude == Some(tag) {
                break;
            }
            let _ = self.open_elements.pop();
        }
    }

    /// Close an element per the "close a p element" style rules: only when
    /// in scope, generating implied end tags (excluding the target) first.
    ///
    /// Per spec, "p" uses button scope; others use the default scope. The
    /// scope check runs BEFORE the implied end tags, since those can pop
    /// elements that should only be popped if the target is actually in
    /// scope.
    pub(super) fn close_element_if_in_scope(&mut self, tag: &str) {
        let in_scope = if tag == "p" {
            self.has_in_button_scope(tag)
        } else {
            self.has_in_scope(tag)
        };
        if in_scope {
            self.generate_implied_end_tags_excluding(Some(tag));
            self.pop_until_tag(tag);
        }
    }

    /// [§ 13.1.1 Special](https://html.spec.whatwg.org/multipage/parsing.html#special)
    ///
    /// "The following elements have varying levels of special parsing
    /// rules... they are collectively known as special elements."
    pub(super) fn is_special_element(tag: &str) -> bool {
        matches!(
            tag,
            "address"
                | "applet"
                | "area"
                | "article"
                | "aside"
                | "base"
                | "basefont"
                | "bgsound"
                | "blockquote"
                | "body"
                | "br"
                | "button"
                | "caption"
                | "center"
                | "col"
                | "colgroup"
                | "dd"
                | "details"
                | "dir"
                | "div"
                | "dl"
                | "dt"
                | "embed"
                | "fieldset"
                | "figcaption"
                | "figure"
                | "footer"
                | "form"
                | "frame"
                | "frameset"
                | "h1"
                | "h2"
                | "h3"
                | "h4"
                | "h5"
                | "h6"
                | "head"
                | "header"
                | "hgroup"
                | "hr"
                | "html"
                | "iframe"
                | "img"
                | "input"
                | "keygen"
                | "li"
                | "link"
                | "listing"
                | "main"
                | "marquee"
                | "menu"
                | "meta"
                | "nav"
                | "noembed"
                | "noframes"
                | "noscript"
                | "object"
                | "ol"
                | "p"
                | "param"
                | "plaintext"
                | "pre"
                | "script"
                | "search"
                | "section"
                | "select"
                | "source"
                | "style"
                | "summary"
                | "table"
                | "tbody"
                | "td"
                | "template"
                | "textarea"
                | "tfoot"
                | "th"
                | "thead"
                | "title"
                | "tr"
                | "track"
                | "ul"
                | "wbr"
                | "xmp"
        )
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#formatting)
    ///
    /// "The elements in the formatting category are: a, b, big, code, em,
    /// font, i, nobr, s, small, strike, strong, tt, u."
    pub(super) fn is_formatting_element(tag: &str) -> bool {
        matches!(
            tag,
            "a" | "b"
                | "big"
                | "code"
                | "em"
                | "font"
                | "i"
                | "nobr"
                | "s"
                | "small"
                | "strike"
                | "strong"
                | "tt"
                | "u"
        )
    }

    // =========================================================================
    // Active formatting elements
    // =========================================================================

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#push-onto-the-list-of-active-formatting-elements)
    ///
    /// Push with the Noah's Ark clause: "If there are already three
    /// elements in the list... after the last marker... that have the same
    /// tag name, namespace, and attributes as element, then remove the
    /// earliest such element."
    pub(super) fn push_active_formatting(&mut self, node_id: NodeId, token: &Token) {
        if let Token::StartTag {
            name, attributes, ..
        } = token
        {
            let mut count = 0;
            let mut earliest = None;
            for (i, entry) in self.active_formatting.iter().enumerate().rev() {
                match entry {
                    FormattingEntry::Marker => break,
                    FormattingEntry::Element {
                        token: entry_token, ..
                    } => {
                        if let Token::StartTag {
                            name: entry_name,
                            attributes: entry_attrs,
                            ..
                        } = entry_token
                            && entry_name == name
                            && entry_attrs == attributes
                        {
                            count += 1;
                            earliest = Some(i);
                        }
                    }
                }
            }
            if count >= 3
                && let Some(i) = earliest
            {
                let _ = self.active_formatting.remove(i);
            }
        }

        self.active_formatting.push(FormattingEntry::Element {
            node_id,
            token: token.clone(),
        });
    }

    /// [§ 13.2.4.3 Reconstruct the active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#reconstruct-the-active-formatting-elements)
    ///
    /// Two phases: rewind (walk backwards to find where to start) and
    /// create (walk forward re-inserting elements).
    pub(super) fn reconstruct_active_formatting(&mut self) {
        // STEP 1: "If there are no entries... there is nothing to
        //          reconstruct; stop."
        if self.active_formatting.is_empty() {
            return;
        }

        // STEP 2: "If the last entry is a marker, or an element in the
        //          stack of open elements, there is nothing to reconstruct."
        if let Some(last) = self.active_formatting.last() {
            match last {
                FormattingEntry::Marker => return,
                FormattingEntry::Element { node_id, .. } => {
                    if self.open_elements.contains(node_id) {
                        return;
                    }
                }
            }
        }

        // STEPS 3-6: Rewind until hitting a marker or an element still on
        // the stack, then step forward one.
        let mut entry_index = self.active_formatting.len() - 1;
        loop {
            if entry_index == 0 {
                break;
            }
            entry_index -= 1;
            match &self.active_formatting[entry_index] {
                FormattingEntry::Marker => {
                    entry_index += 1;
                    break;
                }
                FormattingEntry::Element { node_id, .. } => {
                    if self.open_elements.contains(node_id) {
                        entry_index += 1;
                        break;
                    }
                }
            }
        }

        // STEPS 7-10: Create phase - re-insert each entry and replace it in
        // the list with the fresh element.
        loop {
            let token = match &self.active_formatting[entry_index] {
                FormattingEntry::Element { token, .. } => token.clone(),
                FormattingEntry::Marker => {
                    entry_index += 1;
                    if entry_index >= self.active_formatting.len() {
                        break;
                    }
                    continue;
                }
            };

            let new_id = self.insert_html_element(&token);
            self.active_formatting[entry_index] = FormattingEntry::Element {
                node_id: new_id,
                token,
            };

            entry_index += 1;
            if entry_index >= self.active_formatting.len() {
                break;
            }
        }
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-list-of-active-formatting-elements-up-to-the-last-marker)
    ///
    /// "Let entry be the last entry... Remove entry from the list. If entry
    /// was a marker, stop."
    pub(super) fn clear_formatting_to_last_marker(&mut self) {
        while let Some(entry) = self.active_formatting.pop() {
            if matches!(entry, FormattingEntry::Marker) {
                break;
            }
        }
    }

    // =========================================================================
    // End tag fallback and the adoption agency algorithm
    // =========================================================================

    /// [§ 13.2.6.4.7 "in body" - Any other end tag](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    ///
    /// Walk the stack from the current node downward: a matching node
    /// closes everything above it; hitting a special element first means
    /// the end tag is ignored.
    pub(super) fn any_other_end_tag(&mut self, tag: &str) {
        let mut i = self.open_elements.len();
        while i > 0 {
            i -= 1;
            let node_id = self.open_elements[i];
            if let Some(node_tag) = self.tag_name(node_id) {
                if node_tag == tag {
                    // "Generate implied end tags, except for HTML elements
                    //  with the same tag name as the token... Pop all the
                    //  nodes from the current node up to node, including
                    //  node."
                    self.generate_implied_end_tags_excluding(Some(tag));
                    self.open_elements.truncate(i);
                    return;
                }
                if Self::is_special_element(node_tag) {
                    self.parse_error("unexpected-end-tag");
                    return;
                }
            }
        }
    }

    /// [§ 13.2.6.4.7 The adoption agency algorithm](https://html.spec.whatwg.org/multipage/parsing.html#adoption-agency-algorithm)
    ///
    /// "When the steps below require the UA to run the adoption agency
    /// algorithm for a token, the UA must perform the following steps:"
    ///
    /// Corrects mis-nested formatting elements (`<b>1<i>2</b>3</i>`) by
    /// cloning and relocating elements between the furthest block and the
    /// formatting element. Outer loop capped at 8 and inner at 3, per
    /// spec, so termination is guaranteed.
    pub(super) fn run_adoption_agency(&mut self, subject: &str) {
        // STEP 2: "If the current node is an HTML element whose tag name is
        //          subject, and the current node is not in the list of
        //          active formatting elements, then pop the current node
        //          off the stack of open elements and return."
        if let Some(current) = self.current_node()
            && self.tag_name(current) == Some(subject)
        {
            let in_list = self.active_formatting.iter().any(|entry| {
                matches!(entry, FormattingEntry::Element { node_id, .. } if *node_id == current)
            });
            if !in_list {
                let _ = self.open_elements.pop();
                return;
            }
        }

        // STEPS 3-5: "Let outer loop counter be 0... If outer loop counter
        //             is greater than or equal to 8, then return."
        for _outer in 0..8 {
            // STEP 7: "Let formatting element be the last element in the
            //          list of active formatting elements that is between
            //          the end of the list and the last marker... and has
            //          the tag name subject."
            let formatting_list_index = {
                let mut found = None;
                for (i, entry) in self.active_formatting.iter().enumerate().rev() {
                    match entry {
                        FormattingEntry::Marker => break,
                        FormattingEntry::Element { token, .. } => {
                            if let Token::StartTag { name, .. } = token
                                && name == subject
                            {
                                found = Some(i);
                                break;
                            }
                        }
                    }
                }
                found
            };

            // STEP 8: "If there is no such element, then return and instead
            //          act as described in the 'any other end tag' entry."
            let Some(formatting_list_index) = formatting_list_index else {
                self.any_other_end_tag(subject);
                return;
            };

            let formatting_id = match &self.active_formatting[formatting_list_index] {
                FormattingEntry::Element { node_id, .. } => *node_id,
                FormattingEntry::Marker => return,
            };

            // STEP 9: "If formatting element is not in the stack of open
            //          elements, then this is a parse error; remove the
            //          element from the list, and return."
            let Some(formatting_stack_index) = self
                .open_elements
                .iter()
                .position(|&id| id == formatting_id)
            else {
                self.parse_error("adoption-agency-formatting-element-not-open");
                let _ = self.active_formatting.remove(formatting_list_index);
                return;
            };

            // STEP 10: "If formatting element is in the stack of open
            //           elements, but the element is not in scope, then
            //           this is a parse error; return."
            if !self.has_in_scope(subject) {
                self.parse_error("adoption-agency-formatting-element-not-in-scope");
                return;
            }

            // STEP 12: "Let furthest block be the topmost node in the stack
            //           of open elements that is lower in the stack than
            //           formatting element, and is an element in the
            //           special category."
            let furthest_block_index = ((formatting_stack_index + 1)..self.open_elements.len())
                .find(|&i| {
                    self.tag_name(self.open_elements[i])
                        .is_some_and(Self::is_special_element)
                });

            // STEP 13: "If there is no furthest block, then the UA must
            //           first pop all the nodes from the bottom of the
            //           stack... up to and including formatting element,
            //           then remove formatting element from the list."
            let Some(furthest_block_index) = furthest_block_index else {
                self.open_elements.truncate(formatting_stack_index);
                let _ = self.active_formatting.remove(formatting_list_index);
                return;
            };

            let furthest_block_id = self.open_elements[furthest_block_index];

            // STEP 14: "Let common ancestor be the element immediately
            //           above formatting element in the stack."
            let common_ancestor_id = self.open_elements[formatting_stack_index - 1];

            // STEP 15: "Let a bookmark note the position of formatting
            //           element in the list of active formatting elements."
            let mut bookmark = formatting_list_index;

            // STEP 16: "Let node and last node be furthest block."
            let mut node_stack_index = furthest_block_index;
            let mut last_node_id = furthest_block_id;

            // STEP 17-18: Inner loop.
            let mut inner = 0;
            loop {
                inner += 1;

                // STEP 18.2: "Let node be the element immediately above
                //             node in the stack of open elements."
                node_stack_index -= 1;
                let node_id = self.open_elements[node_stack_index];

                // STEP 18.3: "If node is formatting element, then break."
                if node_id == formatting_id {
                    break;
                }

                // STEP 18.4: "If inner loop counter is greater than 3 and
                //             node is in the list of active formatting
                //             elements, then remove node from the list."
                let node_list_index = self.formatting_index_of(node_id);
                if inner > 3
                    && let Some(i) = node_list_index
                {
                    let _ = self.active_formatting.remove(i);
                    if bookmark > i {
                        bookmark -= 1;
                    }
                }

                // STEP 18.5: "If node is not in the list of active
                //             formatting elements, then remove node from
                //             the stack of open elements and continue."
                let Some(node_list_index) = self.formatting_index_of(node_id) else {
                    let _ = self.open_elements.remove(node_stack_index);
                    // The element above the removed node is now at
                    // node_stack_index - 1; the loop's decrement lands on it.
                    continue;
                };

                // STEP 18.6: "Create an element for the token for which
                //             node was created... replace the entry for
                //             node in the list and in the stack with the
                //             new element."
                let node_token = match &self.active_formatting[node_list_index] {
                    FormattingEntry::Element { token, .. } => token.clone(),
                    FormattingEntry::Marker => break,
                };
                let new_node_id = self.create_element_for_token(&node_token);
                self.active_formatting[node_list_index] = FormattingEntry::Element {
                    node_id: new_node_id,
                    token: node_token,
                };
                self.open_elements[node_stack_index] = new_node_id;

                // STEP 18.7: "If last node is furthest block, then move the
                //             bookmark to be immediately after the new node
                //             in the list."
                if last_node_id == furthest_block_id {
                    bookmark = node_list_index + 1;
                }

                // STEP 18.8: "Append last node to node."
                self.doc.detach(last_node_id);
                self.doc.append_child(new_node_id, last_node_id);

                // STEP 18.9: "Set last node to node."
                last_node_id = new_node_id;
            }

            // STEP 19: "Insert whatever last node ended up being... at the
            //           appropriate place for inserting a node, but using
            //           common ancestor as the override target."
            self.doc.detach(last_node_id);
            if self
                .tag_name(common_ancestor_id)
                .is_some_and(|tag| matches!(tag, "table" | "tbody" | "tfoot" | "thead" | "tr"))
            {
                let (parent_id, before_id) = self.foster_parent_location();
                match before_id {
                    Some(reference) => self.doc.insert_before(parent_id, last_node_id, reference),
                    None => self.doc.append_child(parent_id, last_node_id),
                }
            } else {
                self.doc.append_child(common_ancestor_id, last_node_id);
            }

            // STEP 20: "Create an element for the token for which
            //           formatting element was created... take all of the
            //           child nodes of furthest block and append them to
            //           the element created in the last step."
            let Some(formatting_token) = self.active_formatting.iter().find_map(|entry| {
                match entry {
                    FormattingEntry::Element { node_id, token } if *node_id == formatting_id => {
                        Some(token.clone())
                    }
                    _ => None,
                }
            }) else {
                return;
            };
            let replacement_id = self.create_element_for_token(&formatting_token);
            let children: Vec<NodeId> = self.doc.children(furthest_block_id).to_vec();
            for child in children {
                self.doc.detach(child);
                self.doc.append_child(replacement_id, child);
            }

            // STEP 21: "Append that new element to furthest block."
            self.doc.append_child(furthest_block_id, replacement_id);

            // STEP 22: "Remove formatting element from the list of active
            //           formatting elements, and insert the new element
            //           into the list... at the position of the bookmark."
            if let Some(old_index) = self.formatting_index_of(formatting_id) {
                let _ = self.active_formatting.remove(old_index);
                if bookmark > old_index {
                    bookmark -= 1;
                }
            }
            let bookmark = bookmark.min(self.active_formatting.len());
            self.active_formatting.insert(
                bookmark,
                FormattingEntry::Element {
                    node_id: replacement_id,
                    token: formatting_token,
                },
            );

            // STEP 23: "Remove formatting element from the stack of open
            //           elements, and insert the new element... immediately
            //           below the position of furthest block."
            if let Some(stack_index) = self
                .open_elements
                .iter()
                .position(|&id| id == formatting_id)
            {
                let _ = self.open_elements.remove(stack_index);
            }
            if let Some(block_index) = self
                .open_elements
                .iter()
                .position(|&id| id == furthest_block_id)
            {
                self.open_elements.insert(block_index + 1, replacement_id);
            } else {
                self.open_elements.push(replacement_id);
            }
        }
    }

    /// Index of a node in the active formatting list, if present.
    fn formatting_index_of(&self, node_id: NodeId) -> Option<usize> {
        self.active_formatting.iter().position(|entry| {
            matches!(entry, FormattingEntry::Element { node_id: id, .. } if *id == node_id)
        })
    }

    // =========================================================================
    // Mode reset
    // =========================================================================

    /// [§ 13.2.4.1 Reset the insertion mode appropriately](https://html.spec.whatwg.org/multipage/parsing.html#reset-the-insertion-mode-appropriately)
    ///
    /// Walk the stack from the current node upward and pick the mode the
    /// deepest recognized ancestor dictates.
    pub(super) fn reset_insertion_mode(&mut self) {
        for (i, &node_id) in self.open_elements.iter().enumerate().rev() {
            let last = i == 0;
            let Some(tag) = self.tag_name(node_id) else {
                continue;
            };
            match tag {
                "select" => {
                    // "If node is a select element... let the insertion mode
                    //  be 'in select'" (the in-table refinement is handled
                    //  by InSelectInTable entry points).
                    self.mode = InsertionMode::InSelect;
                    return;
                }
                "td" | "th" if !last => {
                    self.mode = InsertionMode::InCell;
                    return;
                }
                "tr" => {
                    self.mode = InsertionMode::InRow;
                    return;
                }
                "tbody" | "thead" | "tfoot" => {
                    self.mode = InsertionMode::InTableBody;
                    return;
                }
                "caption" => {
                    self.mode = InsertionMode::InCaption;
                    return;
                }
                "colgroup" => {
                    self.mode = InsertionMode::InColumnGroup;
                    return;
                }
                "table" => {
                    self.mode = InsertionMode::InTable;
                    return;
                }
                "head" if !last => {
                    self.mode = InsertionMode::InHead;
                    return;
                }
                "body" => {
                    self.mode = InsertionMode::InBody;
                    return;
                }
                "frameset" => {
                    self.mode = InsertionMode::InFrameset;
                    return;
                }
                "html" => {
                    self.mode = if self.head_element.is_none() {
                        InsertionMode::BeforeHead
                    } else {
                        InsertionMode::AfterHead
                    };
                    return;
                }
                _ => {}
            }
            if last {
                self.mode = InsertionMode::InBody;
                return;
            }
        }
        self.mode = InsertionMode::InBody;
    }
}
