//! CSS selector compilation and evaluation.
//!
//! This crate implements selector parsing and matching per
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/), plus the
//! `:contains(text)` extension familiar from scraping libraries, evaluated
//! against [`loam_dom`] trees.
//!
//! A [`Selector`] compiles once ([`Selector::parse`]) into an immutable AST
//! and is reusable across any number of evaluations and threads.
//! [`select`] / [`select_from`] return matches in document order with
//! duplicates removed; a malformed selector string is a
//! [`SelectorParseError`] at compile time and evaluation never begins.

use std::collections::HashSet;

use loam_dom::{Document, ElementData, NodeId, NodeType};
use thiserror::Error;

/// Errors raised by [`Selector::parse`]. Evaluation is never attempted on a
/// selector that fails to compile.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectorParseError {
    /// The selector string was empty or all whitespace.
    #[error("empty selector")]
    Empty,
    /// A comma-separated list contained an empty segment, or a combinator
    /// had no left-hand side.
    #[error("empty selector segment in {0:?}")]
    EmptySegment(String),
    /// A combinator with no right-hand side (`"div >"`).
    #[error("dangling combinator in {0:?}")]
    DanglingCombinator(String),
    /// A character with no meaning at its position.
    #[error("unexpected character {found:?} in {selector:?}")]
    UnexpectedCharacter {
        /// The offending character.
        found: char,
        /// The full selector input.
        selector: String,
    },
    /// An attribute selector missing its closing bracket.
    #[error("unterminated attribute selector in {0:?}")]
    UnterminatedAttribute(String),
    /// A quoted value missing its closing quote.
    #[error("unterminated quoted string in {0:?}")]
    UnterminatedString(String),
    /// A pseudo-class this engine does not implement.
    #[error("unknown pseudo-class :{0}")]
    UnknownPseudoClass(String),
    /// A functional pseudo-class with a missing or unbalanced argument.
    #[error("unbalanced parentheses in {0:?}")]
    UnbalancedParentheses(String),
    /// An `:nth-child` argument that is not `odd`, `even`, or `an+b`.
    #[error("invalid nth-child argument {0:?}")]
    InvalidNth(String),
}

/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrPredicate {
    /// `[attr]` - "Represents an element with the att attribute"
    Exists(String),
    /// `[attr=value]` - "whose value is exactly 'val'"
    Equals(String, String),
    /// `[attr~=value]` - "a whitespace-separated list of words, one of
    /// which is exactly 'val'"
    Includes(String, String),
    /// `[attr|=value]` - "either being exactly 'val' or beginning with
    /// 'val' immediately followed by '-'"
    DashMatch(String, String),
    /// `[attr^=value]` - "begins with the prefix 'val'"
    PrefixMatch(String, String),
    /// `[attr$=value]` - "ends with the suffix 'val'"
    SuffixMatch(String, String),
    /// `[attr*=value]` - "contains at least one instance of the substring"
    SubstringMatch(String, String),
}

/// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
///
/// Structural pseudo-classes, the negation pseudo-class, and the
/// `:contains` text extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    /// [§ 4.4 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
    /// "an element that is the root of the document" - the `<html>` element.
    Root,
    /// [§ 4.12 :first-child](https://www.w3.org/TR/selectors-4/#the-first-child-pseudo)
    FirstChild,
    /// [§ 4.12 :last-child](https://www.w3.org/TR/selectors-4/#the-last-child-pseudo)
    LastChild,
    /// [§ 4.12 :only-child](https://www.w3.org/TR/selectors-4/#the-only-child-pseudo)
    OnlyChild,
    /// [§ 4.12 :nth-child()](https://www.w3.org/TR/selectors-4/#the-nth-child-pseudo)
    /// "represents an element that has an+b-1 siblings before it"
    NthChild {
        /// The step `a` of `an+b`.
        a: i32,
        /// The offset `b` of `an+b`.
        b: i32,
    },
    /// [§ 4.11 :first-of-type](https://www.w3.org/TR/selectors-4/#the-first-of-type-pseudo)
    FirstOfType,
    /// [§ 4.11 :last-of-type](https://www.w3.org/TR/selectors-4/#the-last-of-type-pseudo)
    LastOfType,
    /// [§ 4.5 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
    Empty,
    /// `:contains(text)` - case-insensitive substring match against the
    /// element's normalized text. Not part of the CSS specs, but the
    /// workhorse of scraping selectors.
    Contains(String),
    /// [§ 4.3 :not()](https://www.w3.org/TR/selectors-4/#negation)
    /// "takes a selector list as an argument... represents an element that
    /// is not represented by its argument"
    Not(Box<Selector>),
}

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors)
///
/// A simple selector is a single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    /// Examples: `div`, `p`, `nyt_headline`
    Type(String),
    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    /// Examples: `.highlight`, `.nav-item`
    Class(String),
    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    /// Examples: `#main`, `#su`
    Id(String),
    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    Universal,
    /// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    /// Examples: `[href]`, `[value=百度一下]`, `[href^=https]`
    Attribute(AttrPredicate),
    /// Pseudo-classes: `:first-child`, `:nth-child(2n+1)`, `:contains(x)`,
    /// `:not(.skip)`
    Pseudo(PseudoClass),
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    /// The simple selectors; all must match.
    pub simple_selectors: Vec<SimpleSelector>,
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// [§ 16.1](https://www.w3.org/TR/selectors-4/#descendant-combinators)
    /// `A B` - B is an arbitrary descendant of A.
    Descendant,
    /// [§ 16.2](https://www.w3.org/TR/selectors-4/#child-combinators)
    /// `A > B` - B is a direct child of A.
    Child,
    /// [§ 16.3](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
    /// `A + B` - B immediately follows A under the same parent.
    NextSibling,
    /// [§ 16.4](https://www.w3.org/TR/selectors-4/#general-sibling-combinators)
    /// `A ~ B` - B follows A (not necessarily immediately).
    SubsequentSibling,
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// "A complex selector is a chain of one or more compound selectors
/// separated by combinators."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// The rightmost compound selector (the subject).
    ///
    /// "The elements represented by a complex selector are the elements
    /// matched by the last compound selector in the complex selector."
    pub subject: CompoundSelector,
    /// Chain of (combinator, compound) pairs going left from the subject,
    /// in right-to-left order for upward matching.
    pub combinators: Vec<(Combinator, CompoundSelector)>,
}

/// A compiled selector: one or more comma-separated alternatives.
///
/// [§ 4.1 Selector lists](https://www.w3.org/TR/selectors-4/#grouping)
/// "A selector list is a comma-separated list of selectors... an element
/// is represented by the list if it is represented by any of them."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    /// The union alternatives; any match is a match.
    pub alternatives: Vec<ComplexSelector>,
}

// =============================================================================
// Evaluation
// =============================================================================

/// Evaluate a compiled selector against the whole document.
///
/// Results are in document order, with no duplicates (a union list cannot
/// report the same element twice).
#[must_use]
pub fn select(doc: &Document, selector: &Selector) -> Vec<NodeId> {
    select_from(doc, doc.root(), selector)
}

/// Evaluate a compiled selector against the subtree rooted at `root`
/// (inclusive). Combinators never reach outside that subtree.
#[must_use]
pub fn select_from(doc: &Document, root: NodeId, selector: &Selector) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for id in std::iter::once(root).chain(doc.descendants(root)) {
        if doc.as_element(id).is_some()
            && selector.matches_within(doc, root, id)
            && seen.insert(id)
        {
            out.push(id);
        }
    }
    out
}

/// Compile and evaluate in one step.
///
/// # Errors
///
/// Returns the [`SelectorParseError`] when the selector string is
/// malformed; the tree is never touched in that case.
pub fn query(doc: &Document, selector: &str) -> Result<Vec<NodeId>, SelectorParseError> {
    Ok(select(doc, &Selector::parse(selector)?))
}

/// Compile and evaluate against a subtree in one step.
///
/// # Errors
///
/// Returns the [`SelectorParseError`] when the selector string is
/// malformed.
pub fn query_from(
    doc: &Document,
    root: NodeId,
    selector: &str,
) -> Result<Vec<NodeId>, SelectorParseError> {
    Ok(select_from(doc, root, &Selector::parse(selector)?))
}

impl Selector {
    /// [§ 4.1 Selector Matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)
    ///
    /// Whether the selector matches the element, with combinators scoped to
    /// the whole document.
    #[must_use]
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        self.matches_within(doc, doc.root(), id)
    }

    /// Match with ancestor/sibling walks bounded by `root`.
    fn matches_within(&self, doc: &Document, root: NodeId, id: NodeId) -> bool {
        self.alternatives
            .iter()
            .any(|complex| complex.matches_within(doc, root, id))
    }
}

impl ComplexSelector {
    fn matches_within(&self, doc: &Document, root: NodeId, id: NodeId) -> bool {
        // The subject (rightmost compound) must match the element itself.
        if !compound_matches(&self.subject, doc, root, id) {
            return false;
        }
        if self.combinators.is_empty() {
            return true;
        }

        // Walk the combinator chain right-to-left, restricting the
        // candidate at each step via ancestor/sibling moves instead of
        // re-scanning the tree.
        let mut current = id;
        for (combinator, compound) in &self.combinators {
            // The query root has no context inside the subtree.
            if current == root {
                return false;
            }
            match combinator {
                // [§ 16.1] "an element B that is an arbitrary descendant of
                // some ancestor element A"
                Combinator::Descendant => {
                    let mut matched = None;
                    for ancestor in doc.ancestors(current) {
                        if compound_matches(compound, doc, root, ancestor) {
                            matched = Some(ancestor);
                            break;
                        }
                        if ancestor == root {
                            break;
                        }
                    }
                    match matched {
                        Some(ancestor) => current = ancestor,
                        None => return false,
                    }
                }
                // [§ 16.2] "an element B that is a direct child of element A"
                Combinator::Child => {
                    let Some(parent) = doc.parent(current) else {
                        return false;
                    };
                    if !compound_matches(compound, doc, root, parent) {
                        return false;
                    }
                    current = parent;
                }
                // [§ 16.3] "an element B that immediately follows element A"
                Combinator::NextSibling => {
                    let Some(prev) = previous_element_sibling(doc, current) else {
                        return false;
                    };
                    if !compound_matches(compound, doc, root, prev) {
                        return false;
                    }
                    current = prev;
                }
                // [§ 16.4] "an element B that follows element A (not
                // necessarily immediately)"
                Combinator::SubsequentSibling => {
                    let matched = doc.preceding_siblings(current).find(|&sibling| {
                        doc.as_element(sibling).is_some()
                            && compound_matches(compound, doc, root, sibling)
                    });
                    match matched {
                        Some(sibling) => current = sibling,
                        None => return false,
                    }
                }
            }
        }
        true
    }
}

/// Whether every simple selector in the compound matches the element.
fn compound_matches(compound: &CompoundSelector, doc: &Document, root: NodeId, id: NodeId) -> bool {
    let Some(element) = doc.as_element(id) else {
        return false;
    };
    compound
        .simple_selectors
        .iter()
        .all(|simple| simple_matches(simple, doc, root, id, element))
}

fn simple_matches(
    simple: &SimpleSelector,
    doc: &Document,
    root: NodeId,
    id: NodeId,
    element: &ElementData,
) -> bool {
    match simple {
        // [§ 5.1] "A type selector... represents an element in the document
        // tree with the same qualified name."
        SimpleSelector::Type(name) => element.tag_name().eq_ignore_ascii_case(name),
        // [§ 6.6] Class tokens are matched case-sensitively.
        SimpleSelector::Class(name) => element.has_class(name),
        // [§ 6.7] "An ID selector represents an element instance that has
        // an identifier that matches."
        SimpleSelector::Id(id_value) => element.id() == Some(id_value.as_str()),
        // [§ 5.2] "represents the qualified name of any element type"
        SimpleSelector::Universal => true,
        SimpleSelector::Attribute(predicate) => attr_matches(predicate, element),
        SimpleSelector::Pseudo(pseudo) => pseudo_matches(pseudo, doc, root, id, element),
    }
}

/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// Attribute names compare ASCII-case-insensitively (the list stores them
/// folded); values compare exactly.
fn attr_matches(predicate: &AttrPredicate, element: &ElementData) -> bool {
    match predicate {
        AttrPredicate::Exists(name) => element.attrs.contains(name),
        AttrPredicate::Equals(name, value) => element.attrs.get(name) == Some(value.as_str()),
        AttrPredicate::Includes(name, value) => element
            .attrs
            .get(name)
            .is_some_and(|v| v.split_ascii_whitespace().any(|word| word == value)),
        AttrPredicate::DashMatch(name, value) => element.attrs.get(name).is_some_and(|v| {
            v == value
                || (v.len() > value.len() && v.starts_with(value.as_str()) && v.as_bytes()[value.len()] == b'-')
        }),
        AttrPredicate::PrefixMatch(name, value) => element
            .attrs
            .get(name)
            .is_some_and(|v| v.starts_with(value.as_str())),
        AttrPredicate::SuffixMatch(name, value) => element
            .attrs
            .get(name)
            .is_some_and(|v| v.ends_with(value.as_str())),
        AttrPredicate::SubstringMatch(name, value) => element
            .attrs
            .get(name)
            .is_some_and(|v| v.contains(value.as_str())),
    }
}

/// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
fn pseudo_matches(
    pseudo: &PseudoClass,
    doc: &Document,
    root: NodeId,
    id: NodeId,
    element: &ElementData,
) -> bool {
    match pseudo {
        // [§ 4.4] "an element that is the root of the document" - the
        // <html> element.
        PseudoClass::Root => doc.document_element() == Some(id),

        // [§ 4.12] "an element that is first among its inclusive siblings"
        PseudoClass::FirstChild => previous_element_sibling(doc, id).is_none(),

        // [§ 4.12] "an element that is last among its inclusive siblings"
        PseudoClass::LastChild => next_element_sibling(doc, id).is_none(),

        // [§ 4.12] "an element that has no siblings"
        PseudoClass::OnlyChild => {
            previous_element_sibling(doc, id).is_none() && next_element_sibling(doc, id).is_none()
        }

        // [§ 4.12] "an element that has an+b-1 siblings before it in the
        // document tree, for any positive integer or zero value of n"
        PseudoClass::NthChild { a, b } => {
            let Some(index) = element_index(doc, id) else {
                return false;
            };
            nth_matches(*a, *b, index)
        }

        // [§ 4.11] "an element that is the first sibling of its type"
        PseudoClass::FirstOfType => doc.parent(id).is_some_and(|parent| {
            doc.children(parent).iter().find(|&&sibling| {
                doc.tag_name(sibling)
                    .is_some_and(|tag| tag.eq_ignore_ascii_case(element.tag_name()))
            }) == Some(&id)
        }),

        // [§ 4.11] "an element that is the last sibling of its type"
        PseudoClass::LastOfType => doc.parent(id).is_some_and(|parent| {
            doc.children(parent).iter().rev().find(|&&sibling| {
                doc.tag_name(sibling)
                    .is_some_and(|tag| tag.eq_ignore_ascii_case(element.tag_name()))
            }) == Some(&id)
        }),

        // [§ 4.5] "an element that has no children at all" - whitespace
        // text and comments are disregarded.
        PseudoClass::Empty => doc
            .children(id)
            .iter()
            .all(|&child| match doc.get(child).map(|n| &n.node_type) {
                Some(NodeType::Text(text)) => text.trim().is_empty(),
                Some(NodeType::Comment(_)) => true,
                _ => false,
            }),

        // `:contains` - case-insensitive substring over the normalized
        // subtree text. An ancestor containing the text matches along with
        // the innermost element, same as the scraping libraries it mirrors.
        PseudoClass::Contains(needle) => doc
            .text(id)
            .to_lowercase()
            .contains(&needle.to_lowercase()),

        // [§ 4.3] "represents an element that is not represented by its
        // argument"
        PseudoClass::Not(inner) => !inner.matches_within(doc, root, id),
    }
}

/// Whether `index` (1-based among element siblings) satisfies `an+b` for
/// some integer n >= 0.
fn nth_matches(a: i32, b: i32, index: i32) -> bool {
    if a == 0 {
        return index == b;
    }
    let delta = index - b;
    delta % a == 0 && delta / a >= 0
}

/// 1-based position of the element among its element siblings.
fn element_index(doc: &Document, id: NodeId) -> Option<i32> {
    let parent = doc.parent(id)?;
    let mut index = 0;
    for &sibling in doc.children(parent) {
        if doc.as_element(sibling).is_some() {
            index += 1;
            if sibling == id {
                return Some(index);
            }
        }
    }
    None
}

/// The nearest preceding sibling that is an element (text and comment
/// nodes do not participate in sibling combinators or child indexing).
fn previous_element_sibling(doc: &Document, id: NodeId) -> Option<NodeId> {
    doc.preceding_siblings(id)
        .find(|&sibling| doc.as_element(sibling).is_some())
}

/// The nearest following sibling that is an element.
fn next_element_sibling(doc: &Document, id: NodeId) -> Option<NodeId> {
    let parent = doc.parent(id)?;
    let siblings = doc.children(parent);
    let position = siblings.iter().position(|&sibling| sibling == id)?;
    siblings[position + 1..]
        .iter()
        .find(|&&sibling| doc.as_element(sibling).is_some())
        .copied()
}

// =============================================================================
// Parsing
// =============================================================================

/// Check if a character can start an identifier.
/// [§ 4.3.10 ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
const fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// Check if a character can continue an identifier.
/// [§ 4.3.9 ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
const fn is_ident_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit() || c == '-'
}

impl Selector {
    /// Parse a raw selector string into a compiled [`Selector`].
    ///
    /// [§ 4 Selector syntax](https://www.w3.org/TR/selectors-4/#syntax)
    ///
    /// Supports type/class/id/universal selectors, compound selectors,
    /// attribute predicates (`=`, `~=`, `|=`, `^=`, `$=`, `*=`), the four
    /// combinators, comma-separated lists, structural pseudo-classes,
    /// `:contains(...)`, and `:not(...)`.
    ///
    /// # Errors
    ///
    /// Any syntactically malformed input - empty segments, dangling
    /// combinators, unterminated brackets or strings, unknown
    /// pseudo-classes, bad `nth-child` arguments - fails with a
    /// [`SelectorParseError`] describing the offending fragment.
    pub fn parse(raw: &str) -> Result<Self, SelectorParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SelectorParseError::Empty);
        }

        let mut parser = Parser {
            raw: raw.to_string(),
            chars: trimmed.chars().peekable(),
            alternatives: Vec::new(),
            compounds: Vec::new(),
            combinators: Vec::new(),
            current_compound: Vec::new(),
            current_ident: String::new(),
        };
        parser.run()?;
        Ok(Self {
            alternatives: parser.alternatives,
        })
    }
}

struct Parser<'s> {
    raw: String,
    chars: std::iter::Peekable<std::str::Chars<'s>>,
    alternatives: Vec<ComplexSelector>,
    compounds: Vec<CompoundSelector>,
    combinators: Vec<Combinator>,
    current_compound: Vec<SimpleSelector>,
    current_ident: String,
}

impl Parser<'_> {
    /// Flush the pending identifier as a type selector into the compound.
    fn flush_ident(&mut self) {
        if !self.current_ident.is_empty() {
            self.current_compound
                .push(SimpleSelector::Type(std::mem::take(&mut self.current_ident)));
        }
    }

    /// Flush the current compound selector into the compounds list.
    /// Returns true if a non-empty compound was flushed.
    fn flush_compound(&mut self) -> bool {
        self.flush_ident();
        if self.current_compound.is_empty() {
            return false;
        }
        self.compounds.push(CompoundSelector {
            simple_selectors: std::mem::take(&mut self.current_compound),
        });
        true
    }

    /// Record an explicit combinator; the left-hand compound must exist.
    fn push_combinator(&mut self, combinator: Combinator) -> Result<(), SelectorParseError> {
        if !self.flush_compound() {
            return Err(SelectorParseError::EmptySegment(self.raw.clone()));
        }
        self.skip_whitespace();
        self.combinators.push(combinator);
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            let _ = self.chars.next();
        }
    }

    /// Assemble the collected compounds and combinators into one
    /// [`ComplexSelector`] alternative.
    ///
    /// [§ 4.3](https://www.w3.org/TR/selectors-4/#complex)
    /// "The elements represented by a complex selector are the elements
    /// matched by the last compound selector" - the rightmost compound
    /// becomes the subject and the chain is reversed for upward matching.
    fn finish_alternative(&mut self) -> Result<(), SelectorParseError> {
        let _ = self.flush_compound();
        if self.compounds.is_empty() {
            return Err(SelectorParseError::EmptySegment(self.raw.clone()));
        }
        if self.compounds.len() != self.combinators.len() + 1 {
            return Err(SelectorParseError::DanglingCombinator(self.raw.clone()));
        }

        let subject = self.compounds.pop().unwrap_or(CompoundSelector {
            simple_selectors: vec![SimpleSelector::Universal],
        });
        let compounds = std::mem::take(&mut self.compounds);
        let combinators = std::mem::take(&mut self.combinators);
        let chain = compounds
            .into_iter()
            .zip(combinators)
            .rev()
            .map(|(compound, combinator)| (combinator, compound))
            .collect();

        self.alternatives.push(ComplexSelector {
            subject,
            combinators: chain,
        });
        Ok(())
    }

    fn run(&mut self) -> Result<(), SelectorParseError> {
        while let Some(c) = self.chars.next() {
            match c {
                // [§ 6.6] "The class selector is given as a full stop (.)
                // immediately followed by an identifier."
                '.' => {
                    self.flush_ident();
                    let name = self.collect_ident();
                    if name.is_empty() {
                        return Err(SelectorParseError::UnexpectedCharacter {
                            found: '.',
                            selector: self.raw.clone(),
                        });
                    }
                    self.current_compound.push(SimpleSelector::Class(name));
                }

                // [§ 6.7] "An ID selector is a hash (#) immediately
                // followed by the ID value."
                '#' => {
                    self.flush_ident();
                    let name = self.collect_ident();
                    if name.is_empty() {
                        return Err(SelectorParseError::UnexpectedCharacter {
                            found: '#',
                            selector: self.raw.clone(),
                        });
                    }
                    self.current_compound.push(SimpleSelector::Id(name));
                }

                // [§ 5.2] "The universal selector is a single asterisk."
                '*' => {
                    self.flush_ident();
                    self.current_compound.push(SimpleSelector::Universal);
                }

                // Whitespace is either insignificant (around explicit
                // combinators and commas) or the descendant combinator.
                c if c.is_ascii_whitespace() => {
                    if self.current_ident.is_empty()
                        && self.current_compound.is_empty()
                        && self.compounds.is_empty()
                    {
                        continue;
                    }
                    self.skip_whitespace();
                    match self.chars.peek() {
                        None | Some('>' | '+' | '~' | ',') => self.flush_ident(),
                        // [§ 16.1] "A descendant combinator is whitespace
                        // that separates two compound selectors."
                        Some(_) => {
                            if self.flush_compound() {
                                self.combinators.push(Combinator::Descendant);
                            }
                        }
                    }
                }

                '>' => self.push_combinator(Combinator::Child)?,
                '+' => self.push_combinator(Combinator::NextSibling)?,
                '~' => self.push_combinator(Combinator::SubsequentSibling)?,

                // [§ 4.1] Selector lists: finish this alternative, start
                // the next.
                ',' => {
                    self.finish_alternative()?;
                    self.skip_whitespace();
                }

                // [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
                ':' => {
                    self.flush_ident();
                    let pseudo = self.parse_pseudo()?;
                    self.current_compound.push(SimpleSelector::Pseudo(pseudo));
                }

                // [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
                '[' => {
                    self.flush_ident();
                    let predicate = self.parse_attribute()?;
                    self.current_compound
                        .push(SimpleSelector::Attribute(predicate));
                }

                // Identifier characters - part of a type selector.
                c if self.current_ident.is_empty() && (is_ident_start_char(c) || c == '-') => {
                    self.current_ident.push(c);
                }
                c if !self.current_ident.is_empty() && is_ident_char(c) => {
                    self.current_ident.push(c);
                }

                found => {
                    return Err(SelectorParseError::UnexpectedCharacter {
                        found,
                        selector: self.raw.clone(),
                    });
                }
            }
        }

        self.finish_alternative()
    }

    fn collect_ident(&mut self) -> String {
        let mut ident = String::new();
        while self.chars.peek().copied().is_some_and(is_ident_char) {
            if let Some(c) = self.chars.next() {
                ident.push(c);
            }
        }
        ident
    }

    /// Parse a pseudo-class after the `:` has been consumed.
    fn parse_pseudo(&mut self) -> Result<PseudoClass, SelectorParseError> {
        // Tolerate the `::` pseudo-element syntax; the name decides whether
        // it is something this engine knows.
        if self.chars.peek() == Some(&':') {
            let _ = self.chars.next();
        }
        let name = self.collect_ident();
        if name.is_empty() {
            return Err(SelectorParseError::UnexpectedCharacter {
                found: ':',
                selector: self.raw.clone(),
            });
        }

        let argument = if self.chars.peek() == Some(&'(') {
            let _ = self.chars.next();
            Some(self.collect_balanced_argument()?)
        } else {
            None
        };

        let lower = name.to_ascii_lowercase();
        match (lower.as_str(), argument) {
            ("root", None) => Ok(PseudoClass::Root),
            ("first-child", None) => Ok(PseudoClass::FirstChild),
            ("last-child", None) => Ok(PseudoClass::LastChild),
            ("only-child", None) => Ok(PseudoClass::OnlyChild),
            ("first-of-type", None) => Ok(PseudoClass::FirstOfType),
            ("last-of-type", None) => Ok(PseudoClass::LastOfType),
            ("empty", None) => Ok(PseudoClass::Empty),
            ("nth-child", Some(arg)) => {
                let (a, b) = parse_nth(&arg)?;
                Ok(PseudoClass::NthChild { a, b })
            }
            ("contains", Some(arg)) => {
                let needle = strip_quotes(arg.trim());
                Ok(PseudoClass::Contains(needle.to_string()))
            }
            ("not", Some(arg)) => {
                let inner = Selector::parse(&arg)?;
                Ok(PseudoClass::Not(Box::new(inner)))
            }
            ("nth-child" | "contains" | "not", None) => {
                Err(SelectorParseError::UnbalancedParentheses(self.raw.clone()))
            }
            _ => Err(SelectorParseError::UnknownPseudoClass(name)),
        }
    }

    /// Consume a balanced-parentheses argument; the opening `(` has already
    /// been consumed.
    fn collect_balanced_argument(&mut self) -> Result<String, SelectorParseError> {
        let mut depth = 1_u32;
        let mut argument = String::new();
        for c in self.chars.by_ref() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(argument);
                    }
                }
                _ => {}
            }
            argument.push(c);
        }
        Err(SelectorParseError::UnbalancedParentheses(self.raw.clone()))
    }

    /// Parse an attribute predicate after the `[` has been consumed.
    ///
    /// [§ 6.4](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    fn parse_attribute(&mut self) -> Result<AttrPredicate, SelectorParseError> {
        self.skip_whitespace();

        let mut name = String::new();
        while self
            .chars
            .peek()
            .copied()
            .is_some_and(|c| is_ident_char(c) || c == ':')
        {
            if let Some(c) = self.chars.next() {
                name.push(c);
            }
        }
        if name.is_empty() {
            return Err(SelectorParseError::UnterminatedAttribute(self.raw.clone()));
        }
        let name = name.to_ascii_lowercase();

        self.skip_whitespace();
        match self.chars.next() {
            // "[attr] - Represents an element with the att attribute"
            Some(']') => Ok(AttrPredicate::Exists(name)),
            Some('=') => {
                let value = self.parse_attr_value()?;
                self.expect_closing_bracket()?;
                Ok(AttrPredicate::Equals(name, value))
            }
            Some(op @ ('~' | '|' | '^' | '$' | '*')) => {
                if self.chars.next() != Some('=') {
                    return Err(SelectorParseError::UnexpectedCharacter {
                        found: op,
                        selector: self.raw.clone(),
                    });
                }
                let value = self.parse_attr_value()?;
                self.expect_closing_bracket()?;
                Ok(match op {
                    '~' => AttrPredicate::Includes(name, value),
                    '|' => AttrPredicate::DashMatch(name, value),
                    '^' => AttrPredicate::PrefixMatch(name, value),
                    '$' => AttrPredicate::SuffixMatch(name, value),
                    _ => AttrPredicate::SubstringMatch(name, value),
                })
            }
            _ => Err(SelectorParseError::UnterminatedAttribute(self.raw.clone())),
        }
    }

    /// Parse an attribute value: quoted (`"val"`, `'val'`) or a bare token
    /// running to the closing bracket.
    fn parse_attr_value(&mut self) -> Result<String, SelectorParseError> {
        self.skip_whitespace();
        match self.chars.peek() {
            Some(&quote @ ('"' | '\'')) => {
                let _ = self.chars.next();
                let mut value = String::new();
                for c in self.chars.by_ref() {
                    if c == quote {
                        return Ok(value);
                    }
                    value.push(c);
                }
                Err(SelectorParseError::UnterminatedString(self.raw.clone()))
            }
            Some(_) => {
                let mut value = String::new();
                while self
                    .chars
                    .peek()
                    .is_some_and(|&c| c != ']' && !c.is_ascii_whitespace())
                {
                    if let Some(c) = self.chars.next() {
                        value.push(c);
                    }
                }
                Ok(value)
            }
            None => Err(SelectorParseError::UnterminatedAttribute(self.raw.clone())),
        }
    }

    fn expect_closing_bracket(&mut self) -> Result<(), SelectorParseError> {
        self.skip_whitespace();
        if self.chars.next() == Some(']') {
            Ok(())
        } else {
            Err(SelectorParseError::UnterminatedAttribute(self.raw.clone()))
        }
    }
}

/// Strip one level of matching quotes, if present.
fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// [§ 4.12 The An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)
///
/// Accepts `odd`, `even`, a bare integer, `an`, `an+b`, and `an-b`, with
/// optional signs and whitespace.
fn parse_nth(argument: &str) -> Result<(i32, i32), SelectorParseError> {
    let compact: String = argument
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();

    match compact.as_str() {
        // "odd has the same meaning as 2n+1"
        "odd" => return Ok((2, 1)),
        // "even has the same meaning as 2n"
        "even" => return Ok((2, 0)),
        "" => return Err(SelectorParseError::InvalidNth(argument.to_string())),
        _ => {}
    }

    let invalid = || SelectorParseError::InvalidNth(argument.to_string());

    match compact.find('n') {
        None => compact.parse::<i32>().map(|b| (0, b)).map_err(|_| invalid()),
        Some(n_at) => {
            let a_part = &compact[..n_at];
            let a = match a_part {
                "" | "+" => 1,
                "-" => -1,
                _ => a_part.parse::<i32>().map_err(|_| invalid())?,
            };
            let b_part = &compact[n_at + 1..];
            let b = if b_part.is_empty() {
                0
            } else {
                let (sign, digits) = match b_part.as_bytes()[0] {
                    b'+' => (1, &b_part[1..]),
                    b'-' => (-1, &b_part[1..]),
                    _ => return Err(invalid()),
                };
                sign * digits.parse::<i32>().map_err(|_| invalid())?
            };
            Ok((a, b))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nth_microsyntax() {
        assert_eq!(parse_nth("odd"), Ok((2, 1)));
        assert_eq!(parse_nth("even"), Ok((2, 0)));
        assert_eq!(parse_nth("3"), Ok((0, 3)));
        assert_eq!(parse_nth("2n+1"), Ok((2, 1)));
        assert_eq!(parse_nth("-n+3"), Ok((-1, 3)));
        assert_eq!(parse_nth(" 2n + 1 "), Ok((2, 1)));
        assert!(parse_nth("banana").is_err());
    }

    #[test]
    fn nth_membership() {
        // 2n+1: odd positions
        assert!(nth_matches(2, 1, 1));
        assert!(!nth_matches(2, 1, 2));
        assert!(nth_matches(2, 1, 3));
        // -n+3: first three
        assert!(nth_matches(-1, 3, 1));
        assert!(nth_matches(-1, 3, 3));
        assert!(!nth_matches(-1, 3, 4));
        // 0n+b: exactly b
        assert!(nth_matches(0, 2, 2));
        assert!(!nth_matches(0, 2, 4));
    }
}
