//! Tests for selector parsing: the AST produced for well-formed input and
//! the errors produced for malformed input.

use loam_select::{
    AttrPredicate, Combinator, CompoundSelector, PseudoClass, Selector, SelectorParseError,
    SimpleSelector,
};

fn single(selector: &Selector) -> &CompoundSelector {
    assert_eq!(selector.alternatives.len(), 1);
    &selector.alternatives[0].subject
}

// ========== simple selectors ==========

#[test]
fn test_parse_type_selector() {
    let selector = Selector::parse("body").unwrap();
    let subject = single(&selector);
    assert_eq!(subject.simple_selectors.len(), 1);
    assert!(matches!(
        &subject.simple_selectors[0],
        SimpleSelector::Type(name) if name == "body"
    ));
    assert!(selector.alternatives[0].combinators.is_empty());
}

#[test]
fn test_parse_class_selector() {
    let selector = Selector::parse(".highlight").unwrap();
    assert!(matches!(
        &single(&selector).simple_selectors[0],
        SimpleSelector::Class(name) if name == "highlight"
    ));
}

#[test]
fn test_parse_id_selector() {
    let selector = Selector::parse("#main-content").unwrap();
    assert!(matches!(
        &single(&selector).simple_selectors[0],
        SimpleSelector::Id(name) if name == "main-content"
    ));
}

#[test]
fn test_parse_universal_selector() {
    let selector = Selector::parse("*").unwrap();
    assert!(matches!(
        &single(&selector).simple_selectors[0],
        SimpleSelector::Universal
    ));
}

#[test]
fn test_parse_compound_selector() {
    let selector = Selector::parse("div.highlight#main").unwrap();
    assert_eq!(single(&selector).simple_selectors.len(), 3);
}

#[test]
fn test_parse_underscore_tag_name() {
    let selector = Selector::parse("nyt_headline").unwrap();
    assert!(matches!(
        &single(&selector).simple_selectors[0],
        SimpleSelector::Type(name) if name == "nyt_headline"
    ));
}

// ========== attribute selectors ==========

#[test]
fn test_parse_attribute_forms() {
    let cases: &[(&str, fn(&AttrPredicate) -> bool)] = &[
        ("[href]", |p| matches!(p, AttrPredicate::Exists(n) if n == "href")),
        ("[type=text]", |p| {
            matches!(p, AttrPredicate::Equals(n, v) if n == "type" && v == "text")
        }),
        ("[class~=active]", |p| {
            matches!(p, AttrPredicate::Includes(n, v) if n == "class" && v == "active")
        }),
        ("[lang|=en]", |p| {
            matches!(p, AttrPredicate::DashMatch(n, v) if n == "lang" && v == "en")
        }),
        ("[href^=https]", |p| {
            matches!(p, AttrPredicate::PrefixMatch(n, v) if n == "href" && v == "https")
        }),
        ("[src$=.png]", |p| {
            matches!(p, AttrPredicate::SuffixMatch(n, v) if n == "src" && v == ".png")
        }),
        ("[data-x*=dark]", |p| {
            matches!(p, AttrPredicate::SubstringMatch(n, v) if n == "data-x" && v == "dark")
        }),
    ];
    for (input, check) in cases {
        let selector = Selector::parse(input).unwrap();
        let SimpleSelector::Attribute(predicate) = &single(&selector).simple_selectors[0] else {
            panic!("expected attribute selector for {input}");
        };
        assert!(check(predicate), "wrong predicate for {input}");
    }
}

#[test]
fn test_parse_quoted_attribute_value() {
    let selector = Selector::parse("[title=\"a b\"]").unwrap();
    assert!(matches!(
        &single(&selector).simple_selectors[0],
        SimpleSelector::Attribute(AttrPredicate::Equals(n, v)) if n == "title" && v == "a b"
    ));
}

#[test]
fn test_parse_non_ascii_attribute_value() {
    let selector = Selector::parse("input[value=百度一下]").unwrap();
    assert!(matches!(
        &single(&selector).simple_selectors[1],
        SimpleSelector::Attribute(AttrPredicate::Equals(n, v)) if n == "value" && v == "百度一下"
    ));
}

#[test]
fn test_parse_attribute_name_with_colon() {
    let selector = Selector::parse("[xml:lang]").unwrap();
    assert!(matches!(
        &single(&selector).simple_selectors[0],
        SimpleSelector::Attribute(AttrPredicate::Exists(n)) if n == "xml:lang"
    ));
}

// ========== combinators and lists ==========

#[test]
fn test_parse_descendant_combinator() {
    let selector = Selector::parse("div p").unwrap();
    let complex = &selector.alternatives[0];
    assert!(matches!(
        &complex.subject.simple_selectors[0],
        SimpleSelector::Type(name) if name == "p"
    ));
    assert_eq!(complex.combinators.len(), 1);
    assert_eq!(complex.combinators[0].0, Combinator::Descendant);
}

#[test]
fn test_parse_child_combinator_with_spaces() {
    for input in ["ul > li", "ul>li", "ul >li", "ul> li"] {
        let selector = Selector::parse(input).unwrap();
        let complex = &selector.alternatives[0];
        assert_eq!(complex.combinators.len(), 1, "for {input}");
        assert_eq!(complex.combinators[0].0, Combinator::Child, "for {input}");
    }
}

#[test]
fn test_parse_sibling_combinators() {
    let next = Selector::parse("h1 + p").unwrap();
    assert_eq!(next.alternatives[0].combinators[0].0, Combinator::NextSibling);
    let general = Selector::parse("h1 ~ p").unwrap();
    assert_eq!(
        general.alternatives[0].combinators[0].0,
        Combinator::SubsequentSibling
    );
}

#[test]
fn test_parse_chain_is_right_to_left() {
    // "a > b c" matches from the subject upward: first Descendant to b,
    // then Child to a.
    let selector = Selector::parse("a > b c").unwrap();
    let complex = &selector.alternatives[0];
    assert!(matches!(
        &complex.subject.simple_selectors[0],
        SimpleSelector::Type(name) if name == "c"
    ));
    assert_eq!(complex.combinators[0].0, Combinator::Descendant);
    assert!(matches!(
        &complex.combinators[0].1.simple_selectors[0],
        SimpleSelector::Type(name) if name == "b"
    ));
    assert_eq!(complex.combinators[1].0, Combinator::Child);
}

#[test]
fn test_parse_selector_list() {
    let selector = Selector::parse("h1, .title , #main").unwrap();
    assert_eq!(selector.alternatives.len(), 3);
}

// ========== pseudo-classes ==========

#[test]
fn test_parse_structural_pseudo_classes() {
    for (input, expected) in [
        (":root", PseudoClass::Root),
        (":first-child", PseudoClass::FirstChild),
        (":last-child", PseudoClass::LastChild),
        (":only-child", PseudoClass::OnlyChild),
        (":first-of-type", PseudoClass::FirstOfType),
        (":last-of-type", PseudoClass::LastOfType),
        (":empty", PseudoClass::Empty),
    ] {
        let selector = Selector::parse(input).unwrap();
        assert_eq!(
            single(&selector).simple_selectors[0],
            SimpleSelector::Pseudo(expected),
            "for {input}"
        );
    }
}

#[test]
fn test_parse_nth_child_forms() {
    for (input, a, b) in [
        ("li:nth-child(odd)", 2, 1),
        ("li:nth-child(even)", 2, 0),
        ("li:nth-child(3)", 0, 3),
        ("li:nth-child(2n+1)", 2, 1),
        ("li:nth-child(-n+2)", -1, 2),
    ] {
        let selector = Selector::parse(input).unwrap();
        assert_eq!(
            single(&selector).simple_selectors[1],
            SimpleSelector::Pseudo(PseudoClass::NthChild { a, b }),
            "for {input}"
        );
    }
}

#[test]
fn test_parse_contains() {
    let selector = Selector::parse("a:contains(新)").unwrap();
    assert_eq!(
        single(&selector).simple_selectors[1],
        SimpleSelector::Pseudo(PseudoClass::Contains("新".to_string()))
    );

    let quoted = Selector::parse("p:contains(\"Volt will be sold\")").unwrap();
    assert_eq!(
        single(&quoted).simple_selectors[1],
        SimpleSelector::Pseudo(PseudoClass::Contains("Volt will be sold".to_string()))
    );
}

#[test]
fn test_parse_not() {
    let selector = Selector::parse("div:not(.skip, #old)").unwrap();
    let SimpleSelector::Pseudo(PseudoClass::Not(inner)) = &single(&selector).simple_selectors[1]
    else {
        panic!("expected :not");
    };
    assert_eq!(inner.alternatives.len(), 2);
}

// ========== errors ==========

#[test]
fn test_empty_selector_is_error() {
    assert_eq!(Selector::parse(""), Err(SelectorParseError::Empty));
    assert_eq!(Selector::parse("   "), Err(SelectorParseError::Empty));
}

#[test]
fn test_empty_segment_is_error() {
    assert!(matches!(
        Selector::parse("div,,p"),
        Err(SelectorParseError::EmptySegment(_))
    ));
    assert!(matches!(
        Selector::parse("div,"),
        Err(SelectorParseError::EmptySegment(_))
    ));
}

#[test]
fn test_dangling_combinator_is_error() {
    assert!(matches!(
        Selector::parse("div >"),
        Err(SelectorParseError::DanglingCombinator(_))
    ));
}

#[test]
fn test_leading_combinator_is_error() {
    assert!(matches!(
        Selector::parse("> div"),
        Err(SelectorParseError::EmptySegment(_))
    ));
}

#[test]
fn test_unterminated_attribute_is_error() {
    assert!(matches!(
        Selector::parse("[href"),
        Err(SelectorParseError::UnterminatedAttribute(_))
    ));
    assert!(matches!(
        Selector::parse("a[href=x"),
        Err(SelectorParseError::UnterminatedAttribute(_))
    ));
}

#[test]
fn test_unterminated_string_is_error() {
    assert!(matches!(
        Selector::parse("[title=\"oops]"),
        Err(SelectorParseError::UnterminatedString(_))
    ));
}

#[test]
fn test_unknown_pseudo_class_is_error() {
    assert_eq!(
        Selector::parse("a:hover"),
        Err(SelectorParseError::UnknownPseudoClass("hover".to_string()))
    );
}

#[test]
fn test_invalid_nth_is_error() {
    assert!(matches!(
        Selector::parse("li:nth-child(banana)"),
        Err(SelectorParseError::InvalidNth(_))
    ));
}

#[test]
fn test_unbalanced_parentheses_is_error() {
    assert!(matches!(
        Selector::parse("div:not(.a"),
        Err(SelectorParseError::UnbalancedParentheses(_))
    ));
}

#[test]
fn test_unexpected_character_is_error() {
    assert!(matches!(
        Selector::parse("div { color }"),
        Err(SelectorParseError::UnexpectedCharacter { found: '{', .. })
    ));
}

#[test]
fn test_invalid_selector_inside_not_propagates() {
    assert!(Selector::parse("div:not([oops)").is_err());
}
