//! URL resolution utilities.
//!
//! [§ 4.2.3 The base element](https://html.spec.whatwg.org/multipage/semantics.html#the-base-element)
//! [URL Standard](https://url.spec.whatwg.org/)

use url::Url;

/// [§ 2.5 URLs](https://html.spec.whatwg.org/multipage/urls-and-fetching.html#resolving-urls)
///
/// Resolve a potentially relative URL against a base URL.
///
/// # Algorithm
///
/// STEP 1: "If url is an absolute URL, return url."
///
/// STEP 2: "Otherwise, resolve url relative to base."
///
/// Both steps are delegated to the `url` crate's implementation of the URL
/// Standard parsing algorithm. `None` is returned when neither the input nor
/// the base yields a valid absolute URL - callers surface that as an empty
/// result rather than an error.
#[must_use]
pub fn resolve(href: &str, base: Option<&str>) -> Option<String> {
    // STEP 1: An input that parses on its own is already absolute.
    //
    // [URL Standard § 4.3](https://url.spec.whatwg.org/#url-parsing)
    // "An absolute-URL string is a URL-scheme string, followed by U+003A (:),
    // followed by a scheme-specific part."
    if let Ok(absolute) = Url::parse(href) {
        return Some(absolute.to_string());
    }

    // STEP 2: Resolve relative to base. A base that does not itself parse
    // cannot anchor anything.
    let base = Url::parse(base?.trim()).ok()?;
    base.join(href.trim()).ok().map(|joined| joined.to_string())
}

/// Whether a string parses as an absolute URL on its own.
#[must_use]
pub fn is_absolute(href: &str) -> bool {
    Url::parse(href).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_passes_through() {
        assert_eq!(
            resolve("http://example.com/x", Some("http://other.com/")),
            Some("http://example.com/x".to_string())
        );
    }

    #[test]
    fn relative_joins_base() {
        assert_eq!(
            resolve("/x", Some("http://example.com/dir/page.html")),
            Some("http://example.com/x".to_string())
        );
        assert_eq!(
            resolve("img/a.png", Some("http://example.com/dir/page.html")),
            Some("http://example.com/dir/img/a.png".to_string())
        );
    }

    #[test]
    fn protocol_relative_takes_base_scheme() {
        assert_eq!(
            resolve("//cdn.example.com/a.js", Some("https://example.com/")),
            Some("https://cdn.example.com/a.js".to_string())
        );
    }

    #[test]
    fn unresolvable_is_none() {
        assert_eq!(resolve("/x", None), None);
        assert_eq!(resolve("/x", Some("not a url")), None);
    }
}
