//! Tagging same-site links with the active locale.

use url::{form_urlencoded, Url};

use crate::locale::Locale;

#[derive(thiserror::Error, Debug)]
pub enum LinkError {
    #[error("`{href}` does not resolve against the page URL")]
    Unresolvable {
        href: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum LinkKind {
    Internal,
    External,
    Mailto,
    Fragment,
    Empty,
}

impl LinkKind {
    pub fn is_rewritable(&self) -> bool {
        matches!(self, LinkKind::Internal)
    }
}

// RFC 3986: ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":"
fn has_scheme(href: &str) -> bool {
    let Some((scheme, _)) = href.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => chars
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.')),
        _ => false,
    }
}

/// Strips the ASCII whitespace browsers ignore around `href` values.
pub fn trim_href(href: &str) -> &str {
    href.trim_matches(|ch: char| ch.is_ascii_whitespace())
}

pub fn classify(href: &str) -> LinkKind {
    let href = trim_href(href);
    if href.is_empty() {
        LinkKind::Empty
    } else if href.starts_with('#') {
        LinkKind::Fragment
    } else if href
        .get(..7)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("mailto:"))
    {
        LinkKind::Mailto
    } else if href.starts_with("//") || has_scheme(href) {
        LinkKind::External
    } else {
        LinkKind::Internal
    }
}

/// Sets `param=<locale>` on a same-site href, keeping the path text, every
/// other query pair and the fragment untouched.
///
/// The first existing `param` pair is replaced in place and any duplicates
/// are dropped, so applying this twice gives the same href.
pub fn rewrite_href(
    href: &str,
    base: &Url,
    param: &str,
    locale: Locale,
) -> Result<String, LinkError> {
    base.join(href).map_err(|source| LinkError::Unresolvable {
        href: href.to_owned(),
        source,
    })?;

    let (before_fragment, fragment) = match href.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (href, None),
    };
    let (path, query) = before_fragment
        .split_once('?')
        .unwrap_or((before_fragment, ""));

    let locale_pair = format!("{}={}", encode_component(param), locale.code());
    let mut pairs: Vec<&str> = Vec::new();
    let mut placed = false;
    for segment in query.split('&').filter(|segment| !segment.is_empty()) {
        if pair_key(segment) == param {
            if !placed {
                pairs.push(&locale_pair);
                placed = true;
            }
            continue;
        }
        pairs.push(segment);
    }
    if !placed {
        pairs.push(&locale_pair);
    }

    let mut rewritten = format!("{}?{}", path, pairs.join("&"));
    if let Some(fragment) = fragment {
        rewritten.push('#');
        rewritten.push_str(fragment);
    }
    Ok(rewritten)
}

/// Degraded rewrite for an href that could not be resolved: everything from
/// the first `?` or `#` is dropped before the locale pair is appended.
pub fn fallback_href(href: &str, param: &str, locale: Locale) -> String {
    let path = href.split(['?', '#']).next().unwrap_or_default();
    format!("{}?{}={}", path, encode_component(param), locale.code())
}

fn pair_key(segment: &str) -> String {
    form_urlencoded::parse(segment.as_bytes())
        .next()
        .map(|(key, _)| key.into_owned())
        .unwrap_or_default()
}

fn encode_component(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}
