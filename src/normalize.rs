//! Canonical forms for URLs and tags.
//!
//! The canonical URL is the deduplication key for every collection, so two
//! spellings of the same link must land on the same string here. Tags are
//! folded to lower-kebab-case so `DevOps`, `dev ops` and `dev_ops` compare
//! equal.

use std::borrow::Cow;

use url::{form_urlencoded, Url};

use crate::{BookmarkError, Result};

/// Separator used between words in a normalized tag.
const TAG_SEPARATOR: char = '-';

/// Scheme assumed for URLs written without one.
const DEFAULT_SCHEME: &str = "https";

/// Converts a URL to its canonical form for deduplication.
///
/// Applied in order: default the scheme to `https`, lowercase scheme and
/// host, strip trailing slashes from the path (a lone root `/` survives),
/// sort query parameters by key, drop the fragment.
///
/// # Errors
///
/// Returns [`BookmarkError::InvalidUrl`] when the input is blank or cannot
/// be parsed as a URL even after a scheme has been assumed.
pub fn canonicalize_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid_url(raw, "empty URL"));
    }

    let candidate = with_default_scheme(trimmed);
    let parsed = Url::parse(&candidate).map_err(|e| invalid_url(raw, &e.to_string()))?;

    Ok(render_canonical(&parsed, has_explicit_path(&candidate)))
}

fn invalid_url(url: &str, reason: &str) -> BookmarkError {
    BookmarkError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

/// Prepends the default scheme unless the input already names one.
///
/// `host:port` is not a scheme, and neither is anything containing
/// characters a scheme cannot hold.
fn with_default_scheme(raw: &str) -> Cow<'_, str> {
    if let Some(rest) = raw.strip_prefix("//") {
        return Cow::Owned(format!("{DEFAULT_SCHEME}://{rest}"));
    }

    match raw.split_once(':') {
        Some((scheme, rest))
            if is_scheme(scheme) && !rest.starts_with(|c: char| c.is_ascii_digit()) =>
        {
            Cow::Borrowed(raw)
        }
        _ => Cow::Owned(format!("{DEFAULT_SCHEME}://{raw}")),
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Whether the text after the authority starts with a `/`.
///
/// The parser reports `/` for both `https://host` and `https://host/`;
/// only the latter keeps its slash in canonical form.
fn has_explicit_path(candidate: &str) -> bool {
    let Some(idx) = candidate.find("://") else {
        return false;
    };
    let after_authority = &candidate[idx + 3..];
    after_authority
        .find(|c: char| matches!(c, '/' | '?' | '#'))
        .is_some_and(|pos| after_authority[pos..].starts_with('/'))
}

fn render_canonical(url: &Url, explicit_path: bool) -> String {
    let mut out = String::with_capacity(url.as_str().len());
    out.push_str(&url.scheme().to_ascii_lowercase());

    if url.cannot_be_a_base() {
        out.push(':');
        out.push_str(url.path());
    } else {
        out.push_str("://");
        if !url.username().is_empty() {
            out.push_str(url.username());
            if let Some(password) = url.password() {
                out.push(':');
                out.push_str(password);
            }
            out.push('@');
        }
        if let Some(host) = url.host_str() {
            out.push_str(&host.to_lowercase());
        }
        if let Some(port) = url.port() {
            out.push(':');
            out.push_str(&port.to_string());
        }
        out.push_str(canonical_path(url.path(), explicit_path));
    }

    if let Some(query) = url.query() {
        let sorted = sorted_query(query);
        if !sorted.is_empty() {
            out.push('?');
            out.push_str(&sorted);
        }
    }

    out
}

fn canonical_path(path: &str, explicit: bool) -> &str {
    if path.is_empty() || (!explicit && path == "/") {
        return "";
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Re-encodes a query string with its parameters stably sorted by key.
fn sorted_query(query: &str) -> String {
    let mut pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Converts a tag to lower-kebab-case.
///
/// Examples:
///   - "User Auth" → "user-auth"
///   - "DevOps" → "dev-ops"
///   - "XMLParser" → "xml-parser"
///   - "GraphQL API" → "graph-ql-api"
pub fn normalize_tag(tag: &str) -> String {
    let tag = tag.trim();
    if tag.is_empty() {
        return String::new();
    }

    let split = split_case_boundaries(tag);

    // Runs of anything that is not an ASCII letter or digit (the separator
    // included) collapse to one separator.
    let mut out = String::with_capacity(split.len());
    let mut in_separator_run = false;
    for c in split.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            in_separator_run = false;
        } else if !in_separator_run {
            out.push(TAG_SEPARATOR);
            in_separator_run = true;
        }
    }

    out.trim_matches(TAG_SEPARATOR).to_string()
}

/// Inserts a separator at camelCase and acronym boundaries.
///
/// An uppercase letter gets a separator in front of it when it follows a
/// lowercase letter (`DevOps`), or when it starts a lowercase run after
/// an uppercase one (`XMLParser` → `XML-Parser`).
fn split_case_boundaries(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev_lower = chars[i - 1].is_lowercase();
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev_lower || next_lower {
                result.push(TAG_SEPARATOR);
            }
        }
        result.push(c);
    }

    result
}

/// Normalizes every segment of every tag hierarchy in place.
///
/// Hierarchy structure and order are preserved; only segment text changes.
pub fn normalize_tags(tags: &mut [Vec<String>]) {
    for hierarchy in tags.iter_mut() {
        for segment in hierarchy.iter_mut() {
            *segment = normalize_tag(segment);
        }
    }
}
