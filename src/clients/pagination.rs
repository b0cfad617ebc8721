//! Cursor pagination state.
//!
//! List endpoints return a `Link` header of the form
//! `<https://...?limit=50&page_info=abc>; rel="next", <...>; rel="previous"`.
//! The query string of each URL is the exact query for the neighbouring
//! page: it carries the opaque `page_info` token and the original `limit`.
//! Tokens cannot be built by the client; each one must come from the
//! response immediately before it.

use std::collections::BTreeMap;

use url::Url;

/// Query parameters for the next and previous pages, parsed from a `Link`
/// header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageLinks {
    /// Query for the next page, if any.
    pub next: Option<BTreeMap<String, String>>,
    /// Query for the previous page, if any.
    pub previous: Option<BTreeMap<String, String>>,
}

/// Parses a `Link` header into [`PageLinks`].
///
/// Segments whose URL cannot be parsed, or whose `rel` is neither `next`
/// nor `previous`, are ignored.
///
/// # Example
///
/// ```rust
/// use shopify_client::clients::parse_link_header;
///
/// let links = parse_link_header(r#"<https://x/y?page_info=abc&limit=50>; rel="next""#);
/// let next = links.next.unwrap();
/// assert_eq!(next.get("page_info").map(String::as_str), Some("abc"));
/// assert_eq!(next.get("limit").map(String::as_str), Some("50"));
/// assert!(links.previous.is_none());
/// ```
#[must_use]
pub fn parse_link_header(header_value: &str) -> PageLinks {
    let mut links = PageLinks::default();
    let mut rest = header_value;

    // URLs may legally contain commas, so segments are located by their
    // angle brackets rather than by splitting on ','.
    while let Some(start) = rest.find('<') {
        let Some(len) = rest[start + 1..].find('>') else {
            break;
        };
        let target = &rest[start + 1..start + 1 + len];
        rest = &rest[start + 1 + len + 1..];

        let params_end = rest.find('<').unwrap_or(rest.len());
        let Some(rel) = rel_of(&rest[..params_end]) else {
            continue;
        };

        let Some(query) = query_of(target) else {
            continue;
        };
        match rel.as_str() {
            "next" => links.next = Some(query),
            "previous" => links.previous = Some(query),
            _ => {}
        }
    }

    links
}

fn rel_of(params: &str) -> Option<String> {
    params.split(';').find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("rel")
            .then(|| value.trim().trim_end_matches(',').trim().trim_matches('"').to_string())
    })
}

fn query_of(target: &str) -> Option<BTreeMap<String, String>> {
    let url = Url::parse(target.trim()).ok()?;
    Some(url.query_pairs().into_owned().collect())
}

/// Pagination state of one resource stream.
///
/// Replaced after every GET whose response carries a `Link` header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaginationCursor {
    resource: String,
    next_page_params: Option<BTreeMap<String, String>>,
    prev_page_params: Option<BTreeMap<String, String>>,
    page: u32,
}

impl PaginationCursor {
    /// Creates a cursor for `resource` from a response's `Link` header.
    ///
    /// `resource` is the normalized path the response was fetched from.
    #[must_use]
    pub fn from_link_header(resource: impl Into<String>, header_value: &str) -> Self {
        let links = parse_link_header(header_value);
        Self {
            resource: resource.into(),
            next_page_params: links.next,
            prev_page_params: links.previous,
            page: 1,
        }
    }

    /// Returns the resource path this cursor pages through.
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Returns the 1-based index of the current page.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Returns the query for the next page.
    #[must_use]
    pub const fn next_page_params(&self) -> Option<&BTreeMap<String, String>> {
        self.next_page_params.as_ref()
    }

    /// Returns the query for the previous page.
    #[must_use]
    pub const fn prev_page_params(&self) -> Option<&BTreeMap<String, String>> {
        self.prev_page_params.as_ref()
    }

    /// Returns `true` if a next page link was present.
    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.next_page_params.is_some()
    }

    /// Returns `true` if a previous page link was present.
    #[must_use]
    pub const fn has_prev_page(&self) -> bool {
        self.prev_page_params.is_some()
    }

    /// Replaces the links with those of a neighbouring page and moves the
    /// page counter one step forward or back (never below 1).
    pub(crate) fn advance(&mut self, header_value: Option<&str>, forward: bool) {
        let links = header_value.map(parse_link_header).unwrap_or_default();
        self.next_page_params = links.next;
        self.prev_page_params = links.previous;
        self.page = if forward {
            self.page.saturating_add(1)
        } else {
            self.page.saturating_sub(1).max(1)
        };
        tracing::debug!(
            resource = self.resource.as_str(),
            page = self.page,
            has_next = self.has_next_page(),
            has_prev = self.has_prev_page(),
            "Updated pagination cursor"
        );
    }
}
