//! Pagination for GitLab list endpoints.
//!
//! GitLab reports sibling pages through an RFC 5988 `Link` header:
//!
//! ```text
//! <https://gitlab.example.com/api/v4/projects?page=2&per_page=20>; rel="next",
//! <https://gitlab.example.com/api/v4/projects?page=5&per_page=20>; rel="last"
//! ```
//!
//! Only the `page` and `per_page` query parameters of each target are used.
//! [`fetch_all`] follows `rel="next"` until the server stops sending it.

use std::future::Future;

use reqwest::header::{HeaderMap, LINK};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{GitlabError, Result};

/// Default page size for list operations.
pub const DEFAULT_PER_PAGE: u32 = 100;

/// One slice of a paginated collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed).
    pub page: u32,
    /// Number of items per page.
    pub per_page: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Page {
    /// Create a page reference.
    #[must_use]
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    /// Extract a page from the `page` and `per_page` query parameters of a URL.
    ///
    /// Returns `None` unless both are present and positive.
    pub fn from_url(target: &str) -> Option<Self> {
        let url = Url::parse(target).ok()?;
        let mut page = None;
        let mut per_page = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "page" => page = value.parse::<u32>().ok(),
                "per_page" => per_page = value.parse::<u32>().ok(),
                _ => {}
            }
        }
        let page = Self::new(page?, per_page?);
        page.is_valid().then_some(page)
    }

    /// Both the index and the size must be positive.
    pub fn is_valid(&self) -> bool {
        self.page > 0 && self.per_page > 0
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(GitlabError::InvalidParameter(format!(
                "page {} with per_page {}: both must be positive",
                self.page, self.per_page
            )))
        }
    }
}

/// Sibling page references derived from one response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub first: Option<Page>,
    pub last: Option<Page>,
    pub next: Option<Page>,
    pub prev: Option<Page>,
}

impl Pagination {
    /// Parse the value of a `Link` header.
    ///
    /// Entries that are not of the form `<url>; rel="name"`, or whose URL
    /// does not carry a valid page, are skipped. An empty value yields a
    /// pagination with every field unset.
    pub fn from_link_header(value: &str) -> Self {
        let mut pagination = Self::default();
        for entry in split_link_entries(value) {
            let Some((rels, page)) = parse_link_entry(entry) else {
                continue;
            };
            for rel in rels.split_whitespace() {
                match rel {
                    "first" => pagination.first = Some(page),
                    "last" => pagination.last = Some(page),
                    "next" => pagination.next = Some(page),
                    "prev" => pagination.prev = Some(page),
                    _ => {}
                }
            }
        }
        pagination
    }

    /// Parse pagination from response headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .map(Self::from_link_header)
            .unwrap_or_default()
    }

    /// Whether the server reported a following page.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// Split a `Link` value on the commas that separate entries. Commas inside
/// `<...>` belong to the target URL (e.g. `labels=a,b`).
fn split_link_entries(value: &str) -> impl Iterator<Item = &str> {
    let mut entries = Vec::new();
    let mut in_target = false;
    let mut start = 0;
    for (index, c) in value.char_indices() {
        match c {
            '<' => in_target = true,
            '>' => in_target = false,
            ',' if !in_target => {
                entries.push(&value[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    entries.push(&value[start..]);
    entries.into_iter()
}

/// Split one `<url>; rel="name"` entry into its relation names and page.
fn parse_link_entry(entry: &str) -> Option<(&str, Page)> {
    let mut parts = entry.split(';');
    let target = parts
        .next()?
        .trim()
        .strip_prefix('<')?
        .strip_suffix('>')?;

    let rels = parts.find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("rel") {
            return None;
        }
        value.trim().strip_prefix('"')?.strip_suffix('"')
    })?;

    Some((rels, Page::from_url(target)?))
}

/// A page of results from a GitLab list endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "T: Serialize")]
pub struct Paged<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Sibling pages reported by the server.
    #[serde(skip)]
    pub pagination: Pagination,
}

impl<T> Paged<T> {
    /// Create a page from items and the pagination parsed for them.
    #[must_use]
    pub fn new(items: Vec<T>, pagination: Pagination) -> Self {
        Self { items, pagination }
    }

    /// Map the items to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Paged<U> {
        Paged {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }

    /// Whether the server reported a following page.
    pub fn has_more(&self) -> bool {
        self.pagination.has_next()
    }

    /// Returns true if this page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns an iterator over the items in this page.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for Paged<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Paged<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Walk every page of a collection into `accumulator`.
///
/// The first call passes `None` so the request uses the default page. Each
/// later call passes exactly the `next` page reported by the previous
/// response; the walk ends when a response reports none. The first error
/// is returned as-is, and items from earlier pages stay in `accumulator`.
///
/// There is no page cap: a server that always reports a `next` page keeps
/// the walk going.
pub async fn fetch_all<T, A, F, Fut>(mut fetch_page: F, accumulator: &mut A) -> Result<()>
where
    A: Extend<T> + ?Sized,
    F: FnMut(Option<Page>) -> Fut,
    Fut: Future<Output = Result<Paged<T>>>,
{
    let mut page = None;
    loop {
        let Paged { items, pagination } = fetch_page(page).await?;
        accumulator.extend(items);
        match pagination.next {
            Some(next) => page = Some(next),
            None => return Ok(()),
        }
    }
}

/// [`fetch_all`] into a fresh `Vec`.
pub async fn collect_all<T, F, Fut>(fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(Option<Page>) -> Fut,
    Fut: Future<Output = Result<Paged<T>>>,
{
    let mut items = Vec::new();
    fetch_all(fetch_page, &mut items).await?;
    Ok(items)
}
