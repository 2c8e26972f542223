//! Page-number pagination primitives shared by backend list endpoints.
//!
//! Endpoints expose fixed-size pages addressed by a 1-based `page` query
//! parameter and wrap their results in an envelope carrying the total item
//! count plus absolute `next`/`previous` links:
//!
//! ```json
//! {"count": 21, "next": "https://…/books?page=3", "previous": null, "results": […]}
//! ```
//!
//! The crate is transport-agnostic: callers resolve the request URL and the
//! backing store executes the `limit`/`offset` produced here.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::Serialize;
use url::Url;

/// Error raised when a requested page cannot be served.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    /// The `page` parameter did not parse as a positive integer, or the
    /// requested page lies beyond the last page of the collection.
    #[error("Invalid page number.")]
    InvalidPage,
}

/// 1-based page index requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageNumber(NonZeroU32);

impl PageNumber {
    /// The first page of any collection.
    pub const FIRST: Self = Self(NonZeroU32::MIN);

    /// Validate and construct a page number from a raw integer.
    pub fn new(page: u32) -> Result<Self, PageError> {
        NonZeroU32::new(page).map(Self).ok_or(PageError::InvalidPage)
    }

    /// Underlying 1-based index.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Parse an optional query-string value, defaulting to the first page.
    pub fn from_query(raw: Option<&str>) -> Result<Self, PageError> {
        match raw {
            None => Ok(Self::FIRST),
            Some(value) => value.parse(),
        }
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PageNumber {
    type Err = PageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s.trim().parse().map_err(|_| PageError::InvalidPage)?;
        Self::new(value)
    }
}

/// Fixed page size configured per endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page_size: NonZeroU32,
}

impl Pager {
    /// Construct a pager with the given page size.
    ///
    /// Returns `None` when `page_size` is zero; endpoint page sizes are
    /// compile-time constants so callers typically unwrap in a `const`.
    #[must_use]
    pub const fn new(page_size: u32) -> Option<Self> {
        match NonZeroU32::new(page_size) {
            Some(page_size) => Some(Self { page_size }),
            None => None,
        }
    }

    /// Number of items per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size.get()
    }

    /// Resolve the window for `requested` given the collection size.
    ///
    /// An empty collection still has one (empty) valid page; any page beyond
    /// the last yields [`PageError::InvalidPage`], mirroring the lookup
    /// semantics of page-number pagination.
    pub fn slice(&self, requested: PageNumber, count: u64) -> Result<PageSlice, PageError> {
        let size = u64::from(self.page_size.get());
        let total_pages = count.div_ceil(size).max(1);
        if u64::from(requested.get()) > total_pages {
            return Err(PageError::InvalidPage);
        }
        Ok(PageSlice {
            page: requested,
            page_size: self.page_size,
            count,
            total_pages,
        })
    }
}

/// A validated window into a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlice {
    page: PageNumber,
    page_size: NonZeroU32,
    count: u64,
    total_pages: u64,
}

impl PageSlice {
    /// Offset of the first item in this window.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page.get() as u64 - 1) * self.page_size.get() as u64
    }

    /// Maximum number of items in this window.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.page_size.get() as u64
    }

    /// Total number of items across all pages.
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    fn neighbour(&self, page: u64, base: &Url) -> Option<String> {
        if page < 1 || page > self.total_pages {
            return None;
        }
        let mut link = base.clone();
        {
            let retained: Vec<(String, String)> = link
                .query_pairs()
                .filter(|(name, _)| name != "page")
                .map(|(name, value)| (name.into_owned(), value.into_owned()))
                .collect();
            let mut pairs = link.query_pairs_mut();
            pairs.clear();
            for (name, value) in retained {
                pairs.append_pair(&name, &value);
            }
            // Page 1 keeps its explicit parameter; clients treat the links
            // as opaque either way.
            pairs.append_pair("page", &page.to_string());
        }
        Some(link.into())
    }

    /// Wrap fetched results in the response envelope.
    ///
    /// `base` is the absolute URL of the current request; `next` and
    /// `previous` links reuse its query string with an adjusted `page`.
    #[must_use]
    pub fn envelope<T>(&self, base: &Url, results: Vec<T>) -> Paginated<T> {
        let page = u64::from(self.page.get());
        Paginated {
            count: self.count,
            next: self.neighbour(page + 1, base),
            previous: self.neighbour(page.saturating_sub(1), base),
            results,
        }
    }
}

/// Serialised pagination envelope returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct Paginated<T> {
    /// Total number of items across all pages.
    pub count: u64,
    /// Absolute URL of the next page, if any.
    pub next: Option<String>,
    /// Absolute URL of the previous page, if any.
    pub previous: Option<String>,
    /// Items on this page.
    pub results: Vec<T>,
}
