//! Listing query parameters.

use arbor_core::{Error, Expansion, Request, Result, SortOrder};

/// Query parameter: index of the first child to return.
pub const OFFSET: &str = "offset";
/// Query parameter: maximum number of children to return.
pub const LIMIT: &str = "limit";
/// Query parameter: field to sort by.
pub const SORT: &str = "sort";
/// Query parameter: `asc` or `desc`.
pub const ORDER: &str = "order";
/// Query parameter: free-text search phrase.
pub const SEARCH: &str = "search";
/// Query parameter: comma-separated child names.
pub const NAMES: &str = "names";
/// Query parameter: `full` or a comma-separated field list.
pub const EXPAND: &str = "expand";

/// Listing parameters parsed from a request's query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    /// Children to skip.
    pub offset: usize,
    /// Children to return, `None` meaning all.
    pub limit: Option<usize>,
    /// Field to sort by.
    pub sort: Option<String>,
    /// Sort direction.
    pub order: SortOrder,
    /// Free-text search phrase.
    pub search: Option<String>,
    /// Restrict the listing to these children.
    pub names: Option<Vec<String>>,
    /// Expansion requested by the caller, overriding the collection's
    /// default.
    pub expand: Option<Expansion>,
}

impl ListingQuery {
    /// Parse listing parameters; `limit` is capped at `max_limit`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClientError`] for a malformed number or sort order.
    pub fn from_request(request: &Request, max_limit: Option<usize>) -> Result<Self> {
        let offset = number(request, OFFSET)?.unwrap_or(0);
        let limit = number(request, LIMIT)?;
        let limit = match (limit, max_limit) {
            (Some(limit), Some(max)) => Some(limit.min(max)),
            (None, Some(max)) => Some(max),
            (limit, None) => limit,
        };
        let order = match non_empty(request, ORDER) {
            Some(order) => order.parse()?,
            None => SortOrder::default(),
        };
        let names = non_empty(request, NAMES).map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect()
        });

        Ok(Self {
            offset,
            limit,
            sort: non_empty(request, SORT).map(str::to_string),
            order,
            search: non_empty(request, SEARCH).map(str::to_string),
            names,
            expand: request
                .query(EXPAND)
                .map(|raw| raw.parse().unwrap_or_default()),
        })
    }

    /// Whether a page was requested.
    pub fn is_sliced(&self) -> bool {
        self.offset > 0 || self.limit.is_some()
    }
}

fn non_empty<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request.query(name).map(str::trim).filter(|v| !v.is_empty())
}

fn number(request: &Request, name: &str) -> Result<Option<usize>> {
    non_empty(request, name)
        .map(|raw| {
            raw.parse::<usize>()
                .map_err(|_| Error::ClientError(format!("invalid {} '{}'", name, raw)))
        })
        .transpose()
}
