//! Offset-based pagination links.

use crate::query::{LIMIT, OFFSET};

/// Pagination link set for a sliced listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLinks {
    /// First page URL.
    pub first: Option<String>,
    /// Previous page URL.
    pub prev: Option<String>,
    /// Next page URL.
    pub next: Option<String>,
    /// Last page URL.
    pub last: Option<String>,
}

impl PageLinks {
    /// Links around the page starting at `offset`.
    ///
    /// `params` are carried over to every link except any existing
    /// `offset` and `limit`.
    pub fn new(
        base_url: &str,
        params: &[(String, String)],
        offset: usize,
        limit: usize,
        total: usize,
    ) -> Self {
        if limit == 0 {
            return Self::default();
        }

        let make_url = |page_offset| page_url(base_url, params, page_offset, limit);
        let has_more = offset.saturating_add(limit) < total;
        Self {
            first: (offset > 0).then(|| make_url(0)),
            prev: (offset > 0).then(|| make_url(offset.saturating_sub(limit))),
            next: has_more.then(|| make_url(offset + limit)),
            last: has_more.then(|| make_url((total - 1) / limit * limit)),
        }
    }

    /// Links around a page whose total is unknown.
    ///
    /// A full page may have a successor, so `next` is offered; `last` never
    /// is.
    pub fn open_ended(
        base_url: &str,
        params: &[(String, String)],
        offset: usize,
        limit: usize,
        full_page: bool,
    ) -> Self {
        if limit == 0 {
            return Self::default();
        }

        let make_url = |page_offset| page_url(base_url, params, page_offset, limit);
        Self {
            first: (offset > 0).then(|| make_url(0)),
            prev: (offset > 0).then(|| make_url(offset.saturating_sub(limit))),
            next: full_page.then(|| make_url(offset.saturating_add(limit))),
            last: None,
        }
    }

    /// Check if there are any links.
    pub fn is_empty(&self) -> bool {
        self.first.is_none() && self.prev.is_none() && self.next.is_none() && self.last.is_none()
    }

    /// Format as a `Link` header value.
    pub fn to_header_value(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let parts: Vec<String> = [
            (&self.first, "first"),
            (&self.prev, "prev"),
            (&self.next, "next"),
            (&self.last, "last"),
        ]
        .into_iter()
        .filter_map(|(url, rel)| url.as_ref().map(|url| format!("<{}>; rel=\"{}\"", url, rel)))
        .collect();

        Some(parts.join(", "))
    }
}

fn page_url(base_url: &str, params: &[(String, String)], offset: usize, limit: usize) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in params {
        if name != OFFSET && name != LIMIT {
            query.append_pair(name, value);
        }
    }
    query.append_pair(OFFSET, &offset.to_string());
    query.append_pair(LIMIT, &limit.to_string());
    format!("{}?{}", base_url, query.finish())
}
