//! Normalization of raw browsing query parameters.
//!
//! Browsing is a best-effort public read path: whatever the client sends is
//! folded into a usable [`SortRequest`]. Each parameter falls back to its own
//! default when absent or malformed; parsing never fails.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Untrusted query parameters as they arrive on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrowseParams {
    pub id: Option<String>,
    pub count: Option<String>,
    pub page: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Canonical sort/pagination request.
///
/// Exactly one of `by_rating`/`by_date` is true. `offset` is the zero-based
/// index of the first item; [`SortRequest::parse`] only produces offsets that
/// are page-aligned multiples of `page_size`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortRequest {
    pub by_rating: bool,
    pub by_date: bool,
    pub descending: bool,
    pub page_size: i64,
    pub offset: i64,
}

impl Default for SortRequest {
    fn default() -> Self {
        SortRequest {
            by_rating: false,
            by_date: true,
            descending: true,
            page_size: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl SortRequest {
    /// Builds a request from raw parameters, one field at a time:
    ///
    /// - `count`: page size; unparsable values become 10. A parsed value is
    ///   passed through untouched even when non-positive or absurdly large;
    ///   bounding it is the store's job.
    /// - `page`: 1-based; `offset = (page - 1) * page_size`, clamped to 0,
    ///   so page 0 and negative pages mean page 1.
    /// - `sort_by`: `"rating"` selects rating order, anything else keeps the
    ///   date default.
    /// - `sort_order`: `"down"` is descending, any other present value is
    ///   ascending, absent stays descending.
    pub fn parse(params: &BrowseParams) -> Self {
        let mut req = SortRequest::default();

        if let Some(count) = params.count.as_deref() {
            req.page_size = count.parse().unwrap_or(DEFAULT_PAGE_SIZE);
        }

        if let Some(page) = params.page.as_deref() {
            let p: i64 = page.parse().unwrap_or(1);
            req.offset = p.saturating_sub(1).saturating_mul(req.page_size).max(0);
        }

        if params.sort_by.as_deref() == Some("rating") {
            req.by_rating = true;
            req.by_date = false;
        }

        if let Some(order) = params.sort_order.as_deref() {
            req.descending = order == "down";
        }

        req
    }

    /// 1-based page number this request's offset lands on.
    pub fn page_number(&self) -> i64 {
        if self.page_size <= 0 {
            return 1;
        }
        (self.offset / self.page_size).saturating_add(1)
    }

    /// Value of `sort_by` that reproduces this request.
    pub fn sort_by_param(&self) -> &'static str {
        if self.by_rating {
            "rating"
        } else {
            "date"
        }
    }

    /// Value of `sort_order` that reproduces this request.
    pub fn sort_order_param(&self) -> &'static str {
        if self.descending {
            "down"
        } else {
            "up"
        }
    }
}
