//! Page assembly: store queries combined with navigation state.

use crate::model::Quote;
use crate::sort::SortRequest;
use crate::store::{QuoteStore, StoreError};

/// View model for one rendered page. Built fresh per request and discarded
/// after rendering.
#[derive(Debug, Clone)]
pub struct PageView {
    /// 1-based page number; 0 on the single-quote path.
    pub page: i64,
    /// Total pages under the current page size; 0 when unknown.
    pub pages: i64,
    pub quotes: Vec<Quote>,
    pub db_size: i64,
    pub moderation_queue_size: i64,
    pub prev_button: bool,
    pub next_button: bool,
    pub prev_link: Option<String>,
    pub next_link: Option<String>,
    pub sort: SortRequest,
}

impl PageView {
    fn empty(sort: SortRequest) -> Self {
        PageView {
            page: 0,
            pages: 0,
            quotes: Vec::new(),
            db_size: 0,
            moderation_queue_size: 0,
            prev_button: false,
            next_button: false,
            prev_link: None,
            next_link: None,
            sort,
        }
    }

    /// Derive the navigation flags and links from `page`/`pages`. The links
    /// echo the originating request's page size and sort fields so that
    /// navigating never silently changes them.
    fn finalize(mut self) -> Self {
        self.prev_button = self.page > 1;
        self.next_button = self.pages > 0 && self.page != self.pages;
        if self.prev_button {
            self.prev_link = Some(nav_link(&self, -1));
        }
        if self.next_button {
            self.next_link = Some(nav_link(&self, 1));
        }
        self
    }
}

fn nav_link(view: &PageView, delta: i64) -> String {
    format!(
        "/?count={}&page={}&sort_by={}&sort_order={}",
        view.sort.page_size,
        view.page.saturating_add(delta),
        view.sort.sort_by_param(),
        view.sort.sort_order_param(),
    )
}

/// Assemble the browsing view for `req`.
pub async fn assemble_list(
    store: &dyn QuoteStore,
    req: SortRequest,
) -> Result<PageView, StoreError> {
    let (quotes, pages) = store.get_bulk_quotes(&req).await?;

    let mut view = PageView::empty(req);
    view.page = req.page_number();
    view.pages = pages;
    view.quotes = quotes;
    view.db_size = store.size().await?;
    view.moderation_queue_size = store.moderation_queue_size().await?;
    Ok(view.finalize())
}

/// Assemble the single-quote view for `id`.
///
/// An unknown id is not an error: the view simply carries no quotes. No
/// navigation links are built on this path.
pub async fn assemble_one(store: &dyn QuoteStore, id: i64) -> Result<PageView, StoreError> {
    let mut view = PageView::empty(SortRequest::default());
    match store.get_quote(id).await {
        Ok(quote) => view.quotes = vec![quote],
        Err(StoreError::NotFound) => {}
        Err(err) => return Err(err),
    }
    view.db_size = store.size().await?;
    view.moderation_queue_size = store.moderation_queue_size().await?;
    Ok(view.finalize())
}
