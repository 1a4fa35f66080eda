//! Quote persistence behind a narrow trait.
//!
//! The rest of the server only sees [`QuoteStore`]; the bundled sqlite
//! backend lives in [`sqlite`] and alternative backends can be dropped in
//! without touching the listing or handler code.

pub mod sqlite;

pub use sqlite::SqliteStore;

use crate::model::Quote;
use crate::sort::SortRequest;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("quote not found")]
    NotFound,
    #[error("store backend error: {0}")]
    Backend(#[from] sqlx::Error),
}

/// Storage contract for the quote board.
///
/// Implementations must be safe to call from concurrent requests; the server
/// holds a single instance behind an `Arc` for the life of the process.
#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Number of approved quotes visible in listings.
    async fn size(&self) -> Result<i64, StoreError>;

    /// Number of submissions still awaiting approval.
    async fn moderation_queue_size(&self) -> Result<i64, StoreError>;

    /// Fetch a single approved quote by id.
    async fn get_quote(&self, id: i64) -> Result<Quote, StoreError>;

    /// Fetch one page of approved quotes plus the total page count for the
    /// request's page size. The returned slice is ordered per the request
    /// and holds at most `page_size` quotes; the page count covers the whole
    /// result set regardless of offset.
    async fn get_bulk_quotes(&self, req: &SortRequest) -> Result<(Vec<Quote>, i64), StoreError>;

    /// Persist a new submission into the moderation queue.
    async fn new_quote(&self, quote: Quote) -> Result<(), StoreError>;
}
