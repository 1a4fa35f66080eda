use super::{QuoteStore, StoreError};
use crate::model::{ModerationStatus, Quote};
use crate::sort::{SortRequest, DEFAULT_PAGE_SIZE};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::instrument;

pub type Pool = SqlitePool;

/// sqlite-backed quote store.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: Pool,
}

pub async fn init_pool(database_url: &str) -> Result<Pool> {
    let normalized = prepare_sqlite_url(database_url);
    let pool = SqlitePool::connect(&normalized).await?;
    // Enable WAL and stricter durability.
    sqlx::query("PRAGMA journal_mode=WAL;")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous=FULL;")
        .execute(&pool)
        .await?;
    Ok(pool)
}

/// If using a file-backed SQLite URL, expand a leading `~/` and ensure the
/// parent directory exists. Leaves in-memory URLs untouched.
fn prepare_sqlite_url(url: &str) -> String {
    if !url.starts_with("sqlite:") || url.starts_with("sqlite::memory") {
        return url.to_string();
    }

    let rest = &url["sqlite:".len()..];
    let path_with_query = rest.strip_prefix("//").unwrap_or(rest);

    let (path_part, query_part) = match path_with_query.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path_with_query, None),
    };

    if path_part.is_empty() {
        return url.to_string();
    }

    // Expand leading ~/ to HOME
    let expanded_path = match (path_part.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => format!("{}/{}", home.trim_end_matches('/'), rest),
        _ => path_part.to_string(),
    };

    // Ensure parent directory exists if any
    if let Some(parent) = std::path::Path::new(&expanded_path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }

    let mut rebuilt = String::from("sqlite://");
    rebuilt.push_str(&expanded_path);
    if let Some(q) = query_part {
        rebuilt.push('?');
        rebuilt.push_str(q);
    }
    rebuilt
}

pub async fn run_migrations(pool: &Pool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

impl SqliteStore {
    /// Open (or create) the database at `database_url` and run migrations.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = init_pool(database_url).await?;
        run_migrations(&pool).await?;
        Ok(SqliteStore { pool })
    }

    /// Wrap an already-initialized pool.
    pub fn from_pool(pool: Pool) -> Self {
        SqliteStore { pool }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    async fn count_with_status(&self, status: ModerationStatus) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotes WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn quote_from_row(row: &sqlx::sqlite::SqliteRow) -> Quote {
    let status_str: String = row.get("status");
    Quote {
        id: row.get("id"),
        quote: row.get("quote"),
        rating: row.get("rating"),
        status: ModerationStatus::parse_status(&status_str).unwrap_or(ModerationStatus::Pending),
        submitted: row.get::<DateTime<Utc>, _>("submitted"),
        submitted_ip: row.get("submitted_ip"),
    }
}

#[async_trait]
impl QuoteStore for SqliteStore {
    #[instrument(skip_all)]
    async fn size(&self) -> Result<i64, StoreError> {
        self.count_with_status(ModerationStatus::Approved).await
    }

    #[instrument(skip_all)]
    async fn moderation_queue_size(&self) -> Result<i64, StoreError> {
        self.count_with_status(ModerationStatus::Pending).await
    }

    #[instrument(skip_all)]
    async fn get_quote(&self, id: i64) -> Result<Quote, StoreError> {
        let row = sqlx::query(
            "SELECT id, quote, rating, status, submitted, submitted_ip \
             FROM quotes WHERE id = ? AND status = 'approved'",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(quote_from_row(&row)),
            None => Err(StoreError::NotFound),
        }
    }

    #[instrument(skip_all)]
    async fn get_bulk_quotes(&self, req: &SortRequest) -> Result<(Vec<Quote>, i64), StoreError> {
        // Requests carry the page size as parsed; non-positive values are
        // bounded here.
        let page_size = if req.page_size > 0 {
            req.page_size
        } else {
            DEFAULT_PAGE_SIZE
        };
        let offset = req.offset.max(0);

        let order = match (req.by_rating, req.descending) {
            (true, true) => "rating DESC, id DESC",
            (true, false) => "rating ASC, id ASC",
            (false, true) => "datetime(submitted) DESC, id DESC",
            (false, false) => "datetime(submitted) ASC, id ASC",
        };
        let sql = format!(
            "SELECT id, quote, rating, status, submitted, submitted_ip \
             FROM quotes WHERE status = 'approved' ORDER BY {order} LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query(&sql)
            .bind(page_size)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        let quotes = rows.iter().map(quote_from_row).collect();

        let total = self.count_with_status(ModerationStatus::Approved).await?;
        let pages = total / page_size + i64::from(total % page_size != 0);

        Ok((quotes, pages))
    }

    #[instrument(skip_all)]
    async fn new_quote(&self, quote: Quote) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO quotes (quote, rating, status, submitted, submitted_ip) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&quote.quote)
        .bind(quote.rating)
        .bind(quote.status.as_str())
        .bind(quote.submitted)
        .bind(&quote.submitted_ip)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_store() -> SqliteStore {
        // A single connection keeps the in-memory database alive and shared.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        SqliteStore::from_pool(pool)
    }

    async fn seed_approved(store: &SqliteStore, body: &str, rating: i64, submitted: &str) -> i64 {
        let rec = sqlx::query(
            "INSERT INTO quotes (quote, rating, status, submitted, submitted_ip) \
             VALUES (?, ?, 'approved', ?, '127.0.0.1') RETURNING id",
        )
        .bind(body)
        .bind(rating)
        .bind(submitted)
        .fetch_one(store.pool())
        .await
        .unwrap();
        rec.get("id")
    }

    #[tokio::test]
    async fn new_submissions_land_in_moderation_queue() {
        let store = setup_store().await;
        assert_eq!(store.size().await.unwrap(), 0);
        assert_eq!(store.moderation_queue_size().await.unwrap(), 0);

        store
            .new_quote(Quote::new_submission("first!".into(), "10.0.0.1:9999".into()))
            .await
            .unwrap();

        assert_eq!(store.size().await.unwrap(), 0);
        assert_eq!(store.moderation_queue_size().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn get_quote_hides_pending_and_missing() {
        let store = setup_store().await;
        let id = seed_approved(&store, "visible", 1, "2024-01-01T00:00:00Z").await;
        store
            .new_quote(Quote::new_submission("hidden".into(), "10.0.0.1:9999".into()))
            .await
            .unwrap();

        let q = store.get_quote(id).await.unwrap();
        assert_eq!(q.quote, "visible");
        assert_eq!(q.status, ModerationStatus::Approved);

        assert!(matches!(store.get_quote(id + 1).await, Err(StoreError::NotFound)));
        assert!(matches!(store.get_quote(-1).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn bulk_quotes_order_and_paginate() {
        let store = setup_store().await;
        for (i, rating) in [(1, 5), (2, 9), (3, 1), (4, 7)] {
            seed_approved(
                &store,
                &format!("quote {i}"),
                rating,
                &format!("2024-01-0{i}T00:00:00Z"),
            )
            .await;
        }

        // Newest first by default.
        let req = SortRequest::default();
        let (quotes, pages) = store.get_bulk_quotes(&req).await.unwrap();
        assert_eq!(pages, 1);
        assert_eq!(
            quotes.iter().map(|q| q.quote.as_str()).collect::<Vec<_>>(),
            vec!["quote 4", "quote 3", "quote 2", "quote 1"]
        );

        // Rating, ascending.
        let req = SortRequest {
            by_rating: true,
            by_date: false,
            descending: false,
            ..SortRequest::default()
        };
        let (quotes, _) = store.get_bulk_quotes(&req).await.unwrap();
        assert_eq!(
            quotes.iter().map(|q| q.rating).collect::<Vec<_>>(),
            vec![1, 5, 7, 9]
        );

        // Two per page: 4 quotes make 2 pages, offset walks them.
        let req = SortRequest {
            page_size: 2,
            offset: 2,
            ..SortRequest::default()
        };
        let (quotes, pages) = store.get_bulk_quotes(&req).await.unwrap();
        assert_eq!(pages, 2);
        assert_eq!(
            quotes.iter().map(|q| q.quote.as_str()).collect::<Vec<_>>(),
            vec!["quote 2", "quote 1"]
        );
    }

    #[tokio::test]
    async fn page_count_rounds_up() {
        let store = setup_store().await;
        for i in 0..5 {
            seed_approved(&store, &format!("q{i}"), 0, "2024-01-01T00:00:00Z").await;
        }
        let req = SortRequest {
            page_size: 2,
            ..SortRequest::default()
        };
        let (_, pages) = store.get_bulk_quotes(&req).await.unwrap();
        assert_eq!(pages, 3);
    }

    #[tokio::test]
    async fn non_positive_page_size_is_bounded() {
        let store = setup_store().await;
        for i in 0..3 {
            seed_approved(&store, &format!("q{i}"), 0, "2024-01-01T00:00:00Z").await;
        }
        let req = SortRequest {
            page_size: 0,
            ..SortRequest::default()
        };
        let (quotes, pages) = store.get_bulk_quotes(&req).await.unwrap();
        assert_eq!(quotes.len(), 3);
        assert_eq!(pages, 1);
    }

    #[test]
    fn sqlite_url_normalization() {
        assert_eq!(prepare_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            prepare_sqlite_url("postgres://host/db"),
            "postgres://host/db"
        );
        let td = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}/nested/q.db", td.path().display());
        assert_eq!(prepare_sqlite_url(&url), url);
        assert!(td.path().join("nested").exists());
    }
}
