//! HTTP surface: routing and request handlers.

use crate::model::Quote;
use crate::page;
use crate::render;
use crate::sort::{BrowseParams, SortRequest};
use crate::store::{QuoteStore, StoreError};
use axum::extract::{ConnectInfo, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

/// Shared per-process state: a single store reference, bound once at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn QuoteStore>,
}

/// Build the full application router.
pub fn router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/viewquote.php", get(home))
        .route("/add", get(add_form).post(add_quote))
        .route("/status", get(status))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn store_failure(err: StoreError) -> (StatusCode, String) {
    warn!(%err, "store failure");
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

/// Browsing and single-quote views. An `id` parameter selects one quote;
/// otherwise the listing is driven by `count`/`page`/`sort_by`/`sort_order`.
#[instrument(skip_all)]
async fn home(
    State(state): State<AppState>,
    params: Option<Query<BrowseParams>>,
) -> Result<Html<String>, (StatusCode, String)> {
    let params = params.map(|Query(p)| p).unwrap_or_default();

    let view = if let Some(raw_id) = params.id.as_deref() {
        // Unparsable ids fall through to the not-found path.
        let id: i64 = raw_id.parse().unwrap_or(-1);
        page::assemble_one(state.store.as_ref(), id)
            .await
            .map_err(store_failure)?
    } else {
        let req = SortRequest::parse(&params);
        page::assemble_list(state.store.as_ref(), req)
            .await
            .map_err(store_failure)?
    };

    Ok(Html(render::home_page(&view)))
}

#[derive(Debug, Deserialize)]
struct AddForm {
    #[serde(rename = "Quote")]
    quote: Option<String>,
}

async fn add_form() -> Html<String> {
    Html(render::add_page())
}

/// Accept a submission into the moderation queue.
#[instrument(skip_all)]
async fn add_quote(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Form(form): Form<AddForm>,
) -> Response {
    let Some(raw) = form.quote else {
        return (
            StatusCode::BAD_REQUEST,
            "Quote field missing in request".to_string(),
        )
            .into_response();
    };

    let quote = Quote::new_submission(render::encode_newlines(&raw), addr.to_string());
    match state.store.new_quote(quote).await {
        Ok(()) => {
            info!(from = %addr, "queued quote submission");
            Redirect::to("/").into_response()
        }
        Err(err) => {
            warn!(%err, "failed to persist submission");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

async fn status() -> &'static str {
    "Server OK"
}
