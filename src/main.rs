use anyhow::Result;
use clap::Parser;
use quoteboard::store::SqliteStore;
use quoteboard::{config, web};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;
    cfg.ensure_dirs()?;

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| format!("sqlite://{}/quotes.db", cfg.app.data_dir));

    let store = SqliteStore::connect(&database_url).await?;
    let state = web::AppState {
        store: Arc::new(store),
    };
    let app = web::router(state, Path::new(&cfg.web.static_dir));

    let listener = tokio::net::TcpListener::bind(cfg.web.listen_addr()).await?;
    info!(addr = %listener.local_addr()?, "serving quote board");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
