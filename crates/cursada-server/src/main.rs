//! Cursada server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus `CURSADA_*`
//! environment overrides, opens the SQLite agenda and the file directory, and
//! serves the JSON API over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use cursada_api::ApiState;
use cursada_server::{ServerConfig, build_router, expand_tilde};
use cursada_store_sqlite::{FsBlobStore, SqliteStore};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Cursada study planner server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("CURSADA").try_parsing(true))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  let options = server_cfg.normalize_options()?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let blob_dir = expand_tilde(&server_cfg.blob_dir);

  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let blobs = FsBlobStore::open(&blob_dir, server_cfg.blob_base_url.clone())
    .await
    .with_context(|| format!("failed to open file directory at {blob_dir:?}"))?;

  let state = ApiState::new(Arc::new(store), Arc::new(blobs), options);
  let app = build_router(state, &blob_dir);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!(
    timezone = %server_cfg.display_timezone,
    "Listening on http://{address}"
  );
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
