//! HTTP server for Cursada.
//!
//! Mounts the JSON API under `/api` and serves uploaded files from the blob
//! directory under `/files`, so the download URLs handed out by
//! [`cursada_store_sqlite::FsBlobStore`] resolve against this server.

use std::path::{Path, PathBuf};

use anyhow::anyhow;
use axum::Router;
use chrono_tz::Tz;
use cursada_api::{ApiState, api_router};
use cursada_core::{
  normalize::NormalizeOptions,
  store::{AgendaStore, BlobStore},
};
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CURSADA_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:             String,
  #[serde(default = "default_port")]
  pub port:             u16,
  #[serde(default = "default_store_path")]
  pub store_path:       PathBuf,
  #[serde(default = "default_blob_dir")]
  pub blob_dir:         PathBuf,
  /// Public URL under which `blob_dir` is reachable.
  #[serde(default = "default_blob_base_url")]
  pub blob_base_url:    String,
  /// IANA zone used to display instants, e.g. `America/Argentina/Buenos_Aires`.
  #[serde(default = "default_timezone")]
  pub display_timezone: String,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/cursada/cursada.db") }
fn default_blob_dir() -> PathBuf { PathBuf::from("~/.local/share/cursada/files") }
fn default_blob_base_url() -> String { "http://127.0.0.1:8080/files".into() }
fn default_timezone() -> String { "UTC".into() }

impl ServerConfig {
  pub fn normalize_options(&self) -> anyhow::Result<NormalizeOptions> {
    let display_tz: Tz = self
      .display_timezone
      .parse()
      .map_err(|e| anyhow!("unknown time zone {:?}: {e}", self.display_timezone))?;
    Ok(NormalizeOptions { display_tz })
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn build_router<S, B>(state: ApiState<S, B>, blob_dir: &Path) -> Router
where
  S: AgendaStore + 'static,
  B: BlobStore + 'static,
{
  Router::new()
    .nest("/api", api_router(state))
    .nest_service("/files", ServeDir::new(blob_dir))
    .layer(TraceLayer::new_for_http())
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use cursada_store_sqlite::{FsBlobStore, SqliteStore};
  use serde_json::Value;
  use tower::ServiceExt;
  use uuid::Uuid;

  use super::*;

  fn config_from(toml: &str) -> ServerConfig {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn missing_keys_fall_back_to_defaults() {
    let cfg = config_from("port = 9000");
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.normalize_options().unwrap(), NormalizeOptions::default());
  }

  #[test]
  fn display_timezone_is_parsed() {
    let cfg = config_from(r#"display_timezone = "America/Argentina/Buenos_Aires""#);
    assert_eq!(
      cfg.normalize_options().unwrap().display_tz,
      chrono_tz::America::Argentina::Buenos_Aires
    );

    let bad = config_from(r#"display_timezone = "Mars/Olympus""#);
    assert!(bad.normalize_options().is_err());
  }

  #[test]
  fn tilde_expands_to_home() {
    let home = std::env::var("HOME").unwrap_or_default();
    if !home.is_empty() {
      assert_eq!(expand_tilde(Path::new("~/x.db")), PathBuf::from(&home).join("x.db"));
    }
    assert_eq!(expand_tilde(Path::new("/tmp/x.db")), PathBuf::from("/tmp/x.db"));
  }

  #[tokio::test]
  async fn uploaded_files_are_served_under_files() {
    let dir = tempfile::tempdir().unwrap();
    let blobs = FsBlobStore::open(dir.path(), "http://localhost/files").await.unwrap();
    let store = SqliteStore::open_in_memory().await.unwrap();
    let state = ApiState::new(Arc::new(store), Arc::new(blobs), NormalizeOptions::default());
    let app = build_router(state, dir.path());

    let user = Uuid::new_v4();
    let call = |req: Request<Body>| {
      let app = app.clone();
      async move {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, bytes)
      }
    };
    let json = |bytes: &[u8]| serde_json::from_slice::<Value>(bytes).unwrap();

    let (status, body) = call(
      Request::post(format!("/api/users/{user}/years"))
        .header("content-type", "application/json")
        .body(Body::from(r#"{"name":"2024"}"#))
        .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let year_id = json(&body)["year_id"].as_str().unwrap().to_owned();

    let (_, body) = call(
      Request::post(format!("/api/users/{user}/years/{year_id}/subjects"))
        .header("content-type", "application/json")
        .body(Body::from(r#"{"name":"Química"}"#))
        .unwrap(),
    )
    .await;
    let subject_id = json(&body)["subject_id"].as_str().unwrap().to_owned();

    let (status, body) = call(
      Request::post(format!(
        "/api/users/{user}/years/{year_id}/subjects/{subject_id}/files?name=notas.txt"
      ))
      .body(Body::from("hola"))
      .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let url = json(&body)["files"][0]["url"].as_str().unwrap().to_owned();
    let path = url.strip_prefix("http://localhost").unwrap().to_owned();

    let (status, body) = call(Request::get(path).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"hola");
  }
}
