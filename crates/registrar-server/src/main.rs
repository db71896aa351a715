//! Registrar server binary.
//!
//! Reads `registrar.toml` (or the path given with `--config`), opens the
//! SQLite store, and serves the registrar API over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use registrar_core::Registrar;
use registrar_server::{HttpAccountingPeer, ServerConfig};
use registrar_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "School registrar server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, env = "REGISTRAR_CONFIG", default_value = "registrar.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let peer = HttpAccountingPeer::new(
    server_cfg.accounting.base_url.clone(),
    server_cfg.accounting.timeout(),
  )
  .context("failed to build accounting client")?;

  let prices = server_cfg.price_table();
  tracing::info!(
    courses = prices.len(),
    accounting = %server_cfg.accounting.base_url,
    "registrar configured"
  );

  let registrar = Arc::new(Registrar::new(store, peer, prices));
  let app = registrar_server::app(registrar);
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
