//! Registrar HTTP server: configuration, the accounting peer client, and the
//! top-level router with tracing and CORS middleware.

pub mod accounting;

pub use accounting::HttpAccountingPeer;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::Router;
use registrar_core::{Registrar, peer::AccountingPeer, pricing::PriceTable, store::RegistrarStore};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `registrar.toml` and
/// `REGISTRAR_*` environment variables.
#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default)]
  pub accounting: AccountingConfig,
  /// Course price table; replaces the built-in one when present.
  #[serde(default = "default_courses")]
  pub courses:    Vec<CoursePrice>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AccountingConfig {
  #[serde(default = "default_accounting_url")]
  pub base_url:     String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct CoursePrice {
  pub name:  String,
  pub price: Decimal,
}

fn default_host() -> String { "0.0.0.0".to_string() }

fn default_port() -> u16 { 5000 }

fn default_store_path() -> PathBuf { PathBuf::from("registrar.db") }

fn default_accounting_url() -> String { "http://127.0.0.1:5001".to_string() }

fn default_timeout_secs() -> u64 { 10 }

fn default_courses() -> Vec<CoursePrice> {
  [
    ("Primer Curso", Decimal::new(30000, 2)),
    ("Segundo Curso", Decimal::new(34000, 2)),
    ("Tercer Curso", Decimal::new(45000, 2)),
  ]
  .into_iter()
  .map(|(name, price)| CoursePrice { name: name.to_string(), price })
  .collect()
}

impl Default for AccountingConfig {
  fn default() -> Self {
    Self {
      base_url:     default_accounting_url(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

impl AccountingConfig {
  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}

impl ServerConfig {
  /// Layer the optional TOML file at `path` under `REGISTRAR_*` environment
  /// variables (`__` separates nested keys, e.g. `REGISTRAR_ACCOUNTING__BASE_URL`).
  pub fn load(path: impl Into<PathBuf>) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path.into()).required(false))
      .add_source(config::Environment::with_prefix("REGISTRAR").separator("__"))
      .build()?
      .try_deserialize()
  }

  pub fn price_table(&self) -> PriceTable {
    self
      .courses
      .iter()
      .map(|c| (c.name.clone(), c.price))
      .collect()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full application: the JSON API under `/api`, with request tracing and
/// permissive CORS.
pub fn app<S, P>(registrar: Arc<Registrar<S, P>>) -> Router
where
  S: RegistrarStore + 'static,
  P: AccountingPeer + 'static,
  registrar_core::Error: From<S::Error>,
{
  Router::new()
    .nest("/api", registrar_api::api_router(registrar))
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http())
}
