//! HTTP client for the accounting peer.

use std::time::Duration;

use registrar_core::peer::{AccountingPeer, NotifyOutcome, ProformaNotice};
use reqwest::Client;

/// Path on the peer that registers a new proforma.
pub const REGISTER_PROFORMA_PATH: &str = "/api/pagos/registrar-proforma";

/// Posts proforma notices to the accounting system, once, with a bounded
/// wait.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpAccountingPeer {
  client:   Client,
  base_url: String,
}

impl HttpAccountingPeer {
  pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client, base_url: base_url.into() })
  }

  fn url(&self) -> String {
    format!("{}{REGISTER_PROFORMA_PATH}", self.base_url.trim_end_matches('/'))
  }
}

impl AccountingPeer for HttpAccountingPeer {
  async fn register_proforma(&self, notice: &ProformaNotice) -> NotifyOutcome {
    let url = self.url();
    tracing::debug!(%url, number = %notice.number, "notifying accounting peer");

    match self.client.post(&url).json(notice).send().await {
      Ok(resp) if resp.status().is_success() => NotifyOutcome::Delivered,
      Ok(resp) => NotifyOutcome::Rejected { status: resp.status().as_u16() },
      Err(e) => {
        let reason = if e.is_timeout() {
          format!("timed out: {e}")
        } else if e.is_connect() {
          format!("connection failed: {e}")
        } else {
          e.to_string()
        };
        NotifyOutcome::Unreachable { reason }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
  use rust_decimal::Decimal;
  use serde_json::Value;
  use tokio::net::TcpListener;

  use super::*;

  type Received = Arc<Mutex<Vec<Value>>>;

  /// Serve a fake accounting peer answering `status` after `delay`.
  async fn fake_peer(status: StatusCode, delay: Duration) -> (String, Received) {
    let received: Received = Arc::default();
    let app = Router::new()
      .route(
        REGISTER_PROFORMA_PATH,
        post(move |State(seen): State<Received>, Json(body): Json<Value>| async move {
          seen.lock().unwrap().push(body);
          tokio::time::sleep(delay).await;
          status
        }),
      )
      .with_state(received.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    (format!("http://{addr}"), received)
  }

  fn notice() -> ProformaNotice {
    ProformaNotice {
      number:       "PROF-20240601-0001".into(),
      student_code: "E100".into(),
      full_name:    "Ana Pérez".into(),
      course:       "Primer Curso".into(),
      amount:       Decimal::new(30000, 2),
    }
  }

  #[tokio::test]
  async fn success_status_is_delivered() {
    let (url, received) = fake_peer(StatusCode::OK, Duration::ZERO).await;
    let peer = HttpAccountingPeer::new(url, Duration::from_secs(5)).unwrap();

    assert_eq!(peer.register_proforma(&notice()).await, NotifyOutcome::Delivered);

    let bodies = received.lock().unwrap().clone();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["numero_proforma"], "PROF-20240601-0001");
    assert_eq!(bodies[0]["codigo_estudiante"], "E100");
    assert_eq!(bodies[0]["nombre_completo"], "Ana Pérez");
    assert_eq!(bodies[0]["curso"], "Primer Curso");
    assert_eq!(bodies[0]["monto"].as_f64(), Some(300.0));
  }

  #[tokio::test]
  async fn error_status_is_rejected() {
    let (url, _) = fake_peer(StatusCode::INTERNAL_SERVER_ERROR, Duration::ZERO).await;
    let peer = HttpAccountingPeer::new(format!("{url}/"), Duration::from_secs(5)).unwrap();

    assert_eq!(
      peer.register_proforma(&notice()).await,
      NotifyOutcome::Rejected { status: 500 }
    );
  }

  #[tokio::test]
  async fn slow_peer_times_out() {
    let (url, _) = fake_peer(StatusCode::OK, Duration::from_secs(2)).await;
    let peer = HttpAccountingPeer::new(url, Duration::from_millis(100)).unwrap();

    let outcome = peer.register_proforma(&notice()).await;
    assert!(
      matches!(outcome, NotifyOutcome::Unreachable { ref reason } if reason.starts_with("timed out")),
      "{outcome:?}"
    );
  }

  #[tokio::test]
  async fn closed_port_is_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let peer = HttpAccountingPeer::new(format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    let outcome = peer.register_proforma(&notice()).await;
    assert!(matches!(outcome, NotifyOutcome::Unreachable { .. }), "{outcome:?}");
  }
}
