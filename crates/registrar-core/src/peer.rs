//! The accounting peer: the external system of record for payments.
//!
//! After a proforma is committed the registrar notifies the peer once. The
//! outcome is reported to the caller but never undoes the proforma.

use std::future::Future;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::proforma::ProformaNumber;

/// Payload sent to the peer; field names follow the peer's wire protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProformaNotice {
  #[serde(rename = "numero_proforma")]
  pub number:       ProformaNumber,
  #[serde(rename = "codigo_estudiante")]
  pub student_code: String,
  #[serde(rename = "nombre_completo")]
  pub full_name:    String,
  #[serde(rename = "curso")]
  pub course:       String,
  #[serde(rename = "monto")]
  pub amount:       Decimal,
}

/// Result of one notification attempt. None of these is an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NotifyOutcome {
  /// The peer answered with a success status.
  Delivered,
  /// The peer answered, but not with a success status.
  Rejected { status: u16 },
  /// Connection failure, timeout, or any other transport error.
  Unreachable { reason: String },
}

impl NotifyOutcome {
  pub fn is_delivered(&self) -> bool { matches!(self, Self::Delivered) }
}

/// Outbound notification channel to the accounting system.
///
/// Implementations make a single bounded attempt: no retry, no queue.
pub trait AccountingPeer: Send + Sync {
  fn register_proforma<'a>(
    &'a self,
    notice: &'a ProformaNotice,
  ) -> impl Future<Output = NotifyOutcome> + Send + 'a;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn notice_uses_peer_field_names() {
    let notice = ProformaNotice {
      number:       ProformaNumber::from("PROF-20240601-0001"),
      student_code: "E100".into(),
      full_name:    "Ana Pérez".into(),
      course:       "Primer Curso".into(),
      amount:       Decimal::new(30000, 2),
    };
    let json = serde_json::to_value(&notice).unwrap();
    assert_eq!(json["numero_proforma"], "PROF-20240601-0001");
    assert_eq!(json["codigo_estudiante"], "E100");
    assert_eq!(json["nombre_completo"], "Ana Pérez");
    assert_eq!(json["curso"], "Primer Curso");
    assert_eq!(json["monto"].as_f64(), Some(300.0));
  }
}
