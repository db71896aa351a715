//! Handler for `PUT /estudiantes/:id/matricular`, the accounting peer's
//! payment-confirmation callback.
//!
//! | Status | When |
//! |--------|------|
//! | 200 | Proforma marked paid and student enrolled |
//! | 400 | `numero_proforma` or `numero_comprobante` missing or blank, malformed JSON, non-numeric id |
//! | 404 | No pending proforma with that number for that student |
//! | 500 | Anything else; body `{"error": "..."}` |

use std::sync::Arc;

use axum::{Json, extract::State};
use registrar_core::{
  Registrar,
  peer::AccountingPeer,
  proforma::ProformaNumber,
  store::RegistrarStore,
  student::StudentId,
};
use serde::{Deserialize, Serialize};

use crate::{
  error::ApiError,
  extract::{JsonBody, PathParam},
};

#[derive(Debug, Deserialize)]
pub struct EnrollBody {
  pub numero_proforma:    Option<String>,
  pub numero_comprobante: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EnrolledBody {
  pub mensaje:            &'static str,
  pub id_estudiante:      StudentId,
  pub numero_proforma:    ProformaNumber,
  pub numero_comprobante: String,
}

/// `PUT /estudiantes/:id/matricular` with body
/// `{"numero_proforma": "...", "numero_comprobante": "..."}`
pub async fn enroll<S, P>(
  State(registrar): State<Arc<Registrar<S, P>>>,
  PathParam(id): PathParam<i64>,
  JsonBody(body): JsonBody<EnrollBody>,
) -> Result<Json<EnrolledBody>, ApiError>
where
  S: RegistrarStore,
  P: AccountingPeer,
  registrar_core::Error: From<S::Error>,
{
  let confirmation = registrar
    .confirm_payment(
      StudentId(id),
      body.numero_proforma.as_deref().unwrap_or_default(),
      body.numero_comprobante.as_deref().unwrap_or_default(),
    )
    .await?;

  Ok(Json(EnrolledBody {
    mensaje:            "Estudiante matriculado exitosamente",
    id_estudiante:      confirmation.student_id,
    numero_proforma:    confirmation.number,
    numero_comprobante: confirmation.receipt_number,
  }))
}
