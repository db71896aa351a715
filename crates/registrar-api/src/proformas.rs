//! Handlers for `/proformas` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/proformas` | Newest first |
//! | `POST` | `/proformas` | Body: [`GenerateBody`]; 201 + notification outcome |
//! | `GET`  | `/proformas/:numero` | Proforma, owning student and line items; 404 if absent |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use registrar_core::{
  Registrar,
  lifecycle::GeneratedProforma,
  peer::{AccountingPeer, NotifyOutcome},
  proforma::{LineItem, ProformaDetail, ProformaNumber, ProformaState, ProformaSummary},
  store::RegistrarStore,
  student::StudentId,
  subject::SubjectId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
  error::ApiError,
  extract::{JsonBody, PathParam},
  students::enrollment_label,
};

pub(crate) fn state_label(state: ProformaState) -> &'static str {
  match state {
    ProformaState::Pending => "pendiente",
    ProformaState::Paid => "pagado",
  }
}

// ─── Generate ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateBody {
  pub id_estudiante: Option<i64>,
  #[serde(default)]
  pub asignaturas:   Vec<i64>,
}

/// How the accounting peer took the notification. Always a soft outcome.
#[derive(Debug, Serialize)]
pub struct NotificationBody {
  /// `notificada`, `rechazada` or `sin_conexion`.
  pub resultado: &'static str,
  pub mensaje:   String,
}

impl NotificationBody {
  fn new(number: &ProformaNumber, outcome: &NotifyOutcome) -> Self {
    match outcome {
      NotifyOutcome::Delivered => Self {
        resultado: "notificada",
        mensaje:   format!("Proforma {number} generada y notificada a contabilidad"),
      },
      NotifyOutcome::Rejected { status } => Self {
        resultado: "rechazada",
        mensaje:   format!(
          "Proforma {number} generada, pero contabilidad respondió con estado {status}"
        ),
      },
      NotifyOutcome::Unreachable { reason } => Self {
        resultado: "sin_conexion",
        mensaje:   format!(
          "Proforma {number} generada, pero no se pudo conectar con contabilidad: {reason}"
        ),
      },
    }
  }
}

#[derive(Debug, Serialize)]
pub struct GeneratedBody {
  pub numero_proforma: ProformaNumber,
  pub monto:           Decimal,
  pub estado:          &'static str,
  pub notificacion:    NotificationBody,
}

impl From<GeneratedProforma> for GeneratedBody {
  fn from(g: GeneratedProforma) -> Self {
    Self {
      notificacion:    NotificationBody::new(&g.proforma.number, &g.notification),
      monto:           g.proforma.amount,
      estado:          state_label(g.proforma.state),
      numero_proforma: g.proforma.number,
    }
  }
}

/// `POST /proformas` with body `{"id_estudiante": 1, "asignaturas": [1, 2]}`.
///
/// Returns 201 whenever the proforma is committed, whatever the peer said.
pub async fn create<S, P>(
  State(registrar): State<Arc<Registrar<S, P>>>,
  JsonBody(body): JsonBody<GenerateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistrarStore,
  P: AccountingPeer,
  registrar_core::Error: From<S::Error>,
{
  let student_id = body
    .id_estudiante
    .ok_or_else(|| ApiError::BadRequest("id_estudiante is required".into()))?;
  let subjects = body.asignaturas.into_iter().map(SubjectId).collect();

  let generated = registrar
    .generate_proforma(StudentId(student_id), subjects)
    .await?;
  Ok((StatusCode::CREATED, Json(GeneratedBody::from(generated))))
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SummaryBody {
  pub numero_proforma:   ProformaNumber,
  pub id_estudiante:     StudentId,
  pub codigo_estudiante: String,
  pub nombre:            String,
  pub apellido:          String,
  pub curso:             String,
  pub monto:             Decimal,
  pub fecha_generacion:  DateTime<Utc>,
  pub estado:            &'static str,
}

impl From<ProformaSummary> for SummaryBody {
  fn from(s: ProformaSummary) -> Self {
    Self {
      numero_proforma:   s.number,
      id_estudiante:     s.student_id,
      codigo_estudiante: s.student_code,
      nombre:            s.first_name,
      apellido:          s.last_name,
      curso:             s.course,
      monto:             s.amount,
      fecha_generacion:  s.generated_at,
      estado:            state_label(s.state),
    }
  }
}

/// `GET /proformas`
pub async fn list<S, P>(
  State(registrar): State<Arc<Registrar<S, P>>>,
) -> Result<Json<Vec<SummaryBody>>, ApiError>
where
  S: RegistrarStore,
  P: AccountingPeer,
  registrar_core::Error: From<S::Error>,
{
  let proformas = registrar.list_proformas().await?;
  Ok(Json(proformas.into_iter().map(SummaryBody::from).collect()))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LineItemBody {
  pub id_asignatura:     SubjectId,
  pub nombre_asignatura: String,
  pub descripcion:       Option<String>,
}

impl From<LineItem> for LineItemBody {
  fn from(i: LineItem) -> Self {
    Self {
      id_asignatura:     i.subject_id,
      nombre_asignatura: i.subject_name,
      descripcion:       i.description,
    }
  }
}

/// The proforma row flattened together with the owning student's fields.
#[derive(Debug, Serialize)]
pub struct DetailBody {
  pub numero_proforma:    ProformaNumber,
  pub id_estudiante:      StudentId,
  pub codigo_estudiante:  String,
  pub curso:              String,
  pub monto:              Decimal,
  pub fecha_generacion:   DateTime<Utc>,
  pub estado:             &'static str,
  pub numero_comprobante: Option<String>,
  pub fecha_pago:         Option<DateTime<Utc>>,
  pub nombre:             String,
  pub apellido:           String,
  pub cedula:             String,
  pub email:              String,
  pub estado_matricula:   &'static str,
  pub asignaturas:        Vec<LineItemBody>,
}

impl From<ProformaDetail> for DetailBody {
  fn from(d: ProformaDetail) -> Self {
    let ProformaDetail { proforma: p, student: s } = d;
    Self {
      numero_proforma:    p.number,
      id_estudiante:      p.student_id,
      codigo_estudiante:  p.student_code,
      curso:              p.course,
      monto:              p.amount,
      fecha_generacion:   p.generated_at,
      estado:             state_label(p.state),
      numero_comprobante: p.receipt_number,
      fecha_pago:         p.paid_at,
      nombre:             s.first_name,
      apellido:           s.last_name,
      cedula:             s.national_id,
      email:              s.email,
      estado_matricula:   enrollment_label(s.enrollment),
      asignaturas:        p.items.into_iter().map(LineItemBody::from).collect(),
    }
  }
}

/// `GET /proformas/:numero`
pub async fn get_one<S, P>(
  State(registrar): State<Arc<Registrar<S, P>>>,
  PathParam(number): PathParam<String>,
) -> Result<Json<DetailBody>, ApiError>
where
  S: RegistrarStore,
  P: AccountingPeer,
  registrar_core::Error: From<S::Error>,
{
  let detail = registrar.get_proforma(&number).await?;
  Ok(Json(DetailBody::from(detail)))
}
