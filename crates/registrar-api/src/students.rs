//! Handlers for `/estudiantes` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/estudiantes` | Newest registration first |
//! | `POST` | `/estudiantes` | Body: [`RegisterBody`]; 201, 400 on a blank field, 409 on a taken code |
//! | `GET`  | `/estudiantes/sin-proforma` | Not enrolled and nothing pending |
//! | `GET`  | `/estudiantes/:id` | 404 if not found |

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
  peer::AccountingPeer,
  store::RegistrarStore,
  student::{EnrollmentState, NewStudent, Student, StudentId},
};
use serde::{Deserialize, Serialize};

use crate::{
  error::ApiError,
  extract::{JsonBody, PathParam},
};

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StudentBody {
  pub id:                StudentId,
  pub codigo_estudiante: String,
  pub cedula:            String,
  pub nombre:            String,
  pub apellido:          String,
  pub curso:             String,
  pub email:             String,
  pub estado_matricula:  &'static str,
  pub fecha_registro:    DateTime<Utc>,
}

impl From<Student> for StudentBody {
  fn from(s: Student) -> Self {
    Self {
      id:                s.student_id,
      codigo_estudiante: s.code,
      cedula:            s.national_id,
      nombre:            s.first_name,
      apellido:          s.last_name,
      curso:             s.course,
      email:             s.email,
      estado_matricula:  enrollment_label(s.enrollment),
      fecha_registro:    s.registered_at,
    }
  }
}

pub(crate) fn enrollment_label(state: EnrollmentState) -> &'static str {
  match state {
    EnrollmentState::NotEnrolled => "no_matriculado",
    EnrollmentState::Enrolled => "matriculado",
  }
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /estudiantes`
pub async fn list<S, P>(
  State(registrar): State<Arc<Registrar<S, P>>>,
) -> Result<Json<Vec<StudentBody>>, ApiError>
where
  S: RegistrarStore,
  P: AccountingPeer,
  registrar_core::Error: From<S::Error>,
{
  let students = registrar.list_students().await?;
  Ok(Json(students.into_iter().map(StudentBody::from).collect()))
}

/// `GET /estudiantes/sin-proforma`
pub async fn awaiting<S, P>(
  State(registrar): State<Arc<Registrar<S, P>>>,
) -> Result<Json<Vec<StudentBody>>, ApiError>
where
  S: RegistrarStore,
  P: AccountingPeer,
  registrar_core::Error: From<S::Error>,
{
  let students = registrar.students_awaiting_proforma().await?;
  Ok(Json(students.into_iter().map(StudentBody::from).collect()))
}

// ─── Register ────────────────────────────────────────────────────────────────

/// Missing fields deserialise as empty and are rejected by validation.
#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  #[serde(default)]
  pub codigo_estudiante: String,
  #[serde(default)]
  pub cedula:            String,
  #[serde(default)]
  pub nombre:            String,
  #[serde(default)]
  pub apellido:          String,
  #[serde(default)]
  pub curso:             String,
  #[serde(default)]
  pub email:             String,
}

impl From<RegisterBody> for NewStudent {
  fn from(b: RegisterBody) -> Self {
    NewStudent {
      code:        b.codigo_estudiante,
      national_id: b.cedula,
      first_name:  b.nombre,
      last_name:   b.apellido,
      course:      b.curso,
      email:       b.email,
    }
  }
}

/// `POST /estudiantes` returns 201 + the stored student.
pub async fn create<S, P>(
  State(registrar): State<Arc<Registrar<S, P>>>,
  JsonBody(body): JsonBody<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistrarStore,
  P: AccountingPeer,
  registrar_core::Error: From<S::Error>,
{
  let student = registrar.register_student(NewStudent::from(body)).await?;
  Ok((StatusCode::CREATED, Json(StudentBody::from(student))))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /estudiantes/:id`
pub async fn get_one<S, P>(
  State(registrar): State<Arc<Registrar<S, P>>>,
  PathParam(id): PathParam<i64>,
) -> Result<Json<StudentBody>, ApiError>
where
  S: RegistrarStore,
  P: AccountingPeer,
  registrar_core::Error: From<S::Error>,
{
  let student = registrar.get_student(StudentId(id)).await?;
  Ok(Json(StudentBody::from(student)))
}
