//! Handler for `GET /asignaturas/:curso`: the catalog of one course.

use std::sync::Arc;

use axum::{Json, extract::State};
use registrar_core::{
  Registrar,
  peer::AccountingPeer,
  store::RegistrarStore,
  subject::{Subject, SubjectId},
};
use serde::Serialize;

use crate::{error::ApiError, extract::PathParam};

#[derive(Debug, Serialize)]
pub struct SubjectBody {
  pub id:          SubjectId,
  pub nombre:      String,
  pub curso:       String,
  pub descripcion: Option<String>,
}

impl From<Subject> for SubjectBody {
  fn from(s: Subject) -> Self {
    Self {
      id:          s.subject_id,
      nombre:      s.name,
      curso:       s.course,
      descripcion: s.description,
    }
  }
}

/// `GET /asignaturas/:curso`. An unknown course yields an empty list.
pub async fn by_course<S, P>(
  State(registrar): State<Arc<Registrar<S, P>>>,
  PathParam(course): PathParam<String>,
) -> Result<Json<Vec<SubjectBody>>, ApiError>
where
  S: RegistrarStore,
  P: AccountingPeer,
  registrar_core::Error: From<S::Error>,
{
  let subjects = registrar.subjects_for_course(&course).await?;
  Ok(Json(subjects.into_iter().map(SubjectBody::from).collect()))
}
