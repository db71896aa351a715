//! Error type for `registrar-store-sqlite`.

use registrar_core::{student::StudentId, subject::SubjectId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("decimal parse error: {0}")]
  Decimal(#[from] rust_decimal::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown {kind} value: {value:?}")]
  UnknownValue { kind: &'static str, value: String },

  #[error("student code {0:?} is already registered")]
  DuplicateStudentCode(String),

  #[error("proforma number {0:?} already exists")]
  DuplicateProformaNumber(String),

  #[error("student {0} already has a pending proforma")]
  PendingProforma(StudentId),

  #[error("subject not found: {0}")]
  SubjectNotFound(SubjectId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for registrar_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::DuplicateStudentCode(_) | Error::DuplicateProformaNumber(_) => {
        Self::DuplicateKey(e.to_string())
      }
      Error::PendingProforma(id) => Self::PendingProforma(id),
      Error::SubjectNotFound(id) => Self::NotFound(format!("subject {id}")),
      other => Self::Store(Box::new(other)),
    }
  }
}
