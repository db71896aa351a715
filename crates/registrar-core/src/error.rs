//! Error types for `registrar-core`.

use thiserror::Error;

use crate::student::StudentId;

#[derive(Debug, Error)]
pub enum Error {
  /// Missing or blank required input.
  #[error("validation error: {0}")]
  Validation(String),

  /// A business key (student code, proforma number) is already taken.
  #[error("duplicate key: {0}")]
  DuplicateKey(String),

  /// The referenced entity, or a record in the required state, is absent.
  #[error("not found: {0}")]
  NotFound(String),

  #[error("student {0} already has a pending proforma")]
  PendingProforma(StudentId),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
