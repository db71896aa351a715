//! Students and their enrollment state.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};

use crate::{Error, Result};

/// Surrogate key of a student row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub i64);

impl fmt::Display for StudentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// Only the payment-confirmation transition moves a student to `Enrolled`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EnrollmentState {
  NotEnrolled,
  Enrolled,
}

impl EnrollmentState {
  pub fn as_str(self) -> &'static str { self.into() }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
  pub student_id:    StudentId,
  /// Business key; globally unique and never changed after registration.
  pub code:          String,
  pub national_id:   String,
  pub first_name:    String,
  pub last_name:     String,
  pub course:        String,
  pub email:         String,
  pub enrollment:    EnrollmentState,
  pub registered_at: DateTime<Utc>,
}

impl Student {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

/// Input for a student registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewStudent {
  pub code:        String,
  pub national_id: String,
  pub first_name:  String,
  pub last_name:   String,
  pub course:      String,
  pub email:       String,
}

impl NewStudent {
  /// Every field is required.
  pub fn validate(&self) -> Result<()> {
    let fields = [
      ("student code", &self.code),
      ("national id", &self.national_id),
      ("first name", &self.first_name),
      ("last name", &self.last_name),
      ("course", &self.course),
      ("email", &self.email),
    ];
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
      Some((name, _)) => Err(Error::Validation(format!("{name} is required"))),
      None => Ok(()),
    }
  }
}
