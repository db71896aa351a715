//! Proformas (billing quotes for a set of subjects) and their line items.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};

use crate::{
  student::{Student, StudentId},
  subject::SubjectId,
};

// ─── Identity ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProformaId(pub i64);

/// Human-readable business key, e.g. `PROF-20240601-0001`.
///
/// Built by [`crate::numbering::next_number`]; any string is accepted when
/// looking a proforma up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProformaNumber(String);

impl ProformaNumber {
  pub fn as_str(&self) -> &str { &self.0 }
}

impl From<String> for ProformaNumber {
  fn from(s: String) -> Self { Self(s) }
}

impl From<&str> for ProformaNumber {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl fmt::Display for ProformaNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

// ─── State ───────────────────────────────────────────────────────────────────

/// `Pending` moves to `Paid` exactly once, on the accounting peer's callback.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProformaState {
  Pending,
  Paid,
}

impl ProformaState {
  pub fn as_str(self) -> &'static str { self.into() }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// One billed subject. The name is a snapshot taken at creation time and
/// survives later catalog edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
  pub subject_id:   SubjectId,
  pub subject_name: String,
  /// Current catalog description, if the subject still exists.
  pub description:  Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proforma {
  pub proforma_id:    ProformaId,
  pub number:         ProformaNumber,
  pub student_id:     StudentId,
  /// Denormalised from the owning student at creation time.
  pub student_code:   String,
  pub course:         String,
  pub amount:         Decimal,
  pub generated_at:   DateTime<Utc>,
  pub state:          ProformaState,
  /// Receipt identifier supplied by the accounting peer on payment.
  pub receipt_number: Option<String>,
  pub paid_at:        Option<DateTime<Utc>>,
  /// Fixed at creation; never edited afterwards.
  pub items:          Vec<LineItem>,
}

/// Everything the store needs to persist a proforma and its line items in
/// one transaction.
#[derive(Debug, Clone)]
pub struct NewProforma {
  pub number:       ProformaNumber,
  pub student_id:   StudentId,
  pub student_code: String,
  pub course:       String,
  pub amount:       Decimal,
  pub generated_at: DateTime<Utc>,
  pub subject_ids:  Vec<SubjectId>,
}

/// A proforma joined with its owning student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProformaDetail {
  pub proforma: Proforma,
  pub student:  Student,
}

/// Listing row: a proforma without line items, plus the student's name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProformaSummary {
  pub number:       ProformaNumber,
  pub student_id:   StudentId,
  pub student_code: String,
  pub first_name:   String,
  pub last_name:    String,
  pub course:       String,
  pub amount:       Decimal,
  pub generated_at: DateTime<Utc>,
  pub state:        ProformaState,
}
