//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with a fixed microsecond
//! precision so that they sort lexically. Amounts are stored as decimal text.
//! States are stored as their snake_case names.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use registrar_core::{
  proforma::{LineItem, Proforma, ProformaId, ProformaNumber, ProformaState, ProformaSummary},
  student::{EnrollmentState, Student, StudentId},
  subject::{Subject, SubjectId},
};
use rust_decimal::Decimal;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Decimal ─────────────────────────────────────────────────────────────────

pub fn encode_amount(amount: Decimal) -> String { amount.to_string() }

pub fn decode_amount(s: &str) -> Result<Decimal> { Ok(Decimal::from_str(s)?) }

// ─── States ──────────────────────────────────────────────────────────────────

pub fn decode_enrollment(s: &str) -> Result<EnrollmentState> {
  s.parse().map_err(|_| Error::UnknownValue {
    kind:  "enrollment state",
    value: s.to_owned(),
  })
}

pub fn decode_proforma_state(s: &str) -> Result<ProformaState> {
  s.parse().map_err(|_| Error::UnknownValue {
    kind:  "proforma state",
    value: s.to_owned(),
  })
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const STUDENT_COLUMNS: &str = "s.student_id, s.code, s.national_id, s.first_name, \
                                   s.last_name, s.course, s.email, s.enrollment, \
                                   s.registered_at";

/// Raw values read directly from a `students` row, in [`STUDENT_COLUMNS`]
/// order starting at `offset`.
pub struct RawStudent {
  pub student_id:    i64,
  pub code:          String,
  pub national_id:   String,
  pub first_name:    String,
  pub last_name:     String,
  pub course:        String,
  pub email:         String,
  pub enrollment:    String,
  pub registered_at: String,
}

impl RawStudent {
  pub fn from_row(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      student_id:    row.get(offset)?,
      code:          row.get(offset + 1)?,
      national_id:   row.get(offset + 2)?,
      first_name:    row.get(offset + 3)?,
      last_name:     row.get(offset + 4)?,
      course:        row.get(offset + 5)?,
      email:         row.get(offset + 6)?,
      enrollment:    row.get(offset + 7)?,
      registered_at: row.get(offset + 8)?,
    })
  }

  pub fn into_student(self) -> Result<Student> {
    Ok(Student {
      student_id:    StudentId(self.student_id),
      code:          self.code,
      national_id:   self.national_id,
      first_name:    self.first_name,
      last_name:     self.last_name,
      course:        self.course,
      email:         self.email,
      enrollment:    decode_enrollment(&self.enrollment)?,
      registered_at: decode_dt(&self.registered_at)?,
    })
  }
}

pub struct RawSubject {
  pub subject_id:  i64,
  pub name:        String,
  pub course:      String,
  pub description: Option<String>,
}

impl RawSubject {
  pub fn into_subject(self) -> Subject {
    Subject {
      subject_id:  SubjectId(self.subject_id),
      name:        self.name,
      course:      self.course,
      description: self.description,
    }
  }
}

pub const PROFORMA_COLUMNS: &str = "p.proforma_id, p.number, p.student_id, p.student_code, \
                                    p.course, p.amount, p.generated_at, p.state, \
                                    p.receipt_number, p.paid_at";

/// Raw values read from a `proformas` row, in [`PROFORMA_COLUMNS`] order.
pub struct RawProforma {
  pub proforma_id:    i64,
  pub number:         String,
  pub student_id:     i64,
  pub student_code:   String,
  pub course:         String,
  pub amount:         String,
  pub generated_at:   String,
  pub state:          String,
  pub receipt_number: Option<String>,
  pub paid_at:        Option<String>,
}

impl RawProforma {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      proforma_id:    row.get(0)?,
      number:         row.get(1)?,
      student_id:     row.get(2)?,
      student_code:   row.get(3)?,
      course:         row.get(4)?,
      amount:         row.get(5)?,
      generated_at:   row.get(6)?,
      state:          row.get(7)?,
      receipt_number: row.get(8)?,
      paid_at:        row.get(9)?,
    })
  }

  pub fn into_proforma(self, items: Vec<RawLineItem>) -> Result<Proforma> {
    Ok(Proforma {
      proforma_id:    ProformaId(self.proforma_id),
      number:         ProformaNumber::from(self.number),
      student_id:     StudentId(self.student_id),
      student_code:   self.student_code,
      course:         self.course,
      amount:         decode_amount(&self.amount)?,
      generated_at:   decode_dt(&self.generated_at)?,
      state:          decode_proforma_state(&self.state)?,
      receipt_number: self.receipt_number,
      paid_at:        self.paid_at.as_deref().map(decode_dt).transpose()?,
      items:          items.into_iter().map(RawLineItem::into_line_item).collect(),
    })
  }
}

pub struct RawLineItem {
  pub subject_id:   i64,
  pub subject_name: String,
  pub description:  Option<String>,
}

impl RawLineItem {
  pub fn into_line_item(self) -> LineItem {
    LineItem {
      subject_id:   SubjectId(self.subject_id),
      subject_name: self.subject_name,
      description:  self.description,
    }
  }
}

/// A `proformas` row joined with the owner's name, for listings.
pub struct RawSummary {
  pub number:       String,
  pub student_id:   i64,
  pub student_code: String,
  pub first_name:   String,
  pub last_name:    String,
  pub course:       String,
  pub amount:       String,
  pub generated_at: String,
  pub state:        String,
}

impl RawSummary {
  pub fn into_summary(self) -> Result<ProformaSummary> {
    Ok(ProformaSummary {
      number:       ProformaNumber::from(self.number),
      student_id:   StudentId(self.student_id),
      student_code: self.student_code,
      first_name:   self.first_name,
      last_name:    self.last_name,
      course:       self.course,
      amount:       decode_amount(&self.amount)?,
      generated_at: decode_dt(&self.generated_at)?,
      state:        decode_proforma_state(&self.state)?,
    })
  }
}
