//! [`SqliteStore`], the SQLite implementation of [`RegistrarStore`].

use std::path::Path;

use chrono::{SubsecRound as _, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use registrar_core::{
  proforma::{NewProforma, Proforma, ProformaDetail, ProformaNumber, ProformaState, ProformaSummary},
  store::RegistrarStore,
  student::{EnrollmentState, NewStudent, Student, StudentId},
  subject::{Subject, SubjectId},
};

use crate::{
  Error, Result,
  encode::{
    PROFORMA_COLUMNS, RawLineItem, RawProforma, RawStudent, RawSubject, RawSummary,
    STUDENT_COLUMNS, encode_amount, encode_dt,
  },
  schema::{SCHEMA, SEED_SUBJECTS},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A registrar store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path`, initialise the schema and seed the
  /// subject catalog if it is empty.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    let seeded = self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;

        let existing: i64 =
          conn.query_row("SELECT COUNT(*) FROM subjects", [], |r| r.get(0))?;
        if existing > 0 {
          return Ok(false);
        }

        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO subjects (name, course, description) VALUES (?1, ?2, ?3)",
          )?;
          for &(name, course, description) in SEED_SUBJECTS {
            stmt.execute(rusqlite::params![name, course, description])?;
          }
        }
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if seeded {
      tracing::debug!(subjects = SEED_SUBJECTS.len(), "seeded subject catalog");
    }
    Ok(())
  }

  /// Overwrite a catalog entry's name; lets tests show that line items keep
  /// their snapshot.
  #[cfg(test)]
  pub(crate) async fn rename_subject(&self, id: SubjectId, name: &str) -> Result<()> {
    let name = name.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE subjects SET name = ?1 WHERE subject_id = ?2",
          rusqlite::params![name, id.0],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn query_students(
    &self,
    sql: String,
    params: Vec<String>,
  ) -> Result<Vec<Student>> {
    let raws: Vec<RawStudent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), |row| {
            RawStudent::from_row(row, 0)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStudent::into_student).collect()
  }
}

/// The message of a UNIQUE constraint failure, if `e` is one.
fn unique_violation(e: &tokio_rusqlite::Error) -> Option<&str> {
  match e {
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(failure, message))
      if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
    {
      Some(message.as_deref().unwrap_or_default())
    }
    _ => None,
  }
}

/// Map a UNIQUE constraint failure through `on_unique`; anything else is a
/// plain database error.
fn classify(e: tokio_rusqlite::Error, on_unique: impl FnOnce(&str) -> Error) -> Error {
  let mapped = unique_violation(&e).map(on_unique);
  mapped.unwrap_or_else(|| e.into())
}

/// Line items of a proforma, in insertion order, with the current catalog
/// description of each subject.
fn load_items(
  conn: &rusqlite::Connection,
  proforma_id: i64,
) -> rusqlite::Result<Vec<RawLineItem>> {
  let mut stmt = conn.prepare(
    "SELECT ps.subject_id, ps.subject_name, sub.description
     FROM proforma_subjects ps
     LEFT JOIN subjects sub ON sub.subject_id = ps.subject_id
     WHERE ps.proforma_id = ?1
     ORDER BY ps.line_id",
  )?;
  stmt
    .query_map(rusqlite::params![proforma_id], |row| {
      Ok(RawLineItem {
        subject_id:   row.get(0)?,
        subject_name: row.get(1)?,
        description:  row.get(2)?,
      })
    })?
    .collect()
}

// ─── RegistrarStore impl ─────────────────────────────────────────────────────

impl RegistrarStore for SqliteStore {
  type Error = Error;

  // ── Students ──────────────────────────────────────────────────────────────

  async fn insert_student(&self, input: NewStudent) -> Result<Student> {
    // Stored precision is microseconds.
    let registered_at = Utc::now().trunc_subsecs(6);
    let at_str        = encode_dt(registered_at);
    let state         = EnrollmentState::NotEnrolled;
    let row           = input.clone();

    let inserted = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO students (
             code, national_id, first_name, last_name, course, email,
             enrollment, registered_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            row.code,
            row.national_id,
            row.first_name,
            row.last_name,
            row.course,
            row.email,
            state.as_str(),
            at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await;

    let student_id = match inserted {
      Ok(id) => StudentId(id),
      Err(e) => {
        return Err(classify(e, |_| Error::DuplicateStudentCode(input.code.clone())));
      }
    };

    Ok(Student {
      student_id,
      code: input.code,
      national_id: input.national_id,
      first_name: input.first_name,
      last_name: input.last_name,
      course: input.course,
      email: input.email,
      enrollment: state,
      registered_at,
    })
  }

  async fn list_students(&self) -> Result<Vec<Student>> {
    self
      .query_students(
        format!(
          "SELECT {STUDENT_COLUMNS} FROM students s
           ORDER BY s.registered_at DESC, s.student_id DESC"
        ),
        vec![],
      )
      .await
  }

  async fn list_students_awaiting_proforma(&self) -> Result<Vec<Student>> {
    self
      .query_students(
        format!(
          "SELECT {STUDENT_COLUMNS} FROM students s
           WHERE s.enrollment = ?1
             AND NOT EXISTS (
               SELECT 1 FROM proformas p
               WHERE p.student_id = s.student_id AND p.state = ?2
             )
           ORDER BY s.registered_at DESC, s.student_id DESC"
        ),
        vec![
          EnrollmentState::NotEnrolled.as_str().to_owned(),
          ProformaState::Pending.as_str().to_owned(),
        ],
      )
      .await
  }

  async fn get_student(&self, id: StudentId) -> Result<Option<Student>> {
    let raw: Option<RawStudent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {STUDENT_COLUMNS} FROM students s WHERE s.student_id = ?1"),
              rusqlite::params![id.0],
              |row| RawStudent::from_row(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawStudent::into_student).transpose()
  }

  // ── Subjects ──────────────────────────────────────────────────────────────

  async fn list_subjects_by_course(&self, course: &str) -> Result<Vec<Subject>> {
    let course = course.to_owned();

    let raws: Vec<RawSubject> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT subject_id, name, course, description
           FROM subjects WHERE course = ?1 ORDER BY subject_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![course], |row| {
            Ok(RawSubject {
              subject_id:  row.get(0)?,
              name:        row.get(1)?,
              course:      row.get(2)?,
              description: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawSubject::into_subject).collect())
  }

  // ── Proformas ─────────────────────────────────────────────────────────────

  async fn count_proformas_with_prefix(&self, prefix: &str) -> Result<u64> {
    let pattern = format!("{prefix}%");

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM proformas WHERE number LIKE ?1",
          rusqlite::params![pattern],
          |r| r.get(0),
        )?)
      })
      .await?;

    Ok(count as u64)
  }

  async fn has_pending_proforma(&self, student: StudentId) -> Result<bool> {
    let pending = ProformaState::Pending.as_str();

    let found = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM proformas WHERE student_id = ?1 AND state = ?2",
              rusqlite::params![student.0, pending],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(found)
  }

  async fn insert_proforma_with_items(&self, input: NewProforma) -> Result<Proforma> {
    let number_str      = input.number.as_str().to_owned();
    let student_id      = input.student_id.0;
    let student_code    = input.student_code.clone();
    let course          = input.course.clone();
    let amount_str      = encode_amount(input.amount);
    let generated_str   = encode_dt(input.generated_at);
    let state           = ProformaState::Pending;
    let subject_ids: Vec<i64> = input.subject_ids.iter().map(|s| s.0).collect();

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
          "INSERT INTO proformas (
             number, student_id, student_code, course, amount, generated_at, state
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            number_str,
            student_id,
            student_code,
            course,
            amount_str,
            generated_str,
            state.as_str(),
          ],
        )?;
        let proforma_id = tx.last_insert_rowid();

        let mut items = Vec::with_capacity(subject_ids.len());
        for subject_id in subject_ids {
          let subject: Option<(String, Option<String>)> = tx
            .query_row(
              "SELECT name, description FROM subjects WHERE subject_id = ?1",
              rusqlite::params![subject_id],
              |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?;

          // Dropping `tx` here rolls back the proforma row too.
          let Some((subject_name, description)) = subject else {
            return Ok(Err(SubjectId(subject_id)));
          };

          tx.execute(
            "INSERT INTO proforma_subjects (proforma_id, subject_id, subject_name)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![proforma_id, subject_id, subject_name],
          )?;
          items.push(RawLineItem { subject_id, subject_name, description });
        }

        tx.commit()?;
        Ok(Ok((proforma_id, items)))
      })
      .await;

    let (proforma_id, items) = match inserted {
      Ok(Ok(row)) => row,
      Ok(Err(missing)) => return Err(Error::SubjectNotFound(missing)),
      Err(e) => {
        return Err(classify(e, |msg| {
          if msg.contains("student_id") {
            Error::PendingProforma(input.student_id)
          } else {
            Error::DuplicateProformaNumber(input.number.to_string())
          }
        }));
      }
    };

    // Round-trip through the row encoding so the result matches a later read.
    RawProforma {
      proforma_id,
      number: input.number.to_string(),
      student_id,
      student_code: input.student_code,
      course: input.course,
      amount: encode_amount(input.amount),
      generated_at: encode_dt(input.generated_at),
      state: state.as_str().to_owned(),
      receipt_number: None,
      paid_at: None,
    }
    .into_proforma(items)
  }

  async fn get_proforma(&self, number: &ProformaNumber) -> Result<Option<ProformaDetail>> {
    let number_str = number.as_str().to_owned();

    let raw: Option<(RawProforma, RawStudent, Vec<RawLineItem>)> = self
      .conn
      .call(move |conn| {
        let row = conn
          .query_row(
            &format!(
              "SELECT {PROFORMA_COLUMNS}, {STUDENT_COLUMNS}
               FROM proformas p
               JOIN students s ON s.student_id = p.student_id
               WHERE p.number = ?1"
            ),
            rusqlite::params![number_str],
            |row| Ok((RawProforma::from_row(row)?, RawStudent::from_row(row, 10)?)),
          )
          .optional()?;

        let Some((proforma, student)) = row else {
          return Ok(None);
        };
        let items = load_items(conn, proforma.proforma_id)?;
        Ok(Some((proforma, student, items)))
      })
      .await?;

    raw
      .map(|(proforma, student, items)| {
        Ok(ProformaDetail {
          proforma: proforma.into_proforma(items)?,
          student:  student.into_student()?,
        })
      })
      .transpose()
  }

  async fn list_proformas(&self) -> Result<Vec<ProformaSummary>> {
    let raws: Vec<RawSummary> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT p.number, p.student_id, p.student_code, s.first_name, s.last_name,
                  p.course, p.amount, p.generated_at, p.state
           FROM proformas p
           JOIN students s ON s.student_id = p.student_id
           ORDER BY p.generated_at DESC, p.proforma_id DESC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawSummary {
              number:       row.get(0)?,
              student_id:   row.get(1)?,
              student_code: row.get(2)?,
              first_name:   row.get(3)?,
              last_name:    row.get(4)?,
              course:       row.get(5)?,
              amount:       row.get(6)?,
              generated_at: row.get(7)?,
              state:        row.get(8)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSummary::into_summary).collect()
  }

  async fn settle_proforma(
    &self,
    student: StudentId,
    number:  &ProformaNumber,
    receipt: &str,
  ) -> Result<bool> {
    let number_str  = number.as_str().to_owned();
    let receipt_str = receipt.to_owned();
    let paid_at_str = encode_dt(Utc::now());

    let settled = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let changed = tx.execute(
          "UPDATE proformas
           SET state = ?1, receipt_number = ?2, paid_at = ?3
           WHERE student_id = ?4 AND number = ?5 AND state = ?6",
          rusqlite::params![
            ProformaState::Paid.as_str(),
            receipt_str,
            paid_at_str,
            student.0,
            number_str,
            ProformaState::Pending.as_str(),
          ],
        )?;
        if changed == 0 {
          return Ok(false);
        }

        tx.execute(
          "UPDATE students SET enrollment = ?1 WHERE student_id = ?2",
          rusqlite::params![EnrollmentState::Enrolled.as_str(), student.0],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(settled)
  }
}
