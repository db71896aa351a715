//! The `RegistrarStore` trait.
//!
//! Implemented by storage backends (e.g. `registrar-store-sqlite`). The
//! [`Registrar`](crate::Registrar) depends on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use crate::{
  proforma::{NewProforma, Proforma, ProformaDetail, ProformaNumber, ProformaSummary},
  student::{NewStudent, Student, StudentId},
  subject::Subject,
};

/// Durable, transactional storage for students, subjects, proformas and
/// their line items.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RegistrarStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Students ──────────────────────────────────────────────────────────

  /// Persist a new student in the `NotEnrolled` state.
  ///
  /// Fails with a duplicate-key error if the student code is already taken.
  fn insert_student(
    &self,
    input: NewStudent,
  ) -> impl Future<Output = Result<Student, Self::Error>> + Send + '_;

  /// All students, most recently registered first.
  fn list_students(
    &self,
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + '_;

  /// Students that are not enrolled and have no pending proforma.
  fn list_students_awaiting_proforma(
    &self,
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + '_;

  fn get_student(
    &self,
    id: StudentId,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  // ── Subjects ──────────────────────────────────────────────────────────

  fn list_subjects_by_course<'a>(
    &'a self,
    course: &'a str,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + 'a;

  // ── Proformas ─────────────────────────────────────────────────────────

  /// Number of proformas whose number starts with `prefix`.
  fn count_proformas_with_prefix<'a>(
    &'a self,
    prefix: &'a str,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  fn has_pending_proforma(
    &self,
    student: StudentId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Insert the proforma and one line item per subject id atomically.
  ///
  /// Each line item snapshots the subject's current name. An unknown subject
  /// id aborts the whole insert.
  fn insert_proforma_with_items(
    &self,
    input: NewProforma,
  ) -> impl Future<Output = Result<Proforma, Self::Error>> + Send + '_;

  /// Look a proforma up by number, joined with its owning student.
  fn get_proforma<'a>(
    &'a self,
    number: &'a ProformaNumber,
  ) -> impl Future<Output = Result<Option<ProformaDetail>, Self::Error>> + Send + 'a;

  /// All proformas, most recently generated first.
  fn list_proformas(
    &self,
  ) -> impl Future<Output = Result<Vec<ProformaSummary>, Self::Error>> + Send + '_;

  /// Mark the student's pending proforma `number` as paid and the student as
  /// enrolled, in one transaction.
  ///
  /// Returns `false`, writing nothing, when no pending proforma with that
  /// number belongs to the student.
  fn settle_proforma<'a>(
    &'a self,
    student: StudentId,
    number: &'a ProformaNumber,
    receipt: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}
