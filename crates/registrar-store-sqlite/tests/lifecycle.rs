//! End-to-end tests of the proforma lifecycle over an in-memory store and a
//! scripted accounting peer.

use std::sync::Mutex;

use chrono::{DateTime, Local, TimeZone};
use registrar_core::{
  Error, Registrar,
  peer::{AccountingPeer, NotifyOutcome, ProformaNotice},
  pricing::PriceTable,
  proforma::ProformaState,
  store::RegistrarStore,
  student::{EnrollmentState, NewStudent, Student},
  subject::SubjectId,
};
use registrar_store_sqlite::SqliteStore;

// ─── Fixtures ────────────────────────────────────────────────────────────────

/// Answers every notification with a fixed outcome and records the notices.
struct ScriptedPeer {
  outcome: NotifyOutcome,
  seen:    Mutex<Vec<ProformaNotice>>,
}

impl ScriptedPeer {
  fn new(outcome: NotifyOutcome) -> Self {
    Self { outcome, seen: Mutex::new(Vec::new()) }
  }

  fn seen(&self) -> Vec<ProformaNotice> { self.seen.lock().unwrap().clone() }
}

impl AccountingPeer for ScriptedPeer {
  async fn register_proforma(&self, notice: &ProformaNotice) -> NotifyOutcome {
    self.seen.lock().unwrap().push(notice.clone());
    self.outcome.clone()
  }
}

async fn registrar(outcome: NotifyOutcome) -> Registrar<SqliteStore, ScriptedPeer> {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  Registrar::new(store, ScriptedPeer::new(outcome), PriceTable::default())
}

fn june_first() -> DateTime<Local> {
  Local.with_ymd_and_hms(2024, 6, 1, 10, 30, 0).unwrap()
}

fn new_student(code: &str, course: &str) -> NewStudent {
  NewStudent {
    code:        code.into(),
    national_id: format!("ID-{code}"),
    first_name:  "Ana".into(),
    last_name:   "Pérez".into(),
    course:      course.into(),
    email:       format!("{}@example.com", code.to_lowercase()),
  }
}

async fn course_subject_ids(
  r: &Registrar<SqliteStore, ScriptedPeer>,
  student: &Student,
  n: usize,
) -> Vec<SubjectId> {
  r.subjects_for_course(&student.course)
    .await
    .unwrap()
    .into_iter()
    .take(n)
    .map(|s| s.subject_id)
    .collect()
}

// ─── Registration ────────────────────────────────────────────────────────────

#[tokio::test]
async fn registration_keeps_the_business_key() {
  let r = registrar(NotifyOutcome::Delivered).await;

  let student = r.register_student(new_student("E100", "Primer Curso")).await.unwrap();
  assert_eq!(student.code, "E100");
  assert_eq!(r.get_student(student.student_id).await.unwrap().code, "E100");

  let err = r
    .register_student(new_student("E100", "Tercer Curso"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateKey(_)), "{err}");
}

#[tokio::test]
async fn blank_registration_is_a_validation_error() {
  let r = registrar(NotifyOutcome::Delivered).await;
  let input = NewStudent { first_name: String::new(), ..new_student("E1", "Primer Curso") };

  let err = r.register_student(input).await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)), "{err}");
  assert!(r.list_students().await.unwrap().is_empty());
}

// ─── Generation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_proforma_of_the_day() {
  let r = registrar(NotifyOutcome::Delivered).await;
  let student = r.register_student(new_student("E100", "Primer Curso")).await.unwrap();
  let subjects = course_subject_ids(&r, &student, 2).await;

  let generated = r
    .generate_proforma_at(student.student_id, subjects, june_first())
    .await
    .unwrap();

  let proforma = &generated.proforma;
  assert_eq!(proforma.number.as_str(), "PROF-20240601-0001");
  assert_eq!(proforma.amount.to_string(), "300.00");
  assert_eq!(proforma.state, ProformaState::Pending);
  assert_eq!(proforma.items.len(), 2);
  assert_eq!(generated.notification, NotifyOutcome::Delivered);

  let notices = r.peer().seen();
  assert_eq!(notices.len(), 1);
  assert_eq!(notices[0].number, proforma.number);
  assert_eq!(notices[0].student_code, "E100");
  assert_eq!(notices[0].full_name, "Ana Pérez");
  assert_eq!(notices[0].course, "Primer Curso");
  assert_eq!(notices[0].amount, proforma.amount);
}

#[tokio::test]
async fn sequence_counts_todays_proformas() {
  let r = registrar(NotifyOutcome::Delivered).await;
  let a = r.register_student(new_student("E1", "Primer Curso")).await.unwrap();
  let b = r.register_student(new_student("E2", "Segundo Curso")).await.unwrap();
  let c = r.register_student(new_student("E3", "Tercer Curso")).await.unwrap();

  let first = r
    .generate_proforma_at(a.student_id, course_subject_ids(&r, &a, 1).await, june_first())
    .await
    .unwrap();
  let second = r
    .generate_proforma_at(b.student_id, course_subject_ids(&r, &b, 3).await, june_first())
    .await
    .unwrap();
  let next_day = Local.with_ymd_and_hms(2024, 6, 2, 9, 0, 0).unwrap();
  let third = r
    .generate_proforma_at(c.student_id, course_subject_ids(&r, &c, 1).await, next_day)
    .await
    .unwrap();

  assert_eq!(first.proforma.number.as_str(), "PROF-20240601-0001");
  assert_eq!(second.proforma.number.as_str(), "PROF-20240601-0002");
  assert_eq!(second.proforma.amount.to_string(), "340.00");
  assert_eq!(third.proforma.number.as_str(), "PROF-20240602-0001");
  assert_eq!(third.proforma.amount.to_string(), "450.00");
}

#[tokio::test]
async fn unknown_course_prices_at_zero() {
  let r = registrar(NotifyOutcome::Delivered).await;
  let student = r.register_student(new_student("E9", "Curso Libre")).await.unwrap();

  let generated = r
    .generate_proforma_at(student.student_id, vec![SubjectId(1)], june_first())
    .await
    .unwrap();
  assert_eq!(generated.proforma.amount.to_string(), "0.00");
}

#[tokio::test]
async fn empty_subject_set_persists_nothing() {
  let r = registrar(NotifyOutcome::Delivered).await;
  let student = r.register_student(new_student("E100", "Primer Curso")).await.unwrap();

  let err = r
    .generate_proforma_at(student.student_id, vec![], june_first())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)), "{err}");

  assert!(r.list_proformas().await.unwrap().is_empty());
  assert!(r.peer().seen().is_empty());
}

#[tokio::test]
async fn missing_student_is_not_found() {
  let r = registrar(NotifyOutcome::Delivered).await;

  let err = r
    .generate_proforma_at(registrar_core::student::StudentId(77), vec![SubjectId(1)], june_first())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound(_)), "{err}");
}

#[tokio::test]
async fn one_pending_proforma_per_student() {
  let r = registrar(NotifyOutcome::Delivered).await;
  let student = r.register_student(new_student("E100", "Primer Curso")).await.unwrap();

  r.generate_proforma_at(student.student_id, vec![SubjectId(1)], june_first())
    .await
    .unwrap();
  let err = r
    .generate_proforma_at(student.student_id, vec![SubjectId(2)], june_first())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PendingProforma(id) if id == student.student_id), "{err}");
  assert_eq!(r.list_proformas().await.unwrap().len(), 1);
}

#[tokio::test]
async fn unreachable_peer_still_creates_the_proforma() {
  let r = registrar(NotifyOutcome::Unreachable { reason: "operation timed out".into() }).await;
  let student = r.register_student(new_student("E100", "Primer Curso")).await.unwrap();

  let generated = r
    .generate_proforma_at(student.student_id, vec![SubjectId(1)], june_first())
    .await
    .unwrap();
  assert!(!generated.notification.is_delivered());

  let detail = r.get_proforma(generated.proforma.number.as_str()).await.unwrap();
  assert_eq!(detail.proforma.state, ProformaState::Pending);
}

#[tokio::test]
async fn rejected_notification_still_creates_the_proforma() {
  let r = registrar(NotifyOutcome::Rejected { status: 503 }).await;
  let student = r.register_student(new_student("E100", "Primer Curso")).await.unwrap();

  let generated = r
    .generate_proforma_at(student.student_id, vec![SubjectId(1)], june_first())
    .await
    .unwrap();
  assert_eq!(generated.notification, NotifyOutcome::Rejected { status: 503 });
  assert!(r.store().has_pending_proforma(student.student_id).await.unwrap());
}

// ─── Payment confirmation ────────────────────────────────────────────────────

#[tokio::test]
async fn confirmation_enrolls_once() {
  let r = registrar(NotifyOutcome::Delivered).await;
  let student = r.register_student(new_student("E100", "Primer Curso")).await.unwrap();
  let generated = r
    .generate_proforma_at(student.student_id, vec![SubjectId(1), SubjectId(2)], june_first())
    .await
    .unwrap();
  let number = generated.proforma.number.as_str();

  let confirmation = r.confirm_payment(student.student_id, number, "REC-001").await.unwrap();
  assert_eq!(confirmation.number.as_str(), number);
  assert_eq!(confirmation.receipt_number, "REC-001");

  let detail = r.get_proforma(number).await.unwrap();
  assert_eq!(detail.proforma.state, ProformaState::Paid);
  assert_eq!(detail.student.enrollment, EnrollmentState::Enrolled);

  let err = r
    .confirm_payment(student.student_id, number, "REC-001")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound(_)), "{err}");
}

#[tokio::test]
async fn confirmation_requires_both_identifiers() {
  let r = registrar(NotifyOutcome::Delivered).await;
  let student = r.register_student(new_student("E100", "Primer Curso")).await.unwrap();

  let err = r.confirm_payment(student.student_id, "", "REC-1").await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)), "{err}");

  let err = r
    .confirm_payment(student.student_id, "PROF-20240601-0001", " ")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)), "{err}");
}

#[tokio::test]
async fn confirmation_of_unknown_proforma_is_not_found() {
  let r = registrar(NotifyOutcome::Delivered).await;
  let student = r.register_student(new_student("E100", "Primer Curso")).await.unwrap();

  let err = r
    .confirm_payment(student.student_id, "PROF-20240601-0001", "REC-1")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound(_)), "{err}");
  assert_eq!(
    r.get_student(student.student_id).await.unwrap().enrollment,
    EnrollmentState::NotEnrolled
  );
}

#[tokio::test]
async fn paid_student_can_be_quoted_again() {
  let r = registrar(NotifyOutcome::Delivered).await;
  let student = r.register_student(new_student("E100", "Primer Curso")).await.unwrap();
  let first = r
    .generate_proforma_at(student.student_id, vec![SubjectId(1)], june_first())
    .await
    .unwrap();
  r.confirm_payment(student.student_id, first.proforma.number.as_str(), "REC-1")
    .await
    .unwrap();

  assert!(r.students_awaiting_proforma().await.unwrap().is_empty());

  let second = r
    .generate_proforma_at(student.student_id, vec![SubjectId(2)], june_first())
    .await
    .unwrap();
  assert_eq!(second.proforma.number.as_str(), "PROF-20240601-0002");
}

// ─── Queries ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_proforma_is_not_found() {
  let r = registrar(NotifyOutcome::Delivered).await;
  let err = r.get_proforma("PROF-20240601-0001").await.unwrap_err();
  assert!(matches!(err, Error::NotFound(_)), "{err}");
}
