//! The proforma lifecycle manager.
//!
//! [`Registrar`] orchestrates registration, proforma generation (validate,
//! price, number, insert, notify) and the peer-initiated payment
//! confirmation that moves a proforma from pending to paid.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  numbering::{day_prefix, next_number},
  peer::{AccountingPeer, NotifyOutcome, ProformaNotice},
  pricing::PriceTable,
  proforma::{NewProforma, Proforma, ProformaDetail, ProformaNumber, ProformaSummary},
  store::RegistrarStore,
  student::{NewStudent, Student, StudentId},
  subject::{Subject, SubjectId},
};

/// A committed proforma and the outcome of notifying the accounting peer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedProforma {
  pub proforma:     Proforma,
  pub notification: NotifyOutcome,
}

/// Acknowledgement of a confirmed payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
  pub student_id:     StudentId,
  pub number:         ProformaNumber,
  pub receipt_number: String,
}

pub struct Registrar<S, P> {
  store:  S,
  peer:   P,
  prices: PriceTable,
}

impl<S, P> Registrar<S, P> {
  pub fn new(store: S, peer: P, prices: PriceTable) -> Self {
    Self { store, peer, prices }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn peer(&self) -> &P { &self.peer }

  pub fn prices(&self) -> &PriceTable { &self.prices }
}

impl<S, P> Registrar<S, P>
where
  S: RegistrarStore,
  P: AccountingPeer,
  Error: From<S::Error>,
{
  // ── Students ──────────────────────────────────────────────────────────────

  pub async fn register_student(&self, input: NewStudent) -> Result<Student> {
    input.validate()?;
    let student = self.store.insert_student(input).await?;
    tracing::info!(code = %student.code, id = %student.student_id, "student registered");
    Ok(student)
  }

  pub async fn list_students(&self) -> Result<Vec<Student>> {
    Ok(self.store.list_students().await?)
  }

  /// Candidates for a new proforma: not enrolled, nothing pending.
  pub async fn students_awaiting_proforma(&self) -> Result<Vec<Student>> {
    Ok(self.store.list_students_awaiting_proforma().await?)
  }

  pub async fn get_student(&self, id: StudentId) -> Result<Student> {
    self
      .store
      .get_student(id)
      .await?
      .ok_or_else(|| Error::NotFound(format!("student {id}")))
  }

  pub async fn subjects_for_course(&self, course: &str) -> Result<Vec<Subject>> {
    Ok(self.store.list_subjects_by_course(course).await?)
  }

  // ── Proformas ─────────────────────────────────────────────────────────────

  /// Generate a proforma dated with the local calendar day.
  pub async fn generate_proforma(
    &self,
    student_id: StudentId,
    subject_ids: Vec<SubjectId>,
  ) -> Result<GeneratedProforma> {
    self.generate_proforma_at(student_id, subject_ids, Local::now()).await
  }

  /// Generate a proforma as if the current time were `now`.
  ///
  /// The proforma is committed before the peer is contacted; the
  /// notification outcome is returned alongside it and never rolls it back.
  pub async fn generate_proforma_at(
    &self,
    student_id: StudentId,
    subject_ids: Vec<SubjectId>,
    now: DateTime<Local>,
  ) -> Result<GeneratedProforma> {
    if subject_ids.is_empty() {
      return Err(Error::Validation("at least one subject must be selected".into()));
    }

    let student = self.get_student(student_id).await?;
    if self.store.has_pending_proforma(student_id).await? {
      return Err(Error::PendingProforma(student_id));
    }

    let amount = self.prices.price_for(&student.course);

    let today = now.date_naive();
    let issued_today = self.store.count_proformas_with_prefix(&day_prefix(today)).await?;
    let number = next_number(today, issued_today);

    let proforma = self
      .store
      .insert_proforma_with_items(NewProforma {
        number,
        student_id,
        student_code: student.code.clone(),
        course: student.course.clone(),
        amount,
        generated_at: now.with_timezone(&Utc),
        subject_ids,
      })
      .await?;

    tracing::info!(
      number = %proforma.number,
      student = %student.code,
      amount = %proforma.amount,
      items = proforma.items.len(),
      "proforma generated"
    );

    let notice = ProformaNotice {
      number:       proforma.number.clone(),
      student_code: student.code.clone(),
      full_name:    student.full_name(),
      course:       student.course.clone(),
      amount:       proforma.amount,
    };
    let notification = self.peer.register_proforma(&notice).await;

    match &notification {
      NotifyOutcome::Delivered => {
        tracing::info!(number = %proforma.number, "accounting peer notified")
      }
      NotifyOutcome::Rejected { status } => tracing::warn!(
        number = %proforma.number,
        status,
        "accounting peer rejected the proforma notification"
      ),
      NotifyOutcome::Unreachable { reason } => tracing::warn!(
        number = %proforma.number,
        %reason,
        "accounting peer unreachable"
      ),
    }

    Ok(GeneratedProforma { proforma, notification })
  }

  /// Peer-initiated transition: pending proforma to paid, student to
  /// enrolled. A second confirmation of the same proforma is `NotFound`.
  pub async fn confirm_payment(
    &self,
    student_id: StudentId,
    number: &str,
    receipt_number: &str,
  ) -> Result<Confirmation> {
    if number.trim().is_empty() || receipt_number.trim().is_empty() {
      return Err(Error::Validation(
        "proforma number and receipt number are required".into(),
      ));
    }

    let number = ProformaNumber::from(number);
    if !self.store.settle_proforma(student_id, &number, receipt_number).await? {
      return Err(Error::NotFound(format!(
        "no pending proforma {number} for student {student_id}"
      )));
    }

    tracing::info!(
      %number,
      student = %student_id,
      receipt = receipt_number,
      "payment confirmed; student enrolled"
    );

    Ok(Confirmation {
      student_id,
      number,
      receipt_number: receipt_number.to_owned(),
    })
  }

  pub async fn get_proforma(&self, number: &str) -> Result<ProformaDetail> {
    let number = ProformaNumber::from(number);
    self
      .store
      .get_proforma(&number)
      .await?
      .ok_or_else(|| Error::NotFound(format!("proforma {number}")))
  }

  pub async fn list_proformas(&self) -> Result<Vec<ProformaSummary>> {
    Ok(self.store.list_proformas().await?)
  }
}
