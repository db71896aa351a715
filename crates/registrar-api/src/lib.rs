//! JSON REST API for the registrar.
//!
//! Exposes an axum [`Router`] backed by a [`Registrar`] over any
//! [`RegistrarStore`] and [`AccountingPeer`]. Wire field names follow the
//! accounting peer's protocol. Tracing, CORS and transport are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", registrar_api::api_router(registrar.clone()))
//! ```

pub mod enrollment;
pub mod error;
pub mod extract;
pub mod proformas;
pub mod students;
pub mod subjects;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, put},
};
use registrar_core::{Registrar, peer::AccountingPeer, store::RegistrarStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `registrar`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, P>(registrar: Arc<Registrar<S, P>>) -> Router<()>
where
  S: RegistrarStore + 'static,
  P: AccountingPeer + 'static,
  registrar_core::Error: From<S::Error>,
{
  Router::new()
    // Students
    .route(
      "/estudiantes",
      get(students::list::<S, P>).post(students::create::<S, P>),
    )
    .route("/estudiantes/sin-proforma", get(students::awaiting::<S, P>))
    .route("/estudiantes/{id}", get(students::get_one::<S, P>))
    // Accounting peer callback
    .route("/estudiantes/{id}/matricular", put(enrollment::enroll::<S, P>))
    // Catalog
    .route("/asignaturas/{curso}", get(subjects::by_course::<S, P>))
    // Proformas
    .route(
      "/proformas",
      get(proformas::list::<S, P>).post(proformas::create::<S, P>),
    )
    .route("/proformas/{numero}", get(proformas::get_one::<S, P>))
    .with_state(registrar)
}
