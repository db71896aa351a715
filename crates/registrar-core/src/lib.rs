//! Core types and trait definitions for the school registrar.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! storage backend and the accounting peer are reached through the
//! [`store::RegistrarStore`] and [`peer::AccountingPeer`] traits.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod lifecycle;
pub mod numbering;
pub mod peer;
pub mod pricing;
pub mod proforma;
pub mod store;
pub mod student;
pub mod subject;

pub use error::{Error, Result};
pub use lifecycle::Registrar;
