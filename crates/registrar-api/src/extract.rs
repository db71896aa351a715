//! Request extractors whose rejections render as [`ApiError`].
//!
//! axum's own `Json` and `Path` reject with plain-text 415/422/400
//! responses; these wrappers route every failure through the
//! `{"error": ...}` body instead.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// A JSON request body. Any rejection is a 400.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Typed path parameters. Any rejection is a 400.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);
