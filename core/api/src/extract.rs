// cobuy/core/api/src/extract.rs

use crate::error::ApiError;
use axum::extract::FromRequest;

/// `axum::Json` whose rejection is reported as an [`ApiError`], so schema
/// failures get the same `{"detail": ...}` body as every other error
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ValidatedJson<T>(pub T);
