// cobuy/core/api/src/lib.rs

//! HTTP surface of the Cobuy recommender: an axum router exposing
//! `POST /recommend`, plus health and banner routes.

pub mod error;
pub mod extract;
pub mod server;
pub mod trace;

pub use error::{ApiError, ErrorResponse};
pub use server::{AppState, HealthResponse, RecommendServer, ServerConfig};
pub use trace::{TraceId, TRACE_ID_HEADER};
