// cobuy/core/api/src/trace.rs

//! Request correlation ids.
//!
//! Every request carries a [`TraceId`] in its extensions and in the
//! `x-trace-id` response header. A well-formed id sent by the caller is kept,
//! so logs on both sides of the call line up; anything else is replaced.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::Span;

pub const TRACE_ID_HEADER: &str = "x-trace-id";

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// `<millis>-<sequence>-<salt>`, each part lowercase hex
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TraceId {
    millis: u64,
    sequence: u64,
    salt: u16,
}

impl TraceId {
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or_default();

        Self {
            millis,
            sequence: SEQUENCE.fetch_add(1, Ordering::Relaxed),
            salt: rand::random(),
        }
    }

    /// Id sent by the caller, if the header is present and well-formed
    fn from_headers(request: &Request) -> Option<Self> {
        request
            .headers()
            .get(TRACE_ID_HEADER)?
            .to_str()
            .ok()?
            .parse()
            .ok()
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}-{:x}-{:04x}", self.millis, self.sequence, self.salt)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed trace id")]
pub struct MalformedTraceId;

impl FromStr for TraceId {
    type Err = MalformedTraceId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        type Radix<T> = fn(&str, u32) -> Result<T, ParseIntError>;

        fn hex<T>(part: Option<&str>, parse: Radix<T>) -> Result<T, MalformedTraceId> {
            let digits = part.filter(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_hexdigit()));
            parse(digits.ok_or(MalformedTraceId)?, 16).map_err(|_| MalformedTraceId)
        }

        let mut parts = s.splitn(3, '-');
        Ok(Self {
            millis: hex(parts.next(), u64::from_str_radix)?,
            sequence: hex(parts.next(), u64::from_str_radix)?,
            salt: hex(parts.next(), u16::from_str_radix)?,
        })
    }
}

/// Middleware: resolve the request's trace id and echo it on the response
pub async fn propagate_trace_id(mut request: Request, next: Next) -> Response {
    let trace_id = TraceId::from_headers(&request).unwrap_or_else(TraceId::generate);
    request.extensions_mut().insert(trace_id);

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&trace_id.to_string()) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }
    response
}

/// Span factory for `TraceLayer`
pub fn make_request_span(request: &Request) -> Span {
    let trace_id = request
        .extensions()
        .get::<TraceId>()
        .copied()
        .unwrap_or_else(TraceId::generate);

    tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %request.method(),
        uri = %request.uri(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(TraceId::generate(), TraceId::generate());
    }

    #[test]
    fn test_display_parses_back() {
        let id = TraceId::generate();
        assert_eq!(id.to_string().parse::<TraceId>(), Ok(id));
        assert_eq!(
            "18f3a-0-00ff".parse::<TraceId>(),
            Ok(TraceId {
                millis: 0x18f3a,
                sequence: 0,
                salt: 0xff,
            })
        );
    }

    #[test]
    fn test_malformed_ids() {
        for input in ["", "1-2", "1--2", "not-a-trace", "1-2-3-4", "+1-2-3", "1-2-10000"] {
            assert_eq!(input.parse::<TraceId>(), Err(MalformedTraceId), "{input}");
        }
    }
}
