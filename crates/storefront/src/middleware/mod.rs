//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span, see [`request_id::make_span`])
//! 3. Request ID (records the id on that span and echoes it back)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, make_span, request_id_middleware};
