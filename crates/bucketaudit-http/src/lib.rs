//! HTTP service layer for the bucket audit service.
//!
//! This crate turns `GET` requests into audit requests, providing:
//!
//! - **Router**: Resolves path and query string into a [`Route`]
//! - **Handler trait**: Defines the boundary between HTTP and the scoring engine
//! - **Service**: Hyper `Service` implementation with request ids and CORS headers
//! - **Response helpers**: JSON success/error response formatting

pub mod body;
pub mod dispatch;
pub mod response;
pub mod router;
pub mod service;

pub use body::AuditResponseBody;
pub use dispatch::{AuditFuture, AuditHandler, NotImplementedHandler};
pub use router::{Route, resolve_route};
pub use service::{AuditHttpConfig, AuditHttpService};
