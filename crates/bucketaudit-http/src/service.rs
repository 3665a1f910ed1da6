//! Audit HTTP service implementing the hyper `Service` trait.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use hyper::body::Incoming;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::body::AuditResponseBody;
use crate::dispatch::{AuditHandler, dispatch_audit};
use crate::response::{CONTENT_TYPE, REQUEST_ID_HEADER, error_to_response, json_response};
use crate::router::{Route, resolve_route};

/// Configuration for the audit HTTP service.
#[derive(Debug, Clone)]
pub struct AuditHttpConfig {
    /// Name reported by `/info`.
    pub system_name: String,
    /// Version reported by `/info`.
    pub version: String,
}

impl Default for AuditHttpConfig {
    fn default() -> Self {
        Self {
            system_name: "S3 Security Compliance Scanner".to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

/// Body of `GET /info`.
#[derive(Debug, Serialize)]
struct ServiceInfo<'a> {
    system: &'a str,
    status: &'static str,
    usage: &'static str,
    version: &'a str,
}

/// Hyper `Service` implementation for the audit API.
///
/// Wraps an [`AuditHandler`] and routes incoming requests to it, answering
/// health, info, and CORS preflight requests itself.
#[derive(Debug)]
pub struct AuditHttpService<H: AuditHandler> {
    handler: Arc<H>,
    config: Arc<AuditHttpConfig>,
}

impl<H: AuditHandler> AuditHttpService<H> {
    /// Create a new `AuditHttpService`.
    pub fn new(handler: Arc<H>, config: AuditHttpConfig) -> Self {
        Self {
            handler,
            config: Arc::new(config),
        }
    }
}

impl<H: AuditHandler> Clone for AuditHttpService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            config: Arc::clone(&self.config),
        }
    }
}

impl<H: AuditHandler> hyper::service::Service<http::Request<Incoming>> for AuditHttpService<H> {
    type Response = http::Response<AuditResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let handler = Arc::clone(&self.handler);
        let config = Arc::clone(&self.config);
        let request_id = uuid::Uuid::new_v4().to_string();

        Box::pin(async move {
            // Audit requests carry everything in the query string.
            let (parts, _body) = req.into_parts();
            let response = process_request(&parts, handler.as_ref(), &config, &request_id).await;
            Ok(add_common_headers(response, &request_id))
        })
    }
}

/// Process a single request through routing and dispatch.
pub async fn process_request<H: AuditHandler>(
    parts: &http::request::Parts,
    handler: &H,
    config: &AuditHttpConfig,
    request_id: &str,
) -> http::Response<AuditResponseBody> {
    debug!(
        request_id,
        method = %parts.method,
        uri = %parts.uri,
        "received request"
    );

    if parts.method == http::Method::OPTIONS {
        return preflight_response();
    }

    let route = match resolve_route(&parts.method, &parts.uri) {
        Ok(route) => route,
        Err(err) => {
            debug!(request_id, code = %err.code, "request rejected");
            return error_to_response(&err, request_id);
        }
    };

    let response = match route {
        Route::Health => json_response(&serde_json::json!({ "status": "running" }), request_id),
        Route::Info => json_response(
            &ServiceInfo {
                system: &config.system_name,
                status: "Online",
                usage: "GET /scan?bucket=<name> | GET /?buckets=<a,b> | GET /?filter=<substring>",
                version: &config.version,
            },
            request_id,
        ),
        Route::Audit(request) => match dispatch_audit(handler, request).await {
            Ok(outcome) => json_response(&outcome, request_id),
            Err(err) => {
                warn!(request_id, code = %err.code, error = %err.message, "audit failed");
                error_to_response(&err, request_id)
            }
        },
    };

    info!(
        request_id,
        path = parts.uri.path(),
        status = response.status().as_u16(),
        "request completed"
    );
    response
}

/// Answer a CORS preflight request.
fn preflight_response() -> http::Response<AuditResponseBody> {
    http::Response::builder()
        .status(http::StatusCode::NO_CONTENT)
        .header("access-control-allow-methods", "GET, OPTIONS")
        .header("access-control-allow-headers", "content-type")
        .header("access-control-max-age", "86400")
        .body(AuditResponseBody::empty())
        .expect("static preflight response should be valid")
}

/// Add headers every audit response carries.
fn add_common_headers(
    mut response: http::Response<AuditResponseBody>,
    request_id: &str,
) -> http::Response<AuditResponseBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        headers.entry(REQUEST_ID_HEADER).or_insert(hv);
    }

    headers
        .entry("content-type")
        .or_insert(http::HeaderValue::from_static(CONTENT_TYPE));

    // CORS headers.
    headers.insert(
        "access-control-allow-origin",
        http::HeaderValue::from_static("*"),
    );
    headers
        .entry("access-control-allow-methods")
        .or_insert(http::HeaderValue::from_static("GET"));

    response
}
