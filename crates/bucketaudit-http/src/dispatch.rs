//! Audit handler trait and request dispatch.

use std::future::Future;
use std::pin::Pin;

use bucketaudit_model::{AuditError, AuditOutcome, AuditRequest};

/// Future returned by [`AuditHandler::handle_audit`].
pub type AuditFuture = Pin<Box<dyn Future<Output = Result<AuditOutcome, AuditError>> + Send>>;

/// Trait that the audit business logic must implement.
///
/// The handler receives a parsed [`AuditRequest`] and returns the report or
/// dashboard to serialize. This is the boundary between the HTTP transport
/// and the scoring engine.
pub trait AuditHandler: Send + Sync + 'static {
    /// Run one audit.
    fn handle_audit(&self, request: AuditRequest) -> AuditFuture;
}

/// Dispatch an audit request to the handler.
pub async fn dispatch_audit<H: AuditHandler>(
    handler: &H,
    request: AuditRequest,
) -> Result<AuditOutcome, AuditError> {
    tracing::debug!(kind = request.kind(), "dispatching audit request");
    handler.handle_audit(request).await
}

/// Handler that refuses every audit, for wiring the service without a provider.
#[derive(Debug, Clone, Default)]
pub struct NotImplementedHandler;

impl AuditHandler for NotImplementedHandler {
    fn handle_audit(&self, request: AuditRequest) -> AuditFuture {
        Box::pin(async move {
            Err(AuditError::internal_error(format!(
                "no storage provider configured for {} audits",
                request.kind()
            )))
        })
    }
}
