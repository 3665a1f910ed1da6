//! Audit handler implementation for [`Auditor`].
//!
//! Bridges the HTTP layer (`bucketaudit-http`) with the scoring engine
//! (`bucketaudit-core`) by implementing the [`AuditHandler`] trait.

use std::sync::Arc;

use bucketaudit_core::{Auditor, BucketProbe};
use bucketaudit_http::{AuditFuture, AuditHandler};
use bucketaudit_model::AuditRequest;

/// Wrapper that implements [`AuditHandler`] by delegating to a shared [`Auditor`].
#[derive(Debug)]
pub struct AuditServerHandler<P: BucketProbe>(pub Arc<Auditor<P>>);

impl<P: BucketProbe> Clone for AuditServerHandler<P> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<P: BucketProbe> AuditHandler for AuditServerHandler<P> {
    fn handle_audit(&self, request: AuditRequest) -> AuditFuture {
        let auditor = Arc::clone(&self.0);
        Box::pin(async move { auditor.execute(&request).await })
    }
}
