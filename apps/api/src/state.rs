use std::sync::Arc;

use tokio::sync::Mutex;

use crate::controller::OptimizationController;
use crate::rewrite::ResumeRewriter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Rewrite seam. Production: `OpenAiRewriteClient`; tests stub it.
    pub rewriter: Arc<dyn ResumeRewriter>,
    /// The single in-memory optimization session. One submission in flight
    /// at a time; nothing persisted.
    pub controller: Arc<Mutex<OptimizationController>>,
}
