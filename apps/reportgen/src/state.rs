use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::ReportGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Report pipeline. Requests share it read-only; each call owns its own document and output file.
    pub generator: Arc<dyn ReportGenerator>,
}
