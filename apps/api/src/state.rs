use std::sync::Arc;

use crate::config::Config;
use crate::ids::IdGenerator;
use crate::store::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable record store. PostgreSQL when `DATABASE_URL` is set, in-memory otherwise.
    pub store: Arc<dyn ResumeStore>,
    pub ids: Arc<dyn IdGenerator>,
    pub config: Config,
}
