use std::sync::Arc;

use kuvertki_core::progress::ProgressStore;

use crate::config::ServerConfig;
use crate::jobs::JobRunner;

/// Shared application state, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub progress: Arc<dyn ProgressStore>,
    pub jobs: Arc<JobRunner>,
}
