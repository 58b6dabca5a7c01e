use crate::config::ServerConfig;
use crate::error::ServerResult;
use drawgate::{IngestConfig, UploadStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Upload directory (shared across requests)
    pub store: Arc<UploadStore>,

    /// Prometheus render handle, present when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState {
    /// Create new server state, creating the upload directory if needed
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = UploadStore::new(config.gateway.storage.clone());
        store.ensure_directory()?;

        Ok(Self {
            config: Arc::new(config),
            store: Arc::new(store),
            metrics: None,
        })
    }

    /// Attach the Prometheus handle used by `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn ingest(&self) -> &IngestConfig {
        &self.config.gateway.ingest
    }
}
