//! Prometheus-backed upload metrics.

use drawgate::{DrawingFormat, IngestError, StorageError, UploadMetrics};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use std::time::Duration;

pub const UPLOADS_TOTAL: &str = "drawgate_uploads_total";
pub const UPLOAD_BYTES_TOTAL: &str = "drawgate_upload_bytes_total";
pub const UPLOAD_DURATION_SECONDS: &str = "drawgate_upload_duration_seconds";

/// Forwards gateway events to the `metrics` facade.
#[derive(Debug, Default)]
pub struct PrometheusUploadMetrics;

impl UploadMetrics for PrometheusUploadMetrics {
    fn record_validation(&self, latency: Duration, result: Result<DrawingFormat, &IngestError>) {
        match result {
            Ok(format) => {
                ::metrics::histogram!(UPLOAD_DURATION_SECONDS, "stage" => "validate", "format" => format.extension())
                    .record(latency.as_secs_f64());
            }
            Err(err) => {
                ::metrics::counter!(UPLOADS_TOTAL, "outcome" => err.code()).increment(1);
            }
        }
    }

    fn record_store(&self, latency: Duration, bytes: usize, result: Result<(), &StorageError>) {
        ::metrics::histogram!(UPLOAD_DURATION_SECONDS, "stage" => "store")
            .record(latency.as_secs_f64());
        match result {
            Ok(()) => {
                ::metrics::counter!(UPLOADS_TOTAL, "outcome" => "uploaded").increment(1);
                ::metrics::counter!(UPLOAD_BYTES_TOTAL).increment(bytes as u64);
            }
            Err(_) => {
                ::metrics::counter!(UPLOADS_TOTAL, "outcome" => "STORAGE_ERROR").increment(1);
            }
        }
    }
}

/// Install the global Prometheus recorder and the gateway metrics hook.
pub fn install() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|err| anyhow::anyhow!("failed to install metrics recorder: {err}"))?;
    drawgate::set_upload_metrics(Some(Arc::new(PrometheusUploadMetrics)));
    Ok(handle)
}
