use std::sync::Arc;

use cvguard_core::{AvScanConfig, UploadConfig};
use cvguard_processing::ValidationPipeline;

use super::clamav::{ClamAvClient, ClamAvVirusScanner};

/// Assemble the upload pipeline, attaching the ClamAV scanner when enabled.
pub fn build_pipeline(upload: UploadConfig, av: AvScanConfig) -> ValidationPipeline {
    let pipeline = ValidationPipeline::new(upload);
    if !av.enabled {
        tracing::info!("ClamAV scanning disabled");
        return pipeline;
    }

    tracing::info!(
        address = %av.address(),
        fail_closed = av.fail_closed,
        timeout_ms = av.timeout_ms,
        "ClamAV scanning enabled"
    );
    let fail_closed = av.fail_closed;
    let scanner = ClamAvVirusScanner::new(ClamAvClient::new(av));
    pipeline.with_scanner(Arc::new(scanner), fail_closed)
}
