//! Traits for the upload pipeline.

use async_trait::async_trait;
use cvguard_core::AvScanResult;

/// External virus scanner (e.g. ClamAV). Implemented by the services crate.
///
/// Implementations never fail: transport problems come back as an
/// unavailable [`AvScanResult`].
#[async_trait]
pub trait VirusScanner: Send + Sync {
    async fn scan(&self, data: &[u8]) -> AvScanResult;
}
