//! CVGuard Services Layer
//!
//! Network-facing services for the upload pipeline. Today that is the ClamAV
//! daemon client, exposed both directly and as a
//! [`cvguard_processing::VirusScanner`] so callers can plug it into
//! [`cvguard_processing::ValidationPipeline`].

pub mod services;

pub use cvguard_processing::{ValidationPipeline, VirusScanner};
#[cfg(feature = "clamav")]
pub use services::clamav::{ClamAvClient, ClamAvVirusScanner};
#[cfg(feature = "clamav")]
pub use services::build_pipeline;
