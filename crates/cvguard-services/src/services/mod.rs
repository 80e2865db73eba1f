#[cfg(feature = "clamav")]
pub mod clamav;
#[cfg(feature = "clamav")]
pub mod pipeline;

#[cfg(feature = "clamav")]
pub use clamav::{ClamAvClient, ClamAvVirusScanner};
#[cfg(feature = "clamav")]
pub use pipeline::build_pipeline;
