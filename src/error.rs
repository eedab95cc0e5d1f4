use thiserror::Error;

/// Failures that abort a scan before or instead of producing per-port
/// results.
///
/// Per-port timeouts and refusals are never errors; they classify into
/// [`PortOutcome`](crate::types::PortOutcome) and the scan continues.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("no ports were supplied to scan")]
    EmptyPortSet,
    #[error("concurrency limit must be positive")]
    InvalidConcurrency,
    #[error("scan already ran; build a new scanner for another pass")]
    AlreadyStarted,
    #[error("failed to resolve hostname to target address {target}")]
    ResolutionFailed {
        target: String,
        #[source]
        source: std::io::Error,
    },
    #[error("resolver found no usable address for target {target}")]
    UnresolvedTarget { target: String },
}
