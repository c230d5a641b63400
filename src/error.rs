//! Error types for breaker construction
//!
//! The breaker itself never returns an error at runtime: permission checks
//! express denial through their boolean result, and outcome reports are
//! infallible. The only failure surface is configuration validation at
//! construction time.

use thiserror::Error;

/// Configuration rejected at construction time
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The failure threshold must be at least 1
    #[error("failure_threshold must be positive")]
    ZeroFailureThreshold,

    /// The success threshold must be at least 1
    #[error("success_threshold must be positive")]
    ZeroSuccessThreshold,
}
