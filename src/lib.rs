//! Circuit Guard: a pure-logic circuit breaker primitive
//!
//! # Overview
//!
//! A [`CircuitBreaker`] wraps a call site that talks to a potentially failing
//! downstream (a remote service, a database, a device) and protects the
//! caller from cascading failures. It tracks recent call outcomes and gates
//! whether a new attempt may proceed:
//!
//! - **Closed**: normal operation, calls permitted, failures counted
//! - **Open**: calls rejected outright while the downstream cools off
//! - **HalfOpen**: trial period, probe calls permitted to test recovery
//!
//! The breaker never runs the protected operation itself. Callers ask
//! [`CircuitBreaker::acquire_permission`] before attempting the call and
//! report the outcome back with [`CircuitBreaker::on_success`] or
//! [`CircuitBreaker::on_failure`].
//!
//! # Key Principles
//!
//! This crate is **pure logic** with zero knowledge of:
//! - What the protected call does (no execution, no retries, no backoff)
//! - Network protocols or storage systems
//! - Application-specific concerns
//!
//! The only external input is time, and even that is injectable: see
//! [`clock::Clock`] for swapping the wall clock out for a deterministic one
//! in tests.
//!
//! # Usage Example
//!
//! ```
//! use circuit_guard::{BreakerConfig, BreakerState, CircuitBreaker};
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), circuit_guard::ConfigError> {
//! let breaker = CircuitBreaker::new(BreakerConfig {
//!     failure_threshold: 5,
//!     success_threshold: 2,
//!     interval: Duration::from_secs(30),
//! })?;
//!
//! if breaker.acquire_permission() {
//!     match do_request() {
//!         Ok(_) => breaker.on_success(),
//!         Err(_) => breaker.on_failure(),
//!     }
//! } else {
//!     // Fail fast; the downstream is cooling off.
//!     assert_eq!(breaker.current_state(), BreakerState::Open);
//! }
//! # Ok(())
//! # }
//! # fn do_request() -> Result<(), ()> { Ok(()) }
//! ```

pub mod breaker;
pub mod clock;
pub mod error;

// Re-export main types for convenience
pub use breaker::{BreakerConfig, BreakerState, CircuitBreaker};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::ConfigError;

/// Prelude module for convenient imports
///
/// # Example
/// ```
/// use circuit_guard::prelude::*;
/// ```
pub mod prelude {
    pub use super::breaker::{BreakerConfig, BreakerState, CircuitBreaker};
    pub use super::clock::{Clock, SystemClock};
    pub use super::error::ConfigError;
}
