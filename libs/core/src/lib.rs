//! Ambassador core contracts and value types.
//!
//! This crate exposes the canonical message model produced by every inbound decoder, the generic
//! carousel abstraction consumed by the outbound encoders, the error taxonomy shared across the
//! adapters and the HTTP transport seam used for dispatch.
pub mod carousel;
pub mod errors;
#[cfg(feature = "testkit")]
pub mod testkit;
pub mod transport;
pub mod types;

pub use carousel::*;
pub use errors::*;
pub use transport::*;
pub use types::*;

/// Returns the semantic version advertised by this crate.
///
/// ```
/// assert_eq!(amb_core::version(), "0.1.0");
/// ```
pub fn version() -> &'static str {
    "0.1.0"
}
