//! Platform ambassadors.
//!
//! An ambassador decodes its platform's webhooks, stages reply fragments and flushes them to the
//! platform's send endpoint through an injected [`amb_core::HttpTransport`]. Callers normally
//! obtain one through [`create`] and talk to it via the [`Ambassador`] trait.

mod ambassador;
mod config;
mod egress;
pub mod facebook;
mod factory;
pub mod line;
mod staging;

pub use ambassador::Ambassador;
pub use config::{ConfigError, Credentials};
pub use facebook::FacebookAmbassador;
pub use factory::{create, create_for};
pub use line::LineAmbassador;
pub use staging::StagingBuffer;
