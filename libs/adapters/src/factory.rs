use std::sync::Arc;

use amb_core::{AdapterError, Platform, SharedTransport};

use crate::ambassador::Ambassador;
use crate::config::Credentials;
use crate::facebook::FacebookAmbassador;
use crate::line::LineAmbassador;

/// Builds the ambassador for a platform tag such as `"facebook"` or `"line"`.
///
/// ```
/// use amb_adapters::{Credentials, create};
/// use amb_core::{AdapterError, ReqwestTransport};
///
/// let transport = ReqwestTransport::shared(Default::default());
/// let line = create("line", Credentials::new("token"), transport.clone()).unwrap();
/// assert_eq!(line.platform().as_str(), "line");
///
/// let err = create("telegram", Credentials::new("token"), transport).err().unwrap();
/// assert!(matches!(err, AdapterError::UnsupportedPlatform(tag) if tag == "telegram"));
/// ```
pub fn create(
    tag: &str,
    credentials: Credentials,
    transport: SharedTransport,
) -> Result<Arc<dyn Ambassador>, AdapterError> {
    let platform: Platform = tag.parse().inspect_err(|_| {
        tracing::warn!(tag, "no ambassador registered for platform");
    })?;
    Ok(create_for(platform, credentials, transport))
}

pub fn create_for(
    platform: Platform,
    credentials: Credentials,
    transport: SharedTransport,
) -> Arc<dyn Ambassador> {
    tracing::debug!(%platform, "creating ambassador");
    match platform {
        Platform::Facebook => Arc::new(FacebookAmbassador::new(credentials, transport)),
        Platform::Line => Arc::new(LineAmbassador::new(credentials, transport)),
    }
}
