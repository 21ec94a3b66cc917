use crate::domain::ports::{
    CorrelationTag, EXTRA_DATA, EXTRA_REQUEST_TYPE, HostContext, LaunchRequest, LaunchResolution,
};
use crate::domain::request::{SALE, SalePayload};
use crate::error::{BridgeError, Result};
use tracing::{debug, warn};

/// Proof that a launch was issued for a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchHandle {
    pub package: String,
    pub correlation_tag: CorrelationTag,
}

/// Starts the payment terminal app with an encoded sale.
pub struct ExternalAppLauncher {
    package: String,
}

impl ExternalAppLauncher {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Resolves the terminal app on `host` and launches it for a result.
    ///
    /// The request carries no routing flags; the return event is only
    /// delivered back for a plain launch.
    pub async fn launch(
        &self,
        host: &dyn HostContext,
        payload: &SalePayload,
        correlation_tag: CorrelationTag,
    ) -> Result<LaunchHandle> {
        let target = match host.resolve(&self.package).await {
            LaunchResolution::Launchable(target) => target,
            LaunchResolution::NotFound => {
                warn!(package = %self.package, "payment app not installed");
                return Err(BridgeError::AppNotInstalled {
                    package: self.package.clone(),
                });
            }
        };

        let data = payload.to_json()?;
        debug!(tag = %correlation_tag, request = %data, "sale request");

        let request = LaunchRequest::new(target, correlation_tag)
            .with_extra(EXTRA_REQUEST_TYPE, SALE)
            .with_extra(EXTRA_DATA, data);

        host.start_for_result(request)
            .await
            .map_err(|e| BridgeError::Launch(e.to_string()))?;

        Ok(LaunchHandle {
            package: self.package.clone(),
            correlation_tag,
        })
    }
}
