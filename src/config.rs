use std::time::Duration;

pub const DEFAULT_PAYMENT_APP_PACKAGE: &str = "com.icici.viz.verifone";
pub const DEFAULT_BASE_REQUEST_CODE: u16 = 101;
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_DETACH_GRACE: Duration = Duration::from_secs(30);

/// Settings for a [`TransactionBridge`](crate::application::bridge::TransactionBridge).
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    /// Package identifier of the payment terminal app.
    pub payment_app_package: String,
    /// First correlation tag handed out; later tags count up from here.
    pub base_request_code: u16,
    /// How long a caller waits for the terminal to return.
    pub response_timeout: Duration,
    /// How long the host may stay detached while a sale is in flight.
    pub detach_grace: Duration,
    /// Number of sales allowed in flight at once.
    pub max_in_flight: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            payment_app_package: DEFAULT_PAYMENT_APP_PACKAGE.to_string(),
            base_request_code: DEFAULT_BASE_REQUEST_CODE,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            detach_grace: DEFAULT_DETACH_GRACE,
            max_in_flight: 1,
        }
    }
}

impl BridgeConfig {
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.payment_app_package = package.into();
        self
    }

    pub fn with_base_request_code(mut self, code: u16) -> Self {
        self.base_request_code = code;
        self
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    pub fn with_detach_grace(mut self, grace: Duration) -> Self {
        self.detach_grace = grace;
        self
    }

    /// Values below one are raised to one.
    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.max_in_flight = max.max(1);
        self
    }
}
