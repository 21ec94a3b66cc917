use std::time::Duration;
use thiserror::Error;

/// Failures surfaced to the caller of a sale transaction.
///
/// Every variant is local to one transaction attempt. `code()` gives the
/// stable identifier reported on the method channel.
#[derive(Error, Debug, PartialEq)]
pub enum BridgeError {
    #[error("Plugin not attached to an Activity")]
    NoActiveHost,
    #[error("Invalid argument: {0}")]
    Validation(String),
    #[error("Payment app {package} not installed")]
    AppNotInstalled { package: String },
    #[error("Failed to launch payment app: {0}")]
    Launch(String),
    #[error("Failed to decode payment app response: {0}")]
    ResponseDecode(String),
    #[error("Method {0} not implemented")]
    UnsupportedMethod(String),
    #[error("A sale transaction is already in progress")]
    TransactionInProgress,
    #[error("No response from payment app within {0:?}")]
    Timeout(Duration),
    #[error("Host activity detached and did not come back")]
    HostDetached,
    #[error("Transaction cancelled")]
    Cancelled,
}

impl BridgeError {
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::NoActiveHost => "NO_ACTIVITY",
            BridgeError::Validation(_) => "INVALID_ARGUMENT",
            BridgeError::AppNotInstalled { .. } => "APP_NOT_INSTALLED",
            BridgeError::Launch(_) => "SALE_ERROR",
            BridgeError::ResponseDecode(_) => "RESPONSE_ERROR",
            BridgeError::UnsupportedMethod(_) => "NOT_IMPLEMENTED",
            BridgeError::TransactionInProgress => "TRANSACTION_IN_PROGRESS",
            BridgeError::Timeout(_) => "TIMEOUT",
            BridgeError::HostDetached => "HOST_DETACHED",
            BridgeError::Cancelled => "CANCELLED",
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
