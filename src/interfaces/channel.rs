use crate::application::bridge::TransactionBridge;
use crate::error::BridgeError;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// A call arriving over the structured message channel.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

/// The answer sent back for a [`MethodCall`].
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResult {
    Success(Value),
    Error {
        code: String,
        message: String,
        details: Option<Value>,
    },
    NotImplemented,
}

impl From<BridgeError> for MethodResult {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::UnsupportedMethod(_) => MethodResult::NotImplemented,
            err => MethodResult::Error {
                code: err.code().to_string(),
                message: err.to_string(),
                details: None,
            },
        }
    }
}

/// Dispatches channel calls to the payment bridge.
pub struct PaymentChannel {
    bridge: Arc<TransactionBridge>,
}

impl PaymentChannel {
    pub const NAME: &'static str = "vizpay_flutter";
    pub const GET_PAYMENT_APP_PACKAGE: &'static str = "getPaymentAppPackage";
    pub const START_SALE_TRANSACTION: &'static str = "startSaleTransaction";

    pub fn new(bridge: Arc<TransactionBridge>) -> Self {
        Self { bridge }
    }

    pub async fn handle(&self, call: MethodCall) -> MethodResult {
        debug!(channel = Self::NAME, method = %call.method, "method call");
        match call.method.as_str() {
            Self::GET_PAYMENT_APP_PACKAGE => MethodResult::Success(Value::String(
                self.bridge.config().payment_app_package.clone(),
            )),
            Self::START_SALE_TRANSACTION => {
                match self.bridge.start_sale(&call.arguments).await {
                    Ok(response) => match serde_json::to_value(response) {
                        Ok(value) => MethodResult::Success(value),
                        Err(e) => BridgeError::ResponseDecode(e.to_string()).into(),
                    },
                    Err(e) => e.into(),
                }
            }
            other => BridgeError::UnsupportedMethod(other.to_string()).into(),
        }
    }
}
