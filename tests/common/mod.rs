#![allow(dead_code)]

use serde_json::{Value, json};
use std::sync::Arc;
use tokio::task::JoinHandle;
use vizpay_bridge::application::bridge::TransactionBridge;
use vizpay_bridge::config::BridgeConfig;
use vizpay_bridge::domain::ports::{ActivityResult, CorrelationTag, HostContext};
use vizpay_bridge::domain::response::{ReturnedData, TransactionResponse};
use vizpay_bridge::error::Result;
use vizpay_bridge::infrastructure::simulated::SimulatedHost;

pub const PACKAGE: &str = "com.icici.viz.verifone";

pub struct Harness {
    pub bridge: Arc<TransactionBridge>,
    pub host: Arc<SimulatedHost>,
    pub dyn_host: Arc<dyn HostContext>,
}

impl Harness {
    /// A bridge attached to a host with the terminal app installed.
    pub fn attached(config: BridgeConfig) -> Self {
        let bridge = Arc::new(TransactionBridge::new(config));
        let host = Arc::new(SimulatedHost::with_installed(PACKAGE));
        let dyn_host: Arc<dyn HostContext> = host.clone();
        bridge.lifecycle().attach(&dyn_host);
        Self {
            bridge,
            host,
            dyn_host,
        }
    }

    pub fn spawn_sale(&self, params: Value) -> JoinHandle<Result<TransactionResponse>> {
        let bridge = self.bridge.clone();
        tokio::spawn(async move { bridge.start_sale(&params).await })
    }

    pub fn deliver(&self, tag: CorrelationTag, data: Option<ReturnedData>) -> bool {
        self.bridge.on_activity_result(ActivityResult {
            request_code: tag,
            result_code: ActivityResult::RESULT_OK,
            data,
        })
    }
}

pub fn sale_params() -> Value {
    json!({
        "amount": "100.00",
        "billNumber": "B1",
        "sourceId": "S1",
        "printFlag": "1",
    })
}

pub fn approved() -> TransactionResponse {
    TransactionResponse {
        response_type: "SALE".to_string(),
        status_code: "00".to_string(),
        status_message: "Approved".to_string(),
        receipt_data: "MERCHANT COPY\nAMT 100.00".to_string(),
    }
}
