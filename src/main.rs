use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result, miette};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use vizpay_bridge::application::bridge::TransactionBridge;
use vizpay_bridge::config::{BridgeConfig, DEFAULT_PAYMENT_APP_PACKAGE};
use vizpay_bridge::domain::ports::{ActivityResult, HostContext};
use vizpay_bridge::domain::response::{ReturnedData, TransactionResponse};
use vizpay_bridge::infrastructure::simulated::SimulatedHost;
use vizpay_bridge::interfaces::channel::{MethodCall, MethodResult, PaymentChannel};
use vizpay_bridge::telemetry::init_tracing;

/// How the simulated payment terminal behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Terminal {
    Approve,
    Decline,
    NotInstalled,
    Silent,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Sale amount, e.g. 100.00
    #[arg(long)]
    amount: String,

    #[arg(long)]
    bill_number: String,

    #[arg(long)]
    source_id: String,

    #[arg(long)]
    tip_amount: Option<String>,

    #[arg(long, default_value = "1")]
    print_flag: String,

    /// Package of the payment terminal app.
    #[arg(long, env = "VIZPAY_APP_PACKAGE", default_value = DEFAULT_PAYMENT_APP_PACKAGE)]
    package: String,

    #[arg(long, env = "VIZPAY_BASE_REQUEST_CODE", default_value_t = 101)]
    base_request_code: u16,

    /// Seconds to wait for the terminal to return.
    #[arg(long, env = "VIZPAY_TIMEOUT_SECS", default_value_t = 120)]
    timeout_secs: u64,

    /// Seconds the host may stay detached during a sale.
    #[arg(long, env = "VIZPAY_DETACH_GRACE_SECS", default_value_t = 30)]
    detach_grace_secs: u64,

    /// Sales allowed in flight at once.
    #[arg(long, env = "VIZPAY_MAX_IN_FLIGHT", default_value_t = 1)]
    max_in_flight: usize,

    #[arg(long, value_enum, default_value_t = Terminal::Approve)]
    terminal: Terminal,

    #[arg(long, env = "VIZPAY_LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = BridgeConfig::default()
        .with_package(cli.package.clone())
        .with_base_request_code(cli.base_request_code)
        .with_response_timeout(Duration::from_secs(cli.timeout_secs))
        .with_detach_grace(Duration::from_secs(cli.detach_grace_secs))
        .with_max_in_flight(cli.max_in_flight);
    let bridge = Arc::new(TransactionBridge::new(config));

    let host = Arc::new(SimulatedHost::new());
    if cli.terminal != Terminal::NotInstalled {
        host.install(&cli.package).await;
    }
    let dyn_host: Arc<dyn HostContext> = host.clone();
    bridge.lifecycle().attach(&dyn_host);

    // Plays the terminal: answers each launch with the scripted outcome.
    let terminal = cli.terminal;
    tokio::spawn({
        let bridge = bridge.clone();
        let host = host.clone();
        async move {
            while let Some(launch) = host.next_launch().await {
                let Some(response) = scripted_response(terminal) else {
                    continue;
                };
                let data = ReturnedData::from_response(&response).ok();
                bridge.on_activity_result(ActivityResult {
                    request_code: launch.correlation_tag,
                    result_code: ActivityResult::RESULT_OK,
                    data,
                });
            }
        }
    });

    let mut arguments = json!({
        "amount": cli.amount,
        "billNumber": cli.bill_number,
        "sourceId": cli.source_id,
        "printFlag": cli.print_flag,
    });
    if let Some(tip) = cli.tip_amount {
        arguments["tipAmount"] = json!(tip);
    }

    let channel = PaymentChannel::new(bridge);
    let call = MethodCall::new(PaymentChannel::START_SALE_TRANSACTION, arguments);
    match channel.handle(call).await {
        MethodResult::Success(value) => {
            println!("{}", serde_json::to_string(&value).into_diagnostic()?);
            Ok(())
        }
        MethodResult::Error { code, message, .. } => Err(miette!("{code}: {message}")),
        MethodResult::NotImplemented => Err(miette!("NOT_IMPLEMENTED")),
    }
}

fn scripted_response(terminal: Terminal) -> Option<TransactionResponse> {
    let (status_code, status_message) = match terminal {
        Terminal::Approve => ("00", "Approved"),
        Terminal::Decline => ("05", "Declined"),
        Terminal::NotInstalled | Terminal::Silent => return None,
    };
    Some(TransactionResponse {
        response_type: "SALE".to_string(),
        status_code: status_code.to_string(),
        status_message: status_message.to_string(),
        receipt_data: String::new(),
    })
}
