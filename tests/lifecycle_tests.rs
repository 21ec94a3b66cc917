mod common;

use common::{Harness, approved, sale_params};
use std::time::Duration;
use vizpay_bridge::application::bridge::BridgeState;
use vizpay_bridge::config::BridgeConfig;
use vizpay_bridge::domain::response::ReturnedData;
use vizpay_bridge::error::BridgeError;

fn config() -> BridgeConfig {
    BridgeConfig::default()
        .with_response_timeout(Duration::from_secs(120))
        .with_detach_grace(Duration::from_secs(30))
}

#[tokio::test]
async fn test_detached_host_rejects_start() {
    let harness = Harness::attached(config());
    harness.bridge.lifecycle().detach();

    let err = harness.bridge.start_sale(&sale_params()).await.unwrap_err();
    assert_eq!(err, BridgeError::NoActiveHost);
    assert_eq!(harness.bridge.state(), BridgeState::Idle);
    assert!(harness.host.launches().await.is_empty());
}

#[tokio::test]
async fn test_result_claimed_after_reattach() {
    let harness = Harness::attached(config());
    let sale = harness.spawn_sale(sale_params());
    let launch = harness.host.next_launch().await.unwrap();

    harness.bridge.lifecycle().detach();
    harness.bridge.lifecycle().reattach(&harness.dyn_host);

    harness.deliver(
        launch.correlation_tag,
        Some(ReturnedData::from_response(&approved()).unwrap()),
    );
    assert_eq!(sale.await.unwrap().unwrap(), approved());
}

#[tokio::test]
async fn test_result_claimed_while_detached_within_grace() {
    let harness = Harness::attached(config());
    let sale = harness.spawn_sale(sale_params());
    let launch = harness.host.next_launch().await.unwrap();

    harness.bridge.lifecycle().detach();
    assert!(harness.deliver(
        launch.correlation_tag,
        Some(ReturnedData::from_response(&approved()).unwrap()),
    ));
    assert_eq!(sale.await.unwrap().unwrap(), approved());
}

#[tokio::test(start_paused = true)]
async fn test_detach_without_reattach_fails_sale() {
    let harness = Harness::attached(config());
    let sale = harness.spawn_sale(sale_params());
    let launch = harness.host.next_launch().await.unwrap();

    harness.bridge.lifecycle().detach();

    assert_eq!(sale.await.unwrap(), Err(BridgeError::HostDetached));
    assert_eq!(harness.bridge.state(), BridgeState::Idle);
    assert!(!harness.deliver(
        launch.correlation_tag,
        Some(ReturnedData::from_response(&approved()).unwrap()),
    ));
}

#[tokio::test(start_paused = true)]
async fn test_reattach_inside_grace_keeps_sale_alive() {
    let harness = Harness::attached(config());
    let sale = harness.spawn_sale(sale_params());
    let launch = harness.host.next_launch().await.unwrap();

    harness.bridge.lifecycle().detach();
    tokio::time::sleep(Duration::from_secs(10)).await;
    harness.bridge.lifecycle().reattach(&harness.dyn_host);
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert!(!sale.is_finished());
    harness.deliver(
        launch.correlation_tag,
        Some(ReturnedData::from_response(&approved()).unwrap()),
    );
    assert_eq!(sale.await.unwrap().unwrap(), approved());
}

#[tokio::test(start_paused = true)]
async fn test_silent_terminal_times_out() {
    let harness = Harness::attached(config());
    let sale = harness.spawn_sale(sale_params());
    let launch = harness.host.next_launch().await.unwrap();

    assert_eq!(
        sale.await.unwrap(),
        Err(BridgeError::Timeout(Duration::from_secs(120)))
    );
    assert_eq!(harness.bridge.state(), BridgeState::Idle);

    // A result arriving after the timeout belongs to nobody.
    assert!(!harness.deliver(
        launch.correlation_tag,
        Some(ReturnedData::from_response(&approved()).unwrap()),
    ));
}

#[tokio::test(start_paused = true)]
async fn test_response_on_timeout_tick_wins() {
    let harness = Harness::attached(config());
    let sale = harness.spawn_sale(sale_params());
    let launch = harness.host.next_launch().await.unwrap();

    // Fires on the same tick as the sale's response timeout.
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert!(harness.deliver(
        launch.correlation_tag,
        Some(ReturnedData::from_response(&approved()).unwrap()),
    ));

    assert_eq!(sale.await.unwrap().unwrap(), approved());
    assert_eq!(harness.bridge.state(), BridgeState::Idle);
    assert!(!harness.deliver(
        launch.correlation_tag,
        Some(ReturnedData::from_response(&approved()).unwrap()),
    ));
}
