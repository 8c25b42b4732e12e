//! One Axum server impersonating every upstream API the exporter talks to.
//!
//! Tests steer the responses at runtime through the shared
//! [`UpstreamBehavior`] handle, e.g. to make the price source fail or to
//! switch Ethermine into its "NO DATA" idle-miner answer.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::json;
use tokio::net::TcpListener;

/// Knobs controlling what the mock upstreams answer.
///
/// Balance values are stored in the unit the real API reports: wei for
/// Etherscan and Ethermine, Gwei for 2miners, USD cents for the price.
pub struct UpstreamBehavior {
    pub fail_price: AtomicBool,
    pub ethermine_no_data: AtomicBool,
    pub etherscan_error: AtomicBool,
    pub price_cents: AtomicU64,
    pub wallet_wei: AtomicU64,
    pub ethermine_wei: AtomicU64,
    pub dashboard_wei: AtomicU64,
    pub two_miners_gwei: AtomicU64,
}

impl Default for UpstreamBehavior {
    fn default() -> Self {
        Self {
            fail_price: AtomicBool::new(false),
            ethermine_no_data: AtomicBool::new(false),
            etherscan_error: AtomicBool::new(false),
            // 1234.56 USD
            price_cents: AtomicU64::new(123_456),
            // 1.5 ETH
            wallet_wei: AtomicU64::new(1_500_000_000_000_000_000),
            // 0.25 ETH
            ethermine_wei: AtomicU64::new(250_000_000_000_000_000),
            // 0.75 ETH
            dashboard_wei: AtomicU64::new(750_000_000_000_000_000),
            // 1.0 ETH
            two_miners_gwei: AtomicU64::new(1_000_000_000),
        }
    }
}

/// Start the mock upstream server on an ephemeral port.
///
/// Returns the behavior handle and the base URL to point every source
/// endpoint at.
pub async fn start_mock_upstreams() -> (Arc<UpstreamBehavior>, String) {
    let behavior = Arc::new(UpstreamBehavior::default());

    let app = Router::new()
        .route("/data/price", get(handle_price))
        .route("/coins/151.json", get(handle_coin_stats))
        .route("/api", get(handle_etherscan))
        .route("/api/accounts/{address}", get(handle_two_miners))
        .route("/miner/{address}/currentStats", get(handle_ethermine_stats))
        .route("/miner/{address}/dashboard", get(handle_ethermine_dashboard))
        .with_state(behavior.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock upstream");
    let address = listener.local_addr().expect("mock upstream address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock upstream server");
    });

    (behavior, format!("http://{address}"))
}

async fn handle_price(State(behavior): State<Arc<UpstreamBehavior>>) -> Response {
    if behavior.fail_price.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "price source down").into_response();
    }
    let usd = behavior.price_cents.load(Ordering::SeqCst) as f64 / 100.0;
    Json(json!({ "USD": usd })).into_response()
}

async fn handle_coin_stats() -> Json<serde_json::Value> {
    Json(json!({
        "id": 151,
        "name": "Ethereum",
        "tag": "ETH",
        "block_time": "13.5",
        "block_reward": 2.0,
        "block_reward24": 2.1,
        "block_reward3": 2.2,
        "block_reward7": 2.3,
        "last_block": 12_345_678,
        "difficulty": 1e15,
        "difficulty24": 2e15,
        "difficulty3": 3e15,
        "difficulty7": 4e15,
        "nethash": 500_000_000_000_000_u64
    }))
}

async fn handle_etherscan(
    State(behavior): State<Arc<UpstreamBehavior>>,
) -> Json<serde_json::Value> {
    if behavior.etherscan_error.load(Ordering::SeqCst) {
        return Json(json!({
            "status": "0",
            "message": "NOTOK",
            "result": "Max rate limit reached"
        }));
    }
    let wei = behavior.wallet_wei.load(Ordering::SeqCst);
    Json(json!({
        "status": "1",
        "message": "OK",
        "result": wei.to_string()
    }))
}

async fn handle_two_miners(
    State(behavior): State<Arc<UpstreamBehavior>>,
) -> Json<serde_json::Value> {
    let gwei = behavior.two_miners_gwei.load(Ordering::SeqCst);
    Json(json!({
        "currentHashrate": 0,
        "stats": { "balance": gwei, "paid": 0 }
    }))
}

async fn handle_ethermine_stats(
    State(behavior): State<Arc<UpstreamBehavior>>,
) -> Json<serde_json::Value> {
    if behavior.ethermine_no_data.load(Ordering::SeqCst) {
        return Json(json!({ "status": "OK", "data": "NO DATA" }));
    }
    let wei = behavior.ethermine_wei.load(Ordering::SeqCst);
    Json(json!({
        "status": "OK",
        "data": { "unpaid": wei, "reportedHashrate": 0 }
    }))
}

async fn handle_ethermine_dashboard(
    State(behavior): State<Arc<UpstreamBehavior>>,
) -> Json<serde_json::Value> {
    let wei = behavior.dashboard_wei.load(Ordering::SeqCst);
    Json(json!({
        "status": "OK",
        "data": {
            "workers": [],
            "currentStatistics": { "unpaid": wei }
        }
    }))
}
