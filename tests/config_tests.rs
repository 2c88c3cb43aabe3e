//! 配置与 Mock 录制 / 重放测试
//!
//! 修改环境变量的测试串行执行


use serde_json::json;
use serial_test::serial;
use std::sync::Arc;
use swap_router_sdk::common::http_client::{HttpClient, QueryParams};
use swap_router_sdk::common::mock_http::{MockHttpClient, MockMode};
use swap_router_sdk::{BlockchainName, SdkConfig, SdkError};
use test_helpers::WALLET;

const ENV_KEYS: [&str; 6] =
    ["RPC_URL_ETH", "RPC_URL_POLYGON", "ONEINCH_API_KEY", "WALLET_ADDRESS", "HTTPS_PROXY", "MOCK_MODE"];

fn clear_env() {
    for key in ENV_KEYS {
        unsafe { std::env::remove_var(key) };
    }
}

#[test]
#[serial]
fn test_config_from_env() {
    clear_env();
    unsafe {
        std::env::set_var("RPC_URL_ETH", "https://eth.example.org");
        std::env::set_var("RPC_URL_POLYGON", "  ");
        std::env::set_var("ONEINCH_API_KEY", "key-123");
        std::env::set_var("WALLET_ADDRESS", WALLET.to_string());
    }

    let config = SdkConfig::from_env().unwrap();
    assert_eq!(config.rpc_url(BlockchainName::Ethereum), Some("https://eth.example.org"));
    assert_eq!(config.rpc_url(BlockchainName::Polygon), None);
    assert_eq!(config.oneinch_api_key.as_deref(), Some("key-123"));
    assert_eq!(config.wallet_address, Some(WALLET));

    unsafe { std::env::set_var("WALLET_ADDRESS", "not-an-address") };
    assert!(matches!(SdkConfig::from_env(), Err(SdkError::Config(_))));

    clear_env();
    println!("✅ 环境变量配置读取成功");
}

#[test]
#[serial]
fn test_mock_mode_from_env() {
    clear_env();
    assert_eq!(MockMode::from_env(), MockMode::Live);

    unsafe { std::env::set_var("MOCK_MODE", "record") };
    assert_eq!(MockMode::from_env(), MockMode::Record);

    unsafe { std::env::set_var("MOCK_MODE", "replay") };
    assert_eq!(MockMode::from_env(), MockMode::Replay);

    clear_env();
}

#[tokio::test]
async fn test_record_then_replay() {
    let dir = tempfile::tempdir().unwrap();
    let url = "https://aggregator-api.xy.finance/v1/quote";
    let query: QueryParams = vec![("srcChainId".to_string(), "1".to_string())];

    // 录制：内部客户端提供"真实"响应
    let upstream = Arc::new(MockHttpClient::new());
    upstream.on_get("/quote", json!({"success": true, "routes": []}));
    let recorder = MockHttpClient::with_mode(MockMode::Record, dir.path(), Some(upstream.clone()));
    let recorded = recorder.get_json(url, &query, &Vec::new()).await.unwrap();
    assert!(recorder.has_mock_data(url, &query));

    // 重放：不再访问上游
    let replayer = MockHttpClient::with_mode(MockMode::Replay, dir.path(), None);
    let replayed = replayer.get_json(url, &query, &Vec::new()).await.unwrap();
    assert_eq!(recorded, replayed);
    assert_eq!(upstream.request_count("/quote"), 1);

    let missing: QueryParams = vec![("srcChainId".to_string(), "56".to_string())];
    assert!(replayer.get_json(url, &missing, &Vec::new()).await.is_err());
    println!("✅ 录制 / 重放: {}", replayer.generate_file_name(url, &query));
}

#[test]
fn test_sdk_new_builds_live_clients() {
    let config = SdkConfig::default()
        .with_rpc_url(BlockchainName::Ethereum, "https://eth.example.org")
        .with_http_timeout_millis(5_000);
    let sdk = swap_router_sdk::SwapSdk::new(config).unwrap();
    assert_eq!(sdk.config().http_timeout_millis, 5_000);
    assert!(!sdk.registry().on_chain_providers_for(BlockchainName::Ethereum).is_empty());
}

/// 真实 API 报价，需要网络：`cargo test --features live-test`
#[tokio::test]
#[cfg_attr(not(feature = "live-test"), ignore)]
async fn test_live_xy_quote() {
    dotenvy::dotenv().ok();
    let sdk = swap_router_sdk::SwapSdk::new(SdkConfig::from_env().unwrap()).unwrap();

    let result = sdk
        .calculate(
            swap_router_sdk::OnChainTradeType::XyDex,
            &test_helpers::thousand_usdc(),
            &test_helpers::price_token(test_helpers::dai()),
            &swap_router_sdk::OnChainCalculationOptions::default(),
        )
        .await;
    match result.into_result() {
        Ok(Some(trade)) => println!("✅ XY 报价: {} DAI", trade.to.token_amount()),
        Ok(None) => println!("ℹ️ XY 没有路径"),
        Err(SdkError::ApproveNeeded { spender }) => println!("ℹ️ 需要先授权 {spender}"),
        Err(e) => panic!("XY 报价失败: {e}"),
    }
}
