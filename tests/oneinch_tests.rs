//! 1inch 计算与编码测试


use serde_json::{Value, json};
use swap_router_sdk::{
    EncodeTransactionOptions, OnChainCalculationOptions, OnChainTradeType, SdkConfig, SdkError,
};
use test_helpers::*;

const SPENDER: &str = "0x1111111254EEB25477B68fb85Ed929f73A960582";

fn tokens_response() -> Value {
    json!({
        "tokens": {
            "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48": {"symbol": "USDC", "decimals": 6},
            "0x6b175474e89094c44da98b954eedeac495271d0f": {"symbol": "DAI", "decimals": 18},
            "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee": {"symbol": "ETH", "decimals": 18}
        }
    })
}

fn direct_protocols() -> Value {
    json!([[[{
        "name": "UNISWAP_V3",
        "part": 100,
        "fromTokenAddress": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
        "toTokenAddress": "0x6b175474e89094c44da98b954eedeac495271d0f"
    }]]])
}

fn mock_listing(http: &swap_router_sdk::common::mock_http::MockHttpClient) {
    http.on_get("/1/tokens", tokens_response());
    http.on_get("/1/approve/spender", json!({"address": SPENDER}));
}

#[tokio::test]
async fn test_oneinch_unlisted_token_is_unsupported() {
    let (sdk, http, _) = create_test_sdk();
    mock_listing(&http);

    let unlisted = swap_router_sdk::Token::new(
        swap_router_sdk::BlockchainName::Ethereum,
        alloy_primitives::Address::repeat_byte(0x42),
        18,
        "NOPE",
        "Unlisted",
    );
    let result = sdk
        .calculate(OnChainTradeType::Oneinch, &thousand_usdc(), &price_token(unlisted), &OnChainCalculationOptions::default())
        .await;

    let err = result.error().expect("unlisted token fails");
    assert!(matches!(err, SdkError::UnsupportedPair { .. }), "unexpected error: {err}");
    assert_eq!(http.request_count("/quote"), 0);
    println!("✅ 未上架代币: {err}");
}

#[tokio::test]
async fn test_oneinch_calculate_and_encode() {
    let config = SdkConfig::default().with_oneinch_api("https://api.1inch.test/swap/v5.2", Some("secret".to_string()));
    let (sdk, http, _) = create_test_sdk_with(config);
    mock_listing(&http);
    http.on_get("/1/quote", json!({"toAmount": ether(999).to_string(), "protocols": direct_protocols(), "gas": 150000}));
    http.on_get(
        "/1/swap",
        json!({
            "toAmount": ether(1001).to_string(),
            "protocols": direct_protocols(),
            "tx": {"to": SPENDER, "data": "0x12aa3caf", "value": "0", "gas": 210000, "gasPrice": "30000000000"}
        }),
    );

    let trade = sdk
        .calculate(OnChainTradeType::Oneinch, &thousand_usdc(), &price_token(dai()), &OnChainCalculationOptions::default())
        .await
        .into_trade()
        .expect("1inch trade");
    assert_eq!(trade.to.wei_amount, ether(999));
    assert_eq!(trade.path.len(), 2);
    assert_eq!(trade.contract_address.to_string(), SPENDER);

    let quote_request = http.last_request("/1/quote").unwrap();
    assert!(quote_request.headers.contains(&("Authorization".to_string(), "Bearer secret".to_string())));

    let tx = trade.encode(&EncodeTransactionOptions::new(WALLET)).await.unwrap();
    assert_eq!(tx.gas, Some(alloy_primitives::U256::from(210_000u64)));
    assert_eq!(tx.gas_price, Some(alloy_primitives::U256::from(30_000_000_000u64)));

    let swap_request = http.last_request("/1/swap").unwrap();
    assert_eq!(swap_request.query_value("disableEstimate"), Some("false"));
    assert_eq!(swap_request.query_value("from"), Some(WALLET.to_string().as_str()));

    // 代币列表与授权合约只请求一次
    sdk.calculate(OnChainTradeType::Oneinch, &thousand_usdc(), &price_token(dai()), &OnChainCalculationOptions::default())
        .await;
    assert_eq!(http.request_count("/1/tokens"), 1);
    assert_eq!(http.request_count("/1/approve/spender"), 1);
}

#[tokio::test]
async fn test_oneinch_zero_output_is_no_route() {
    let (sdk, http, _) = create_test_sdk();
    mock_listing(&http);
    http.on_get("/1/quote", json!({"toAmount": "0", "protocols": []}));

    let result = sdk
        .calculate(OnChainTradeType::Oneinch, &thousand_usdc(), &price_token(dai()), &OnChainCalculationOptions::default())
        .await;
    assert!(matches!(result, swap_router_sdk::CalculationResult::NoRoute { .. }));
}
