pub mod chain_reader;
pub mod errors;
pub mod http_client;
pub mod mock_chain;
pub mod mock_http;
pub mod tokens;
pub mod types;

pub use chain_reader::{ChainReader, RpcChainReader, call_contract_method};
pub use errors::SdkError;
pub use http_client::{HttpClient, HttpClientConfig, ReqwestHttpClient};
pub use tokens::{PriceToken, PriceTokenAmount, Token};
pub use types::*;
