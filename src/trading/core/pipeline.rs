//! 编码流水线
//!
//! `Quoted → Fetching → Validating → (Rejected | Accepted) → Encoded`
//!
//! 每次编码只获取一次新报价；获取失败原样返回，不做重试。

use crate::common::errors::SdkError;
use crate::common::types::EvmEncodeConfig;
use crate::trading::core::rate_validator::{RateTolerance, check_order_amount};
use crate::trading::core::trade::OnChainTrade;
use crate::utils::quote::Quote;
use std::fmt;
use std::future::Future;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Quoted,
    Fetching,
    Validating,
    Rejected,
    Accepted,
    Encoded,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Quoted => "quoted",
            PipelineStage::Fetching => "fetching",
            PipelineStage::Validating => "validating",
            PipelineStage::Rejected => "rejected",
            PipelineStage::Accepted => "accepted",
            PipelineStage::Encoded => "encoded",
        };
        f.write_str(name)
    }
}

/// 一次获取得到的新报价与对应的交易
#[derive(Debug, Clone)]
pub struct FreshQuote {
    pub quote: Quote,
    pub transaction: EvmEncodeConfig,
}

/// `fetch` 是尚未执行的新报价请求，流水线只 await 它一次
pub async fn run_encode_pipeline<Fut>(
    trade: &OnChainTrade,
    tolerance: &RateTolerance,
    fetch: Fut,
) -> Result<EvmEncodeConfig, SdkError>
where
    Fut: Future<Output = Result<FreshQuote, SdkError>>,
{
    let provider = trade.trade_type;
    debug!(%provider, stage = %PipelineStage::Quoted, expected = %trade.to.token_amount());

    debug!(%provider, stage = %PipelineStage::Fetching);
    let fresh = fetch.await.map_err(|e| {
        warn!(%provider, stage = %PipelineStage::Fetching, error = %e, "fresh quote fetch failed");
        e
    })?;

    debug!(
        %provider,
        stage = %PipelineStage::Validating,
        fresh_wei = %fresh.quote.destination_amount_wei,
        min_receive_wei = ?fresh.quote.min_receive_amount_wei,
    );
    if let Err(e) = check_order_amount(trade, &fresh.quote, tolerance) {
        info!(%provider, stage = %PipelineStage::Rejected, "trade must be confirmed with the new rate");
        return Err(e);
    }

    debug!(%provider, stage = %PipelineStage::Accepted);
    info!(%provider, stage = %PipelineStage::Encoded, to = %fresh.transaction.to);
    Ok(fresh.transaction)
}
