use std::collections::HashMap;

use async_trait::async_trait;
use futures_util::StreamExt;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use riskguard_models::config::EngineConfig;
use riskguard_models::verdict::RiskVerdict;
use riskguard_models::{PORTFOLIO_STATE_KEY, TRADE_PROPOSAL_KEY};

use crate::engine::{EngineEventStream, EngineInput, RiskEngine};
use crate::error::EngineError;
use crate::events::{EngineEvent, RISK_CHECK_RESULT};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Deserialize)]
struct TradeProposal {
    symbol: String,
    side: Side,
    quantity: Decimal,
    price: Decimal,
}

#[derive(Debug, Deserialize, Default)]
struct PortfolioState {
    #[serde(default)]
    total_value: Decimal,
    /// Market value of current positions keyed by symbol.
    #[serde(default)]
    holdings: HashMap<String, Decimal>,
}

#[derive(Debug, Deserialize)]
struct EnginePayload {
    #[serde(rename = "trade_proposal")]
    proposal: TradeProposal,
    #[serde(rename = "portfolio_state", default)]
    portfolio: PortfolioState,
}

fn overflow(symbol: &str) -> EngineError {
    EngineError::InvalidInput(format!(
        "Risk figures for {symbol} overflow the supported numeric range"
    ))
}

/// Deterministic risk checks against configured limits: maximum notional
/// value per trade, and maximum portfolio concentration in one symbol.
pub struct RuleBasedRiskEngine {
    config: EngineConfig,
}

impl RuleBasedRiskEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    fn evaluate(&self, payload: &EnginePayload) -> Result<RiskVerdict, EngineError> {
        let proposal = &payload.proposal;
        let trade_value = proposal
            .quantity
            .checked_mul(proposal.price)
            .ok_or_else(|| overflow(&proposal.symbol))?;

        if trade_value > self.config.max_trade_value {
            return Ok(RiskVerdict::denied(format!(
                "Trade value {trade_value} exceeds the per-trade limit of {}.",
                self.config.max_trade_value
            )));
        }

        if let Side::Buy = proposal.side {
            let current = payload
                .portfolio
                .holdings
                .get(&proposal.symbol)
                .copied()
                .unwrap_or(Decimal::ZERO);
            let projected_position = current
                .checked_add(trade_value)
                .ok_or_else(|| overflow(&proposal.symbol))?;
            let projected_total = payload
                .portfolio
                .total_value
                .checked_add(trade_value)
                .ok_or_else(|| overflow(&proposal.symbol))?;

            if projected_total > Decimal::ZERO {
                let pct = projected_position
                    .checked_mul(Decimal::ONE_HUNDRED)
                    .and_then(|scaled| scaled.checked_div(projected_total))
                    .ok_or_else(|| overflow(&proposal.symbol))?;
                if pct > self.config.max_concentration_pct {
                    return Ok(RiskVerdict::denied(format!(
                        "Position in {} would reach {:.1}% of the portfolio, above the {}% concentration limit.",
                        proposal.symbol, pct, self.config.max_concentration_pct
                    )));
                }
            }
        }

        Ok(RiskVerdict::approved(format!(
            "Trade value {trade_value} is within the per-trade limit of {} and concentration limits.",
            self.config.max_trade_value
        )))
    }
}

#[async_trait]
impl RiskEngine for RuleBasedRiskEngine {
    async fn run(
        &self,
        user_id: &str,
        session_id: &str,
        input: EngineInput,
    ) -> Result<EngineEventStream, EngineError> {
        let payload: EnginePayload = serde_json::from_str(&input.text).map_err(|e| {
            EngineError::InvalidInput(format!(
                "Payload must contain '{TRADE_PROPOSAL_KEY}' and '{PORTFOLIO_STATE_KEY}': {e}"
            ))
        })?;

        debug!(
            user_id,
            session_id,
            symbol = %payload.proposal.symbol,
            "Running rule-based risk evaluation"
        );

        let verdict = self.evaluate(&payload)?;
        let events = vec![
            EngineEvent::text(format!(
                "Evaluating trade proposal for {}",
                payload.proposal.symbol
            )),
            EngineEvent::function_response(RISK_CHECK_RESULT, verdict.to_value()),
        ];

        Ok(futures_util::stream::iter(events.into_iter().map(Ok)).boxed())
    }
}
