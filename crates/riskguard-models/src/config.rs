use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Top-level configuration for the RiskGuard adapter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RiskGuardConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionBackend {
    Memory,
    Sqlite,
}

/// Configuration for the session store backing the adapter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    pub backend: SessionBackend,
    /// Path to the session database. Only used by the sqlite backend.
    pub sqlite_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::Memory,
            sqlite_path: "data/riskguard_sessions.db".to_string(),
        }
    }
}

/// Limits applied by the built-in rule engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Maximum notional value of a single trade.
    pub max_trade_value: Decimal,
    /// Maximum share of the portfolio (percent) a single holding may reach
    /// after the trade.
    pub max_concentration_pct: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_trade_value: Decimal::new(10_000, 0),
            max_concentration_pct: Decimal::new(25, 0),
        }
    }
}
