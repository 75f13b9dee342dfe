use serde::{Deserialize, Serialize};

/// The category of a tracked asset.
/// Determines which quote provider is asked for market data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    /// Individual equities (AAPL, SAN, etc.) — Yahoo Finance
    Stock,
    /// Exchange-traded funds — Yahoo Finance
    Etf,
    /// Cryptocurrencies (BTC, ETH, etc.) — CoinGecko
    Crypto,
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetClass::Stock => write!(f, "Stock"),
            AssetClass::Etf => write!(f, "ETF"),
            AssetClass::Crypto => write!(f, "Crypto"),
        }
    }
}
