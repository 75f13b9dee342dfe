use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::asset::AssetClass;

use super::traits::QuoteProvider;

const BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Symbols this provider can resolve, mapped to CoinGecko coin ids.
///
/// The set is deliberately closed: an unmapped symbol is reported as
/// unavailable instead of guessed, so a typo never values a holding
/// against the wrong coin.
const COIN_IDS: &[(&str, &str)] = &[
    ("BTC", "bitcoin"),
    ("ETH", "ethereum"),
    ("USDT", "tether"),
    ("BNB", "binancecoin"),
    ("SOL", "solana"),
    ("XRP", "ripple"),
    ("USDC", "usd-coin"),
    ("ADA", "cardano"),
    ("DOGE", "dogecoin"),
    ("DOT", "polkadot"),
    ("MATIC", "matic-network"),
    ("LTC", "litecoin"),
    ("AVAX", "avalanche-2"),
    ("LINK", "chainlink"),
    ("UNI", "uniswap"),
    ("ATOM", "cosmos"),
    ("XLM", "stellar"),
    ("XMR", "monero"),
];

/// CoinGecko API provider for cryptocurrency prices.
///
/// - **Free**: No API key required for the simple price endpoint.
/// - **Endpoint**: `/simple/price?ids={id}&vs_currencies={currency}`
pub struct CoinGeckoProvider {
    client: Client,
}

impl CoinGeckoProvider {
    pub fn new() -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(15));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
        }
    }

    /// Resolve a symbol like "BTC" to a CoinGecko id like "bitcoin".
    /// Returns `None` for symbols outside the fixed table.
    #[must_use]
    pub fn coin_id(symbol: &str) -> Option<&'static str> {
        let upper = symbol.trim().to_uppercase();
        COIN_IDS
            .iter()
            .find(|(sym, _)| *sym == upper)
            .map(|(_, id)| *id)
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Response shape: {"bitcoin": {"eur": 57123.0}}
type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl QuoteProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        "CoinGecko"
    }

    fn supported_classes(&self) -> Vec<AssetClass> {
        vec![AssetClass::Crypto]
    }

    async fn fetch_latest(&self, symbol: &str, currency: &str) -> Result<f64, CoreError> {
        let id = Self::coin_id(symbol).ok_or_else(|| CoreError::PriceNotAvailable {
            symbol: symbol.to_string(),
        })?;
        let vs = currency.trim().to_lowercase();
        let url = format!("{BASE_URL}/simple/price?ids={id}&vs_currencies={vs}");

        let resp: SimplePriceResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "CoinGecko".into(),
                message: format!("Failed to parse response for {symbol}: {e}"),
            })?;

        resp.get(id)
            .and_then(|prices| prices.get(&vs))
            .copied()
            .ok_or_else(|| CoreError::PriceNotAvailable {
                symbol: symbol.to_string(),
            })
    }
}
