use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::asset::AssetClass;

/// Trait abstraction for market quote sources.
///
/// One implementation per upstream API (Yahoo Finance, CoinGecko). If an
/// API stops working or changes, only that one implementation is replaced —
/// the rest of the codebase is untouched.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Which asset classes this provider can quote.
    fn supported_classes(&self) -> Vec<AssetClass>;

    /// Latest market price for a symbol. `currency` is honored where the
    /// upstream supports it; Yahoo quotes come back in the listing
    /// currency.
    async fn fetch_latest(&self, symbol: &str, currency: &str) -> Result<f64, CoreError>;
}
