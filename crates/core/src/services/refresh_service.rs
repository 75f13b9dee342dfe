use serde::{Deserialize, Serialize};

use crate::models::asset::AssetClass;
use crate::providers::registry::QuoteProviderRegistry;

/// Outcome of one price refresh pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefreshReport {
    /// Distinct symbols attempted
    pub total: usize,

    /// Symbols whose quote was overwritten with a fresh price
    pub updated: usize,

    /// Symbols whose fetch failed; their previous quotes are left untouched
    pub failed: Vec<String>,
}

/// Fetches current prices from the provider registry, best-effort.
///
/// Every failure — network error, unparseable body, unmapped symbol,
/// non-finite price — collapses to "no price", never to a hard error. The
/// caller keeps the last known quote or falls back to the last transaction
/// price at valuation time.
pub struct RefreshService {
    registry: QuoteProviderRegistry,
}

impl RefreshService {
    pub fn new(registry: QuoteProviderRegistry) -> Self {
        Self { registry }
    }

    /// Latest price for one symbol, or `None` when no provider could
    /// deliver one. Providers are tried in registration order; a returned
    /// price must be finite and positive to count.
    pub async fn fetch_latest(
        &self,
        symbol: &str,
        asset_class: AssetClass,
        currency: &str,
    ) -> Option<f64> {
        let providers = self.registry.providers_for(asset_class);
        if providers.is_empty() {
            log::warn!("no quote provider registered for {asset_class}");
            return None;
        }

        for provider in providers {
            match provider.fetch_latest(symbol, currency).await {
                Ok(price) if price.is_finite() && price > 0.0 => return Some(price),
                Ok(price) => {
                    log::warn!(
                        "{} returned unusable price {price} for {symbol}",
                        provider.name()
                    );
                }
                Err(e) => {
                    log::warn!("{} failed for {symbol}: {e}", provider.name());
                }
            }
        }

        None
    }
}
