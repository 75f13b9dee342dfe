use crate::models::asset::AssetClass;

use super::coingecko::CoinGeckoProvider;
use super::traits::QuoteProvider;
#[cfg(not(target_arch = "wasm32"))]
use super::yahoo::YahooFinanceProvider;

/// Registry of all available quote providers.
///
/// Routes requests to the correct provider based on [`AssetClass`]. New
/// providers can be added without modifying existing code.
pub struct QuoteProviderRegistry {
    providers: Vec<Box<dyn QuoteProvider>>,
}

impl QuoteProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a registry with all default providers pre-configured.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        // CoinGecko — crypto, no API key needed
        registry.register(Box::new(CoinGeckoProvider::new()));

        // Yahoo Finance — stocks and ETFs, no API key needed.
        // Not available on WASM (uses native reqwest/tokio connectors).
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Ok(yahoo) = YahooFinanceProvider::new() {
                registry.register(Box::new(yahoo));
            }
        }

        registry
    }

    /// Register a new quote provider.
    pub fn register(&mut self, provider: Box<dyn QuoteProvider>) {
        self.providers.push(provider);
    }

    /// Find the first provider that supports the given asset class.
    pub fn provider_for(&self, asset_class: AssetClass) -> Option<&dyn QuoteProvider> {
        self.providers
            .iter()
            .find(|p| p.supported_classes().contains(&asset_class))
            .map(|p| p.as_ref())
    }

    /// All providers that support the given asset class, in registration
    /// order. Used for fallback: if the first provider fails, try the next.
    pub fn providers_for(&self, asset_class: AssetClass) -> Vec<&dyn QuoteProvider> {
        self.providers
            .iter()
            .filter(|p| p.supported_classes().contains(&asset_class))
            .map(|p| p.as_ref())
            .collect()
    }
}

impl Default for QuoteProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
