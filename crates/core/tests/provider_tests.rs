// ═══════════════════════════════════════════════════════════════════
// Provider Tests — Registry routing, CoinGecko symbol table,
// Yahoo suffix remap
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;

use portfolio_tracker_core::errors::CoreError;
use portfolio_tracker_core::models::asset::AssetClass;
use portfolio_tracker_core::providers::coingecko::CoinGeckoProvider;
use portfolio_tracker_core::providers::registry::QuoteProviderRegistry;
use portfolio_tracker_core::providers::traits::QuoteProvider;
use portfolio_tracker_core::providers::yahoo::YahooFinanceProvider;

// ═══════════════════════════════════════════════════════════════════
//  Registry routing
// ═══════════════════════════════════════════════════════════════════

struct StubProvider {
    name: &'static str,
    classes: Vec<AssetClass>,
}

#[async_trait]
impl QuoteProvider for StubProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn supported_classes(&self) -> Vec<AssetClass> {
        self.classes.clone()
    }

    async fn fetch_latest(&self, _symbol: &str, _currency: &str) -> Result<f64, CoreError> {
        Ok(1.0)
    }
}

mod registry {
    use super::*;

    #[test]
    fn empty_registry_has_no_providers() {
        let registry = QuoteProviderRegistry::new();
        assert!(registry.provider_for(AssetClass::Stock).is_none());
        assert!(registry.providers_for(AssetClass::Crypto).is_empty());
    }

    #[test]
    fn routes_by_asset_class() {
        let mut registry = QuoteProviderRegistry::new();
        registry.register(Box::new(StubProvider {
            name: "crypto-only",
            classes: vec![AssetClass::Crypto],
        }));
        registry.register(Box::new(StubProvider {
            name: "equities",
            classes: vec![AssetClass::Stock, AssetClass::Etf],
        }));

        assert_eq!(
            registry.provider_for(AssetClass::Crypto).unwrap().name(),
            "crypto-only"
        );
        assert_eq!(
            registry.provider_for(AssetClass::Stock).unwrap().name(),
            "equities"
        );
        assert_eq!(
            registry.provider_for(AssetClass::Etf).unwrap().name(),
            "equities"
        );
    }

    #[test]
    fn fallback_order_follows_registration_order() {
        let mut registry = QuoteProviderRegistry::new();
        registry.register(Box::new(StubProvider {
            name: "primary",
            classes: vec![AssetClass::Stock],
        }));
        registry.register(Box::new(StubProvider {
            name: "secondary",
            classes: vec![AssetClass::Stock],
        }));

        let names: Vec<&str> = registry
            .providers_for(AssetClass::Stock)
            .iter()
            .map(|p| p.name())
            .collect();
        assert_eq!(names, vec!["primary", "secondary"]);
    }

    #[test]
    fn default_registry_quotes_crypto() {
        let registry = QuoteProviderRegistry::with_defaults();
        assert!(registry.provider_for(AssetClass::Crypto).is_some());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  CoinGecko symbol table
// ═══════════════════════════════════════════════════════════════════

mod coingecko {
    use super::*;

    #[test]
    fn maps_known_symbols() {
        assert_eq!(CoinGeckoProvider::coin_id("BTC"), Some("bitcoin"));
        assert_eq!(CoinGeckoProvider::coin_id("ETH"), Some("ethereum"));
        assert_eq!(CoinGeckoProvider::coin_id("ADA"), Some("cardano"));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(CoinGeckoProvider::coin_id("btc"), Some("bitcoin"));
        assert_eq!(CoinGeckoProvider::coin_id(" sol "), Some("solana"));
    }

    #[test]
    fn unmapped_symbols_are_unresolvable() {
        assert_eq!(CoinGeckoProvider::coin_id("NOTACOIN"), None);
        assert_eq!(CoinGeckoProvider::coin_id(""), None);
    }

    #[test]
    fn supports_only_crypto() {
        let provider = CoinGeckoProvider::new();
        assert_eq!(provider.supported_classes(), vec![AssetClass::Crypto]);
        assert_eq!(provider.name(), "CoinGecko");
    }

    #[tokio::test]
    async fn unmapped_symbol_fetch_fails_without_network() {
        // Resolution happens before any request is made.
        let provider = CoinGeckoProvider::new();
        let err = provider.fetch_latest("NOTACOIN", "EUR").await.unwrap_err();
        assert!(matches!(err, CoreError::PriceNotAvailable { .. }));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Yahoo suffix remap
// ═══════════════════════════════════════════════════════════════════

mod yahoo {
    use super::*;

    #[test]
    fn remaps_regional_listings() {
        assert_eq!(YahooFinanceProvider::remapped("SAN"), Some("SAN.MC"));
        assert_eq!(YahooFinanceProvider::remapped("SAP"), Some("SAP.DE"));
        assert_eq!(YahooFinanceProvider::remapped("ASML"), Some("ASML.AS"));
        assert_eq!(YahooFinanceProvider::remapped("AZN"), Some("AZN.L"));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(YahooFinanceProvider::remapped("san"), Some("SAN.MC"));
        assert_eq!(YahooFinanceProvider::remapped(" tef "), Some("TEF.MC"));
    }

    #[test]
    fn us_listings_have_no_remap() {
        assert_eq!(YahooFinanceProvider::remapped("AAPL"), None);
        assert_eq!(YahooFinanceProvider::remapped("MSFT"), None);
    }

    #[test]
    fn supports_stocks_and_etfs() {
        if let Ok(provider) = YahooFinanceProvider::new() {
            assert_eq!(
                provider.supported_classes(),
                vec![AssetClass::Stock, AssetClass::Etf]
            );
            assert_eq!(provider.name(), "Yahoo Finance");
        }
    }
}
