use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::asset::AssetClass;

use super::traits::QuoteProvider;

/// Tickers that Yahoo only lists under a regional exchange suffix.
///
/// When the bare symbol fails, the lookup is retried exactly once with the
/// remapped symbol. Covers the European listings commonly entered without
/// their suffix.
const SUFFIX_REMAP: &[(&str, &str)] = &[
    // Madrid
    ("SAN", "SAN.MC"),
    ("BBVA", "BBVA.MC"),
    ("TEF", "TEF.MC"),
    ("IBE", "IBE.MC"),
    ("ITX", "ITX.MC"),
    ("REP", "REP.MC"),
    ("ACS", "ACS.MC"),
    ("AMS", "AMS.MC"),
    ("CABK", "CABK.MC"),
    ("FER", "FER.MC"),
    ("ELE", "ELE.MC"),
    ("MAP", "MAP.MC"),
    // Amsterdam
    ("ASML", "ASML.AS"),
    ("AD", "AD.AS"),
    ("INGA", "INGA.AS"),
    // Paris
    ("AIR", "AIR.PA"),
    ("MC", "MC.PA"),
    ("OR", "OR.PA"),
    ("TTE", "TTE.PA"),
    // Frankfurt/Xetra
    ("SAP", "SAP.DE"),
    ("SIE", "SIE.DE"),
    ("BAS", "BAS.DE"),
    ("VOW3", "VOW3.DE"),
    // Milan
    ("ENI", "ENI.MI"),
    ("ISP", "ISP.MI"),
    ("ENEL", "ENEL.MI"),
    // London
    ("AZN", "AZN.L"),
    ("SHEL", "SHEL.L"),
    ("HSBA", "HSBA.L"),
];

/// Yahoo Finance API provider for stock and ETF prices.
///
/// - **Free**: No API key required (unofficial public API).
/// - **Coverage**: Global equities, ETFs, indices.
///
/// Uses the `yahoo_finance_api` crate which wraps Yahoo Finance's public
/// endpoints. Prices come back in the listing currency.
///
/// **Note**: Not WASM-compatible (uses native reqwest/tokio connectors).
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new().map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("Failed to create connector: {e}"),
        })?;
        Ok(Self { connector })
    }

    /// Regional-suffix alias for a symbol, if the static table knows one.
    #[must_use]
    pub fn remapped(symbol: &str) -> Option<&'static str> {
        let upper = symbol.trim().to_uppercase();
        SUFFIX_REMAP
            .iter()
            .find(|(sym, _)| *sym == upper)
            .map(|(_, alias)| *alias)
    }

    async fn latest_close(&self, symbol: &str) -> Result<f64, CoreError> {
        let resp = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Failed to fetch latest quote for {symbol}: {e}"),
            })?;

        let quote = resp.last_quote().map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("No quote data for {symbol}: {e}"),
        })?;

        Ok(quote.close)
    }
}

#[async_trait]
impl QuoteProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    fn supported_classes(&self) -> Vec<AssetClass> {
        vec![AssetClass::Stock, AssetClass::Etf]
    }

    async fn fetch_latest(&self, symbol: &str, _currency: &str) -> Result<f64, CoreError> {
        match self.latest_close(symbol).await {
            Ok(price) => Ok(price),
            Err(bare_err) => match Self::remapped(symbol) {
                Some(alias) => {
                    log::debug!("retrying {symbol} as {alias}");
                    self.latest_close(alias).await
                }
                None => Err(bare_err),
            },
        }
    }
}
