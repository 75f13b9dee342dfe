pub mod commands;
pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::NaiveDate;
use std::collections::HashMap;

use models::{
    asset::AssetClass,
    dividend::{Dividend, DividendDraft},
    ledger::Backup,
    settings::Settings,
    summary::{AssetAggregate, DividendSummary, PortfolioReport, PortfolioTotals, RealizedGain},
    transaction::{Transaction, TransactionDraft},
};
use providers::registry::QuoteProviderRegistry;
use services::{
    refresh_service::{RefreshReport, RefreshService},
    valuation_engine::ValuationEngine,
};
use storage::store::RecordStore;

use errors::CoreError;

/// Main entry point for the Portfolio Tracker core library.
///
/// Holds an explicitly injected [`RecordStore`] plus the services that
/// operate on it. Every mutation goes through the store; every summary is
/// a full recompute over the complete record set.
#[must_use]
pub struct PortfolioTracker {
    store: RecordStore,
    valuation: ValuationEngine,
    refresh: RefreshService,
}

impl std::fmt::Debug for PortfolioTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioTracker")
            .field("transactions", &self.store.transactions().len())
            .field("dividends", &self.store.dividends().len())
            .field("settings", self.store.settings())
            .field("dirty", &self.store.has_unsaved_changes())
            .finish()
    }
}

impl PortfolioTracker {
    /// Wrap a record store, using the default quote providers.
    pub fn new(store: RecordStore) -> Self {
        Self::with_registry(store, QuoteProviderRegistry::with_defaults())
    }

    /// Wrap a record store with a custom provider registry
    /// (used by tests to inject mock providers).
    pub fn with_registry(store: RecordStore, registry: QuoteProviderRegistry) -> Self {
        Self {
            store,
            valuation: ValuationEngine::new(),
            refresh: RefreshService::new(registry),
        }
    }

    // ── Transactions ────────────────────────────────────────────────

    /// Record a buy/sell transaction. Returns its assigned id.
    pub fn add_transaction(&mut self, draft: TransactionDraft) -> Result<u64, CoreError> {
        self.store.add_transaction(draft)
    }

    /// Update an existing transaction by its id.
    pub fn update_transaction(&mut self, id: u64, draft: TransactionDraft) -> Result<(), CoreError> {
        self.store.update_transaction(id, draft)
    }

    /// Remove a transaction by its id. Returns the removed record.
    pub fn remove_transaction(&mut self, id: u64) -> Result<Transaction, CoreError> {
        self.store.remove_transaction(id)
    }

    /// Get a single transaction by its id.
    #[must_use]
    pub fn get_transaction(&self, id: u64) -> Option<&Transaction> {
        self.store.transaction(id)
    }

    /// All transactions, in entry order.
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        self.store.transactions()
    }

    /// Transactions for one symbol (case-insensitive), in entry order.
    #[must_use]
    pub fn transactions_for_symbol(&self, symbol: &str) -> Vec<&Transaction> {
        let upper = symbol.trim().to_uppercase();
        self.store
            .transactions()
            .iter()
            .filter(|tx| tx.symbol == upper)
            .collect()
    }

    /// Transactions filtered by asset class (e.g., show all crypto trades).
    #[must_use]
    pub fn transactions_by_class(&self, asset_class: AssetClass) -> Vec<&Transaction> {
        self.store
            .transactions()
            .iter()
            .filter(|tx| tx.asset_class == asset_class)
            .collect()
    }

    // ── Dividends ───────────────────────────────────────────────────

    /// Record a dividend receipt. A draft without an explicit share count
    /// gets one reconstructed from transaction history as of the payment
    /// date. Returns the assigned id.
    pub fn add_dividend(&mut self, draft: DividendDraft) -> Result<u64, CoreError> {
        self.store.add_dividend(draft)
    }

    /// Update an existing dividend by its id.
    pub fn update_dividend(&mut self, id: u64, draft: DividendDraft) -> Result<(), CoreError> {
        self.store.update_dividend(id, draft)
    }

    /// Remove a dividend by its id. Returns the removed record.
    pub fn remove_dividend(&mut self, id: u64) -> Result<Dividend, CoreError> {
        self.store.remove_dividend(id)
    }

    /// Get a single dividend by its id.
    #[must_use]
    pub fn get_dividend(&self, id: u64) -> Option<&Dividend> {
        self.store.dividend(id)
    }

    /// All dividends, in entry order.
    #[must_use]
    pub fn dividends(&self) -> &[Dividend] {
        self.store.dividends()
    }

    /// Net units of `symbol` held on `date` — what a dividend entry form
    /// shows as the entitled share count.
    #[must_use]
    pub fn entitled_shares(&self, symbol: &str, date: NaiveDate) -> f64 {
        self.valuation
            .shares_held_on(self.store.transactions(), symbol, date)
    }

    // ── Prices ──────────────────────────────────────────────────────

    /// Manually set the current price for a symbol.
    pub fn set_manual_price(&mut self, symbol: &str, price: f64) -> Result<(), CoreError> {
        self.store.set_quote(symbol, price)
    }

    /// Last known price for a symbol, if any.
    #[must_use]
    pub fn quote(&self, symbol: &str) -> Option<f64> {
        self.store.quote(symbol)
    }

    /// Refresh current prices for every symbol in the ledger, one awaited
    /// fetch at a time. Failures are collapsed to "no price" and reported
    /// in the returned summary; the previous quotes survive.
    pub async fn refresh_prices(&mut self) -> RefreshReport {
        let currency = self.store.settings().reporting_currency.clone();
        let symbols = self.store.ledger().distinct_symbols();
        let mut report = RefreshReport {
            total: symbols.len(),
            ..RefreshReport::default()
        };

        for symbol in symbols {
            let Some(asset_class) = self.store.ledger().asset_class_of(&symbol) else {
                report.failed.push(symbol);
                continue;
            };
            match self.refresh.fetch_latest(&symbol, asset_class, &currency).await {
                Some(price) => match self.store.set_quote(&symbol, price) {
                    Ok(()) => report.updated += 1,
                    Err(_) => report.failed.push(symbol),
                },
                None => report.failed.push(symbol),
            }
        }

        log::info!(
            "price refresh: {}/{} symbols updated",
            report.updated,
            report.total
        );
        report
    }

    // ── Summary / analytics ─────────────────────────────────────────

    /// One full recompute of everything the summary view renders from.
    #[must_use]
    pub fn report(&self) -> PortfolioReport {
        self.valuation.report(self.store.ledger())
    }

    /// Per-symbol valuation across the whole transaction history.
    #[must_use]
    pub fn per_asset_aggregates(&self) -> HashMap<String, AssetAggregate> {
        let ledger = self.store.ledger();
        self.valuation
            .per_asset_aggregates(&ledger.transactions, &ledger.quotes)
    }

    /// Portfolio-wide invested/current/gain sums.
    #[must_use]
    pub fn portfolio_totals(&self) -> PortfolioTotals {
        self.valuation.portfolio_totals(&self.per_asset_aggregates())
    }

    /// FIFO-matched realized gains for every symbol with sells.
    #[must_use]
    pub fn realized_sale_gains(&self) -> HashMap<String, RealizedGain> {
        self.valuation.realized_sale_gains(self.store.transactions())
    }

    /// Dividend income rollup (gross, illustrative net, groupings).
    #[must_use]
    pub fn dividend_summary(&self) -> DividendSummary {
        self.valuation.dividend_summary(
            self.store.dividends(),
            self.store.settings().dividend_withholding_rate,
        )
    }

    /// Current-value share per asset class, as fractions summing to 1.
    #[must_use]
    pub fn allocation(&self) -> HashMap<AssetClass, f64> {
        self.valuation.allocation(&self.per_asset_aggregates())
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export all three collections as a pretty-printed JSON document.
    pub fn export_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.store.export_backup())
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize backup: {e}")))
    }

    /// Import a backup document, destructively replacing all three
    /// collections. Invalid JSON or a wrong shape fails before anything
    /// is touched.
    pub fn import_json(&mut self, json: &str) -> Result<(), CoreError> {
        let backup: Backup = serde_json::from_str(json)
            .map_err(|e| CoreError::Import(format!("Invalid backup document: {e}")))?;
        self.store.replace_all(backup);
        Ok(())
    }

    // ── Settings ────────────────────────────────────────────────────

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        self.store.settings()
    }

    /// Set the reporting currency (e.g., "EUR", "USD").
    /// Currency code must be exactly 3 ASCII letters.
    pub fn set_reporting_currency(&mut self, currency: impl Into<String>) -> Result<(), CoreError> {
        let trimmed = currency.into().trim().to_uppercase();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CoreError::Validation(format!(
                "Invalid currency code '{trimmed}': must be exactly 3 ASCII letters (e.g., EUR, USD)"
            )));
        }
        let mut settings = self.store.settings().clone();
        settings.reporting_currency = trimmed;
        self.store.set_settings(settings);
        Ok(())
    }

    /// Set the flat dividend withholding rate, as a fraction in [0, 1).
    pub fn set_withholding_rate(&mut self, rate: f64) -> Result<(), CoreError> {
        if !rate.is_finite() || !(0.0..1.0).contains(&rate) {
            return Err(CoreError::Validation(format!(
                "Invalid withholding rate {rate}: must be a fraction in [0, 1)"
            )));
        }
        let mut settings = self.store.settings().clone();
        settings.dividend_withholding_rate = rate;
        self.store.set_settings(settings);
        Ok(())
    }

    // ── Persistence ─────────────────────────────────────────────────

    /// Returns `true` if the ledger has been modified since the last save
    /// or load.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.store.has_unsaved_changes()
    }

    /// Serialize the ledger to raw file bytes (WASM-friendly).
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>, CoreError> {
        self.store.save_to_bytes()
    }

    /// Write the ledger to its backing file (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&mut self) -> Result<(), CoreError> {
        self.store.save()
    }

    /// Save any unsaved changes and consume the tracker.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn close(self) -> Result<(), CoreError> {
        self.store.close()
    }
}
