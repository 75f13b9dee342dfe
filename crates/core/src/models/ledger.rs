use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::asset::AssetClass;
use super::dividend::Dividend;
use super::quote::QuoteBoard;
use super::settings::Settings;
use super::transaction::Transaction;

/// The main data container. Everything in here is serialized into the
/// persisted ledger file: the three record collections, user settings,
/// and the id counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    /// All buy/sell transactions, in entry order
    #[serde(default)]
    pub transactions: Vec<Transaction>,

    /// All dividend receipts, in entry order
    #[serde(default)]
    pub dividends: Vec<Dividend>,

    /// Latest known price per symbol
    #[serde(default)]
    pub quotes: QuoteBoard,

    /// User settings (reporting currency, withholding rate)
    #[serde(default)]
    pub settings: Settings,

    /// Next transaction sequence number
    #[serde(default = "first_id")]
    pub(crate) transaction_seq: u64,

    /// Next dividend sequence number
    #[serde(default = "first_id")]
    pub(crate) dividend_seq: u64,
}

fn first_id() -> u64 {
    1
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            transactions: Vec::new(),
            dividends: Vec::new(),
            quotes: QuoteBoard::new(),
            settings: Settings::default(),
            transaction_seq: 1,
            dividend_seq: 1,
        }
    }
}

impl Ledger {
    pub(crate) fn allocate_transaction_id(&mut self) -> u64 {
        let id = self.transaction_seq;
        self.transaction_seq += 1;
        id
    }

    pub(crate) fn allocate_dividend_id(&mut self) -> u64 {
        let id = self.dividend_seq;
        self.dividend_seq += 1;
        id
    }

    /// Ensure the id counters sit above every existing record id.
    /// Files written before the counters were persisted load with the
    /// serde defaults, which would hand out duplicate ids.
    pub(crate) fn normalize_counters(&mut self) {
        let max_tx = self.transactions.iter().map(|tx| tx.id).max().unwrap_or(0);
        if self.transaction_seq <= max_tx {
            self.transaction_seq = max_tx + 1;
        }
        let max_div = self.dividends.iter().map(|d| d.id).max().unwrap_or(0);
        if self.dividend_seq <= max_div {
            self.dividend_seq = max_div + 1;
        }
    }

    /// Distinct transaction symbols, in first-appearance order.
    #[must_use]
    pub fn distinct_symbols(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.transactions
            .iter()
            .filter_map(|tx| {
                if seen.insert(tx.symbol.clone()) {
                    Some(tx.symbol.clone())
                } else {
                    None
                }
            })
            .collect()
    }

    /// Asset class of a symbol, taken from its first recorded transaction.
    #[must_use]
    pub fn asset_class_of(&self, symbol: &str) -> Option<AssetClass> {
        let upper = symbol.trim().to_uppercase();
        self.transactions
            .iter()
            .find(|tx| tx.symbol == upper)
            .map(|tx| tx.asset_class)
    }
}

/// The import/export document: a single JSON object with the three
/// collections as plain record arrays. Import replaces everything;
/// export serializes everything verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub dividends: Vec<Dividend>,
    #[serde(default)]
    pub prices: Vec<super::quote::PriceQuote>,
}
