use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Last known market price for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub symbol: String,
    pub price: f64,
}

/// symbol → last known price.
///
/// Overwritten by automated fetch or manual entry; no history is retained —
/// only the latest value survives. Serialized as a plain list of
/// [`PriceQuote`] records so the persisted form matches the export format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<PriceQuote>", into = "Vec<PriceQuote>")]
pub struct QuoteBoard {
    entries: HashMap<String, f64>,
}

impl QuoteBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the latest price for a symbol (case-insensitive).
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.entries.get(&symbol.trim().to_uppercase()).copied()
    }

    /// Insert or overwrite the price for a symbol.
    pub fn set(&mut self, symbol: &str, price: f64) {
        self.entries.insert(symbol.trim().to_uppercase(), price);
    }

    /// Drop the quote for a symbol. Returns the removed price, if any.
    pub fn remove(&mut self, symbol: &str) -> Option<f64> {
        self.entries.remove(&symbol.trim().to_uppercase())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All quotes as records, sorted by symbol for deterministic output.
    #[must_use]
    pub fn to_records(&self) -> Vec<PriceQuote> {
        let mut records: Vec<PriceQuote> = self
            .entries
            .iter()
            .map(|(symbol, price)| PriceQuote {
                symbol: symbol.clone(),
                price: *price,
            })
            .collect();
        records.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        records
    }
}

impl From<Vec<PriceQuote>> for QuoteBoard {
    fn from(records: Vec<PriceQuote>) -> Self {
        let mut board = Self::new();
        for record in records {
            board.set(&record.symbol, record.price);
        }
        board
    }
}

impl From<QuoteBoard> for Vec<PriceQuote> {
    fn from(board: QuoteBoard) -> Self {
        board.to_records()
    }
}
