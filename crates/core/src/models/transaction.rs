use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

use super::asset::AssetClass;

/// Which side of a trade a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    /// Buying / acquiring an asset
    Buy,
    /// Selling / disposing of an asset
    Sell,
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "Buy"),
            TradeSide::Sell => write!(f, "Sell"),
        }
    }
}

/// A single recorded buy or sell.
///
/// The unit price is the execution price in the reporting currency; it also
/// serves as the valuation fallback for symbols without a live quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Auto-assigned sequence number, unique per ledger
    pub id: u64,

    /// Ticker symbol, uppercased (e.g., "AAPL", "BTC")
    pub symbol: String,

    /// Optional human-readable name (e.g., "Apple Inc.")
    #[serde(default)]
    pub name: Option<String>,

    /// Asset category — determines which quote provider serves the symbol
    pub asset_class: AssetClass,

    /// Buy or Sell
    pub side: TradeSide,

    /// Units traded (always positive)
    pub quantity: f64,

    /// Execution price per unit, in the reporting currency
    pub unit_price: f64,

    /// Commission paid for the trade, in the reporting currency
    #[serde(default)]
    pub commission: f64,

    /// Execution date (no time component — daily granularity)
    pub trade_date: NaiveDate,

    /// When the record was entered
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Gross amount exchanged, before commission.
    #[must_use]
    pub fn gross_amount(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// Validated input for creating or updating a [`Transaction`].
/// The record store assigns the id and creation timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    pub asset_class: AssetClass,
    pub side: TradeSide,
    pub quantity: f64,
    pub unit_price: f64,
    #[serde(default)]
    pub commission: f64,
    pub trade_date: NaiveDate,
}

impl TransactionDraft {
    /// Create a draft with no display name and zero commission.
    /// The symbol is trimmed and uppercased.
    pub fn new(
        side: TradeSide,
        asset_class: AssetClass,
        symbol: impl Into<String>,
        quantity: f64,
        unit_price: f64,
        trade_date: NaiveDate,
    ) -> Self {
        Self {
            symbol: symbol.into().trim().to_uppercase(),
            name: None,
            asset_class,
            side,
            quantity,
            unit_price,
            commission: 0.0,
            trade_date,
        }
    }

    /// Attach a display name. Blank names are treated as absent.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into().trim().to_string();
        self.name = if name.is_empty() { None } else { Some(name) };
        self
    }

    /// Set the commission paid for the trade.
    #[must_use]
    pub fn with_commission(mut self, commission: f64) -> Self {
        self.commission = commission;
        self
    }

    /// Check the invariants every stored transaction must satisfy.
    ///
    /// Note that selling more than is currently held is *not* rejected here:
    /// negative aggregate holdings are clamped to zero at valuation time.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.symbol.is_empty() {
            return Err(CoreError::Validation("Symbol must not be empty".into()));
        }
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(CoreError::Validation(
                "Quantity must be a positive number".into(),
            ));
        }
        if !self.unit_price.is_finite() || self.unit_price < 0.0 {
            return Err(CoreError::Validation(
                "Unit price must be a non-negative number".into(),
            ));
        }
        if !self.commission.is_finite() || self.commission < 0.0 {
            return Err(CoreError::Validation(
                "Commission must be a non-negative number".into(),
            ));
        }
        check_not_future(self.trade_date)?;
        Ok(())
    }

    pub(crate) fn into_transaction(self, id: u64, created_at: DateTime<Utc>) -> Transaction {
        Transaction {
            id,
            symbol: self.symbol,
            name: self.name,
            asset_class: self.asset_class,
            side: self.side,
            quantity: self.quantity,
            unit_price: self.unit_price,
            commission: self.commission,
            trade_date: self.trade_date,
            created_at,
        }
    }
}

/// Net units of `symbol` held on `date`, replaying buys and sells up to and
/// including that day. Clamped at zero: sell-before-buy entry errors must not
/// produce a negative share count.
#[must_use]
pub fn shares_held_on(transactions: &[Transaction], symbol: &str, date: NaiveDate) -> f64 {
    let upper = symbol.trim().to_uppercase();
    let mut quantity = 0.0;
    for tx in transactions {
        if tx.symbol != upper || tx.trade_date > date {
            continue;
        }
        match tx.side {
            TradeSide::Buy => quantity += tx.quantity,
            TradeSide::Sell => quantity -= tx.quantity,
        }
    }
    quantity.max(0.0)
}

/// Reject dates in the future (one day of tolerance for timezone skew).
pub(crate) fn check_not_future(date: NaiveDate) -> Result<(), CoreError> {
    let today = Utc::now().date_naive();
    if let Some(tomorrow) = today.succ_opt() {
        if date > tomorrow {
            return Err(CoreError::Validation(format!(
                "Date {date} is in the future"
            )));
        }
    }
    Ok(())
}
