use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

use super::transaction::check_not_future;

/// A dividend receipt.
///
/// The gross amount is always derived as `shares × per_share` — it is never
/// stored, so the two can not drift apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dividend {
    /// Auto-assigned sequence number, unique per ledger
    pub id: u64,

    /// Ticker symbol, uppercased
    pub symbol: String,

    /// Shares entitled to the payment on the payment date
    pub shares: f64,

    /// Dividend paid per share, in the reporting currency
    pub per_share: f64,

    /// Payment date
    pub payment_date: NaiveDate,
}

impl Dividend {
    /// Gross amount received.
    #[must_use]
    pub fn amount(&self) -> f64 {
        self.shares * self.per_share
    }
}

/// Validated input for creating or updating a [`Dividend`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendDraft {
    pub symbol: String,

    /// Shares entitled to the payment. `None` asks the store to reconstruct
    /// the count by replaying transaction history as of the payment date.
    #[serde(default)]
    pub shares: Option<f64>,

    pub per_share: f64,
    pub payment_date: NaiveDate,
}

impl DividendDraft {
    /// Create a draft whose share count will be reconstructed from
    /// transaction history. The symbol is trimmed and uppercased.
    pub fn new(symbol: impl Into<String>, per_share: f64, payment_date: NaiveDate) -> Self {
        Self {
            symbol: symbol.into().trim().to_uppercase(),
            shares: None,
            per_share,
            payment_date,
        }
    }

    /// Supply the entitled share count explicitly.
    #[must_use]
    pub fn with_shares(mut self, shares: f64) -> Self {
        self.shares = Some(shares);
        self
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.symbol.is_empty() {
            return Err(CoreError::Validation("Symbol must not be empty".into()));
        }
        if !self.per_share.is_finite() || self.per_share <= 0.0 {
            return Err(CoreError::Validation(
                "Dividend per share must be a positive number".into(),
            ));
        }
        if let Some(shares) = self.shares {
            if !shares.is_finite() || shares < 0.0 {
                return Err(CoreError::Validation(
                    "Share count must be a non-negative number".into(),
                ));
            }
        }
        check_not_future(self.payment_date)?;
        Ok(())
    }

    pub(crate) fn into_dividend(self, id: u64, shares: f64) -> Dividend {
        Dividend {
            id,
            symbol: self.symbol,
            shares,
            per_share: self.per_share,
            payment_date: self.payment_date,
        }
    }
}
