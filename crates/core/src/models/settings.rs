use serde::{Deserialize, Serialize};

/// User-configurable settings, persisted inside the ledger file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Currency in which all monetary values are recorded and reported
    /// (e.g., "EUR", "USD").
    pub reporting_currency: String,

    /// Flat fractional tax assumed to be withheld from gross dividend
    /// income. Used only to display an illustrative net figure.
    pub dividend_withholding_rate: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reporting_currency: "EUR".to_string(),
            dividend_withholding_rate: 0.19,
        }
    }
}
