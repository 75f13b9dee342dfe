use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::asset::AssetClass;

/// Valuation of a single symbol across its whole transaction history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetAggregate {
    /// Ticker symbol
    pub symbol: String,

    /// Display name, if any transaction carried one
    pub name: Option<String>,

    /// Asset category (from the most recent transaction)
    pub asset_class: AssetClass,

    /// Net units held, clamped at zero
    pub quantity: f64,

    /// Cost basis: buys add cost (incl. commission), sell proceeds
    /// (net of commission) reduce it
    pub invested: f64,

    /// Price used for valuation: the live quote, or the most recent
    /// transaction's execution price when no quote exists
    pub price: f64,

    /// quantity × price
    pub current_value: f64,

    /// current_value − invested
    pub unrealized_gain: f64,

    /// unrealized_gain / invested when invested > 0, else 0
    pub unrealized_gain_pct: f64,
}

/// Portfolio-wide sums over all assets with a positive holding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioTotals {
    pub total_invested: f64,
    pub total_current_value: f64,

    /// total_current_value − total_invested
    pub total_gain: f64,

    /// total_gain / total_invested when total_invested > 0, else 0
    /// (never NaN)
    pub total_gain_pct: f64,
}

/// Gain locked in by completed sales of one symbol, FIFO-matched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RealizedGain {
    /// Σ over sells of (quantity × unit_price − commission)
    pub total_proceeds: f64,

    /// FIFO-matched acquisition cost of the sold units, commission prorated
    pub total_cost: f64,

    /// total_proceeds − total_cost
    pub gain: f64,
}

/// Dividend income rollup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DividendSummary {
    /// Σ gross amounts
    pub total_gross: f64,

    /// total_gross × (1 − withholding rate); informational only
    pub total_net: f64,

    /// Gross received per symbol
    pub per_symbol: HashMap<String, f64>,

    /// Gross received per payment year
    pub per_year: BTreeMap<i32, f64>,
}

/// Everything the summary view needs, recomputed in one pass over the
/// full record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReport {
    /// Currency all monetary values are expressed in
    pub currency: String,

    /// Per-asset valuations, largest current value first
    pub assets: Vec<AssetAggregate>,

    pub totals: PortfolioTotals,

    /// Realized gains for every symbol with at least one sell
    pub realized: HashMap<String, RealizedGain>,

    pub dividends: DividendSummary,

    /// Share of current value per asset class, as fractions summing to 1.
    /// Empty when nothing is held.
    pub allocation: HashMap<AssetClass, f64>,
}
