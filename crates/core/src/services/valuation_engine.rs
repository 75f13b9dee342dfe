use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

use crate::models::asset::AssetClass;
use crate::models::dividend::Dividend;
use crate::models::ledger::Ledger;
use crate::models::quote::QuoteBoard;
use crate::models::summary::{
    AssetAggregate, DividendSummary, PortfolioReport, PortfolioTotals, RealizedGain,
};
use crate::models::transaction::{self, TradeSide, Transaction};

/// Derives the portfolio summary from the full record set.
///
/// Pure business logic — no I/O, no API calls, no hidden state. Total over
/// its inputs: malformed records degrade to best-effort numbers, never to
/// an error. Recomputed from scratch after every mutation.
pub struct ValuationEngine;

impl ValuationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Valuation of every symbol that appears in the transaction list.
    ///
    /// Buys add quantity and (quantity × price + commission) to the cost
    /// basis; sells subtract quantity and (quantity × price − commission).
    /// A negative resulting holding is clamped to zero — sell-before-buy
    /// entry errors are tolerated, not rejected. When no quote exists for a
    /// symbol, the most recent transaction's execution price stands in.
    pub fn per_asset_aggregates(
        &self,
        transactions: &[Transaction],
        quotes: &QuoteBoard,
    ) -> HashMap<String, AssetAggregate> {
        struct Running {
            name: Option<String>,
            asset_class: AssetClass,
            quantity: f64,
            invested: f64,
            last_price: f64,
            last_seen: (NaiveDate, u64),
        }

        let mut running: HashMap<String, Running> = HashMap::new();

        for tx in transactions {
            let entry = running
                .entry(tx.symbol.clone())
                .or_insert_with(|| Running {
                    name: None,
                    asset_class: tx.asset_class,
                    quantity: 0.0,
                    invested: 0.0,
                    last_price: tx.unit_price,
                    last_seen: (tx.trade_date, tx.id),
                });

            match tx.side {
                TradeSide::Buy => {
                    entry.quantity += tx.quantity;
                    entry.invested += tx.gross_amount() + tx.commission;
                }
                TradeSide::Sell => {
                    entry.quantity -= tx.quantity;
                    entry.invested -= tx.gross_amount() - tx.commission;
                }
            }

            if (tx.trade_date, tx.id) >= entry.last_seen {
                entry.last_seen = (tx.trade_date, tx.id);
                entry.last_price = tx.unit_price;
                entry.asset_class = tx.asset_class;
            }
            if let Some(name) = &tx.name {
                if !name.is_empty() {
                    entry.name = Some(name.clone());
                }
            }
        }

        running
            .into_iter()
            .map(|(symbol, r)| {
                let quantity = r.quantity.max(0.0);
                let price = quotes.get(&symbol).unwrap_or(r.last_price);
                let current_value = quantity * price;
                let unrealized_gain = current_value - r.invested;
                let unrealized_gain_pct = if r.invested > 0.0 {
                    unrealized_gain / r.invested
                } else {
                    0.0
                };
                let aggregate = AssetAggregate {
                    symbol: symbol.clone(),
                    name: r.name,
                    asset_class: r.asset_class,
                    quantity,
                    invested: r.invested,
                    price,
                    current_value,
                    unrealized_gain,
                    unrealized_gain_pct,
                };
                (symbol, aggregate)
            })
            .collect()
    }

    /// Sum invested cost and current value over assets with a positive
    /// holding. The gain percentage is defined as 0 when nothing was
    /// invested, never NaN.
    pub fn portfolio_totals(
        &self,
        aggregates: &HashMap<String, AssetAggregate>,
    ) -> PortfolioTotals {
        let mut total_invested = 0.0;
        let mut total_current_value = 0.0;

        for aggregate in aggregates.values() {
            if aggregate.quantity <= 0.0 {
                continue;
            }
            total_invested += aggregate.invested;
            total_current_value += aggregate.current_value;
        }

        let total_gain = total_current_value - total_invested;
        let total_gain_pct = if total_invested > 0.0 {
            total_gain / total_invested
        } else {
            0.0
        };

        PortfolioTotals {
            total_invested,
            total_current_value,
            total_gain,
            total_gain_pct,
        }
    }

    /// Realized gains for every symbol with at least one sell.
    ///
    /// Proceeds are Σ (quantity × price − commission) over sells. Cost is
    /// FIFO-matched: buys sorted by trade date (entry order as tiebreak) are
    /// consumed oldest-first up to the total quantity sold, with each lot's
    /// commission prorated by the consumed fraction. If sells exceed the
    /// units ever bought, the unmatched remainder carries zero cost basis.
    pub fn realized_sale_gains(
        &self,
        transactions: &[Transaction],
    ) -> HashMap<String, RealizedGain> {
        let mut by_symbol: HashMap<String, Vec<&Transaction>> = HashMap::new();
        for tx in transactions {
            by_symbol.entry(tx.symbol.clone()).or_default().push(tx);
        }

        let mut gains = HashMap::new();

        for (symbol, txs) in by_symbol {
            let mut total_proceeds = 0.0;
            let mut total_sold = 0.0;
            for tx in txs.iter().filter(|t| t.side == TradeSide::Sell) {
                total_proceeds += tx.gross_amount() - tx.commission;
                total_sold += tx.quantity;
            }
            if total_sold <= 0.0 {
                continue;
            }

            let mut buys: Vec<&Transaction> = txs
                .iter()
                .copied()
                .filter(|t| t.side == TradeSide::Buy)
                .collect();
            buys.sort_by_key(|t| (t.trade_date, t.id));

            let mut remaining = total_sold;
            let mut total_cost = 0.0;
            for buy in buys {
                if remaining <= 0.0 {
                    break;
                }
                if buy.quantity <= 0.0 {
                    continue;
                }
                let consumed = remaining.min(buy.quantity);
                total_cost +=
                    consumed * buy.unit_price + buy.commission * (consumed / buy.quantity);
                remaining -= consumed;
            }

            gains.insert(
                symbol,
                RealizedGain {
                    total_proceeds,
                    total_cost,
                    gain: total_proceeds - total_cost,
                },
            );
        }

        gains
    }

    /// Gross and illustrative-net dividend totals, with per-symbol and
    /// per-year groupings. Amounts are always derived from shares ×
    /// per-share.
    pub fn dividend_summary(
        &self,
        dividends: &[Dividend],
        withholding_rate: f64,
    ) -> DividendSummary {
        let mut summary = DividendSummary::default();

        for dividend in dividends {
            let amount = dividend.amount();
            summary.total_gross += amount;
            *summary
                .per_symbol
                .entry(dividend.symbol.clone())
                .or_insert(0.0) += amount;
            *summary
                .per_year
                .entry(dividend.payment_date.year())
                .or_insert(0.0) += amount;
        }

        summary.total_net = summary.total_gross * (1.0 - withholding_rate);
        summary
    }

    /// Share of current value per asset class, over assets with a positive
    /// holding, as fractions summing to 1. Empty when the total is zero.
    pub fn allocation(
        &self,
        aggregates: &HashMap<String, AssetAggregate>,
    ) -> HashMap<AssetClass, f64> {
        let mut per_class: HashMap<AssetClass, f64> = HashMap::new();
        let mut total = 0.0;

        for aggregate in aggregates.values() {
            if aggregate.quantity <= 0.0 {
                continue;
            }
            *per_class.entry(aggregate.asset_class).or_insert(0.0) += aggregate.current_value;
            total += aggregate.current_value;
        }

        if total <= 0.0 {
            return HashMap::new();
        }

        per_class
            .into_iter()
            .map(|(class, value)| (class, value / total))
            .collect()
    }

    /// Net units of `symbol` held on `date`. Used to reconstruct the share
    /// count a dividend was entitled to.
    #[must_use]
    pub fn shares_held_on(
        &self,
        transactions: &[Transaction],
        symbol: &str,
        date: NaiveDate,
    ) -> f64 {
        transaction::shares_held_on(transactions, symbol, date)
    }

    /// One full recompute: everything the summary view renders from.
    pub fn report(&self, ledger: &Ledger) -> PortfolioReport {
        let aggregates = self.per_asset_aggregates(&ledger.transactions, &ledger.quotes);
        let totals = self.portfolio_totals(&aggregates);
        let realized = self.realized_sale_gains(&ledger.transactions);
        let dividends = self.dividend_summary(
            &ledger.dividends,
            ledger.settings.dividend_withholding_rate,
        );
        let allocation = self.allocation(&aggregates);

        let mut assets: Vec<AssetAggregate> = aggregates.into_values().collect();
        assets.sort_by(|a, b| {
            b.current_value
                .partial_cmp(&a.current_value)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });

        PortfolioReport {
            currency: ledger.settings.reporting_currency.clone(),
            assets,
            totals,
            realized,
            dividends,
            allocation,
        }
    }
}

impl Default for ValuationEngine {
    fn default() -> Self {
        Self::new()
    }
}
