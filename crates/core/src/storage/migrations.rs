use chrono::NaiveDate;
use serde_json::Value;

use crate::errors::CoreError;

use super::format::CURRENT_VERSION;

/// A single schema migration: old document in, upgraded document out.
/// Pure — no I/O, no clock — so each step is independently testable
/// against a fixture "before" state.
type Migration = fn(Value) -> Result<Value, CoreError>;

/// Ordered migration steps: `MIGRATIONS[n]` upgrades a version `n + 1`
/// document to version `n + 2`.
const MIGRATIONS: &[Migration] = &[backfill_dividend_shares];

/// Upgrade a document from `version` to [`CURRENT_VERSION`] by applying
/// every remaining migration step in order.
pub fn run(mut doc: Value, version: u16) -> Result<Value, CoreError> {
    if version == 0 || version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }
    for step in &MIGRATIONS[(version as usize) - 1..] {
        doc = step(doc)?;
    }
    Ok(doc)
}

/// v1 → v2: dividends stored a flat `amount` and no share count.
///
/// Recompute `shares` for each dividend by replaying the transaction
/// history for its symbol up to the payment date (clamped at zero). When
/// the replay comes up empty but an amount was recorded, fall back to
/// `amount / per_share` so existing totals survive the upgrade. The stored
/// `amount` is dropped — from v2 on it is always derived.
fn backfill_dividend_shares(mut doc: Value) -> Result<Value, CoreError> {
    // (symbol, side, quantity, trade_date) of every parseable transaction.
    let trades: Vec<(String, String, f64, NaiveDate)> = doc
        .get("transactions")
        .and_then(Value::as_array)
        .map(|txs| {
            txs.iter()
                .filter_map(|tx| {
                    let symbol = tx.get("symbol")?.as_str()?.to_uppercase();
                    let side = tx.get("side")?.as_str()?.to_string();
                    let quantity = tx.get("quantity")?.as_f64()?;
                    let date = parse_date(tx.get("trade_date")?)?;
                    Some((symbol, side, quantity, date))
                })
                .collect()
        })
        .unwrap_or_default();

    let Some(dividends) = doc.get_mut("dividends").and_then(Value::as_array_mut) else {
        return Ok(doc);
    };

    for dividend in dividends {
        let Some(record) = dividend.as_object_mut() else {
            continue;
        };
        if record.contains_key("shares") {
            continue;
        }

        let symbol = record
            .get("symbol")
            .and_then(Value::as_str)
            .map(str::to_uppercase)
            .unwrap_or_default();
        let payment_date = record.get("payment_date").and_then(parse_date);
        let per_share = record
            .get("per_share")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        let amount = record.get("amount").and_then(Value::as_f64).unwrap_or(0.0);

        let mut shares = match payment_date {
            Some(date) => replay_held(&trades, &symbol, date),
            None => 0.0,
        };
        if shares <= 0.0 && amount > 0.0 && per_share > 0.0 {
            shares = amount / per_share;
        }

        record.insert("shares".into(), shares.into());
        record.remove("amount");
    }

    Ok(doc)
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.as_str()?, "%Y-%m-%d").ok()
}

fn replay_held(trades: &[(String, String, f64, NaiveDate)], symbol: &str, date: NaiveDate) -> f64 {
    let mut quantity = 0.0;
    for (sym, side, qty, trade_date) in trades {
        if sym != symbol || *trade_date > date {
            continue;
        }
        match side.as_str() {
            "buy" => quantity += qty,
            "sell" => quantity -= qty,
            _ => {}
        }
    }
    quantity.max(0.0)
}
