use crate::errors::CoreError;
use crate::models::dividend::{Dividend, DividendDraft};
use crate::models::summary::PortfolioReport;
use crate::models::transaction::{Transaction, TransactionDraft};
use crate::services::refresh_service::RefreshReport;
use crate::PortfolioTracker;

/// A typed mutation request from the outside world.
///
/// A frontend never touches the record store directly: it emits commands,
/// and [`PortfolioTracker::dispatch`] applies each one and hands back a
/// freshly recomputed report — one mutate-then-recompute cycle per command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddTransaction(TransactionDraft),
    UpdateTransaction { id: u64, draft: TransactionDraft },
    RemoveTransaction { id: u64 },
    AddDividend(DividendDraft),
    UpdateDividend { id: u64, draft: DividendDraft },
    RemoveDividend { id: u64 },
    SetManualPrice { symbol: String, price: f64 },
    RefreshPrices,
    ImportBackup { json: String },
}

/// What a dispatched command did, besides triggering the recompute.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandEffect {
    TransactionAdded { id: u64 },
    TransactionUpdated { id: u64 },
    TransactionRemoved(Transaction),
    DividendAdded { id: u64 },
    DividendUpdated { id: u64 },
    DividendRemoved(Dividend),
    PriceSet { symbol: String, price: f64 },
    PricesRefreshed(RefreshReport),
    Imported,
}

/// Result of a dispatch: the effect plus the recomputed summary to render.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    pub effect: CommandEffect,
    pub report: PortfolioReport,
}

impl PortfolioTracker {
    /// Apply one command to the record store and recompute the report.
    ///
    /// On error the store is untouched and no recompute happens — the
    /// previously rendered state is still accurate.
    pub async fn dispatch(&mut self, command: Command) -> Result<CommandOutcome, CoreError> {
        let effect = match command {
            Command::AddTransaction(draft) => CommandEffect::TransactionAdded {
                id: self.add_transaction(draft)?,
            },
            Command::UpdateTransaction { id, draft } => {
                self.update_transaction(id, draft)?;
                CommandEffect::TransactionUpdated { id }
            }
            Command::RemoveTransaction { id } => {
                CommandEffect::TransactionRemoved(self.remove_transaction(id)?)
            }
            Command::AddDividend(draft) => CommandEffect::DividendAdded {
                id: self.add_dividend(draft)?,
            },
            Command::UpdateDividend { id, draft } => {
                self.update_dividend(id, draft)?;
                CommandEffect::DividendUpdated { id }
            }
            Command::RemoveDividend { id } => {
                CommandEffect::DividendRemoved(self.remove_dividend(id)?)
            }
            Command::SetManualPrice { symbol, price } => {
                self.set_manual_price(&symbol, price)?;
                CommandEffect::PriceSet { symbol, price }
            }
            Command::RefreshPrices => {
                CommandEffect::PricesRefreshed(self.refresh_prices().await)
            }
            Command::ImportBackup { json } => {
                self.import_json(&json)?;
                CommandEffect::Imported
            }
        };

        Ok(CommandOutcome {
            effect,
            report: self.report(),
        })
    }
}
