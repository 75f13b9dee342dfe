use chrono::Utc;
#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};

use crate::errors::CoreError;
use crate::models::dividend::{Dividend, DividendDraft};
use crate::models::ledger::{Backup, Ledger};
use crate::models::settings::Settings;
use crate::models::transaction::{self, Transaction, TransactionDraft};

use super::{format, migrations};

/// Durable home of the three record collections.
///
/// Explicitly constructed and injected into the tracker facade, with an
/// explicit lifecycle: create with [`open`](Self::open) (native),
/// [`in_memory`](Self::in_memory), or
/// [`load_from_bytes`](Self::load_from_bytes); persist with
/// [`save`](Self::save) / [`save_to_bytes`](Self::save_to_bytes); finish
/// with [`close`](Self::close).
///
/// All mutations flow through `&mut self`, so readers can never observe a
/// half-applied change — in particular, [`replace_all`](Self::replace_all)
/// swaps in a fully built ledger in one assignment.
pub struct RecordStore {
    ledger: Ledger,
    #[cfg(not(target_arch = "wasm32"))]
    path: Option<PathBuf>,
    /// Tracks whether any mutation has occurred since the last save/load.
    dirty: bool,
}

impl RecordStore {
    /// A store with no backing file. Used for tests and WASM frontends
    /// that handle persistence themselves.
    pub fn in_memory() -> Self {
        Self {
            ledger: Ledger::default(),
            #[cfg(not(target_arch = "wasm32"))]
            path: None,
            dirty: false,
        }
    }

    /// Open a store backed by a file on disk (native only). A missing file
    /// yields an empty ledger that will be created on the first save.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref().to_path_buf();
        let ledger = if path.exists() {
            let bytes = std::fs::read(&path)?;
            Self::decode(&bytes)?
        } else {
            Ledger::default()
        };
        Ok(Self {
            ledger,
            path: Some(path),
            dirty: false,
        })
    }

    /// Load a store from raw ledger-file bytes.
    /// Use this for WASM / Tauri where the frontend handles file I/O.
    pub fn load_from_bytes(data: &[u8]) -> Result<Self, CoreError> {
        Ok(Self {
            ledger: Self::decode(data)?,
            #[cfg(not(target_arch = "wasm32"))]
            path: None,
            dirty: false,
        })
    }

    /// Serialize the ledger to raw file bytes.
    /// Clears the unsaved-changes flag on success.
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>, CoreError> {
        let bytes = Self::encode(&self.ledger)?;
        self.dirty = false;
        Ok(bytes)
    }

    /// Write the ledger to the backing file (native only).
    /// Clears the unsaved-changes flag on success.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&mut self) -> Result<(), CoreError> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| CoreError::FileIo("Store has no backing file".into()))?;
        let bytes = Self::encode(&self.ledger)?;
        std::fs::write(&path, bytes)?;
        self.dirty = false;
        log::debug!("ledger saved to {}", path.display());
        Ok(())
    }

    /// Save any unsaved changes and consume the store.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn close(mut self) -> Result<(), CoreError> {
        if self.dirty && self.path.is_some() {
            self.save()?;
        }
        Ok(())
    }

    /// Returns `true` if the ledger has been modified since the last
    /// save or load.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    // ── Transactions ────────────────────────────────────────────────

    /// Validate and insert a transaction. Returns the assigned id.
    pub fn add_transaction(&mut self, draft: TransactionDraft) -> Result<u64, CoreError> {
        draft.validate()?;
        let id = self.ledger.allocate_transaction_id();
        self.ledger
            .transactions
            .push(draft.into_transaction(id, Utc::now()));
        self.dirty = true;
        Ok(id)
    }

    #[must_use]
    pub fn transaction(&self, id: u64) -> Option<&Transaction> {
        self.ledger.transactions.iter().find(|tx| tx.id == id)
    }

    /// Replace an existing transaction's fields, keeping its identity and
    /// creation timestamp. The draft is validated before anything changes.
    pub fn update_transaction(&mut self, id: u64, draft: TransactionDraft) -> Result<(), CoreError> {
        draft.validate()?;
        let tx = self
            .ledger
            .transactions
            .iter_mut()
            .find(|tx| tx.id == id)
            .ok_or(CoreError::NotFound {
                kind: "transaction",
                id,
            })?;
        let created_at = tx.created_at;
        *tx = draft.into_transaction(id, created_at);
        self.dirty = true;
        Ok(())
    }

    /// Delete a transaction. Returns the removed record.
    pub fn remove_transaction(&mut self, id: u64) -> Result<Transaction, CoreError> {
        let idx = self
            .ledger
            .transactions
            .iter()
            .position(|tx| tx.id == id)
            .ok_or(CoreError::NotFound {
                kind: "transaction",
                id,
            })?;
        self.dirty = true;
        Ok(self.ledger.transactions.remove(idx))
    }

    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        &self.ledger.transactions
    }

    // ── Dividends ───────────────────────────────────────────────────

    /// Validate and insert a dividend. When the draft carries no share
    /// count, it is reconstructed by replaying transaction history as of
    /// the payment date. Returns the assigned id.
    pub fn add_dividend(&mut self, draft: DividendDraft) -> Result<u64, CoreError> {
        draft.validate()?;
        let shares = self.resolve_shares(&draft);
        let id = self.ledger.allocate_dividend_id();
        self.ledger.dividends.push(draft.into_dividend(id, shares));
        self.dirty = true;
        Ok(id)
    }

    #[must_use]
    pub fn dividend(&self, id: u64) -> Option<&Dividend> {
        self.ledger.dividends.iter().find(|d| d.id == id)
    }

    /// Replace an existing dividend's fields, keeping its identity.
    /// A draft without a share count is reconstructed, as on insert.
    pub fn update_dividend(&mut self, id: u64, draft: DividendDraft) -> Result<(), CoreError> {
        draft.validate()?;
        let shares = self.resolve_shares(&draft);
        let dividend = self
            .ledger
            .dividends
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(CoreError::NotFound {
                kind: "dividend",
                id,
            })?;
        *dividend = draft.into_dividend(id, shares);
        self.dirty = true;
        Ok(())
    }

    /// Delete a dividend. Returns the removed record.
    pub fn remove_dividend(&mut self, id: u64) -> Result<Dividend, CoreError> {
        let idx = self
            .ledger
            .dividends
            .iter()
            .position(|d| d.id == id)
            .ok_or(CoreError::NotFound {
                kind: "dividend",
                id,
            })?;
        self.dirty = true;
        Ok(self.ledger.dividends.remove(idx))
    }

    #[must_use]
    pub fn dividends(&self) -> &[Dividend] {
        &self.ledger.dividends
    }

    // ── Prices ──────────────────────────────────────────────────────

    /// Insert or overwrite the current price for a symbol. The price must
    /// be finite and positive.
    pub fn set_quote(&mut self, symbol: &str, price: f64) -> Result<(), CoreError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(CoreError::Validation(
                "Price must be a positive number".into(),
            ));
        }
        self.ledger.quotes.set(symbol, price);
        self.dirty = true;
        Ok(())
    }

    #[must_use]
    pub fn quote(&self, symbol: &str) -> Option<f64> {
        self.ledger.quotes.get(symbol)
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.ledger.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.ledger.settings = settings;
        self.dirty = true;
    }

    // ── Bulk replace / export ───────────────────────────────────────

    /// Destructively replace all three collections with the backup's
    /// contents. The new ledger is fully built before a single swap, so no
    /// reader ever observes transactions cleared but dividends not yet
    /// replaced. Settings survive the import; the id counters restart
    /// above the highest imported id.
    pub fn replace_all(&mut self, backup: Backup) {
        let transaction_seq = backup
            .transactions
            .iter()
            .map(|tx| tx.id)
            .max()
            .unwrap_or(0)
            + 1;
        let dividend_seq = backup.dividends.iter().map(|d| d.id).max().unwrap_or(0) + 1;

        let ledger = Ledger {
            transactions: backup.transactions,
            dividends: backup.dividends,
            quotes: backup.prices.into(),
            settings: self.ledger.settings.clone(),
            transaction_seq,
            dividend_seq,
        };

        self.ledger = ledger;
        self.dirty = true;
        log::info!(
            "ledger replaced: {} transactions, {} dividends, {} quotes",
            self.ledger.transactions.len(),
            self.ledger.dividends.len(),
            self.ledger.quotes.len()
        );
    }

    /// All three collections, verbatim, for export.
    #[must_use]
    pub fn export_backup(&self) -> Backup {
        Backup {
            transactions: self.ledger.transactions.clone(),
            dividends: self.ledger.dividends.clone(),
            prices: self.ledger.quotes.to_records(),
        }
    }

    // ── Internal ────────────────────────────────────────────────────

    fn resolve_shares(&self, draft: &DividendDraft) -> f64 {
        match draft.shares {
            Some(shares) => shares,
            None => transaction::shares_held_on(
                &self.ledger.transactions,
                &draft.symbol,
                draft.payment_date,
            ),
        }
    }

    fn decode(data: &[u8]) -> Result<Ledger, CoreError> {
        let (version, payload) = format::read_file(data)?;
        let mut doc: serde_json::Value = serde_json::from_slice(payload)?;
        if version < format::CURRENT_VERSION {
            doc = migrations::run(doc, version)?;
            log::info!(
                "migrated ledger from v{version} to v{}",
                format::CURRENT_VERSION
            );
        }
        let mut ledger: Ledger =
            serde_json::from_value(doc).map_err(|e| CoreError::Deserialization(e.to_string()))?;
        ledger.normalize_counters();
        Ok(ledger)
    }

    fn encode(ledger: &Ledger) -> Result<Vec<u8>, CoreError> {
        let payload =
            serde_json::to_vec(ledger).map_err(|e| CoreError::Serialization(e.to_string()))?;
        Ok(format::write_file(format::CURRENT_VERSION, &payload))
    }
}
