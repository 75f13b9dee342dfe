// ═══════════════════════════════════════════════════════════════════
// Storage Tests — file format, migrations, RecordStore lifecycle
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;
use serde_json::json;

use portfolio_tracker_core::errors::CoreError;
use portfolio_tracker_core::models::asset::AssetClass;
use portfolio_tracker_core::models::dividend::DividendDraft;
use portfolio_tracker_core::models::ledger::Backup;
use portfolio_tracker_core::models::quote::PriceQuote;
use portfolio_tracker_core::models::transaction::{TradeSide, TransactionDraft};
use portfolio_tracker_core::storage::store::RecordStore;
use portfolio_tracker_core::storage::{format, migrations};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn buy(symbol: &str, quantity: f64, price: f64, date: NaiveDate) -> TransactionDraft {
    TransactionDraft::new(TradeSide::Buy, AssetClass::Stock, symbol, quantity, price, date)
}

fn sell(symbol: &str, quantity: f64, price: f64, date: NaiveDate) -> TransactionDraft {
    TransactionDraft::new(TradeSide::Sell, AssetClass::Stock, symbol, quantity, price, date)
}

// ═══════════════════════════════════════════════════════════════════
//  File format
// ═══════════════════════════════════════════════════════════════════

mod file_format {
    use super::*;

    #[test]
    fn roundtrip() {
        let payload = br#"{"transactions":[]}"#;
        let bytes = format::write_file(format::CURRENT_VERSION, payload);
        let (version, read_payload) = format::read_file(&bytes).unwrap();
        assert_eq!(version, format::CURRENT_VERSION);
        assert_eq!(read_payload, payload);
    }

    #[test]
    fn starts_with_magic() {
        let bytes = format::write_file(format::CURRENT_VERSION, b"{}");
        assert_eq!(&bytes[0..4], format::MAGIC);
    }

    #[test]
    fn rejects_too_small_input() {
        let err = format::read_file(b"PTRK").unwrap_err();
        assert!(matches!(err, CoreError::InvalidFileFormat(_)));
    }

    #[test]
    fn rejects_wrong_magic() {
        let mut bytes = format::write_file(format::CURRENT_VERSION, b"{}");
        bytes[0..4].copy_from_slice(b"NOPE");
        let err = format::read_file(&bytes).unwrap_err();
        assert!(matches!(err, CoreError::InvalidFileFormat(_)));
    }

    #[test]
    fn rejects_future_version() {
        let bytes = format::write_file(format::CURRENT_VERSION + 1, b"{}");
        let err = format::read_file(&bytes).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedVersion(v) if v == format::CURRENT_VERSION + 1));
    }

    #[test]
    fn rejects_version_zero() {
        let bytes = format::write_file(0, b"{}");
        assert!(matches!(
            format::read_file(&bytes).unwrap_err(),
            CoreError::UnsupportedVersion(0)
        ));
    }

    #[test]
    fn rejects_truncated_payload() {
        let mut bytes = format::write_file(format::CURRENT_VERSION, b"{\"k\":1}");
        bytes.truncate(bytes.len() - 3);
        let err = format::read_file(&bytes).unwrap_err();
        assert!(matches!(err, CoreError::InvalidFileFormat(_)));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Migrations
// ═══════════════════════════════════════════════════════════════════

mod migration {
    use super::*;

    #[test]
    fn v1_backfills_shares_by_replaying_transactions() {
        let v1 = json!({
            "transactions": [
                {
                    "id": 1, "symbol": "XYZ", "asset_class": "stock",
                    "side": "buy", "quantity": 30.0, "unit_price": 10.0,
                    "commission": 0.0, "trade_date": "2023-01-10",
                    "created_at": "2023-01-10T09:00:00Z"
                },
                {
                    "id": 2, "symbol": "XYZ", "asset_class": "stock",
                    "side": "sell", "quantity": 10.0, "unit_price": 12.0,
                    "commission": 0.0, "trade_date": "2023-06-01",
                    "created_at": "2023-06-01T09:00:00Z"
                }
            ],
            "dividends": [
                // Before the sell: 30 shares held
                { "id": 1, "symbol": "XYZ", "amount": 15.0, "per_share": 0.5,
                  "payment_date": "2023-03-01" },
                // After the sell: 20 shares held
                { "id": 2, "symbol": "XYZ", "amount": 10.0, "per_share": 0.5,
                  "payment_date": "2023-09-01" }
            ]
        });

        let migrated = migrations::run(v1, 1).unwrap();
        let dividends = migrated["dividends"].as_array().unwrap();

        assert_eq!(dividends[0]["shares"], json!(30.0));
        assert_eq!(dividends[1]["shares"], json!(20.0));
        // The stored amount is gone — from v2 on it is derived.
        assert!(dividends[0].get("amount").is_none());
    }

    #[test]
    fn v1_falls_back_to_amount_over_per_share() {
        // No transaction history for the symbol: the replay yields zero,
        // so the recorded amount is converted instead.
        let v1 = json!({
            "transactions": [],
            "dividends": [
                { "id": 1, "symbol": "GONE", "amount": 12.0, "per_share": 0.4,
                  "payment_date": "2023-03-01" }
            ]
        });

        let migrated = migrations::run(v1, 1).unwrap();
        let shares = migrated["dividends"][0]["shares"].as_f64().unwrap();
        assert!((shares - 30.0).abs() < 1e-9);
    }

    #[test]
    fn records_that_already_have_shares_are_untouched() {
        let v1 = json!({
            "transactions": [],
            "dividends": [
                { "id": 1, "symbol": "XYZ", "shares": 7.0, "per_share": 0.5,
                  "payment_date": "2023-03-01" }
            ]
        });

        let migrated = migrations::run(v1, 1).unwrap();
        assert_eq!(migrated["dividends"][0]["shares"], json!(7.0));
    }

    #[test]
    fn current_version_is_a_no_op() {
        let doc = json!({ "transactions": [], "dividends": [] });
        let migrated = migrations::run(doc.clone(), format::CURRENT_VERSION).unwrap();
        assert_eq!(migrated, doc);
    }

    #[test]
    fn unknown_version_is_rejected() {
        let doc = json!({});
        assert!(migrations::run(doc.clone(), 0).is_err());
        assert!(migrations::run(doc, format::CURRENT_VERSION + 1).is_err());
    }

    #[test]
    fn v1_file_loads_end_to_end() {
        // A complete v1 ledger file: dividends carry amounts, no shares.
        let payload = json!({
            "transactions": [
                {
                    "id": 1, "symbol": "XYZ", "asset_class": "stock",
                    "side": "buy", "quantity": 20.0, "unit_price": 10.0,
                    "commission": 0.0, "trade_date": "2023-01-10",
                    "created_at": "2023-01-10T09:00:00Z"
                }
            ],
            "dividends": [
                { "id": 1, "symbol": "XYZ", "amount": 10.0, "per_share": 0.5,
                  "payment_date": "2023-03-01" }
            ],
            "quotes": [ { "symbol": "XYZ", "price": 11.0 } ],
            "settings": { "reporting_currency": "EUR",
                          "dividend_withholding_rate": 0.19 }
        });
        let bytes = format::write_file(1, payload.to_string().as_bytes());

        let mut store = RecordStore::load_from_bytes(&bytes).unwrap();
        let dividend = &store.dividends()[0];
        assert_eq!(dividend.shares, 20.0);
        assert_eq!(dividend.amount(), 10.0);
        assert_eq!(store.quote("XYZ"), Some(11.0));

        // v1 files predate the stored id counters — a fresh insert must
        // not collide with the imported ids.
        let next = store
            .add_transaction(buy("XYZ", 1.0, 11.0, d(2023, 7, 1)))
            .unwrap();
        assert_eq!(next, 2);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  RecordStore — CRUD
// ═══════════════════════════════════════════════════════════════════

mod crud {
    use super::*;

    #[test]
    fn add_assigns_sequential_ids() {
        let mut store = RecordStore::in_memory();
        let a = store.add_transaction(buy("AAA", 1.0, 10.0, d(2024, 1, 1))).unwrap();
        let b = store.add_transaction(buy("BBB", 1.0, 10.0, d(2024, 1, 2))).unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, 2);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut store = RecordStore::in_memory();
        let a = store.add_transaction(buy("AAA", 1.0, 10.0, d(2024, 1, 1))).unwrap();
        store.remove_transaction(a).unwrap();
        let b = store.add_transaction(buy("BBB", 1.0, 10.0, d(2024, 1, 2))).unwrap();
        assert_eq!(b, 2);
    }

    #[test]
    fn invalid_draft_is_rejected_and_nothing_is_stored() {
        let mut store = RecordStore::in_memory();
        let result = store.add_transaction(buy("AAA", -1.0, 10.0, d(2024, 1, 1)));
        assert!(result.is_err());
        assert!(store.transactions().is_empty());
        assert!(!store.has_unsaved_changes());
    }

    #[test]
    fn update_keeps_identity_and_creation_time() {
        let mut store = RecordStore::in_memory();
        let id = store.add_transaction(buy("AAA", 1.0, 10.0, d(2024, 1, 1))).unwrap();
        let created_at = store.transaction(id).unwrap().created_at;

        store
            .update_transaction(id, buy("AAA", 2.0, 11.0, d(2024, 1, 2)))
            .unwrap();

        let tx = store.transaction(id).unwrap();
        assert_eq!(tx.quantity, 2.0);
        assert_eq!(tx.created_at, created_at);
    }

    #[test]
    fn update_missing_id_is_not_found() {
        let mut store = RecordStore::in_memory();
        let err = store
            .update_transaction(99, buy("AAA", 1.0, 10.0, d(2024, 1, 1)))
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { kind: "transaction", id: 99 }));
    }

    #[test]
    fn remove_returns_the_record() {
        let mut store = RecordStore::in_memory();
        let id = store.add_transaction(buy("AAA", 1.0, 10.0, d(2024, 1, 1))).unwrap();
        let removed = store.remove_transaction(id).unwrap();
        assert_eq!(removed.symbol, "AAA");
        assert!(store.transactions().is_empty());
    }

    #[test]
    fn dividend_shares_are_reconstructed_when_absent() {
        let mut store = RecordStore::in_memory();
        store.add_transaction(buy("XYZ", 20.0, 10.0, d(2024, 1, 1))).unwrap();
        store.add_transaction(sell("XYZ", 5.0, 12.0, d(2024, 2, 1))).unwrap();

        let id = store
            .add_dividend(DividendDraft::new("XYZ", 0.5, d(2024, 3, 1)))
            .unwrap();

        let dividend = store.dividend(id).unwrap();
        assert_eq!(dividend.shares, 15.0);
        assert_eq!(dividend.amount(), 7.5);
    }

    #[test]
    fn dividend_explicit_shares_are_kept() {
        let mut store = RecordStore::in_memory();
        let id = store
            .add_dividend(DividendDraft::new("XYZ", 0.5, d(2024, 3, 1)).with_shares(8.0))
            .unwrap();
        assert_eq!(store.dividend(id).unwrap().shares, 8.0);
    }

    #[test]
    fn dividend_update_rereconstructs_shares() {
        let mut store = RecordStore::in_memory();
        store.add_transaction(buy("XYZ", 10.0, 10.0, d(2024, 1, 1))).unwrap();
        let id = store
            .add_dividend(DividendDraft::new("XYZ", 0.5, d(2024, 2, 1)))
            .unwrap();

        // More history arrives, then the dividend is re-dated past it.
        store.add_transaction(buy("XYZ", 5.0, 11.0, d(2024, 3, 1))).unwrap();
        store
            .update_dividend(id, DividendDraft::new("XYZ", 0.5, d(2024, 4, 1)))
            .unwrap();

        assert_eq!(store.dividend(id).unwrap().shares, 15.0);
    }

    #[test]
    fn set_quote_rejects_non_positive_prices() {
        let mut store = RecordStore::in_memory();
        assert!(store.set_quote("AAPL", 0.0).is_err());
        assert!(store.set_quote("AAPL", -5.0).is_err());
        assert!(store.set_quote("AAPL", f64::NAN).is_err());
        assert_eq!(store.quote("AAPL"), None);

        store.set_quote("AAPL", 185.0).unwrap();
        assert_eq!(store.quote("AAPL"), Some(185.0));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  RecordStore — bulk replace, persistence
// ═══════════════════════════════════════════════════════════════════

mod persistence {
    use super::*;

    #[test]
    fn replace_all_with_empty_backup_empties_every_collection() {
        let mut store = RecordStore::in_memory();
        store.add_transaction(buy("AAA", 1.0, 10.0, d(2024, 1, 1))).unwrap();
        store
            .add_dividend(DividendDraft::new("AAA", 0.5, d(2024, 2, 1)).with_shares(1.0))
            .unwrap();
        store.set_quote("AAA", 11.0).unwrap();

        store.replace_all(Backup::default());

        assert!(store.transactions().is_empty());
        assert!(store.dividends().is_empty());
        assert_eq!(store.quote("AAA"), None);
    }

    #[test]
    fn replace_all_restarts_counters_above_imported_ids() {
        let mut store = RecordStore::in_memory();
        let mut donor = RecordStore::in_memory();
        donor.add_transaction(buy("AAA", 1.0, 10.0, d(2024, 1, 1))).unwrap();
        donor.add_transaction(buy("BBB", 1.0, 10.0, d(2024, 1, 2))).unwrap();

        store.replace_all(donor.export_backup());
        let next = store.add_transaction(buy("CCC", 1.0, 10.0, d(2024, 1, 3))).unwrap();
        assert_eq!(next, 3);
    }

    #[test]
    fn replace_all_keeps_settings() {
        let mut store = RecordStore::in_memory();
        let mut settings = store.settings().clone();
        settings.reporting_currency = "USD".to_string();
        store.set_settings(settings);

        store.replace_all(Backup::default());
        assert_eq!(store.settings().reporting_currency, "USD");
    }

    #[test]
    fn export_import_roundtrip() {
        let mut store = RecordStore::in_memory();
        store.add_transaction(buy("AAA", 2.0, 10.0, d(2024, 1, 1))).unwrap();
        store
            .add_dividend(DividendDraft::new("AAA", 0.5, d(2024, 2, 1)))
            .unwrap();
        store.set_quote("AAA", 12.0).unwrap();

        let backup = store.export_backup();
        let mut other = RecordStore::in_memory();
        other.replace_all(backup.clone());

        assert_eq!(other.export_backup(), backup);
    }

    #[test]
    fn export_prices_are_plain_records() {
        let mut store = RecordStore::in_memory();
        store.set_quote("BBB", 2.0).unwrap();
        store.set_quote("AAA", 1.0).unwrap();

        let backup = store.export_backup();
        assert_eq!(
            backup.prices,
            vec![
                PriceQuote { symbol: "AAA".into(), price: 1.0 },
                PriceQuote { symbol: "BBB".into(), price: 2.0 },
            ]
        );
    }

    #[test]
    fn dirty_flag_follows_mutations_and_saves() {
        let mut store = RecordStore::in_memory();
        assert!(!store.has_unsaved_changes());

        store.add_transaction(buy("AAA", 1.0, 10.0, d(2024, 1, 1))).unwrap();
        assert!(store.has_unsaved_changes());

        store.save_to_bytes().unwrap();
        assert!(!store.has_unsaved_changes());
    }

    #[test]
    fn bytes_roundtrip_preserves_everything() {
        let mut store = RecordStore::in_memory();
        store.add_transaction(buy("AAA", 2.0, 10.0, d(2024, 1, 1))).unwrap();
        store
            .add_dividend(DividendDraft::new("AAA", 0.5, d(2024, 2, 1)))
            .unwrap();
        store.set_quote("AAA", 12.0).unwrap();

        let bytes = store.save_to_bytes().unwrap();
        let restored = RecordStore::load_from_bytes(&bytes).unwrap();

        assert_eq!(restored.ledger(), store.ledger());
        assert!(!restored.has_unsaved_changes());
    }

    #[test]
    fn open_save_reopen_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portfolio.ptrk");

        {
            let mut store = RecordStore::open(&path).unwrap();
            assert!(store.transactions().is_empty());
            store.add_transaction(buy("AAA", 3.0, 10.0, d(2024, 1, 1))).unwrap();
            store.save().unwrap();
            assert!(!store.has_unsaved_changes());
        }

        let store = RecordStore::open(&path).unwrap();
        assert_eq!(store.transactions().len(), 1);
        assert_eq!(store.transactions()[0].symbol, "AAA");
    }

    #[test]
    fn close_saves_pending_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portfolio.ptrk");

        let mut store = RecordStore::open(&path).unwrap();
        store.add_transaction(buy("AAA", 3.0, 10.0, d(2024, 1, 1))).unwrap();
        store.close().unwrap();

        let store = RecordStore::open(&path).unwrap();
        assert_eq!(store.transactions().len(), 1);
    }

    #[test]
    fn save_without_backing_file_is_an_error() {
        let mut store = RecordStore::in_memory();
        assert!(matches!(store.save(), Err(CoreError::FileIo(_))));
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(RecordStore::load_from_bytes(b"not a ledger").is_err());
    }
}
