// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use portfolio_tracker_core::errors::CoreError;

mod display {
    use super::*;

    #[test]
    fn invalid_file_format() {
        let err = CoreError::InvalidFileFormat("bad magic".into());
        assert_eq!(err.to_string(), "Invalid file format: bad magic");
    }

    #[test]
    fn unsupported_version() {
        assert_eq!(
            CoreError::UnsupportedVersion(9).to_string(),
            "Unsupported file version: 9"
        );
    }

    #[test]
    fn api_error_names_the_provider() {
        let err = CoreError::Api {
            provider: "CoinGecko".into(),
            message: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "API error (CoinGecko): rate limited");
    }

    #[test]
    fn not_found_names_kind_and_id() {
        let err = CoreError::NotFound {
            kind: "dividend",
            id: 7,
        };
        assert_eq!(err.to_string(), "dividend not found: 7");
    }

    #[test]
    fn price_not_available_names_symbol() {
        let err = CoreError::PriceNotAvailable {
            symbol: "XYZ".into(),
        };
        assert_eq!(err.to_string(), "No price available for XYZ");
    }

    #[test]
    fn validation_carries_message() {
        let err = CoreError::Validation("Quantity must be a positive number".into());
        assert!(err.to_string().contains("Quantity"));
    }
}

mod conversions {
    use super::*;

    #[test]
    fn io_error_becomes_file_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CoreError = io.into();
        assert!(matches!(err, CoreError::FileIo(_)));
    }

    #[test]
    fn serde_error_becomes_deserialization() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let err: CoreError = serde_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }
}
