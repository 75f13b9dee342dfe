pub mod refresh_service;
pub mod valuation_engine;
