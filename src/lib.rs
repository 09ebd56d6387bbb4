pub mod api;
pub mod config;
pub mod domain;
pub mod event_sourcing;
pub mod ledger;
pub mod metrics;
pub mod utils;
