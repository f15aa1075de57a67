pub mod catalog_ops;
pub mod ledger_ops;
pub mod reconcile;
pub mod resolve;
pub mod search;
pub mod stats;
