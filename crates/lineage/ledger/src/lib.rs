//! Lineage Ledger - provenance of AI executions.
//!
//! This crate provides:
//! - the `ProvenanceLedger` facade that guards recording behind an
//!   active-agent check and publishes one notification per record
//! - a `RecordStore` boundary that assigns ids and hash links on append
//! - an in-memory store with a per-token index
//! - chain verification over stored records
//!
//! Token ids are stored as given. The ledger does not ask the access registry
//! whether a token was minted; see `ProvenanceLedger::record_derivative`.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod chain;
pub mod error;
pub mod ledger;
pub mod memory;
pub mod query;
pub mod store;

pub use chain::{compute_record_hash, verify_chain};
pub use error::{LedgerError, StoreError, StoreResult};
pub use ledger::{DerivativeRequest, ProvenanceLedger};
pub use memory::InMemoryRecordStore;
pub use query::{LedgerStatistics, RecordQuery};
pub use store::{NewRecord, QueryWindow, RecordStore};
