//! Lineage Attest - the off-ledger half of provenance
//!
//! The ledger anchors two 32-byte roots per execution without interpreting
//! them. This crate produces those roots and later checks them:
//! - `InputCommitment::root` commits to the inputs an executor consumed
//! - `ExecutionTrace` logs steps and folds their hashes into a Merkle root
//! - `TraceDocument` is the serializable trace stored under `trace_cid`
//! - `Auditor` re-derives both roots and compares them with a ledger record

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod audit;
mod commitment;
mod error;
mod merkle;
mod trace;

pub use audit::{AuditReport, Auditor};
pub use commitment::{ExecutionStep, InputCommitment};
pub use error::AttestError;
pub use merkle::{MerkleProof, MerkleProofStep, MerkleTree, ProofDirection};
pub use trace::{ExecutionTrace, TraceDocument};
