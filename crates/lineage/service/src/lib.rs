//! Lineage Service - the substrate facade
//!
//! Deploys the access registry, agent directory, provenance ledger and
//! document vault as one unit, wires them together as the deployer, and
//! hands out caller-bound sessions. State-changing calls are serialized
//! through a single gate so that the first of two conflicting calls wins.
//! Outside a session the components are reachable only as read-only views.
//!
//! ```text
//! Session(caller) -> write gate -> CallContext { caller, at }
//!
//! ProvenanceLedger --(AgentActivity)--> AgentDirectory
//! DocumentVault    --(TokenHolders)---> AccessTokenRegistry
//! ```

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod substrate;
pub mod telemetry;
pub mod view;

pub use config::{ConfigError, LogConfig, SubstrateConfig};
pub use error::{ServiceError, ServiceResult};
pub use substrate::{Session, Substrate};
pub use telemetry::init_tracing;
pub use view::{AccessView, AgentsView, LedgerView, VaultView};

pub use lineage_access::TokenPolicy;
pub use lineage_attest::{AuditReport, InputCommitment, TraceDocument};
pub use lineage_ledger::{DerivativeRequest, LedgerStatistics, RecordQuery};
pub use lineage_vault::UploadRequest;
