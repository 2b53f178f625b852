//! Lineage Types - the shared vocabulary of the contract layer.
//!
//! Every component crate speaks in these terms:
//! - identifiers (`Principal`, `TokenId`, `RecordId`, `Did`, `Cid`, ...)
//! - fixed-size hash values (`Digest`) anchored verbatim by the ledger
//! - persisted entities (`AccessToken`, `Agent`, `ProvenanceRecord`, `StoredDocument`)
//! - the notification stream external indexers subscribe to
//! - the read-only capabilities one component grants another

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod capability;
mod context;
mod digest;
mod entity;
mod error;
mod ids;
mod notify;

pub use capability::{AgentActivity, CapabilityError, TokenHolders};
pub use context::{CallContext, Clock, ManualClock, SystemClock};
pub use digest::{Digest, DigestParseError};
pub use entity::{AccessToken, Agent, ProvenanceRecord, StoredDocument};
pub use error::ErrorKind;
pub use ids::{Cid, ComponentAddress, Did, DocumentId, Principal, RecordId, TokenId};
pub use notify::{
    Notification, NotificationEnvelope, Notifier, DEFAULT_NOTIFICATION_CAPACITY,
};
