//! Notification stream for external indexers and frontends.
//!
//! Components publish; nobody is required to listen.

use crate::{
    Cid, ComponentAddress, Did, Digest, DocumentId, Principal, ProvenanceRecord, RecordId, TokenId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default broadcast buffer size.
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 1024;

/// A state change worth telling the outside world about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    TokenMinted {
        previous_holder: Option<Principal>,
        new_holder: Principal,
        token_id: TokenId,
        document_ref: Cid,
    },
    AgentRegistered {
        did: Did,
        owner: Principal,
        name: String,
    },
    AgentDeactivated {
        did: Did,
    },
    AgentReactivated {
        did: Did,
    },
    DerivativeRecorded {
        record_id: RecordId,
        record: Box<ProvenanceRecord>,
    },
    AgentDirectoryWired {
        directory: ComponentAddress,
    },
    AccessRegistryWired {
        registry: ComponentAddress,
    },
    DocumentUploaded {
        document_id: DocumentId,
        uploader: Principal,
        token_id: TokenId,
        cid: Cid,
        document_hash: Digest,
        file_name: String,
    },
    DocumentVerified {
        document_id: DocumentId,
        verifier: Principal,
        valid: bool,
    },
}

/// A published notification with its origin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEnvelope {
    pub event_id: String,
    pub emitted_at: DateTime<Utc>,
    pub source: ComponentAddress,
    pub notification: Notification,
}

/// Broadcast publisher shared by every component of one deployment.
#[derive(Clone, Debug)]
pub struct Notifier {
    sender: broadcast::Sender<NotificationEnvelope>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish a notification. Having no subscribers is not an error.
    pub fn publish(
        &self,
        source: &ComponentAddress,
        emitted_at: DateTime<Utc>,
        notification: Notification,
    ) -> NotificationEnvelope {
        let envelope = NotificationEnvelope {
            event_id: format!("evt-{}", uuid::Uuid::new_v4()),
            emitted_at,
            source: source.clone(),
            notification,
        };
        let _ = self.sender.send(envelope.clone());
        envelope
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEnvelope> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_CAPACITY)
    }
}
