use crate::store::QueryWindow;
use chrono::{DateTime, Utc};
use lineage_types::{Did, Principal, ProvenanceRecord, TokenId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Query parameters for ledger search. Unset fields match everything.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RecordQuery {
    pub token_id: Option<TokenId>,
    pub agent_did: Option<Did>,
    pub executor: Option<Principal>,
    pub after: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
    /// Maximum number of results. `None` and `Some(0)` are both unbounded,
    /// as with [`QueryWindow`].
    pub limit: Option<usize>,
}

impl RecordQuery {
    /// The paging window this query's limit selects.
    pub fn window(&self) -> QueryWindow {
        QueryWindow {
            limit: self.limit.unwrap_or(0),
            offset: 0,
        }
    }

    pub fn matches(&self, record: &ProvenanceRecord) -> bool {
        if let Some(token_id) = self.token_id {
            if record.token_id != token_id {
                return false;
            }
        }

        if let Some(ref did) = self.agent_did {
            if &record.agent_did != did {
                return false;
            }
        }

        if let Some(ref executor) = self.executor {
            if &record.executor != executor {
                return false;
            }
        }

        if let Some(after) = self.after {
            if record.timestamp < after {
                return false;
            }
        }

        if let Some(before) = self.before {
            if record.timestamp > before {
                return false;
            }
        }

        true
    }
}

/// Statistics about the ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStatistics {
    pub total_records: u64,
    pub distinct_tokens: usize,
    pub records_by_agent: BTreeMap<String, u64>,
}

impl LedgerStatistics {
    pub(crate) fn from_records(records: &[ProvenanceRecord]) -> Self {
        let mut tokens = BTreeSet::new();
        let mut records_by_agent = BTreeMap::new();

        for record in records {
            tokens.insert(record.token_id);
            *records_by_agent
                .entry(record.agent_did.0.clone())
                .or_insert(0) += 1;
        }

        Self {
            total_records: records.len() as u64,
            distinct_tokens: tokens.len(),
            records_by_agent,
        }
    }
}
