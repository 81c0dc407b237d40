use serde::Deserialize;
use serde::Serialize;

use quorum_core::proposal::ContextVariable;
use quorum_core::proposal::ProposalAction;

/// Admin-api responses wrap their payload in a `data` field. A missing or
/// null `data` on a success status means an empty result, not an error.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

/// Body for proposal creation. Unrecognized actions cannot be proposed, so
/// construction from an action is fallible.
#[derive(Debug, Clone, Serialize)]
pub struct CreateProposalRequest {
    pub action_type: String,
    pub params: serde_json::Value,
}

impl CreateProposalRequest {
    pub fn from_action(action: &ProposalAction) -> Option<Self> {
        if matches!(action, ProposalAction::Unrecognized { .. }) {
            return None;
        }
        let wire = serde_json::to_value(action).ok()?;
        let params = wire.get("params").cloned()?;
        Some(Self {
            action_type: action.scope().to_string(),
            params,
        })
    }
}

/// Context storage entries arrive as raw byte arrays on both sides.
#[derive(Debug, Clone, Deserialize)]
pub struct RawContextVariable {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl RawContextVariable {
    pub fn decode(&self) -> ContextVariable {
        ContextVariable::from_raw(&self.key, &self.value)
    }
}
