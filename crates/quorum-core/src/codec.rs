use std::fmt;

use crate::proposal::decode_display_bytes;
use crate::proposal::ProposalAction;

/// The five action kinds a proposal form can submit, keyed by the
/// human-readable labels the dropdown shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    CrossContractCall,
    Transfer,
    SetContextVariable,
    ChangeApprovalsNeeded,
    ChangeMaxActiveProposals,
}

pub const ACTION_KINDS: [ActionKind; 5] = [
    ActionKind::CrossContractCall,
    ActionKind::Transfer,
    ActionKind::SetContextVariable,
    ActionKind::ChangeApprovalsNeeded,
    ActionKind::ChangeMaxActiveProposals,
];

impl ActionKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::CrossContractCall => "Cross contract call",
            Self::Transfer => "Transfer",
            Self::SetContextVariable => "Set context variable",
            Self::ChangeApprovalsNeeded => "Change number of approvals needed",
            Self::ChangeMaxActiveProposals => "Change number of maximum active proposals",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        ACTION_KINDS.iter().copied().find(|kind| kind.label() == label)
    }

    pub fn next(self) -> Self {
        match self {
            Self::CrossContractCall => Self::Transfer,
            Self::Transfer => Self::SetContextVariable,
            Self::SetContextVariable => Self::ChangeApprovalsNeeded,
            Self::ChangeApprovalsNeeded => Self::ChangeMaxActiveProposals,
            Self::ChangeMaxActiveProposals => Self::CrossContractCall,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::CrossContractCall => Self::ChangeMaxActiveProposals,
            Self::Transfer => Self::CrossContractCall,
            Self::SetContextVariable => Self::Transfer,
            Self::ChangeApprovalsNeeded => Self::SetContextVariable,
            Self::ChangeMaxActiveProposals => Self::ChangeApprovalsNeeded,
        }
    }
}

/// Flat form state shared by every action kind; each kind reads only the
/// fields relevant to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalForm {
    pub action_kind: String,
    pub receiver_id: String,
    pub amount: String,
    pub contract_id: String,
    pub method_name: String,
    pub arguments: Vec<ArgumentRow>,
    pub deposit: String,
    pub min_approvals: String,
    pub max_active_proposals: String,
    pub context_key: String,
    pub context_value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentRow {
    pub key: String,
    pub value: String,
}

impl Default for ProposalForm {
    fn default() -> Self {
        Self {
            action_kind: ActionKind::CrossContractCall.label().to_string(),
            receiver_id: String::new(),
            amount: String::new(),
            contract_id: String::new(),
            method_name: String::new(),
            arguments: vec![ArgumentRow::default()],
            deposit: String::new(),
            min_approvals: String::new(),
            max_active_proposals: String::new(),
            context_key: String::new(),
            context_value: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    InvalidActionKind(String),
    InvalidNumber {
        field: &'static str,
        value: String,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidActionKind(label) => write!(f, "invalid action type: {label}"),
            Self::InvalidNumber { field, value } => {
                write!(f, "{field} must be a number, got {value:?}")
            }
        }
    }
}

impl std::error::Error for CodecError {}

/// Maps the selected label plus the relevant form fields onto exactly one
/// action variant. Never produces a partially-built action: any failure
/// returns before a variant is constructed.
pub fn encode(form: &ProposalForm) -> Result<ProposalAction, CodecError> {
    let kind = ActionKind::from_label(form.action_kind.as_str())
        .ok_or_else(|| CodecError::InvalidActionKind(form.action_kind.clone()))?;

    let action = match kind {
        ActionKind::CrossContractCall => ProposalAction::ExternalFunctionCall {
            receiver_id: form.contract_id.clone(),
            method_name: form.method_name.clone(),
            args: collect_args(&form.arguments),
            deposit: parse_number(&form.deposit, "deposit")?,
            gas: 0,
        },
        ActionKind::Transfer => ProposalAction::Transfer {
            receiver_id: form.receiver_id.clone(),
            amount: parse_number(&form.amount, "amount")?,
        },
        ActionKind::SetContextVariable => ProposalAction::SetContextValue {
            key: form.context_key.as_bytes().to_vec(),
            value: form.context_value.as_bytes().to_vec(),
        },
        ActionKind::ChangeApprovalsNeeded => ProposalAction::SetNumApprovals {
            num_approvals: parse_number(&form.min_approvals, "number of approvals")?,
        },
        ActionKind::ChangeMaxActiveProposals => ProposalAction::SetActiveProposalsLimit {
            active_proposals_limit: parse_number(
                &form.max_active_proposals,
                "active proposals limit",
            )?,
        },
    };
    Ok(action)
}

/// Non-empty key/value rows collapse into a single JSON-object string.
fn collect_args(rows: &[ArgumentRow]) -> String {
    let mut object = serde_json::Map::new();
    for row in rows {
        if !row.key.is_empty() && !row.value.is_empty() {
            object.insert(
                row.key.clone(),
                serde_json::Value::String(row.value.clone()),
            );
        }
    }
    serde_json::Value::Object(object).to_string()
}

fn parse_number<T: std::str::FromStr>(text: &str, field: &'static str) -> Result<T, CodecError> {
    let text = text.trim();
    if text.is_empty() {
        return "0".parse().map_err(|_| CodecError::InvalidNumber {
            field,
            value: text.to_string(),
        });
    }
    text.parse().map_err(|_| CodecError::InvalidNumber {
        field,
        value: text.to_string(),
    })
}

/// Column labels for the tabular action view; the count is fixed per
/// variant (3/3/2/2/5, one column for scopes we cannot interpret).
pub fn action_headers(action: &ProposalAction) -> Vec<&'static str> {
    match action {
        ProposalAction::Transfer { .. } => vec!["Scope", "Amount", "Receiver ID"],
        ProposalAction::SetContextValue { .. } => vec!["Scope", "Key", "Value"],
        ProposalAction::SetActiveProposalsLimit { .. } => {
            vec!["Scope", "Active Proposals Limit"]
        }
        ProposalAction::SetNumApprovals { .. } => vec!["Scope", "Number of Approvals"],
        ProposalAction::ExternalFunctionCall { .. } => {
            vec!["Scope", "Receiver ID", "Method", "Deposit", "Gas"]
        }
        ProposalAction::Unrecognized { .. } => vec!["Scope"],
    }
}

/// Display values matching `action_headers` column for column.
pub fn action_values(action: &ProposalAction) -> Vec<String> {
    match action {
        ProposalAction::Transfer {
            receiver_id,
            amount,
        } => vec![
            action.scope().to_string(),
            amount.to_string(),
            receiver_id.clone(),
        ],
        ProposalAction::SetContextValue { key, value } => vec![
            action.scope().to_string(),
            decode_display_bytes(key),
            decode_display_bytes(value),
        ],
        ProposalAction::SetActiveProposalsLimit {
            active_proposals_limit,
        } => vec![action.scope().to_string(), active_proposals_limit.to_string()],
        ProposalAction::SetNumApprovals { num_approvals } => {
            vec![action.scope().to_string(), num_approvals.to_string()]
        }
        ProposalAction::ExternalFunctionCall {
            receiver_id,
            method_name,
            deposit,
            gas,
            ..
        } => vec![
            action.scope().to_string(),
            receiver_id.clone(),
            method_name.clone(),
            deposit.to_string(),
            gas.to_string(),
        ],
        ProposalAction::Unrecognized { scope } => vec![scope.clone()],
    }
}

pub fn column_count(action: &ProposalAction) -> usize {
    action_headers(action).len()
}
