use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

/// One governance operation attached to a proposal. The wire shape is
/// `{ "scope": <tag>, "params": { ... } }`; scopes this client does not
/// know decode to `Unrecognized` so a newer node never breaks rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposalAction {
    Transfer {
        receiver_id: String,
        amount: u64,
    },
    SetContextValue {
        key: Vec<u8>,
        value: Vec<u8>,
    },
    SetActiveProposalsLimit {
        active_proposals_limit: u32,
    },
    SetNumApprovals {
        num_approvals: u32,
    },
    ExternalFunctionCall {
        receiver_id: String,
        method_name: String,
        args: String,
        deposit: u64,
        gas: u64,
    },
    Unrecognized {
        scope: String,
    },
}

impl ProposalAction {
    pub fn scope(&self) -> &str {
        match self {
            Self::Transfer { .. } => "Transfer",
            Self::SetContextValue { .. } => "SetContextValue",
            Self::SetActiveProposalsLimit { .. } => "SetActiveProposalsLimit",
            Self::SetNumApprovals { .. } => "SetNumApprovals",
            Self::ExternalFunctionCall { .. } => "ExternalFunctionCall",
            Self::Unrecognized { scope } => scope.as_str(),
        }
    }
}

/// Known variants, in the exact wire encoding. `ProposalAction` routes its
/// serde through this so the fallback variant stays out of the wire model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "scope", content = "params")]
enum WireAction {
    Transfer {
        receiver_id: String,
        amount: u64,
    },
    SetContextValue {
        key: Vec<u8>,
        value: Vec<u8>,
    },
    SetActiveProposalsLimit {
        active_proposals_limit: u32,
    },
    SetNumApprovals {
        num_approvals: u32,
    },
    ExternalFunctionCall {
        receiver_id: String,
        method_name: String,
        args: String,
        deposit: u64,
        gas: u64,
    },
}

impl From<WireAction> for ProposalAction {
    fn from(wire: WireAction) -> Self {
        match wire {
            WireAction::Transfer {
                receiver_id,
                amount,
            } => Self::Transfer {
                receiver_id,
                amount,
            },
            WireAction::SetContextValue { key, value } => Self::SetContextValue { key, value },
            WireAction::SetActiveProposalsLimit {
                active_proposals_limit,
            } => Self::SetActiveProposalsLimit {
                active_proposals_limit,
            },
            WireAction::SetNumApprovals { num_approvals } => {
                Self::SetNumApprovals { num_approvals }
            }
            WireAction::ExternalFunctionCall {
                receiver_id,
                method_name,
                args,
                deposit,
                gas,
            } => Self::ExternalFunctionCall {
                receiver_id,
                method_name,
                args,
                deposit,
                gas,
            },
        }
    }
}

impl ProposalAction {
    fn to_wire(&self) -> Option<WireAction> {
        match self {
            Self::Transfer {
                receiver_id,
                amount,
            } => Some(WireAction::Transfer {
                receiver_id: receiver_id.clone(),
                amount: *amount,
            }),
            Self::SetContextValue { key, value } => Some(WireAction::SetContextValue {
                key: key.clone(),
                value: value.clone(),
            }),
            Self::SetActiveProposalsLimit {
                active_proposals_limit,
            } => Some(WireAction::SetActiveProposalsLimit {
                active_proposals_limit: *active_proposals_limit,
            }),
            Self::SetNumApprovals { num_approvals } => Some(WireAction::SetNumApprovals {
                num_approvals: *num_approvals,
            }),
            Self::ExternalFunctionCall {
                receiver_id,
                method_name,
                args,
                deposit,
                gas,
            } => Some(WireAction::ExternalFunctionCall {
                receiver_id: receiver_id.clone(),
                method_name: method_name.clone(),
                args: args.clone(),
                deposit: *deposit,
                gas: *gas,
            }),
            Self::Unrecognized { .. } => None,
        }
    }
}

impl Serialize for ProposalAction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.to_wire() {
            Some(wire) => wire.serialize(serializer),
            None => {
                #[derive(Serialize)]
                struct UnknownWire<'a> {
                    scope: &'a str,
                    params: serde_json::Value,
                }
                UnknownWire {
                    scope: self.scope(),
                    params: serde_json::Value::Object(serde_json::Map::new()),
                }
                .serialize(serializer)
            }
        }
    }
}

impl<'de> Deserialize<'de> for ProposalAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        match serde_json::from_value::<WireAction>(raw.clone()) {
            Ok(wire) => Ok(wire.into()),
            Err(_) => {
                let scope = raw
                    .get("scope")
                    .and_then(|scope| scope.as_str())
                    .unwrap_or("Unknown")
                    .to_string();
                Ok(Self::Unrecognized { scope })
            }
        }
    }
}

/// A server-held record of actions awaiting approval/execution. The node
/// owns the canonical copy; this struct is a read-only polled snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: String,
    pub author_id: String,
    pub actions: Vec<ProposalAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalsCount {
    pub proposal_id: String,
    pub num_approvals: u32,
}

/// A server-stored key/value pair, transmitted as byte arrays and decoded
/// lossily for display. Non-UTF-8 bytes degrade to replacement characters;
/// the stored data itself is never rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextVariable {
    pub key: String,
    pub value: String,
}

impl ContextVariable {
    pub fn from_raw(key: &[u8], value: &[u8]) -> Self {
        Self {
            key: decode_display_bytes(key),
            value: decode_display_bytes(value),
        }
    }
}

/// Renders a raw byte sequence as text. Must not panic on arbitrary or
/// truncated byte content.
pub fn decode_display_bytes(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
