use crate::codec::ActionKind;
use crate::codec::ProposalForm;
use crate::proposal::ContextVariable;
use crate::proposal::Proposal;

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
pub const MAX_NOTICES: usize = 64;

/// Identity facts decoded from the session token; consumed read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashIdentity {
    pub context_id: String,
    pub executor_public_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    Idle,
    Polling,
    Reconciling,
}

impl PollPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Polling => "polling",
            Self::Reconciling => "reconciling",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollStatus {
    pub phase: PollPhase,
    pub ticks: u64,
    pub last_error: Option<String>,
}

impl Default for PollStatus {
    fn default() -> Self {
        Self {
            phase: PollPhase::Idle,
            ticks: 0,
            last_error: None,
        }
    }
}

/// Read-only snapshots of server-owned resources, replaced wholesale on
/// each refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProposalCache {
    pub proposals: Vec<Proposal>,
    pub proposal_count: usize,
    pub selected_approvals: Option<u32>,
    pub approvers: Vec<String>,
    pub context_variables: Vec<ContextVariable>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashSelection {
    pub selected_proposal: Option<String>,
    /// Last proposal id that produced an "executed" notice. Guards against
    /// repeat notifications across ticks; reset on every new selection.
    pub last_executed_notice: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

impl NoticeLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Every editable slot in the create-proposal form. Argument rows are
/// addressed by index so the focus order can grow with the row list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    ActionKind,
    ReceiverId,
    Amount,
    ContractId,
    MethodName,
    ArgumentKey(usize),
    ArgumentValue(usize),
    Deposit,
    MinApprovals,
    MaxActiveProposals,
    ContextKey,
    ContextValue,
}

impl FormField {
    pub fn label(self) -> &'static str {
        match self {
            Self::ActionKind => "Action Type",
            Self::ReceiverId => "Receiver ID",
            Self::Amount => "Amount",
            Self::ContractId => "Contract ID",
            Self::MethodName => "Method Name",
            Self::ArgumentKey(_) => "Argument Key",
            Self::ArgumentValue(_) => "Argument Value",
            Self::Deposit => "Deposit",
            Self::MinApprovals => "Number of Approvals",
            Self::MaxActiveProposals => "Active Proposals Limit",
            Self::ContextKey => "Context Key",
            Self::ContextValue => "Context Value",
        }
    }
}

/// Focus order for the currently selected action kind. The kind selector
/// always comes first; the remaining slots are the kind's own fields.
pub fn form_fields(form: &ProposalForm) -> Vec<FormField> {
    let mut fields = vec![FormField::ActionKind];
    match ActionKind::from_label(form.action_kind.as_str()) {
        Some(ActionKind::CrossContractCall) => {
            fields.push(FormField::ContractId);
            fields.push(FormField::MethodName);
            fields.push(FormField::Deposit);
            for index in 0..form.arguments.len() {
                fields.push(FormField::ArgumentKey(index));
                fields.push(FormField::ArgumentValue(index));
            }
        }
        Some(ActionKind::Transfer) => {
            fields.push(FormField::ReceiverId);
            fields.push(FormField::Amount);
        }
        Some(ActionKind::SetContextVariable) => {
            fields.push(FormField::ContextKey);
            fields.push(FormField::ContextValue);
        }
        Some(ActionKind::ChangeApprovalsNeeded) => {
            fields.push(FormField::MinApprovals);
        }
        Some(ActionKind::ChangeMaxActiveProposals) => {
            fields.push(FormField::MaxActiveProposals);
        }
        None => {}
    }
    fields
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashForm {
    pub open: bool,
    pub form: ProposalForm,
    pub focus: usize,
    pub submitting: bool,
}

impl Default for DashForm {
    fn default() -> Self {
        Self {
            open: false,
            form: ProposalForm::default(),
            focus: 0,
            submitting: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashState {
    pub identity: DashIdentity,
    pub cache: ProposalCache,
    pub selection: DashSelection,
    pub poll: PollStatus,
    pub form: DashForm,
    pub notices: Vec<Notice>,
}

impl DashState {
    pub fn new(identity: DashIdentity) -> Self {
        Self {
            identity,
            cache: ProposalCache::default(),
            selection: DashSelection::default(),
            poll: PollStatus::default(),
            form: DashForm::default(),
            notices: Vec::new(),
        }
    }

    pub fn selected_proposal(&self) -> Option<&Proposal> {
        let id = self.selection.selected_proposal.as_deref()?;
        self.cache.proposals.iter().find(|proposal| proposal.id == id)
    }

    pub fn is_author(&self, proposal: &Proposal) -> bool {
        proposal.author_id == self.identity.executor_public_key
    }

    pub fn push_notice(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
        if self.notices.len() > MAX_NOTICES {
            let excess = self.notices.len() - MAX_NOTICES;
            self.notices.drain(0..excess);
        }
    }
}
