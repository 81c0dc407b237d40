use crate::proposal::ApprovalsCount;
use crate::proposal::ContextVariable;
use crate::proposal::Proposal;

#[derive(Debug, Clone)]
pub enum DashAction {
    User(UserAction),
    Runtime(RuntimeAction),
}

/// Interactive input from the dashboard.
#[derive(Debug, Clone)]
pub enum UserAction {
    SelectProposal(Option<String>),
    SelectNextProposal,
    SelectPrevProposal,
    OpenProposalForm,
    CloseProposalForm,
    FormNextField,
    FormPrevField,
    FormKindNext,
    FormKindPrev,
    FormInput(char),
    FormBackspace,
    FormAddArgument,
    FormRemoveArgument,
    SubmitProposalForm,
    DeleteSelectedProposal,
    RefreshContextVariables,
}

/// Results arriving from the poller and from one-shot client commands.
#[derive(Debug, Clone)]
pub enum RuntimeAction {
    PollTickStarted,
    ProposalsRefreshed(Vec<Proposal>),
    ProposalCountRefreshed(usize),
    ApprovalsRefreshed(ApprovalsCount),
    ApproversRefreshed {
        proposal_id: String,
        approvers: Vec<String>,
    },
    ContextVariablesRefreshed(Vec<ContextVariable>),
    PollTickFinished,
    ProposalSubmitted,
    ProposalDeleted {
        proposal_id: String,
    },
    /// A background refresh step failed; recorded, surfaced on the status
    /// line, and retried implicitly by the next tick.
    OperationFailed {
        operation: &'static str,
        message: String,
    },
    /// A user-triggered command failed; surfaced as a blocking alert.
    CommandFailed {
        operation: &'static str,
        message: String,
    },
}
