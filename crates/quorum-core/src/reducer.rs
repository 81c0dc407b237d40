use crate::actions::DashAction;
use crate::actions::RuntimeAction;
use crate::actions::UserAction;
use crate::codec::encode;
use crate::codec::ActionKind;
use crate::codec::ArgumentRow;
use crate::proposal::Proposal;
use crate::proposal::ProposalAction;
use crate::state::form_fields;
use crate::state::DashForm;
use crate::state::DashState;
use crate::state::FormField;
use crate::state::NoticeLevel;
use crate::state::PollPhase;

/// Side effects the reducer asks the host loop to perform. The reducer
/// itself never does I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashEffect {
    RequestFrame,
    /// Blocking user-visible notification.
    Alert(String),
    SubmitProposal(ProposalAction),
    DeleteProposal { proposal_id: String },
    FetchContextVariables,
    /// The selected proposal identity changed; the poller observes this to
    /// schedule an immediate refresh for the new selection.
    SelectionChanged(Option<String>),
}

pub fn reduce(state: &mut DashState, action: DashAction) -> Vec<DashEffect> {
    match action {
        DashAction::User(user) => reduce_user(state, user),
        DashAction::Runtime(runtime) => reduce_runtime(state, runtime),
    }
}

fn reduce_user(state: &mut DashState, action: UserAction) -> Vec<DashEffect> {
    match action {
        UserAction::SelectProposal(id) => select_proposal(state, id),
        UserAction::SelectNextProposal => {
            let next = neighbor_proposal(state, 1);
            select_proposal(state, next)
        }
        UserAction::SelectPrevProposal => {
            let prev = neighbor_proposal(state, -1);
            select_proposal(state, prev)
        }
        UserAction::OpenProposalForm => {
            state.form = DashForm {
                open: true,
                ..DashForm::default()
            };
            vec![DashEffect::RequestFrame]
        }
        UserAction::CloseProposalForm => {
            state.form.open = false;
            vec![DashEffect::RequestFrame]
        }
        UserAction::FormNextField => {
            let fields = form_fields(&state.form.form);
            if !fields.is_empty() {
                state.form.focus = (state.form.focus + 1) % fields.len();
            }
            vec![DashEffect::RequestFrame]
        }
        UserAction::FormPrevField => {
            let fields = form_fields(&state.form.form);
            if !fields.is_empty() {
                state.form.focus = if state.form.focus == 0 {
                    fields.len() - 1
                } else {
                    state.form.focus - 1
                };
            }
            vec![DashEffect::RequestFrame]
        }
        UserAction::FormKindNext => cycle_form_kind(state, true),
        UserAction::FormKindPrev => cycle_form_kind(state, false),
        UserAction::FormInput(ch) => {
            if let Some(field) = focused_field_mut(state) {
                field.push(ch);
            }
            vec![DashEffect::RequestFrame]
        }
        UserAction::FormBackspace => {
            if let Some(field) = focused_field_mut(state) {
                field.pop();
            }
            vec![DashEffect::RequestFrame]
        }
        UserAction::FormAddArgument => {
            if current_kind(state) == Some(ActionKind::CrossContractCall) {
                state.form.form.arguments.push(ArgumentRow::default());
                let index = state.form.form.arguments.len() - 1;
                let fields = form_fields(&state.form.form);
                if let Some(position) = fields
                    .iter()
                    .position(|field| *field == FormField::ArgumentKey(index))
                {
                    state.form.focus = position;
                }
            }
            vec![DashEffect::RequestFrame]
        }
        UserAction::FormRemoveArgument => {
            if state.form.form.arguments.len() > 1 {
                state.form.form.arguments.pop();
                let fields = form_fields(&state.form.form);
                if state.form.focus >= fields.len() {
                    state.form.focus = fields.len().saturating_sub(1);
                }
            }
            vec![DashEffect::RequestFrame]
        }
        UserAction::SubmitProposalForm => match encode(&state.form.form) {
            Ok(action) => {
                state.form.submitting = true;
                vec![
                    DashEffect::SubmitProposal(action),
                    DashEffect::RequestFrame,
                ]
            }
            Err(err) => {
                let message = err.to_string();
                state.push_notice(NoticeLevel::Error, message.clone());
                vec![DashEffect::Alert(message), DashEffect::RequestFrame]
            }
        },
        UserAction::DeleteSelectedProposal => {
            let Some(proposal) = state.selected_proposal().cloned() else {
                return vec![DashEffect::RequestFrame];
            };
            if state.is_author(&proposal) {
                vec![
                    DashEffect::DeleteProposal {
                        proposal_id: proposal.id,
                    },
                    DashEffect::RequestFrame,
                ]
            } else {
                state.push_notice(
                    NoticeLevel::Error,
                    "only the proposal author can delete it",
                );
                vec![DashEffect::RequestFrame]
            }
        }
        UserAction::RefreshContextVariables => {
            vec![DashEffect::FetchContextVariables, DashEffect::RequestFrame]
        }
    }
}

fn reduce_runtime(state: &mut DashState, action: RuntimeAction) -> Vec<DashEffect> {
    match action {
        RuntimeAction::PollTickStarted => {
            state.poll.phase = PollPhase::Polling;
            state.poll.ticks = state.poll.ticks.saturating_add(1);
            vec![DashEffect::RequestFrame]
        }
        RuntimeAction::ProposalsRefreshed(proposals) => {
            state.poll.phase = PollPhase::Reconciling;
            let mut effects = reconcile_selection(state, &proposals);
            state.cache.proposals = proposals;
            effects.push(DashEffect::RequestFrame);
            effects
        }
        RuntimeAction::ProposalCountRefreshed(count) => {
            state.cache.proposal_count = count;
            vec![DashEffect::RequestFrame]
        }
        RuntimeAction::ApprovalsRefreshed(approvals) => {
            if state.selection.selected_proposal.as_deref() == Some(approvals.proposal_id.as_str())
            {
                state.cache.selected_approvals = Some(approvals.num_approvals);
            }
            vec![DashEffect::RequestFrame]
        }
        RuntimeAction::ApproversRefreshed {
            proposal_id,
            approvers,
        } => {
            if state.selection.selected_proposal.as_deref() == Some(proposal_id.as_str()) {
                state.cache.approvers = approvers;
            }
            vec![DashEffect::RequestFrame]
        }
        RuntimeAction::ContextVariablesRefreshed(variables) => {
            state.cache.context_variables = variables;
            vec![DashEffect::RequestFrame]
        }
        RuntimeAction::PollTickFinished => {
            state.poll.phase = PollPhase::Idle;
            vec![DashEffect::RequestFrame]
        }
        RuntimeAction::ProposalSubmitted => {
            state.form.submitting = false;
            state.form.open = false;
            state.push_notice(NoticeLevel::Info, "Proposal created successfully");
            vec![
                DashEffect::Alert("Proposal created successfully".to_string()),
                DashEffect::RequestFrame,
            ]
        }
        RuntimeAction::ProposalDeleted { proposal_id } => {
            state.push_notice(
                NoticeLevel::Info,
                format!("Proposal {proposal_id} deleted"),
            );
            let mut effects = Vec::new();
            if state.selection.selected_proposal.as_deref() == Some(proposal_id.as_str()) {
                clear_selection(state);
                effects.push(DashEffect::SelectionChanged(None));
            }
            effects.push(DashEffect::RequestFrame);
            effects
        }
        RuntimeAction::OperationFailed { operation, message } => {
            state.poll.last_error = Some(format!("{operation}: {message}"));
            vec![DashEffect::RequestFrame]
        }
        RuntimeAction::CommandFailed { operation, message } => {
            state.form.submitting = false;
            let message = format!("{operation}: {message}");
            state.push_notice(NoticeLevel::Error, message.clone());
            vec![DashEffect::Alert(message), DashEffect::RequestFrame]
        }
    }
}

/// Detects that the selected proposal vanished from the server list, which
/// means it was executed (or deleted) out-of-band. Fires at most one alert
/// per selected id: the marker survives until a new proposal is selected.
fn reconcile_selection(state: &mut DashState, refreshed: &[Proposal]) -> Vec<DashEffect> {
    let Some(selected) = state.selection.selected_proposal.clone() else {
        return Vec::new();
    };
    let still_exists = refreshed.iter().any(|proposal| proposal.id == selected);
    if still_exists {
        return Vec::new();
    }
    if state.selection.last_executed_notice.as_deref() == Some(selected.as_str()) {
        return Vec::new();
    }

    let message = format!("Proposal with id: {selected} was executed");
    state.push_notice(NoticeLevel::Info, message.clone());
    state.selection.last_executed_notice = Some(selected);
    clear_selection(state);
    vec![
        DashEffect::Alert(message),
        DashEffect::SelectionChanged(None),
    ]
}

fn clear_selection(state: &mut DashState) {
    state.selection.selected_proposal = None;
    state.cache.selected_approvals = None;
    state.cache.approvers.clear();
}

fn select_proposal(state: &mut DashState, id: Option<String>) -> Vec<DashEffect> {
    if state.selection.selected_proposal == id {
        return vec![DashEffect::RequestFrame];
    }
    // Approvals and approvers belong to the previous selection; drop them
    // until the next tick refreshes the new one.
    state.cache.selected_approvals = None;
    state.cache.approvers.clear();
    if id.is_some() {
        state.selection.last_executed_notice = None;
    }
    state.selection.selected_proposal = id.clone();
    vec![DashEffect::SelectionChanged(id), DashEffect::RequestFrame]
}

fn neighbor_proposal(state: &DashState, step: isize) -> Option<String> {
    let proposals = &state.cache.proposals;
    if proposals.is_empty() {
        return None;
    }
    let current = state
        .selection
        .selected_proposal
        .as_deref()
        .and_then(|id| proposals.iter().position(|proposal| proposal.id == id));
    let index = match current {
        Some(index) => {
            let len = proposals.len() as isize;
            ((index as isize + step).rem_euclid(len)) as usize
        }
        None => {
            if step >= 0 {
                0
            } else {
                proposals.len() - 1
            }
        }
    };
    Some(proposals[index].id.clone())
}

fn current_kind(state: &DashState) -> Option<ActionKind> {
    ActionKind::from_label(state.form.form.action_kind.as_str())
}

fn cycle_form_kind(state: &mut DashState, forward: bool) -> Vec<DashEffect> {
    if let Some(kind) = current_kind(state) {
        let next = if forward { kind.next() } else { kind.prev() };
        state.form.form.action_kind = next.label().to_string();
        state.form.focus = 0;
    }
    vec![DashEffect::RequestFrame]
}

fn focused_field_mut(state: &mut DashState) -> Option<&mut String> {
    let fields = form_fields(&state.form.form);
    let field = fields.get(state.form.focus)?;
    let form = &mut state.form.form;
    match field {
        FormField::ActionKind => None,
        FormField::ReceiverId => Some(&mut form.receiver_id),
        FormField::Amount => Some(&mut form.amount),
        FormField::ContractId => Some(&mut form.contract_id),
        FormField::MethodName => Some(&mut form.method_name),
        FormField::ArgumentKey(index) => form.arguments.get_mut(*index).map(|row| &mut row.key),
        FormField::ArgumentValue(index) => {
            form.arguments.get_mut(*index).map(|row| &mut row.value)
        }
        FormField::Deposit => Some(&mut form.deposit),
        FormField::MinApprovals => Some(&mut form.min_approvals),
        FormField::MaxActiveProposals => Some(&mut form.max_active_proposals),
        FormField::ContextKey => Some(&mut form.context_key),
        FormField::ContextValue => Some(&mut form.context_value),
    }
}

#[cfg(test)]
mod tests;
