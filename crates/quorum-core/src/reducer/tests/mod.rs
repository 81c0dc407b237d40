pub(super) use super::reduce;
pub(super) use super::DashEffect;
pub(super) use crate::actions::DashAction;
pub(super) use crate::actions::RuntimeAction;
pub(super) use crate::actions::UserAction;
pub(super) use crate::codec::ActionKind;
pub(super) use crate::proposal::ApprovalsCount;
pub(super) use crate::proposal::Proposal;
pub(super) use crate::proposal::ProposalAction;
pub(super) use crate::state::DashIdentity;
pub(super) use crate::state::DashState;
pub(super) use crate::state::NoticeLevel;
pub(super) use crate::state::PollPhase;

mod poll_cycle;
mod selection_reconcile;

pub(super) const MY_KEY: &str = "my-executor-key";

fn state() -> DashState {
    DashState::new(DashIdentity {
        context_id: "ctx-1".to_string(),
        executor_public_key: MY_KEY.to_string(),
    })
}

fn proposal(id: &str, author: &str) -> Proposal {
    Proposal {
        id: id.to_string(),
        author_id: author.to_string(),
        actions: vec![ProposalAction::Transfer {
            receiver_id: "treasury".to_string(),
            amount: 100,
        }],
    }
}

fn run_user(state: &mut DashState, action: UserAction) -> Vec<DashEffect> {
    reduce(state, DashAction::User(action))
}

fn run_runtime(state: &mut DashState, action: RuntimeAction) -> Vec<DashEffect> {
    reduce(state, DashAction::Runtime(action))
}

fn alerts(effects: &[DashEffect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            DashEffect::Alert(message) => Some(message.clone()),
            _ => None,
        })
        .collect()
}
