use super::*;
use pretty_assertions::assert_eq;

fn select(state: &mut DashState, id: &str) {
    run_user(state, UserAction::SelectProposal(Some(id.to_string())));
}

#[test]
fn executed_proposal_raises_exactly_one_alert() {
    let mut state = state();
    state.cache.proposals = vec![proposal("P1", MY_KEY), proposal("P2", "other")];
    select(&mut state, "P1");

    let effects = run_runtime(
        &mut state,
        RuntimeAction::ProposalsRefreshed(vec![proposal("P2", "other")]),
    );

    assert_eq!(
        alerts(&effects),
        vec!["Proposal with id: P1 was executed".to_string()]
    );
    assert_eq!(state.selection.selected_proposal, None);
    assert_eq!(
        state.selection.last_executed_notice.as_deref(),
        Some("P1")
    );
    assert_eq!(state.cache.proposals.len(), 1);
}

#[test]
fn repeated_refreshes_stay_silent_after_the_first_alert() {
    let mut state = state();
    state.cache.proposals = vec![proposal("P1", MY_KEY)];
    select(&mut state, "P1");

    let first = run_runtime(&mut state, RuntimeAction::ProposalsRefreshed(Vec::new()));
    assert_eq!(alerts(&first).len(), 1);

    let second = run_runtime(&mut state, RuntimeAction::ProposalsRefreshed(Vec::new()));
    let third = run_runtime(&mut state, RuntimeAction::ProposalsRefreshed(Vec::new()));
    assert!(alerts(&second).is_empty());
    assert!(alerts(&third).is_empty());
    assert_eq!(state.notices.len(), 1);
}

#[test]
fn surviving_selection_is_left_alone() {
    let mut state = state();
    state.cache.proposals = vec![proposal("P1", MY_KEY), proposal("P2", "other")];
    select(&mut state, "P2");

    let effects = run_runtime(
        &mut state,
        RuntimeAction::ProposalsRefreshed(vec![proposal("P2", "other")]),
    );

    assert!(alerts(&effects).is_empty());
    assert_eq!(state.selection.selected_proposal.as_deref(), Some("P2"));
}

#[test]
fn new_selection_rearms_the_executed_notice() {
    let mut state = state();
    state.cache.proposals = vec![proposal("P1", MY_KEY), proposal("P2", "other")];
    select(&mut state, "P1");
    run_runtime(
        &mut state,
        RuntimeAction::ProposalsRefreshed(vec![proposal("P2", "other")]),
    );
    assert_eq!(
        state.selection.last_executed_notice.as_deref(),
        Some("P1")
    );

    select(&mut state, "P2");
    assert_eq!(state.selection.last_executed_notice, None);

    let effects = run_runtime(&mut state, RuntimeAction::ProposalsRefreshed(Vec::new()));
    assert_eq!(
        alerts(&effects),
        vec!["Proposal with id: P2 was executed".to_string()]
    );
}

#[test]
fn reconcile_without_selection_is_a_plain_refresh() {
    let mut state = state();
    let effects = run_runtime(
        &mut state,
        RuntimeAction::ProposalsRefreshed(vec![proposal("P1", MY_KEY)]),
    );

    assert!(alerts(&effects).is_empty());
    assert_eq!(state.cache.proposals.len(), 1);
    assert!(state.notices.is_empty());
}

#[test]
fn selecting_a_proposal_clears_stale_approval_data() {
    let mut state = state();
    state.cache.proposals = vec![proposal("P1", MY_KEY), proposal("P2", "other")];
    select(&mut state, "P1");
    state.cache.selected_approvals = Some(3);
    state.cache.approvers = vec!["alice".to_string()];

    let effects = run_user(
        &mut state,
        UserAction::SelectProposal(Some("P2".to_string())),
    );

    assert_eq!(state.cache.selected_approvals, None);
    assert!(state.cache.approvers.is_empty());
    assert!(effects.contains(&DashEffect::SelectionChanged(Some("P2".to_string()))));
}

#[test]
fn next_and_prev_walk_the_cached_order() {
    let mut state = state();
    state.cache.proposals = vec![
        proposal("P1", MY_KEY),
        proposal("P2", "other"),
        proposal("P3", "other"),
    ];

    run_user(&mut state, UserAction::SelectNextProposal);
    assert_eq!(state.selection.selected_proposal.as_deref(), Some("P1"));

    run_user(&mut state, UserAction::SelectNextProposal);
    assert_eq!(state.selection.selected_proposal.as_deref(), Some("P2"));

    run_user(&mut state, UserAction::SelectPrevProposal);
    assert_eq!(state.selection.selected_proposal.as_deref(), Some("P1"));

    run_user(&mut state, UserAction::SelectPrevProposal);
    assert_eq!(state.selection.selected_proposal.as_deref(), Some("P3"));
}

#[test]
fn deleting_someone_elses_proposal_is_refused() {
    let mut state = state();
    state.cache.proposals = vec![proposal("P1", "other")];
    select(&mut state, "P1");

    let effects = run_user(&mut state, UserAction::DeleteSelectedProposal);

    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, DashEffect::DeleteProposal { .. })));
    assert_eq!(state.notices.last().unwrap().level, NoticeLevel::Error);
}

#[test]
fn author_delete_emits_the_effect() {
    let mut state = state();
    state.cache.proposals = vec![proposal("P1", MY_KEY)];
    select(&mut state, "P1");

    let effects = run_user(&mut state, UserAction::DeleteSelectedProposal);

    assert!(effects.contains(&DashEffect::DeleteProposal {
        proposal_id: "P1".to_string()
    }));
}

#[test]
fn deletion_confirmation_clears_matching_selection() {
    let mut state = state();
    state.cache.proposals = vec![proposal("P1", MY_KEY)];
    select(&mut state, "P1");

    let effects = run_runtime(
        &mut state,
        RuntimeAction::ProposalDeleted {
            proposal_id: "P1".to_string(),
        },
    );

    assert_eq!(state.selection.selected_proposal, None);
    assert!(effects.contains(&DashEffect::SelectionChanged(None)));
}
