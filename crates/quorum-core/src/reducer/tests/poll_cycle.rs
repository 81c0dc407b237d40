use super::*;
use pretty_assertions::assert_eq;

#[test]
fn tick_walks_through_poll_phases() {
    let mut state = state();
    assert_eq!(state.poll.phase, PollPhase::Idle);

    run_runtime(&mut state, RuntimeAction::PollTickStarted);
    assert_eq!(state.poll.phase, PollPhase::Polling);
    assert_eq!(state.poll.ticks, 1);

    run_runtime(&mut state, RuntimeAction::ProposalsRefreshed(Vec::new()));
    assert_eq!(state.poll.phase, PollPhase::Reconciling);

    run_runtime(&mut state, RuntimeAction::PollTickFinished);
    assert_eq!(state.poll.phase, PollPhase::Idle);
}

#[test]
fn count_refresh_is_applied_verbatim() {
    let mut state = state();
    state.cache.proposals = vec![proposal("P1", MY_KEY)];

    run_runtime(&mut state, RuntimeAction::ProposalCountRefreshed(7));

    // The server count may disagree with the cached page on a racy tick.
    assert_eq!(state.cache.proposal_count, 7);
    assert_eq!(state.cache.proposals.len(), 1);
}

#[test]
fn approvals_for_the_current_selection_are_applied() {
    let mut state = state();
    state.cache.proposals = vec![proposal("P1", MY_KEY)];
    run_user(
        &mut state,
        UserAction::SelectProposal(Some("P1".to_string())),
    );

    run_runtime(
        &mut state,
        RuntimeAction::ApprovalsRefreshed(ApprovalsCount {
            proposal_id: "P1".to_string(),
            num_approvals: 2,
        }),
    );
    run_runtime(
        &mut state,
        RuntimeAction::ApproversRefreshed {
            proposal_id: "P1".to_string(),
            approvers: vec!["alice".to_string(), "bob".to_string()],
        },
    );

    assert_eq!(state.cache.selected_approvals, Some(2));
    assert_eq!(state.cache.approvers.len(), 2);
}

#[test]
fn stale_approvals_for_a_previous_selection_are_dropped() {
    let mut state = state();
    state.cache.proposals = vec![proposal("P1", MY_KEY), proposal("P2", "other")];
    run_user(
        &mut state,
        UserAction::SelectProposal(Some("P2".to_string())),
    );

    run_runtime(
        &mut state,
        RuntimeAction::ApprovalsRefreshed(ApprovalsCount {
            proposal_id: "P1".to_string(),
            num_approvals: 5,
        }),
    );
    run_runtime(
        &mut state,
        RuntimeAction::ApproversRefreshed {
            proposal_id: "P1".to_string(),
            approvers: vec!["alice".to_string()],
        },
    );

    assert_eq!(state.cache.selected_approvals, None);
    assert!(state.cache.approvers.is_empty());
}

#[test]
fn background_failure_only_touches_the_status_line() {
    let mut state = state();

    let effects = run_runtime(
        &mut state,
        RuntimeAction::OperationFailed {
            operation: "list proposals",
            message: "connection refused".to_string(),
        },
    );

    assert!(alerts(&effects).is_empty());
    assert!(state.notices.is_empty());
    assert_eq!(
        state.poll.last_error.as_deref(),
        Some("list proposals: connection refused")
    );
}

#[test]
fn command_failure_alerts_and_unblocks_the_form() {
    let mut state = state();
    state.form.submitting = true;

    let effects = run_runtime(
        &mut state,
        RuntimeAction::CommandFailed {
            operation: "create proposal",
            message: "500".to_string(),
        },
    );

    assert!(!state.form.submitting);
    assert_eq!(alerts(&effects), vec!["create proposal: 500".to_string()]);
    assert_eq!(state.notices.last().unwrap().level, NoticeLevel::Error);
}
