use std::sync::mpsc::Sender;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::interval;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::warn;

use quorum_core::actions::RuntimeAction;

use crate::node::NodeClient;
use crate::node::PAGE_LIMIT;

/// Periodic refresh loop. Each tick snapshots the selection, fetches the
/// server-owned resources in a fixed order, and hands the results to the
/// reducer as runtime actions. A failed step is reported and skipped; the
/// rest of the tick still runs.
pub struct Poller {
    client: NodeClient,
    poll_interval: Duration,
    selection: watch::Receiver<Option<String>>,
    shutdown: CancellationToken,
}

impl Poller {
    pub fn new(
        client: NodeClient,
        poll_interval: Duration,
        selection: watch::Receiver<Option<String>>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            client,
            poll_interval,
            selection,
            shutdown,
        }
    }

    pub async fn run(mut self, events: Sender<RuntimeAction>) {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {}
                changed = self.selection.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    // A new selection refreshes right away instead of
                    // waiting out the rest of the interval.
                    ticker.reset();
                }
            }

            let selected = self.selection.borrow().clone();
            debug!(?selected, "poll tick");
            let batch = self.tick(selected).await;

            if self.shutdown.is_cancelled() {
                break;
            }
            for action in batch {
                if events.send(action).is_err() {
                    return;
                }
            }
        }
    }

    async fn tick(&self, selected: Option<String>) -> Vec<RuntimeAction> {
        let mut batch = vec![RuntimeAction::PollTickStarted];

        if let Some(proposal_id) = selected.as_deref() {
            match self.client.approvals_count(proposal_id).await {
                Ok(approvals) => batch.push(RuntimeAction::ApprovalsRefreshed(approvals)),
                Err(err) => {
                    warn!(error = %err, "approvals refresh failed");
                    batch.push(failed("fetch approvals", err));
                }
            }
        }

        match self.client.list_proposals(0, PAGE_LIMIT).await {
            Ok(proposals) => batch.push(RuntimeAction::ProposalsRefreshed(proposals)),
            Err(err) => {
                warn!(error = %err, "proposal list refresh failed");
                batch.push(failed("list proposals", err));
            }
        }

        match self.client.count_proposals().await {
            Ok(count) => batch.push(RuntimeAction::ProposalCountRefreshed(count)),
            Err(err) => {
                warn!(error = %err, "proposal count refresh failed");
                batch.push(failed("count proposals", err));
            }
        }

        if let Some(proposal_id) = selected {
            match self.client.list_approvers(&proposal_id).await {
                Ok(approvers) => batch.push(RuntimeAction::ApproversRefreshed {
                    proposal_id,
                    approvers,
                }),
                Err(err) => {
                    warn!(error = %err, "approver list refresh failed");
                    batch.push(failed("fetch approvers", err));
                }
            }
        }

        batch.push(RuntimeAction::PollTickFinished);
        batch
    }
}

fn failed(operation: &'static str, err: crate::error::ClientError) -> RuntimeAction {
    RuntimeAction::OperationFailed {
        operation,
        message: err.to_string(),
    }
}
