use std::sync::mpsc::Sender;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing::info;

use quorum_core::actions::RuntimeAction;
use quorum_core::proposal::ProposalAction;

use crate::node::NodeClient;

/// One-shot operations triggered by the user, as opposed to the poller's
/// standing refresh cycle.
#[derive(Debug, Clone)]
pub enum ClientCommand {
    SubmitProposal(ProposalAction),
    DeleteProposal { proposal_id: String },
    FetchContextVariables,
}

/// Executes commands sequentially until the channel closes or shutdown is
/// requested. Results and failures both travel back as runtime actions.
pub async fn run_commands(
    client: NodeClient,
    mut commands: UnboundedReceiver<ClientCommand>,
    events: Sender<RuntimeAction>,
    shutdown: CancellationToken,
) {
    loop {
        let command = tokio::select! {
            _ = shutdown.cancelled() => return,
            command = commands.recv() => match command {
                Some(command) => command,
                None => return,
            },
        };

        let action = match command {
            ClientCommand::SubmitProposal(proposal_action) => {
                match client.create_proposal(&proposal_action).await {
                    Ok(()) => {
                        info!(scope = proposal_action.scope(), "proposal created");
                        RuntimeAction::ProposalSubmitted
                    }
                    Err(err) => RuntimeAction::CommandFailed {
                        operation: "create proposal",
                        message: err.to_string(),
                    },
                }
            }
            ClientCommand::DeleteProposal { proposal_id } => {
                match client.delete_proposal(&proposal_id).await {
                    Ok(()) => {
                        info!(proposal_id = %proposal_id, "proposal deleted");
                        RuntimeAction::ProposalDeleted { proposal_id }
                    }
                    Err(err) => RuntimeAction::CommandFailed {
                        operation: "delete proposal",
                        message: err.to_string(),
                    },
                }
            }
            ClientCommand::FetchContextVariables => match client.context_variables().await {
                Ok(variables) => RuntimeAction::ContextVariablesRefreshed(variables),
                Err(err) => RuntimeAction::CommandFailed {
                    operation: "fetch context variables",
                    message: err.to_string(),
                },
            },
        };

        if events.send(action).is_err() {
            return;
        }
    }
}
