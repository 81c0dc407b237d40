use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::warn;

use quorum_core::proposal::ApprovalsCount;
use quorum_core::proposal::ContextVariable;
use quorum_core::proposal::Proposal;
use quorum_core::proposal::ProposalAction;

use crate::api::CreateProposalRequest;
use crate::api::Envelope;
use crate::api::PageRequest;
use crate::api::RawContextVariable;
use crate::error::ClientError;
use crate::session::Session;

/// Default page size for list requests.
pub const PAGE_LIMIT: usize = 10;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default)]
pub struct ContextDetails {
    pub id: String,
}

/// HTTP client for one node's admin api, scoped to the session's context.
#[derive(Debug, Clone)]
pub struct NodeClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl NodeClient {
    pub fn new(base_url: &str, session: Session) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ClientError::Network(err.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn context_url(&self, suffix: &str) -> String {
        format!(
            "{}/admin-api/contexts/{}{suffix}",
            self.base_url,
            self.session.context_id()
        )
    }

    pub async fn list_proposals(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Proposal>, ClientError> {
        let page = PageRequest { offset, limit };
        let response = self
            .http
            .post(self.context_url("/proposals"))
            .bearer_auth(self.session.token())
            .json(&page)
            .send()
            .await?;
        let envelope: Envelope<Vec<Proposal>> = decode(response).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// Reads the server's count, then refetches the list at that size and
    /// reports how many proposals actually came back. The two can disagree
    /// when proposals execute between the requests; the returned length is
    /// the number the caller can really show.
    pub async fn count_proposals(&self) -> Result<usize, ClientError> {
        let response = self
            .http
            .get(self.context_url("/proposals/count"))
            .bearer_auth(self.session.token())
            .send()
            .await?;
        let envelope: Envelope<usize> = decode(response).await?;
        let advertised = envelope.data.unwrap_or(0);
        let proposals = self.list_proposals(0, advertised).await?;
        Ok(proposals.len())
    }

    /// The approvals endpoint serves a count object; `list_approvers` reads
    /// the identity list from the same resource.
    pub async fn approvals_count(&self, proposal_id: &str) -> Result<ApprovalsCount, ClientError> {
        let response = self
            .http
            .get(self.context_url(&format!("/proposals/{proposal_id}/approvals/users")))
            .bearer_auth(self.session.token())
            .send()
            .await?;
        let envelope: Envelope<ApprovalsCount> = decode(response).await?;
        envelope
            .data
            .ok_or_else(|| ClientError::Decode("approvals payload missing".to_string()))
    }

    pub async fn list_approvers(&self, proposal_id: &str) -> Result<Vec<String>, ClientError> {
        let response = self
            .http
            .get(self.context_url(&format!("/proposals/{proposal_id}/approvals/users")))
            .bearer_auth(self.session.token())
            .send()
            .await?;
        let envelope: Envelope<Vec<String>> = decode(response).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    pub async fn context_variables(&self) -> Result<Vec<ContextVariable>, ClientError> {
        let page = PageRequest {
            offset: 0,
            limit: PAGE_LIMIT,
        };
        let response = self
            .http
            .post(self.context_url("/proposals/context-storage-entries"))
            .bearer_auth(self.session.token())
            .json(&page)
            .send()
            .await?;
        let envelope: Envelope<Vec<RawContextVariable>> = decode(response).await?;
        Ok(envelope
            .data
            .unwrap_or_default()
            .iter()
            .map(RawContextVariable::decode)
            .collect())
    }

    pub async fn create_proposal(&self, action: &ProposalAction) -> Result<(), ClientError> {
        let request = CreateProposalRequest::from_action(action).ok_or_else(|| {
            ClientError::Decode(format!("cannot propose action with scope {}", action.scope()))
        })?;
        let response = self
            .http
            .post(self.context_url("/proposals"))
            .bearer_auth(self.session.token())
            .json(&request)
            .send()
            .await?;
        check_status(&response)?;
        Ok(())
    }

    pub async fn delete_proposal(&self, proposal_id: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.context_url(&format!("/proposals/{proposal_id}")))
            .bearer_auth(self.session.token())
            .send()
            .await?;
        check_status(&response)?;
        Ok(())
    }

    // The node does not expose these resources yet. Kept as explicit stubs
    // so callers compile against the final surface.

    pub async fn context_members(&self) -> Result<Vec<String>, ClientError> {
        warn!("context members endpoint not implemented by the node");
        Ok(Vec::new())
    }

    pub async fn context_members_count(&self) -> Result<usize, ClientError> {
        warn!("context members count endpoint not implemented by the node");
        Ok(0)
    }

    pub async fn context_details(&self) -> Result<ContextDetails, ClientError> {
        warn!("context details endpoint not implemented by the node");
        Ok(ContextDetails::default())
    }
}

fn check_status(response: &reqwest::Response) -> Result<(), ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ClientError::Server {
            status: status.as_u16(),
        })
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    check_status(&response)?;
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|err| ClientError::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tokio::io::AsyncReadExt;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    use super::ClientError;
    use super::NodeClient;
    use crate::session::Session;

    fn session() -> Session {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#);
        let payload = URL_SAFE_NO_PAD
            .encode(r#"{"context_id":"ctx-1","executor_public_key":"ed25519:me"}"#);
        Session::from_token(&format!("{header}.{payload}.sig")).unwrap()
    }

    struct Received {
        head: String,
        body: String,
    }

    /// Serves scripted JSON bodies, one connection per response, and records
    /// what each request looked like.
    async fn spawn_server(
        responses: Vec<(u16, String)>,
    ) -> (String, tokio::sync::mpsc::UnboundedReceiver<Received>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (seen_tx, seen_rx) = tokio::sync::mpsc::unbounded_channel();

        tokio::spawn(async move {
            for (status, body) in responses {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let mut buffer = Vec::new();
                let mut chunk = [0u8; 4096];
                let request = loop {
                    let read = match stream.read(&mut chunk).await {
                        Ok(0) => return,
                        Ok(read) => read,
                        Err(_) => return,
                    };
                    buffer.extend_from_slice(&chunk[..read]);
                    let text = String::from_utf8_lossy(&buffer).to_string();
                    if let Some(split) = text.find("\r\n\r\n") {
                        let head = text[..split].to_string();
                        let expected = content_length(&head);
                        let body = text[split + 4..].to_string();
                        if body.len() >= expected {
                            break Received { head, body };
                        }
                    }
                };
                let _ = seen_tx.send(request);

                let reason = if status == 200 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        (format!("http://{addr}"), seen_rx)
    }

    fn content_length(head: &str) -> usize {
        head.lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                if name.eq_ignore_ascii_case("content-length") {
                    value.trim().parse().ok()
                } else {
                    None
                }
            })
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn list_proposals_posts_a_page_request() {
        let body = r#"{"data":[{"id":"P1","author_id":"ed25519:me","actions":[{"scope":"Transfer","params":{"receiver_id":"r","amount":5}}]}]}"#;
        let (base, mut seen) = spawn_server(vec![(200, body.to_string())]).await;
        let client = NodeClient::new(&base, session()).unwrap();

        let proposals = client.list_proposals(0, 10).await.unwrap();

        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].id, "P1");
        let request = seen.recv().await.unwrap();
        assert!(request.head.starts_with("POST /admin-api/contexts/ctx-1/proposals "));
        assert!(request.head.contains("authorization: Bearer ")
            || request.head.contains("Authorization: Bearer "));
        let page: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(page["offset"], 0);
        assert_eq!(page["limit"], 10);
    }

    #[tokio::test]
    async fn count_reports_the_refetched_length_not_the_advertised_count() {
        let five: Vec<String> = (0..5)
            .map(|index| {
                format!(r#"{{"id":"P{index}","author_id":"a","actions":[]}}"#)
            })
            .collect();
        let list_body = format!(r#"{{"data":[{}]}}"#, five.join(","));
        let (base, mut seen) = spawn_server(vec![
            (200, r#"{"data":7}"#.to_string()),
            (200, list_body),
        ])
        .await;
        let client = NodeClient::new(&base, session()).unwrap();

        let count = client.count_proposals().await.unwrap();

        assert_eq!(count, 5);
        let count_request = seen.recv().await.unwrap();
        assert!(count_request
            .head
            .starts_with("GET /admin-api/contexts/ctx-1/proposals/count "));
        let list_request = seen.recv().await.unwrap();
        let page: serde_json::Value = serde_json::from_str(&list_request.body).unwrap();
        assert_eq!(page["limit"], 7);
    }

    #[tokio::test]
    async fn approvals_endpoint_serves_count_and_approver_list() {
        let (base, _seen) = spawn_server(vec![
            (
                200,
                r#"{"data":{"proposal_id":"P1","num_approvals":2}}"#.to_string(),
            ),
            (200, r#"{"data":["alice","bob"]}"#.to_string()),
        ])
        .await;
        let client = NodeClient::new(&base, session()).unwrap();

        let approvals = client.approvals_count("P1").await.unwrap();
        assert_eq!(approvals.num_approvals, 2);

        let approvers = client.list_approvers("P1").await.unwrap();
        assert_eq!(approvers, vec!["alice".to_string(), "bob".to_string()]);
    }

    #[tokio::test]
    async fn context_variables_decode_raw_bytes_as_text() {
        let body = r#"{"data":[{"key":[104,105],"value":[116,104,101,114,101]}]}"#;
        let (base, mut seen) = spawn_server(vec![(200, body.to_string())]).await;
        let client = NodeClient::new(&base, session()).unwrap();

        let variables = client.context_variables().await.unwrap();

        assert_eq!(variables.len(), 1);
        assert_eq!(variables[0].key, "hi");
        assert_eq!(variables[0].value, "there");
        let request = seen.recv().await.unwrap();
        assert!(request.head.starts_with(
            "POST /admin-api/contexts/ctx-1/proposals/context-storage-entries "
        ));
    }

    #[tokio::test]
    async fn null_data_means_an_empty_result() {
        let (base, _seen) = spawn_server(vec![(200, r#"{"data":null}"#.to_string())]).await;
        let client = NodeClient::new(&base, session()).unwrap();

        let variables = client.context_variables().await.unwrap();

        assert!(variables.is_empty());
    }

    #[tokio::test]
    async fn server_errors_surface_the_status_code() {
        let (base, _seen) = spawn_server(vec![(500, r#"{"error":"boom"}"#.to_string())]).await;
        let client = NodeClient::new(&base, session()).unwrap();

        let err = client.delete_proposal("P1").await.unwrap_err();

        assert!(matches!(err, ClientError::Server { status: 500 }));
    }

    #[tokio::test]
    async fn delete_targets_the_proposal_resource() {
        let (base, mut seen) = spawn_server(vec![(200, String::new())]).await;
        let client = NodeClient::new(&base, session()).unwrap();

        client.delete_proposal("P9").await.unwrap();

        let request = seen.recv().await.unwrap();
        assert!(request
            .head
            .starts_with("DELETE /admin-api/contexts/ctx-1/proposals/P9 "));
    }

    #[tokio::test]
    async fn create_sends_action_type_and_params() {
        let (base, mut seen) = spawn_server(vec![(200, r#"{"data":null}"#.to_string())]).await;
        let client = NodeClient::new(&base, session()).unwrap();

        client
            .create_proposal(&quorum_core::proposal::ProposalAction::Transfer {
                receiver_id: "treasury".to_string(),
                amount: 9,
            })
            .await
            .unwrap();

        let request = seen.recv().await.unwrap();
        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body["action_type"], "Transfer");
        assert_eq!(body["params"]["receiver_id"], "treasury");
        assert_eq!(body["params"]["amount"], 9);
    }

    #[tokio::test]
    async fn stubs_answer_without_a_server() {
        let client = NodeClient::new("http://127.0.0.1:9", session()).unwrap();

        assert!(client.context_members().await.unwrap().is_empty());
        assert_eq!(client.context_members_count().await.unwrap(), 0);
        assert_eq!(client.context_details().await.unwrap().id, "");
    }
}
