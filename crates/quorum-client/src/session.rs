use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

use quorum_core::state::DashIdentity;

use crate::error::ClientError;

#[derive(Debug, Deserialize)]
struct TokenClaims {
    context_id: String,
    executor_public_key: String,
}

/// An authenticated connection to one context. The token is attached as a
/// bearer credential to every request; the claims identify which context to
/// talk to and who the caller is.
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    context_id: String,
    executor_public_key: String,
}

impl Session {
    /// Extracts the claims this client needs from a JWT payload. The
    /// signature is the server's concern and is not checked here.
    pub fn from_token(token: &str) -> Result<Self, ClientError> {
        let payload = token
            .split('.')
            .nth(1)
            .ok_or_else(|| ClientError::Session("token is not a JWT".to_string()))?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|err| ClientError::Session(format!("payload is not base64: {err}")))?;
        let claims: TokenClaims = serde_json::from_slice(&bytes)
            .map_err(|err| ClientError::Session(format!("payload is not valid claims: {err}")))?;
        Ok(Self {
            token: token.to_string(),
            context_id: claims.context_id,
            executor_public_key: claims.executor_public_key,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    pub fn executor_public_key(&self) -> &str {
        &self.executor_public_key
    }

    pub fn identity(&self) -> DashIdentity {
        DashIdentity {
            context_id: self.context_id.clone(),
            executor_public_key: self.executor_public_key.clone(),
        }
    }
}
