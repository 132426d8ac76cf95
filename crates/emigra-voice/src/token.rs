//! Credential issuance for real-time sessions.

use serde::Deserialize;

use crate::error::VoiceError;

/// Port over the collaborator that issues short-lived session credentials.
#[allow(async_fn_in_trait)]
pub trait CredentialIssuer {
    /// Returns an opaque bearer credential scoped to one session.
    async fn issue(&self) -> Result<String, VoiceError>;
}

#[derive(Debug, Deserialize)]
struct CredentialResponse {
    signed_url: String,
}

/// HTTP client for the platform's credential endpoint.
///
/// The endpoint returns `{"signed_url": "..."}`. Failures surface as
/// [`VoiceError::Credential`] and are never retried automatically; the
/// caller sees the session as unavailable and may try again manually.
#[derive(Debug, Clone)]
pub struct HttpCredentialIssuer {
    endpoint: String,
    http: reqwest::Client,
}

impl HttpCredentialIssuer {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
        }
    }
}

impl CredentialIssuer for HttpCredentialIssuer {
    async fn issue(&self) -> Result<String, VoiceError> {
        let response = self
            .http
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| VoiceError::Credential(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VoiceError::Credential(format!(
                "credential endpoint returned {}",
                response.status()
            )));
        }

        let body: CredentialResponse = response
            .json()
            .await
            .map_err(|e| VoiceError::Credential(e.to_string()))?;

        Ok(body.signed_url)
    }
}
