//! The production [`SessionExchange`]: a JSON POST to the backend.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use warden_codec::{IdentityToken, SessionToken};
use warden_session::{SessionError, SessionExchange};

#[derive(Serialize)]
struct ExchangeRequest<'a> {
    id_token: &'a str,
}

#[derive(Deserialize)]
struct ExchangeResponse {
    token: String,
}

#[derive(Deserialize, Default)]
struct ExchangeFailure {
    error: Option<String>,
    message: Option<String>,
}

/// Posts `{"id_token": ".."}` to a backend endpoint and reads back
/// `{"token": ".."}`.
///
/// A non-2xx answer becomes [`SessionError::ExchangeRejected`] carrying the
/// body's `error` (or `message`) text; a network or decoding problem
/// becomes [`SessionError::ExchangeUnavailable`].
#[derive(Debug, Clone)]
pub struct HttpSessionExchange {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSessionExchange {
    /// Creates an exchanger with a default client.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    /// Creates an exchanger around an existing client (timeouts, proxies).
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// The backend endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SessionExchange for HttpSessionExchange {
    async fn exchange(&self, id_token: &IdentityToken) -> Result<SessionToken, SessionError> {
        let response = self
            .client
            .post(self.endpoint.as_str())
            .json(&ExchangeRequest {
                id_token: id_token.as_str(),
            })
            .send()
            .await
            .map_err(|e| SessionError::ExchangeUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let failure = response.json::<ExchangeFailure>().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "session exchange rejected");
            return Err(SessionError::ExchangeRejected(rejection_message(status, failure)));
        }

        let body = response
            .json::<ExchangeResponse>()
            .await
            .map_err(|e| SessionError::ExchangeUnavailable(e.to_string()))?;
        Ok(SessionToken::new(body.token))
    }
}

fn rejection_message(status: StatusCode, failure: ExchangeFailure) -> String {
    failure
        .error
        .or(failure.message)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| format!("session exchange rejected ({status})"))
}
