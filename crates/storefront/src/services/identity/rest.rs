//! REST identity provider client.
//!
//! Talks to a `GoTrue`-compatible auth API: JSON over HTTPS, the project API
//! key on every request, and a bearer token for user-scoped calls.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use giftbox_core::{AccountId, Email};

use super::{IdentityProvider, ProviderError, ProviderIdentity, ProviderSession};
use crate::config::ProviderConfig;

// ===== Wire types =====

#[derive(Serialize)]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct WireIdentity {
    id: String,
    email: String,
}

impl TryFrom<WireIdentity> for ProviderIdentity {
    type Error = ProviderError;

    fn try_from(wire: WireIdentity) -> Result<Self, Self::Error> {
        let id = AccountId::parse(&wire.id)
            .map_err(|e| ProviderError::Protocol(format!("invalid account id from provider: {e}")))?;
        let email = Email::parse(&wire.email)
            .map_err(|e| ProviderError::Protocol(format!("invalid email from provider: {e}")))?;

        Ok(Self { id, email })
    }
}

/// Sign-up response. Some deployments return the identity at the top level,
/// others nest it under `user`; both shapes are accepted.
#[derive(Deserialize)]
struct SignUpResponse {
    #[serde(default)]
    user: Option<WireIdentity>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

impl SignUpResponse {
    fn into_identity(self) -> Result<ProviderIdentity, ProviderError> {
        let wire = match (self.user, self.id, self.email) {
            (Some(user), _, _) => user,
            (None, Some(id), Some(email)) => WireIdentity { id, email },
            _ => {
                return Err(ProviderError::Protocol(
                    "sign-up response carries no identity".to_owned(),
                ));
            }
        };

        wire.try_into()
    }
}

#[derive(Deserialize)]
struct GrantResponse {
    access_token: String,
    /// Token lifetime in seconds.
    expires_in: i64,
    user: WireIdentity,
}

/// Error payload. The message field name varies across provider versions.
#[derive(Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn message(self) -> Option<String> {
        self.msg.or(self.error_description).or(self.message)
    }
}

/// Pull a readable message out of an error response.
async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(ErrorBody::message)
        .unwrap_or(body);

    format!("{status}: {message}")
}

// ===== Client =====

/// HTTP client for a `GoTrue`-compatible identity provider.
pub struct RestIdentityProvider {
    config: ProviderConfig,
    http: reqwest::Client,
}

impl RestIdentityProvider {
    /// Create a new provider client.
    #[must_use]
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Build the URL for an auth endpoint.
    fn auth_url(&self, endpoint: &str) -> String {
        format!(
            "{}/auth/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        )
    }

    /// Attach the project API key. Anonymous calls also bear it as the token.
    fn with_api_key(&self, request: RequestBuilder) -> RequestBuilder {
        let key = self.config.api_key.expose_secret();
        request.header("apikey", key).bearer_auth(key)
    }

    /// Attach the project API key plus a user access token.
    fn with_user_token(&self, request: RequestBuilder, access_token: &str) -> RequestBuilder {
        request
            .header("apikey", self.config.api_key.expose_secret())
            .bearer_auth(access_token)
    }
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    async fn create_identity(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<ProviderIdentity, ProviderError> {
        let body = CredentialsBody {
            email: email.as_str(),
            password,
        };
        let response = self
            .with_api_key(self.http.post(self.auth_url("signup")))
            .json(&body)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let parsed: SignUpResponse = response.json().await?;
                parsed.into_identity()
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY | StatusCode::CONFLICT => {
                let message = error_message(response).await;
                if message.to_lowercase().contains("already") {
                    Err(ProviderError::AlreadyRegistered)
                } else {
                    Err(ProviderError::Protocol(message))
                }
            }
            _ => Err(ProviderError::Protocol(error_message(response).await)),
        }
    }

    async fn password_grant(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<ProviderSession, ProviderError> {
        let body = CredentialsBody {
            email: email.as_str(),
            password,
        };
        let response = self
            .with_api_key(self.http.post(self.auth_url("token?grant_type=password")))
            .json(&body)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let parsed: GrantResponse = response.json().await?;

                Ok(ProviderSession {
                    identity: parsed.user.try_into()?,
                    access_token: parsed.access_token,
                    expires_at: Utc::now() + Duration::seconds(parsed.expires_in),
                })
            }
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(ProviderError::InvalidCredentials)
            }
            _ => Err(ProviderError::Protocol(error_message(response).await)),
        }
    }

    async fn fetch_identity(&self, access_token: &str) -> Result<ProviderIdentity, ProviderError> {
        let response = self
            .with_user_token(self.http.get(self.auth_url("user")), access_token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let wire: WireIdentity = response.json().await?;
                wire.try_into()
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ProviderError::Unauthorized),
            _ => Err(ProviderError::Protocol(error_message(response).await)),
        }
    }

    async fn revoke(&self, access_token: &str) -> Result<(), ProviderError> {
        let response = self
            .with_user_token(self.http.post(self.auth_url("logout")), access_token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ProviderError::Unauthorized),
            _ => Err(ProviderError::Protocol(error_message(response).await)),
        }
    }
}

// ===== Tests =====
