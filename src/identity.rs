use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::AppConfig;

/// IdentityProfile
///
/// The verified identity the provider vouches for after a successful code
/// exchange. `login` is the stable handle used to find-or-create the local
/// user record.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityProfile {
    pub login: String,
    pub name: Option<String>,
}

/// IdentityError
///
/// `InvalidCode` means the provider rejected the code (the caller's fault,
/// surfaced as 401). `Transport` means the exchange itself failed.
#[derive(Debug)]
pub enum IdentityError {
    InvalidCode,
    Transport(String),
}

// 1. IdentityProvider Contract
/// IdentityProvider
///
/// Abstract contract for the external identity-verification collaborator.
/// The concrete OAuth client is swapped for the in-memory mock in tests
/// without touching the authenticator or handlers.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchanges an opaque authorization code for a verified profile.
    /// A single attempt; the exchange is not retried.
    async fn exchange_code(&self, code: &str) -> Result<IdentityProfile, IdentityError>;
}

/// IdentityState
///
/// The concrete type used to share the identity provider across the
/// application state.
pub type IdentityState = Arc<dyn IdentityProvider>;

// 2. The Real Implementation (OAuth code exchange)

#[derive(Deserialize)]
struct TokenExchangeResponse {
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct ProfileResponse {
    login: String,
    name: Option<String>,
}

/// OAuthIdentityProvider
///
/// The reqwest-backed client for a GitHub-style OAuth provider. The code is
/// first exchanged for a provider token, then the token is used to fetch the
/// verified profile.
#[derive(Clone)]
pub struct OAuthIdentityProvider {
    client: reqwest::Client,
    token_url: String,
    profile_url: String,
    client_id: String,
    client_secret: String,
}

impl OAuthIdentityProvider {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            token_url: config.oauth_token_url.clone(),
            profile_url: config.oauth_profile_url.clone(),
            client_id: config.oauth_client_id.clone(),
            client_secret: config.oauth_client_secret.clone(),
        }
    }
}

#[async_trait]
impl IdentityProvider for OAuthIdentityProvider {
    async fn exchange_code(&self, code: &str) -> Result<IdentityProfile, IdentityError> {
        // Step 1: exchange the code for a provider token. GitHub answers 200
        // with an `error` field for a bad code, so the absence of
        // `access_token` is the rejection signal.
        let response = self
            .client
            .post(&self.token_url)
            .header("Accept", "application/json")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
            ])
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IdentityError::InvalidCode);
        }

        let exchange = response
            .json::<TokenExchangeResponse>()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        let provider_token = exchange.access_token.ok_or(IdentityError::InvalidCode)?;

        // Step 2: fetch the profile the token belongs to.
        let response = self
            .client
            .get(&self.profile_url)
            .header("Authorization", format!("Bearer {}", provider_token))
            .header("User-Agent", "blog-api")
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IdentityError::InvalidCode);
        }

        let profile = response
            .json::<ProfileResponse>()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        Ok(IdentityProfile {
            login: profile.login,
            name: profile.name,
        })
    }
}

// 3. The Mock Implementation (For Tests)
/// MockIdentityProvider
///
/// In-memory implementation of `IdentityProvider` used by the test suites. It
/// accepts a fixed set of codes and rejects everything else, so the full
/// login flow can be exercised without a network.
#[derive(Clone, Default)]
pub struct MockIdentityProvider {
    accepted: HashMap<String, IdentityProfile>,
    /// When true, all exchanges fail as transport errors.
    pub should_fail: bool,
}

impl MockIdentityProvider {
    /// A provider that accepts the single code "valid-code".
    pub fn new() -> Self {
        let mut provider = Self::default();
        provider.accept(
            "valid-code",
            IdentityProfile {
                login: "jsmith".to_string(),
                name: Some("John Smith".to_string()),
            },
        );
        provider
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn accept(&mut self, code: &str, profile: IdentityProfile) {
        self.accepted.insert(code.to_string(), profile);
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn exchange_code(&self, code: &str) -> Result<IdentityProfile, IdentityError> {
        if self.should_fail {
            return Err(IdentityError::Transport(
                "mock transport failure".to_string(),
            ));
        }
        self.accepted
            .get(code)
            .cloned()
            .ok_or(IdentityError::InvalidCode)
    }
}
