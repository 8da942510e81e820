//! Application credentials for talking to a channel.
//!
//! The bot authenticates its outbound calls with a bearer token obtained
//! through the OAuth 2.0 client-credentials grant. An empty application id
//! means the bot runs anonymously, which is what the local Emulator expects.
//! The secret never appears in `Debug` output or logs.

use crate::error::CredentialError;
use chrono::{DateTime, Duration, Utc};
use oauth2::{
    AuthType, ClientId, ClientSecret, Scope, TokenResponse, TokenUrl, basic::BasicClient,
};
use rootcause::Report;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// Token endpoint for Bot Framework channels.
pub const DEFAULT_OAUTH_ENDPOINT: &str =
    "https://login.microsoftonline.com/botframework.com/oauth2/v2.0/token";

/// Scope requested for Bot Framework channels.
pub const DEFAULT_OAUTH_SCOPE: &str = "https://api.botframework.com/.default";

/// Tokens are refreshed this long before they expire.
const REFRESH_MARGIN_MINUTES: i64 = 5;

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECONDS: i64 = 3600;

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::minutes(REFRESH_MARGIN_MINUTES) < self.expires_at
    }
}

/// Application id and secret, plus a cached access token.
pub struct AppCredentials {
    app_id: String,
    app_password: String,
    oauth_endpoint: String,
    oauth_scope: String,
    cached: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppCredentials")
            .field("app_id", &self.app_id)
            .field("oauth_endpoint", &self.oauth_endpoint)
            .field("oauth_scope", &self.oauth_scope)
            .finish_non_exhaustive()
    }
}

impl AppCredentials {
    /// Creates credentials for the Bot Framework token endpoint.
    #[must_use]
    pub fn new(app_id: impl Into<String>, app_password: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_password: app_password.into(),
            oauth_endpoint: DEFAULT_OAUTH_ENDPOINT.to_string(),
            oauth_scope: DEFAULT_OAUTH_SCOPE.to_string(),
            cached: Mutex::new(None),
        }
    }

    /// Credentials for a bot without an application registration.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::new("", "")
    }

    /// Overrides the token endpoint.
    #[must_use]
    pub fn with_oauth_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.oauth_endpoint = endpoint.into();
        self
    }

    /// Overrides the requested scope.
    #[must_use]
    pub fn with_oauth_scope(mut self, scope: impl Into<String>) -> Self {
        self.oauth_scope = scope.into();
        self
    }

    /// Returns the application id.
    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Returns true if outbound calls go out without a token.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.app_id.trim().is_empty()
    }

    /// Returns a bearer token for outbound calls, or `None` when anonymous.
    ///
    /// A cached token is reused until shortly before it expires.
    ///
    /// # Errors
    ///
    /// Returns an error if the token endpoint is invalid or refuses the
    /// exchange.
    #[instrument(skip(self), fields(app_id = %self.app_id))]
    pub async fn access_token(&self) -> Result<Option<String>, Report<CredentialError>> {
        if self.is_anonymous() {
            return Ok(None);
        }

        let mut cached = self.cached.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(Some(token.access_token.clone()));
        }

        let token = self.exchange().await?;
        debug!(expires_at = %token.expires_at, "acquired channel access token");
        let access_token = token.access_token.clone();
        *cached = Some(token);

        Ok(Some(access_token))
    }

    async fn exchange(&self) -> Result<CachedToken, Report<CredentialError>> {
        let token_url = TokenUrl::new(self.oauth_endpoint.clone()).map_err(|e| {
            CredentialError::InvalidEndpoint {
                endpoint: self.oauth_endpoint.clone(),
                reason: e.to_string(),
            }
        })?;

        // Redirects from the token endpoint are not followed.
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| CredentialError::ClientSetup {
                reason: e.to_string(),
            })?;

        let client = BasicClient::new(ClientId::new(self.app_id.clone()))
            .set_client_secret(ClientSecret::new(self.app_password.clone()))
            .set_auth_type(AuthType::RequestBody)
            .set_token_uri(token_url);

        let response = client
            .exchange_client_credentials()
            .add_scope(Scope::new(self.oauth_scope.clone()))
            .request_async(&http_client)
            .await
            .map_err(|e| CredentialError::TokenExchange {
                reason: e.to_string(),
            })?;

        let lifetime = response
            .expires_in()
            .and_then(|d| Duration::from_std(d).ok())
            .unwrap_or_else(|| Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECONDS));

        Ok(CachedToken {
            access_token: response.access_token().secret().clone(),
            expires_at: Utc::now() + lifetime,
        })
    }
}
