//! Channel connector trait and its HTTP implementation.
//!
//! A connector posts fully addressed activities to the channel that owns the
//! conversation. The adapter and turn context only ever see the trait, so
//! tests substitute recording doubles for the network.

use crate::credential::AppCredentials;
use crate::error::ConnectorError;
use async_trait::async_trait;
use proactive_bot_conversation::{Activity, ResourceResponse};
use reqwest::Url;
use rootcause::Report;
use rootcause::prelude::ResultExt;
use tracing::{debug, instrument};

/// Trait for posting activities to a channel.
#[async_trait]
pub trait ChannelConnector: Send + Sync {
    /// Posts an activity that already carries its service URL, conversation
    /// and sender/recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if the activity cannot be addressed or the channel
    /// refuses it.
    async fn send_activity(
        &self,
        activity: &Activity,
    ) -> Result<ResourceResponse, Report<ConnectorError>>;
}

/// Connector speaking the Bot Connector REST API over HTTP.
///
/// Activities with a `replyToId` are posted as replies to that activity;
/// all others are posted to the conversation.
#[derive(Debug)]
pub struct HttpChannelConnector {
    http_client: reqwest::Client,
    credentials: AppCredentials,
}

impl HttpChannelConnector {
    /// Creates a connector that authenticates with `credentials`.
    #[must_use]
    pub fn new(credentials: AppCredentials) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            credentials,
        }
    }

    /// Builds the endpoint an activity is posted to.
    ///
    /// # Errors
    ///
    /// Returns an error if the activity has no service URL or conversation,
    /// or the service URL cannot carry a path.
    pub fn activities_url(activity: &Activity) -> Result<Url, Report<ConnectorError>> {
        let service_url = activity
            .service_url
            .as_deref()
            .ok_or_else(|| ConnectorError::Unaddressable {
                reason: "missing serviceUrl".to_string(),
            })?;
        let conversation_id = activity
            .conversation
            .as_ref()
            .map(|c| c.id.as_str())
            .ok_or_else(|| ConnectorError::Unaddressable {
                reason: "missing conversation".to_string(),
            })?;

        let invalid = |reason: String| ConnectorError::InvalidServiceUrl {
            service_url: service_url.to_string(),
            reason,
        };

        let mut url = Url::parse(service_url).map_err(|e| invalid(e.to_string()))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| invalid("url cannot be a base".to_string()))?;
            segments
                .pop_if_empty()
                .extend(["v3", "conversations", conversation_id, "activities"]);
            if let Some(reply_to_id) = activity.reply_to_id.as_deref() {
                segments.push(reply_to_id);
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl ChannelConnector for HttpChannelConnector {
    #[instrument(
        skip(self, activity),
        fields(
            activity_type = ?activity.activity_type,
            reply_to_id = activity.reply_to_id.as_deref().unwrap_or_default(),
        )
    )]
    async fn send_activity(
        &self,
        activity: &Activity,
    ) -> Result<ResourceResponse, Report<ConnectorError>> {
        let url = Self::activities_url(activity)?;

        let mut request = self.http_client.post(url.clone()).json(activity);
        let token = self
            .credentials
            .access_token()
            .await
            .context(ConnectorError::AuthenticationFailed)?;
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ConnectorError::ConnectionFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConnectorError::Rejected {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ConnectorError::ConnectionFailed {
                reason: e.to_string(),
            })?;

        // Some channels answer 200/201 with an empty body.
        let resource = if body.is_empty() {
            ResourceResponse::default()
        } else {
            serde_json::from_slice(&body).map_err(|e| ConnectorError::ProtocolError {
                reason: e.to_string(),
            })?
        };

        debug!(%url, resource_id = %resource.id, "posted activity");
        Ok(resource)
    }
}
