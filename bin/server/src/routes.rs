//! HTTP routes.
//!
//! `/api/messages` is the channel's webhook: each POST carries one activity
//! which is run as a turn. `/api/notify` fans a proactive message out to
//! every conversation the bot has seen.

use crate::error::ServerError;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
};
use proactive_bot_conversation::Activity;
use proactive_bot_dispatch::{ProactiveBot, ProactiveDispatcher};
use proactive_bot_integration::BotAdapter;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Body returned by `/api/notify`.
pub const NOTIFY_RESPONSE: &str =
    "<html><body><h1>Proactive messages have been sent.</h1></body></html>";

/// Shared state for the routes.
#[derive(Clone)]
pub struct AppState {
    pub adapter: BotAdapter,
    pub bot: Arc<ProactiveBot>,
    pub dispatcher: ProactiveDispatcher,
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/messages", post(messages))
        .route("/api/notify", get(notify).post(notify))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs one inbound activity as a turn.
async fn messages(
    State(state): State<AppState>,
    Json(activity): Json<Activity>,
) -> Result<StatusCode, ServerError> {
    state
        .adapter
        .process_activity(activity, state.bot.as_ref())
        .await?;
    Ok(StatusCode::OK)
}

/// Sends the proactive message to every stored conversation.
async fn notify(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.dispatcher.notify_all().await;
    tracing::info!(
        dispatch_id = %report.dispatch_id,
        attempted = report.attempted,
        delivered = report.delivered,
        "notify request handled"
    );
    Html(NOTIFY_RESPONSE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, header},
    };
    use proactive_bot_conversation::{InMemoryReferenceStore, ReferenceStore, ResourceResponse};
    use proactive_bot_integration::{ChannelConnector, ConnectorError};
    use rootcause::Report;
    use std::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Default)]
    struct RecordingConnector {
        sent: Mutex<Vec<Activity>>,
    }

    impl RecordingConnector {
        fn texts(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .filter_map(|a| a.text.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ChannelConnector for RecordingConnector {
        async fn send_activity(
            &self,
            activity: &Activity,
        ) -> Result<ResourceResponse, Report<ConnectorError>> {
            self.sent.lock().unwrap().push(activity.clone());
            Ok(ResourceResponse {
                id: "resp-1".to_string(),
            })
        }
    }

    struct TestApp {
        router: Router,
        store: InMemoryReferenceStore,
        connector: Arc<RecordingConnector>,
    }

    fn app() -> TestApp {
        let store = InMemoryReferenceStore::new();
        let connector = Arc::new(RecordingConnector::default());
        let adapter = BotAdapter::new(connector.clone());
        let shared: Arc<dyn ReferenceStore> = Arc::new(store.clone());
        let state = AppState {
            adapter: adapter.clone(),
            bot: Arc::new(ProactiveBot::new(shared.clone())),
            dispatcher: ProactiveDispatcher::new(adapter, shared),
        };
        TestApp {
            router: router(state),
            store,
            connector,
        }
    }

    fn message_json(user_id: &str, text: &str) -> String {
        serde_json::json!({
            "type": "message",
            "id": format!("act-{user_id}"),
            "channelId": "emulator",
            "serviceUrl": "http://localhost:56120",
            "from": { "id": user_id, "name": "User" },
            "recipient": { "id": "bot", "name": "Bot" },
            "conversation": { "id": format!("conv-{user_id}") },
            "text": text,
        })
        .to_string()
    }

    fn post_json(uri: &str, body: String) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn message_is_processed() {
        let app = app();

        let response = app
            .router
            .oneshot(post_json("/api/messages", message_json("user-1", "hello")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(app.connector.texts(), vec!["You sent: hello"]);
        assert!(app.store.get("user-1").await.is_some());
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let app = app();

        let response = app
            .router
            .oneshot(post_json("/api/messages", "{not json".to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_content_type_is_unsupported() {
        let app = app();

        let request = Request::post("/api/messages")
            .body(Body::from(message_json("user-1", "hello")))
            .unwrap();
        let response = app.router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn activity_without_addressing_is_bad_request() {
        let app = app();
        let body = serde_json::json!({ "type": "message", "text": "hi" }).to_string();

        let response = app
            .router
            .oneshot(post_json("/api/messages", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(app.connector.texts().is_empty());
        assert!(app.store.is_empty().await);
    }

    #[tokio::test]
    async fn blank_sender_id_is_bad_request() {
        let app = app();
        let body = message_json("", "hello");

        let response = app
            .router
            .oneshot(post_json("/api/messages", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(app.connector.texts().is_empty());
        assert!(app.store.is_empty().await);
    }

    #[tokio::test]
    async fn notify_messages_everyone_seen() {
        let app = app();
        for user in ["alice", "bob"] {
            let response = app
                .router
                .clone()
                .oneshot(post_json("/api/messages", message_json(user, "hi")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .router
            .clone()
            .oneshot(Request::get("/api/notify").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, NOTIFY_RESPONSE.as_bytes());

        let proactive = app
            .connector
            .texts()
            .into_iter()
            .filter(|t| t == "proactive hello")
            .count();
        assert_eq!(proactive, 2);
    }

    #[tokio::test]
    async fn notify_accepts_post() {
        let app = app();

        let response = app
            .router
            .oneshot(Request::post("/api/notify").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(app.connector.texts().is_empty());
    }
}
