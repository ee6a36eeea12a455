use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::AppState;

/// Body of an inbound webhook delivery.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookBody {
    #[serde(default)]
    pub destination: Option<String>,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Option<EventSource>,
    #[serde(default)]
    pub message: Option<EventMessage>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Follow,
    Message,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EventMessage {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Event {
    pub fn user_id(&self) -> Option<&str> {
        self.source
            .as_ref()
            .and_then(|source| source.user_id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

/// `POST /webhooks`. Every event is handled before answering; failures are
/// logged per event and never change the response.
pub async fn webhook_handler(
    State(app_state): State<AppState>,
    Json(body): Json<WebhookBody>,
) -> StatusCode {
    debug!("Webhook delivery with {} event(s)", body.events.len());
    app_state.events.handle_events(body.events).await;
    StatusCode::OK
}
