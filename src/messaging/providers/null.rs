use crate::messaging::{Message, MessagingClient, MessagingError, Profile};
use async_trait::async_trait;
use tracing::info;

/// Offline client: replies are logged, lookups fail as unavailable.
pub struct NullClient;

impl NullClient {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NullClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagingClient for NullClient {
    async fn fetch_profile(&self, user_id: &str) -> Result<Profile, MessagingError> {
        Err(MessagingError::Unavailable(format!(
            "no profile lookup for {} without a messaging provider",
            user_id
        )))
    }

    async fn fetch_content(&self, message_id: &str) -> Result<Vec<u8>, MessagingError> {
        Err(MessagingError::Unavailable(format!(
            "no content download for {} without a messaging provider",
            message_id
        )))
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, MessagingError> {
        Err(MessagingError::Unavailable(format!(
            "no download of {} without a messaging provider",
            url
        )))
    }

    async fn reply(&self, reply_token: &str, messages: Vec<Message>) -> Result<(), MessagingError> {
        info!(
            "NULL MESSAGING CLIENT - Would reply to {} with {} message(s)",
            reply_token,
            messages.len()
        );
        for message in &messages {
            tracing::debug!("NULL MESSAGING CLIENT - {:?}", message);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "Null Messaging Client (Logging Only)"
    }
}
