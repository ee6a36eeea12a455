pub mod config;
pub mod error;
pub mod providers;
pub mod types;

pub use config::*;
pub use error::*;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// The messaging platform as seen by the bot: profile lookup, content
/// download and reply delivery.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    async fn fetch_profile(&self, user_id: &str) -> Result<Profile, MessagingError>;

    /// Raw bytes of a user-sent message attachment.
    async fn fetch_content(&self, message_id: &str) -> Result<Vec<u8>, MessagingError>;

    /// Raw bytes behind a URL handed out by the platform, e.g. a profile picture.
    async fn download(&self, url: &str) -> Result<Vec<u8>, MessagingError>;

    async fn reply(&self, reply_token: &str, messages: Vec<Message>) -> Result<(), MessagingError>;

    fn name(&self) -> &str;
}

pub type DynMessagingClient = Arc<dyn MessagingClient>;

pub fn create_client(config: &MessagingConfig) -> Result<DynMessagingClient, MessagingError> {
    match config {
        MessagingConfig::Line(line_config) => {
            Ok(Arc::new(providers::line::LineClient::new(line_config)?))
        }
        MessagingConfig::Null => Ok(Arc::new(providers::null::NullClient::new())),
    }
}
