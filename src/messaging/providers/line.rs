use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, error};

use crate::messaging::{LineConfig, Message, MessagingClient, MessagingError, Profile, ReplyRequest};

/// LINE Messaging API client.
pub struct LineClient {
    client: Client,
    channel_access_token: String,
    api_base_url: String,
    data_api_base_url: String,
}

impl LineClient {
    pub fn new(config: &LineConfig) -> Result<Self, MessagingError> {
        if config.channel_access_token.trim().is_empty() {
            return Err(MessagingError::ConfigError(
                "channel_access_token must not be empty".to_string(),
            ));
        }

        if config.timeout_secs == 0 {
            return Err(MessagingError::ConfigError(
                "timeout_secs must be positive".to_string(),
            ));
        }

        let client = Client::builder()
            .user_agent(concat!("stampbot/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            channel_access_token: config.channel_access_token.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            data_api_base_url: config.data_api_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_authorized(&self, url: &str) -> Result<Response, MessagingError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.channel_access_token)
            .send()
            .await?;
        check_status(url, response)
    }
}

fn check_status(url: &str, response: Response) -> Result<Response, MessagingError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        error!("{} responded with {}", url, status);
        Err(MessagingError::StatusError {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl MessagingClient for LineClient {
    async fn fetch_profile(&self, user_id: &str) -> Result<Profile, MessagingError> {
        let url = format!("{}/v2/bot/profile/{}", self.api_base_url, user_id);
        debug!("Fetching profile for {}", user_id);
        let body = self.get_authorized(&url).await?.bytes().await?;
        let profile = serde_json::from_slice::<Profile>(&body)?;
        Ok(profile)
    }

    async fn fetch_content(&self, message_id: &str) -> Result<Vec<u8>, MessagingError> {
        let url = format!(
            "{}/v2/bot/message/{}/content",
            self.data_api_base_url, message_id
        );
        debug!("Fetching content of message {}", message_id);
        let bytes = self.get_authorized(&url).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, MessagingError> {
        debug!("Downloading {}", url);
        let response = self.client.get(url).send().await?;
        let bytes = check_status(url, response)?.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn reply(&self, reply_token: &str, messages: Vec<Message>) -> Result<(), MessagingError> {
        let url = format!("{}/v2/bot/message/reply", self.api_base_url);
        let request = ReplyRequest {
            reply_token,
            messages: &messages,
        };

        debug!("Replying with {} message(s)", messages.len());
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.channel_access_token)
            .json(&request)
            .send()
            .await?;
        check_status(&url, response)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "LINE Messaging API"
    }
}
