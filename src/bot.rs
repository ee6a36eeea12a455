use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::messaging::{DynMessagingClient, MessagingError};
use crate::pipeline::{Pipeline, PipelineError};
use crate::store::ContentId;
use crate::webhook::{Event, EventKind};

/// What a single event asks the bot to watermark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// The sender's profile picture, keyed by user id.
    ProfilePicture { user_id: String },
    /// A picture the sender uploaded, keyed by message id.
    UploadedImage { message_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Replied { content_id: ContentId },
    Ignored(&'static str),
}

/// Decide what, if anything, an event should be answered with.
pub fn subject_for(event: &Event) -> Option<Subject> {
    let user_id = event.user_id()?;
    match event.kind {
        EventKind::Follow => Some(Subject::ProfilePicture {
            user_id: user_id.to_string(),
        }),
        EventKind::Message => match &event.message {
            Some(message) if message.kind == "image" => Some(Subject::UploadedImage {
                message_id: message.id.clone(),
            }),
            _ => Some(Subject::ProfilePicture {
                user_id: user_id.to_string(),
            }),
        },
        EventKind::Other => None,
    }
}

/// Runs the download, render and reply steps for inbound events.
pub struct EventHandler {
    client: DynMessagingClient,
    pipeline: Pipeline,
    ignored_user_ids: HashSet<String>,
}

impl EventHandler {
    pub fn new(
        client: DynMessagingClient,
        pipeline: Pipeline,
        ignored_user_ids: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            client,
            pipeline,
            ignored_user_ids: ignored_user_ids.into_iter().collect(),
        }
    }

    /// Handle a batch of events concurrently. Failures are logged and
    /// swallowed so one bad event cannot affect the others.
    pub async fn handle_events(self: &Arc<Self>, events: Vec<Event>) {
        let mut tasks = JoinSet::new();
        for event in events {
            let handler = Arc::clone(self);
            tasks.spawn(async move { handler.handle_event(&event).await });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(Outcome::Replied { content_id })) => {
                    info!(content_id = %content_id, "Replied with watermarked image");
                }
                Ok(Ok(Outcome::Ignored(reason))) => {
                    debug!("Ignored event: {}", reason);
                }
                Ok(Err(e)) => {
                    error!(stage = %e.stage(), "Event handling failed: {}", e);
                }
                Err(e) => {
                    error!("Event task panicked or was cancelled: {}", e);
                }
            }
        }
    }

    pub async fn handle_event(&self, event: &Event) -> Result<Outcome, PipelineError> {
        let Some(user_id) = event.user_id() else {
            return Ok(Outcome::Ignored("event has no user id"));
        };
        if self.ignored_user_ids.contains(user_id) {
            return Ok(Outcome::Ignored("user id is ignored"));
        }
        let Some(subject) = subject_for(event) else {
            return Ok(Outcome::Ignored("event type is not handled"));
        };
        let Some(reply_token) = event.reply_token.as_deref() else {
            warn!("Event from {} carries no reply token", user_id);
            return Ok(Outcome::Ignored("event has no reply token"));
        };

        let (content_id, bytes) = self.download(&subject).await?;
        let rendered = self.pipeline.render(&content_id, &bytes).await?;
        let messages = self.pipeline.reply_messages(&rendered);

        self.client
            .reply(reply_token, messages)
            .await
            .map_err(PipelineError::Reply)?;

        Ok(Outcome::Replied { content_id })
    }

    async fn download(&self, subject: &Subject) -> Result<(ContentId, Vec<u8>), PipelineError> {
        match subject {
            Subject::ProfilePicture { user_id } => {
                let content_id = ContentId::new(user_id.as_str())?;
                let profile = self
                    .client
                    .fetch_profile(user_id)
                    .await
                    .map_err(PipelineError::Download)?;
                let picture_url = profile.picture_url.ok_or_else(|| {
                    PipelineError::Download(MessagingError::NoPicture(user_id.clone()))
                })?;
                let bytes = self
                    .client
                    .download(&picture_url)
                    .await
                    .map_err(PipelineError::Download)?;
                Ok((content_id, bytes))
            }
            Subject::UploadedImage { message_id } => {
                let content_id = ContentId::new(message_id.as_str())?;
                let bytes = self
                    .client
                    .fetch_content(message_id)
                    .await
                    .map_err(PipelineError::Download)?;
                Ok((content_id, bytes))
            }
        }
    }
}
