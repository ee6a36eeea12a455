#![allow(dead_code)]

use async_trait::async_trait;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb, Rgba};
use stampbot::Config;
use stampbot::messaging::{Message, MessagingClient, MessagingError, Profile};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;
use tempfile::TempDir;

pub const SOURCE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
pub const WATERMARK_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// A config rooted in `temp_dir` with an opaque red square watermark.
pub fn test_config(temp_dir: &TempDir, watermark_size: (u32, u32)) -> Config {
    let mut config = Config::default();
    config.app.base_url = "https://bot.example.com".to_string();
    config.static_files.directory = temp_dir.path().join("static");
    config.storage.directory = temp_dir.path().join("downloaded");
    config.imaging.watermark = temp_dir.path().join("static").join("watermark.png");

    std::fs::create_dir_all(&config.static_files.directory).unwrap();
    std::fs::create_dir_all(&config.storage.directory).unwrap();
    ImageBuffer::from_pixel(watermark_size.0, watermark_size.1, WATERMARK_COLOR)
        .save(&config.imaging.watermark)
        .unwrap();

    config
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, SOURCE_COLOR));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .unwrap();
    bytes
}

pub fn is_watermark(pixel: Rgb<u8>) -> bool {
    pixel[0] > 200 && pixel[2] < 60
}

pub fn is_source(pixel: Rgb<u8>) -> bool {
    pixel[0] < 60 && pixel[2] > 200
}

/// In-memory stand-in for the messaging platform.
#[derive(Default)]
pub struct FakeClient {
    pub profiles: HashMap<String, Profile>,
    pub downloads: HashMap<String, Vec<u8>>,
    pub contents: HashMap<String, Vec<u8>>,
    pub replies: Mutex<Vec<(String, Vec<Message>)>>,
}

impl FakeClient {
    pub fn with_profile(mut self, user_id: &str, picture: Vec<u8>) -> Self {
        let url = format!("https://profile.example.com/{}.jpg", user_id);
        self.profiles.insert(
            user_id.to_string(),
            Profile {
                user_id: user_id.to_string(),
                display_name: Some(format!("user {}", user_id)),
                picture_url: Some(url.clone()),
            },
        );
        self.downloads.insert(url, picture);
        self
    }

    pub fn with_content(mut self, message_id: &str, bytes: Vec<u8>) -> Self {
        self.contents.insert(message_id.to_string(), bytes);
        self
    }

    pub fn replies(&self) -> Vec<(String, Vec<Message>)> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingClient for FakeClient {
    async fn fetch_profile(&self, user_id: &str) -> Result<Profile, MessagingError> {
        self.profiles
            .get(user_id)
            .cloned()
            .ok_or_else(|| MessagingError::StatusError {
                url: format!("/v2/bot/profile/{}", user_id),
                status: 404,
            })
    }

    async fn fetch_content(&self, message_id: &str) -> Result<Vec<u8>, MessagingError> {
        self.contents
            .get(message_id)
            .cloned()
            .ok_or_else(|| MessagingError::StatusError {
                url: format!("/v2/bot/message/{}/content", message_id),
                status: 404,
            })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, MessagingError> {
        self.downloads
            .get(url)
            .cloned()
            .ok_or_else(|| MessagingError::StatusError {
                url: url.to_string(),
                status: 404,
            })
    }

    async fn reply(&self, reply_token: &str, messages: Vec<Message>) -> Result<(), MessagingError> {
        self.replies
            .lock()
            .unwrap()
            .push((reply_token.to_string(), messages));
        Ok(())
    }

    fn name(&self) -> &str {
        "Fake Messaging Client"
    }
}
