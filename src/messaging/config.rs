use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum MessagingConfig {
    Line(LineConfig),
    #[default]
    Null,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LineConfig {
    pub channel_access_token: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_data_api_base_url")]
    pub data_api_base_url: String,
    /// Bound on every platform request, including the body download.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://api.line.me".to_string()
}

fn default_data_api_base_url() -> String {
    "https://api-data.line.me".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
