use std::fmt;

use serde::{Deserialize, Serialize};

/// Authenticated session token plus the username it was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(alias = "accessToken")]
    pub token: String,
    pub username: String,
}

impl Credential {
    pub fn new(token: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            username: username.into(),
        }
    }
}

pub type PostId = u64;

/// One item of the content feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub body: String,
}

/// A single page returned by the posts endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPage {
    pub page_number: u32,
    pub items: Vec<Post>,
}

/// Who produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Local,
    Remote,
}

/// Transcript entry of the chat channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sequence: u64,
    pub origin: Origin,
    pub text: String,
    pub timestamp: i64,
}

/// Lifecycle of a realtime channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelState {
    /// Never opened.
    #[default]
    Idle,
    Connecting,
    Open,
    Closing,
    Closed,
    Failed,
}

impl ChannelState {
    pub fn is_active(self) -> bool {
        matches!(self, ChannelState::Connecting | ChannelState::Open)
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChannelState::Idle => "idle",
            ChannelState::Connecting => "connecting",
            ChannelState::Open => "open",
            ChannelState::Closing => "closing",
            ChannelState::Closed => "closed",
            ChannelState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// UI colour scheme, persisted under the `theme` storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_accepts_access_token_alias() {
        let json = r#"{"id":1,"username":"emilys","accessToken":"abc","refreshToken":"r"}"#;
        let credential: Credential = serde_json::from_str(json).unwrap();
        assert_eq!(credential, Credential::new("abc", "emilys"));
    }

    #[test]
    fn theme_round_trips_through_storage_labels() {
        assert_eq!(Theme::parse(Theme::Dark.as_str()), Some(Theme::Dark));
        assert_eq!(Theme::parse("sepia"), None);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }
}
