// Message types: platforms, variants, and sequence steps

use serde::{Deserialize, Serialize};

/// Hours a freshly created wait step pauses the sequence
pub const DEFAULT_WAIT_HOURS: u64 = 24;

/// Outreach platform a message can target.
///
/// Serializes as its bare name so it can key JSON maps.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Platform {
    Instagram,
    Facebook,
    LinkedIn,
    Twitter,
    WhatsApp,
    Telegram,
    Discord,
    Reddit,
    Pinterest,
    Nextdoor,
    Skool,
    Slack,
    TikTok,
}

impl Platform {
    pub const ALL: [Platform; 13] = [
        Platform::Instagram,
        Platform::Facebook,
        Platform::LinkedIn,
        Platform::Twitter,
        Platform::WhatsApp,
        Platform::Telegram,
        Platform::Discord,
        Platform::Reddit,
        Platform::Pinterest,
        Platform::Nextdoor,
        Platform::Skool,
        Platform::Slack,
        Platform::TikTok,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Instagram => "Instagram",
            Platform::Facebook => "Facebook",
            Platform::LinkedIn => "LinkedIn",
            Platform::Twitter => "Twitter",
            Platform::WhatsApp => "WhatsApp",
            Platform::Telegram => "Telegram",
            Platform::Discord => "Discord",
            Platform::Reddit => "Reddit",
            Platform::Pinterest => "Pinterest",
            Platform::Nextdoor => "Nextdoor",
            Platform::Skool => "Skool",
            Platform::Slack => "Slack",
            Platform::TikTok => "TikTok",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Platform::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown platform: {}", s))
    }
}

/// One phrasing of an outreach message. Weight is the percentage of
/// sends this variant should receive; content may carry `{{variable}}`
/// placeholders resolved at send time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageVariant {
    /// Unique within its message (UUID v4)
    pub id: String,
    pub content: String,
    pub weight: u32,
}

impl MessageVariant {
    pub fn new(content: &str, weight: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.to_string(),
            weight,
        }
    }
}

/// What a sequence step does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    /// Send one of the step's variants
    Message,
    /// Pause for `delay_hours`
    Wait,
    /// Send a follow-up to non-responders
    FollowUp,
    /// Stop the sequence
    End,
}

/// One step of a campaign sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceMessage {
    pub id: String,
    pub action: ActionKind,
    pub platform: Option<Platform>,
    pub content: String,
    pub delay_hours: u64,
    pub variants: Vec<MessageVariant>,
}

impl SequenceMessage {
    /// A new message step starts with a single empty variant carrying
    /// the full weight.
    pub fn message(platform: Platform) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            action: ActionKind::Message,
            platform: Some(platform),
            content: String::new(),
            delay_hours: 0,
            variants: vec![MessageVariant::new("", 100)],
        }
    }

    /// A new wait step pauses for [`DEFAULT_WAIT_HOURS`] and carries no
    /// variants.
    pub fn wait() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            action: ActionKind::Wait,
            platform: None,
            content: String::new(),
            delay_hours: DEFAULT_WAIT_HOURS,
            variants: Vec::new(),
        }
    }
}
