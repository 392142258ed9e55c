//! Core domain types for chatstatus
//!
//! These types mirror the custom-status JSON contract used by the chat
//! backend and are validated once, at the point where JSON is parsed.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Custom status** | Emoji + text + expiry attached to a user |
//! | **Duration** | The "clear after" choice made when the status was set |
//! | **Recent list** | Bounded most-recently-used list of previous statuses |
//! | **Dedup key** | Canonical emoji name used to detect "the same" status |
//! | **Props** | Free-form string map stored on a user; holds the status JSON |

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Key in a user's props map under which the status JSON is stored.
pub const USER_PROP_CUSTOM_STATUS: &str = "customStatus";

/// Maximum length of a status text, in characters.
pub const CUSTOM_STATUS_TEXT_CHARACTER_LIMIT: usize = 100;

/// Emoji used when a status is saved with text but no emoji.
pub const DEFAULT_STATUS_EMOJI: &str = "speech_balloon";

// ============================================
// Duration
// ============================================

/// When a custom status should be cleared automatically.
///
/// Serialized with the backend's wire strings; `DontClear` is the empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CustomStatusDuration {
    /// Never expires
    #[default]
    #[serde(rename = "")]
    DontClear,
    #[serde(rename = "thirty_minutes")]
    ThirtyMinutes,
    #[serde(rename = "one_hour")]
    OneHour,
    #[serde(rename = "four_hours")]
    FourHours,
    /// Until the end of the current day
    #[serde(rename = "today")]
    Today,
    /// Until the end of the current week
    #[serde(rename = "this_week")]
    ThisWeek,
    /// Until a user-chosen date and time
    #[serde(rename = "date_and_time", alias = "custom_date_time")]
    CustomDateTime,
}

impl CustomStatusDuration {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomStatusDuration::DontClear => "",
            CustomStatusDuration::ThirtyMinutes => "thirty_minutes",
            CustomStatusDuration::OneHour => "one_hour",
            CustomStatusDuration::FourHours => "four_hours",
            CustomStatusDuration::Today => "today",
            CustomStatusDuration::ThisWeek => "this_week",
            CustomStatusDuration::CustomDateTime => "date_and_time",
        }
    }

    /// Human-readable menu label
    pub fn label(&self) -> &'static str {
        match self {
            CustomStatusDuration::DontClear => "Don't clear",
            CustomStatusDuration::ThirtyMinutes => "30 minutes",
            CustomStatusDuration::OneHour => "1 hour",
            CustomStatusDuration::FourHours => "4 hours",
            CustomStatusDuration::Today => "Today",
            CustomStatusDuration::ThisWeek => "This week",
            CustomStatusDuration::CustomDateTime => "Custom",
        }
    }

    /// Whether a status with this duration carries an `expires_at`.
    pub fn expires(&self) -> bool {
        !matches!(self, CustomStatusDuration::DontClear)
    }
}

impl std::fmt::Display for CustomStatusDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for CustomStatusDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "dont_clear" | "never" => Ok(CustomStatusDuration::DontClear),
            "thirty_minutes" | "30m" => Ok(CustomStatusDuration::ThirtyMinutes),
            "one_hour" | "1h" => Ok(CustomStatusDuration::OneHour),
            "four_hours" | "4h" => Ok(CustomStatusDuration::FourHours),
            "today" => Ok(CustomStatusDuration::Today),
            "this_week" | "week" => Ok(CustomStatusDuration::ThisWeek),
            "date_and_time" | "custom_date_time" | "custom" => {
                Ok(CustomStatusDuration::CustomDateTime)
            }
            _ => Err(format!("unknown status duration: {}", s)),
        }
    }
}

// ============================================
// Custom status
// ============================================

/// A user's custom status as stored on the backend.
///
/// `expires_at` is kept as the raw RFC 3339 string so that a malformed
/// timestamp can be detected (and treated as expired) instead of rejected
/// at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomStatus {
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub duration: CustomStatusDuration,
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

impl CustomStatus {
    /// A status that never expires.
    pub fn new(emoji: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            emoji: emoji.into(),
            text: text.into(),
            duration: CustomStatusDuration::DontClear,
            expires_at: None,
        }
    }

    /// True for the "no status set" sentinel.
    pub fn is_empty(&self) -> bool {
        self.emoji.is_empty() && self.text.is_empty()
    }

    /// Parsed expiry, or `None` when absent or malformed.
    pub fn expires_at_time(&self) -> Option<DateTime<FixedOffset>> {
        self.expires_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    }

    /// Parse a status from its JSON string form.
    ///
    /// Returns `None` for malformed JSON or the empty sentinel.
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str::<CustomStatus>(json) {
            Ok(status) if !status.is_empty() => Some(status),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring malformed custom status JSON");
                None
            }
        }
    }

    /// Read the status out of a user's props map.
    pub fn from_user_props(props: &HashMap<String, String>) -> Option<Self> {
        props
            .get(USER_PROP_CUSTOM_STATUS)
            .filter(|s| !s.is_empty())
            .and_then(|s| Self::from_json(s))
    }
}

// ============================================
// User
// ============================================

/// A chat user, reduced to what the status feature reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    /// IANA timezone name, if the user set one
    #[serde(default)]
    pub timezone: Option<String>,
    /// Free-form props; the status lives under [`USER_PROP_CUSTOM_STATUS`]
    #[serde(default)]
    pub props: HashMap<String, String>,
}

impl User {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            timezone: None,
            props: HashMap::new(),
        }
    }

    /// Stored status regardless of expiry.
    pub fn custom_status(&self) -> Option<CustomStatus> {
        CustomStatus::from_user_props(&self.props)
    }
}

// ============================================
// Preferences
// ============================================

/// Preference category shared by all custom-status preferences.
pub const CATEGORY_CUSTOM_STATUS: &str = "custom_status";
/// Preference name holding the recent status list.
pub const NAME_RECENT_CUSTOM_STATUSES: &str = "recent_custom_statuses";
/// Preference name holding the tutorial state object.
pub const NAME_CUSTOM_STATUS_TUTORIAL_STATE: &str = "custom_status_tutorial_state";
/// Key inside the tutorial state object.
pub const CUSTOM_STATUS_MODAL_VIEWED: &str = "custom_status_modal_viewed";

/// Preference category for emoji picker state.
pub const CATEGORY_EMOJI: &str = "emoji";
/// Preference name holding the recently used emoji names.
pub const NAME_RECENT_EMOJIS: &str = "recent_emojis";

/// A single (category, name) preference value for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    pub user_id: String,
    pub category: String,
    pub name: String,
    pub value: String,
}
