//! Status suggestions and drafts
//!
//! A [`StatusDraft`] is what the user is editing before saving; turning it
//! into a [`CustomStatus`] applies the default emoji, trims the text and
//! stamps the expiry.

use crate::error::{Error, Result};
use crate::expiry::calculate_expires_at;
use crate::recent::RecentStatuses;
use crate::types::{
    CustomStatus, CustomStatusDuration, CUSTOM_STATUS_TEXT_CHARACTER_LIMIT, DEFAULT_STATUS_EMOJI,
};
use chrono::{DateTime, TimeZone};

/// A suggested status offered before the user has typed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggestion {
    pub emoji: &'static str,
    pub text: &'static str,
    pub duration: CustomStatusDuration,
}

/// Built-in suggestions, in display order.
pub const DEFAULT_SUGGESTIONS: [Suggestion; 5] = [
    Suggestion {
        emoji: "calendar",
        text: "In a meeting",
        duration: CustomStatusDuration::OneHour,
    },
    Suggestion {
        emoji: "hamburger",
        text: "Out for lunch",
        duration: CustomStatusDuration::ThirtyMinutes,
    },
    Suggestion {
        emoji: "sneezing_face",
        text: "Out sick",
        duration: CustomStatusDuration::Today,
    },
    Suggestion {
        emoji: "house",
        text: "Working from home",
        duration: CustomStatusDuration::Today,
    },
    Suggestion {
        emoji: "palm_tree",
        text: "On a vacation",
        duration: CustomStatusDuration::ThisWeek,
    },
];

impl Suggestion {
    /// Start a draft from this suggestion.
    pub fn to_draft<Tz: TimeZone>(&self) -> StatusDraft<Tz> {
        StatusDraft {
            emoji: self.emoji.to_string(),
            text: self.text.to_string(),
            duration: self.duration,
            custom_expiry: None,
        }
    }
}

/// Default suggestions whose text is not already in the recent list.
pub fn suggestions(recent: &RecentStatuses) -> Vec<Suggestion> {
    DEFAULT_SUGGESTIONS
        .iter()
        .filter(|s| !recent.contains_text(s.text))
        .copied()
        .collect()
}

/// An unsaved status.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusDraft<Tz: TimeZone> {
    pub emoji: String,
    pub text: String,
    pub duration: CustomStatusDuration,
    /// Chosen instant for [`CustomStatusDuration::CustomDateTime`]
    pub custom_expiry: Option<DateTime<Tz>>,
}

impl<Tz: TimeZone> StatusDraft<Tz> {
    pub fn new(emoji: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            emoji: emoji.into(),
            text: text.into(),
            duration: CustomStatusDuration::Today,
            custom_expiry: None,
        }
    }

    pub fn with_duration(mut self, duration: CustomStatusDuration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_custom_expiry(mut self, expiry: DateTime<Tz>) -> Self {
        self.duration = CustomStatusDuration::CustomDateTime;
        self.custom_expiry = Some(expiry);
        self
    }

    /// Seed a draft from a previously saved status (e.g. a recent entry).
    pub fn from_status(status: &CustomStatus) -> Self {
        Self {
            emoji: status.emoji.clone(),
            text: status.text.clone(),
            duration: status.duration,
            custom_expiry: None,
        }
    }

    /// Nothing chosen yet.
    pub fn is_empty(&self) -> bool {
        self.emoji.is_empty() && self.text.trim().is_empty()
    }

    /// Check the draft can be saved.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::InvalidStatus(
                "a status needs an emoji or text".to_string(),
            ));
        }

        let chars = self.text.chars().count();
        if chars > CUSTOM_STATUS_TEXT_CHARACTER_LIMIT {
            return Err(Error::InvalidStatus(format!(
                "text is {} characters, limit is {}",
                chars, CUSTOM_STATUS_TEXT_CHARACTER_LIMIT
            )));
        }

        Ok(())
    }

    /// Build the record to save, computing the expiry relative to `now`.
    pub fn into_status(self, now: &DateTime<Tz>) -> Result<CustomStatus>
    where
        Tz::Offset: std::fmt::Display,
    {
        self.validate()?;

        let expires_at = calculate_expires_at(self.duration, now, self.custom_expiry.as_ref());
        let emoji = if self.emoji.is_empty() {
            DEFAULT_STATUS_EMOJI.to_string()
        } else {
            self.emoji
        };

        Ok(CustomStatus {
            emoji,
            text: self.text.trim().to_string(),
            duration: self.duration,
            expires_at: expires_at.map(|t| t.to_rfc3339()),
        })
    }
}
