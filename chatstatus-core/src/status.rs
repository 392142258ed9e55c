//! Custom status service
//!
//! [`StatusService`] ties the pure helpers to the store: it reads and writes
//! the user's status, keeps the recent lists and tutorial flag in the
//! preference table, and answers the questions display code asks ("is this
//! status visible?", "what does the expiry say?").
//!
//! Every method takes the current time as an argument.

use crate::config::{EmojiConfig, StatusSettings};
use crate::db::Database;
use crate::emoji::EmojiCatalog;
use crate::error::{Error, Result};
use crate::expiry::{status_expiry_label, visible_status};
use crate::recent::{add_recent_status, remove_recent_status, RecentEmojis, RecentStatuses};
use crate::suggestions::{suggestions, StatusDraft, Suggestion};
use crate::tutorial::TutorialState;
use crate::types::*;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::collections::BTreeSet;

/// Build the emoji catalog: built-ins, the optional catalog file, and the
/// custom emojis stored in the database when custom emojis are enabled.
pub fn load_emoji_catalog(
    db: &Database,
    emoji: &EmojiConfig,
    settings: &StatusSettings,
) -> Result<EmojiCatalog> {
    let mut catalog = match &emoji.catalog_path {
        Some(path) => EmojiCatalog::load_from(path)?,
        None => EmojiCatalog::with_system_emojis(),
    };

    if settings.custom_emoji_enabled {
        for custom in db.list_custom_emojis()? {
            catalog.add_custom(custom);
        }
    }

    tracing::debug!(emojis = catalog.len(), "Emoji catalog ready");
    Ok(catalog)
}

/// Status operations for users of one store.
pub struct StatusService<'a> {
    db: &'a Database,
    catalog: &'a EmojiCatalog,
    settings: &'a StatusSettings,
    tz: Tz,
}

impl<'a> StatusService<'a> {
    pub fn new(db: &'a Database, catalog: &'a EmojiCatalog, settings: &'a StatusSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            db,
            catalog,
            settings,
            tz: settings.tz()?,
        })
    }

    /// Configured timezone
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Timezone for a user: their own when set and valid, else the default.
    pub fn user_timezone(&self, user: &User) -> Tz {
        user.timezone
            .as_deref()
            .and_then(|name| name.parse::<Tz>().ok())
            .unwrap_or(self.tz)
    }

    fn require_user(&self, user_id: &str) -> Result<User> {
        self.db
            .get_user(user_id)?
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))
    }

    // ============================================
    // Status
    // ============================================

    /// Save a status for `user_id` and record it as recently used.
    ///
    /// Recent-list and tutorial updates are best effort: a failure there is
    /// logged and the saved status is still returned.
    pub fn set_custom_status(
        &self,
        user_id: &str,
        draft: StatusDraft<Tz>,
        now: &DateTime<Utc>,
    ) -> Result<CustomStatus> {
        if !self.settings.enabled {
            return Err(Error::FeatureDisabled);
        }

        let user = self.require_user(user_id)?;
        let local_now = now.with_timezone(&self.user_timezone(&user));
        let status = draft.into_status(&local_now)?;

        if !self.settings.custom_emoji_enabled && self.catalog.has_custom(&status.emoji) {
            return Err(Error::InvalidStatus(format!(
                "custom emoji :{}: is disabled",
                status.emoji
            )));
        }

        self.db.set_user_custom_status(user_id, &status)?;
        tracing::info!(
            user_id,
            emoji = %status.emoji,
            duration = status.duration.as_str(),
            expires_at = ?status.expires_at,
            "Custom status set"
        );

        if let Err(e) = self.record_recent(user_id, &status) {
            tracing::warn!(user_id, error = %e, "Failed to persist recent statuses");
        }

        Ok(status)
    }

    fn record_recent(&self, user_id: &str, status: &CustomStatus) -> Result<()> {
        let recent = add_recent_status(&self.recent_statuses(user_id)?, status, self.catalog);
        let emojis = self.recent_emojis(user_id)?.add(&status.emoji, self.catalog);
        let tutorial = self.tutorial_state(user_id)?.mark_modal_viewed();

        self.db.save_preferences(&[
            Preference {
                user_id: user_id.to_string(),
                category: CATEGORY_CUSTOM_STATUS.to_string(),
                name: NAME_RECENT_CUSTOM_STATUSES.to_string(),
                value: recent.to_preference_value()?,
            },
            Preference {
                user_id: user_id.to_string(),
                category: CATEGORY_EMOJI.to_string(),
                name: NAME_RECENT_EMOJIS.to_string(),
                value: emojis.to_preference_value()?,
            },
            Preference {
                user_id: user_id.to_string(),
                category: CATEGORY_CUSTOM_STATUS.to_string(),
                name: NAME_CUSTOM_STATUS_TUTORIAL_STATE.to_string(),
                value: tutorial.to_preference_value(),
            },
        ])
    }

    /// Clear the user's status. Returns true if one was set.
    pub fn unset_custom_status(&self, user_id: &str) -> Result<bool> {
        let cleared = self.db.clear_user_custom_status(user_id)?;
        tracing::info!(user_id, cleared, "Custom status cleared");
        Ok(cleared)
    }

    /// The user's status if the feature is on and the status has not expired.
    pub fn get_custom_status(&self, user_id: &str, now: &DateTime<Utc>) -> Result<Option<CustomStatus>> {
        if !self.settings.enabled {
            return Ok(None);
        }

        let user = self.require_user(user_id)?;
        Ok(visible_status(user.custom_status(), now))
    }

    /// "Until ..." label for a status, in the given user's timezone.
    pub fn expiry_label(&self, user: &User, status: &CustomStatus, now: &DateTime<Utc>) -> Option<String> {
        let local_now = now.with_timezone(&self.user_timezone(user));
        status_expiry_label(status, &local_now)
    }

    // ============================================
    // Recent lists
    // ============================================

    pub fn recent_statuses(&self, user_id: &str) -> Result<RecentStatuses> {
        let value =
            self.db
                .get_preference(user_id, CATEGORY_CUSTOM_STATUS, NAME_RECENT_CUSTOM_STATUSES)?;
        Ok(RecentStatuses::from_preference(
            value.as_deref(),
            self.settings.max_recent,
        ))
    }

    /// Forget a recent status (matched by text) and persist the list.
    pub fn remove_recent_status(&self, user_id: &str, status: &CustomStatus) -> Result<RecentStatuses> {
        let current = self.recent_statuses(user_id)?;
        let updated = remove_recent_status(&current, status);

        if updated.len() != current.len() {
            self.db.save_preference(
                user_id,
                CATEGORY_CUSTOM_STATUS,
                NAME_RECENT_CUSTOM_STATUSES,
                &updated.to_preference_value()?,
            )?;
            tracing::debug!(user_id, text = %status.text, "Removed recent status");
        }
        Ok(updated)
    }

    pub fn recent_emojis(&self, user_id: &str) -> Result<RecentEmojis> {
        let value = self
            .db
            .get_preference(user_id, CATEGORY_EMOJI, NAME_RECENT_EMOJIS)?;
        Ok(RecentEmojis::from_preference(value.as_deref()))
    }

    /// Default suggestions not already present in the recent list
    pub fn suggestions(&self, user_id: &str) -> Result<Vec<Suggestion>> {
        Ok(suggestions(&self.recent_statuses(user_id)?))
    }

    // ============================================
    // Tutorial
    // ============================================

    pub fn tutorial_state(&self, user_id: &str) -> Result<TutorialState> {
        let value = self.db.get_preference(
            user_id,
            CATEGORY_CUSTOM_STATUS,
            NAME_CUSTOM_STATUS_TUTORIAL_STATE,
        )?;
        Ok(TutorialState::from_preference(value.as_deref()))
    }

    pub fn show_status_dropdown_pulsating_dot(&self, user_id: &str) -> Result<bool> {
        Ok(self.settings.enabled && self.tutorial_state(user_id)?.show_status_dropdown_pulsating_dot())
    }

    pub fn show_post_header_update_status_button(&self, user_id: &str) -> Result<bool> {
        Ok(self.settings.enabled
            && self
                .tutorial_state(user_id)?
                .show_post_header_update_status_button())
    }

    // ============================================
    // Emoji loading
    // ============================================

    /// Custom emoji names used by these users' visible statuses that the
    /// catalog does not know yet. Sorted and deduplicated; unknown user IDs
    /// are skipped.
    pub fn custom_emojis_to_load(&self, user_ids: &[&str], now: &DateTime<Utc>) -> Result<Vec<String>> {
        if !self.settings.enabled || !self.settings.custom_emoji_enabled {
            return Ok(Vec::new());
        }

        let mut to_load = BTreeSet::new();
        for user_id in user_ids {
            let Some(user) = self.db.get_user(user_id)? else {
                continue;
            };
            let Some(status) = visible_status(user.custom_status(), now) else {
                continue;
            };

            if self.needs_loading(&status.emoji) {
                to_load.insert(status.emoji);
            }
        }

        tracing::debug!(count = to_load.len(), "Custom emojis to load");
        Ok(to_load.into_iter().collect())
    }

    /// Names in the user's recently used emojis that the catalog lacks,
    /// sorted. Empty when custom emojis are disabled.
    pub fn recent_custom_emojis_to_load(&self, user_id: &str) -> Result<Vec<String>> {
        if !self.settings.custom_emoji_enabled {
            return Ok(Vec::new());
        }

        let to_load: BTreeSet<String> = self
            .recent_emojis(user_id)?
            .as_slice()
            .iter()
            .filter(|name| self.needs_loading(name))
            .cloned()
            .collect();

        tracing::debug!(user_id, count = to_load.len(), "Recent custom emojis to load");
        Ok(to_load.into_iter().collect())
    }

    /// Not a system emoji, not a loaded custom emoji, not known to be missing.
    fn needs_loading(&self, name: &str) -> bool {
        !name.is_empty()
            && !self.catalog.is_system(name)
            && !self.catalog.is_known_non_existent(name)
            && !self.catalog.has_custom(name)
    }
}
