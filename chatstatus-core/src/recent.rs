//! Recently used statuses and emojis
//!
//! Both lists are bounded most-recently-used sequences: the newest entry is
//! at the tail, re-selecting an entry moves it to the tail instead of
//! duplicating it, and the oldest entries fall off the head once the list is
//! over its limit. Display code reads them newest first.
//!
//! All operations are pure: they take a list and return a new one. Callers
//! persist the result.

use crate::emoji::EmojiCatalog;
use crate::error::Result;
use crate::types::CustomStatus;

/// Default bound for both recent lists.
pub const MAX_RECENT_CUSTOM_STATUSES: usize = 27;

/// Bound for the emoji picker's recently used row.
pub const MAX_RECENT_EMOJIS: usize = 27;

/// Remove every entry matching `same`, push `item`, trim the head.
///
/// Stored lists may already hold duplicates (another client wrote them), so
/// all matches go, not just the first.
fn push_most_recent<T>(items: &mut Vec<T>, item: T, limit: usize, same: impl Fn(&T) -> bool) {
    items.retain(|existing| !same(existing));
    items.push(item);

    if items.len() > limit {
        let excess = items.len() - limit;
        items.drain(..excess);
    }
}

/// Parse a JSON array preference value, falling back to empty.
fn parse_list<T: serde::de::DeserializeOwned>(value: Option<&str>, what: &str) -> Vec<T> {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<T>>(value) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(error = %e, list = what, "Discarding malformed recent list");
            Vec::new()
        }
    }
}

// ============================================
// Recent statuses
// ============================================

/// Most-recently-used custom statuses, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentStatuses {
    statuses: Vec<CustomStatus>,
    limit: usize,
}

impl Default for RecentStatuses {
    fn default() -> Self {
        Self::with_limit(MAX_RECENT_CUSTOM_STATUSES)
    }
}

impl RecentStatuses {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty list with a custom bound (at least 1).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            statuses: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Load from a stored preference value.
    ///
    /// Missing or malformed data yields an empty list. Empty sentinel
    /// records are dropped and an over-long list keeps its newest entries.
    pub fn from_preference(value: Option<&str>, limit: usize) -> Self {
        let mut list = Self::with_limit(limit);
        list.statuses = parse_list::<CustomStatus>(value, "custom_statuses")
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();

        if list.statuses.len() > list.limit {
            let excess = list.statuses.len() - list.limit;
            list.statuses.drain(..excess);
        }
        list
    }

    /// Serialize for the preference store.
    pub fn to_preference_value(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.statuses)?)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// Entries in storage order (oldest first).
    pub fn as_slice(&self) -> &[CustomStatus] {
        &self.statuses
    }

    /// Entries newest first, as shown in the status editor.
    pub fn iter_recent_first(&self) -> impl Iterator<Item = &CustomStatus> {
        self.statuses.iter().rev()
    }

    /// Whether any entry carries this text.
    pub fn contains_text(&self, text: &str) -> bool {
        self.statuses.iter().any(|s| s.text == text)
    }
}

/// Record `selected` as the most recently used status.
///
/// The dedup key is the canonical name of the selected emoji. When the
/// emoji is not in the catalog the input list is returned unchanged.
pub fn add_recent_status(
    list: &RecentStatuses,
    selected: &CustomStatus,
    catalog: &EmojiCatalog,
) -> RecentStatuses {
    let Some(key) = catalog.resolve_name(&selected.emoji) else {
        tracing::debug!(emoji = %selected.emoji, "Skipping recent status with unknown emoji");
        return list.clone();
    };

    let entry = CustomStatus {
        emoji: key.to_string(),
        ..selected.clone()
    };

    let mut updated = list.clone();
    push_most_recent(&mut updated.statuses, entry, updated.limit, |existing| {
        catalog
            .resolve_name(&existing.emoji)
            .unwrap_or(existing.emoji.as_str())
            == key
    });
    updated
}

/// Drop entries whose text matches `status`. Order is preserved.
pub fn remove_recent_status(list: &RecentStatuses, status: &CustomStatus) -> RecentStatuses {
    let mut updated = list.clone();
    updated.statuses.retain(|s| s.text != status.text);
    updated
}

// ============================================
// Recent emojis
// ============================================

/// Most-recently-used emoji names, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentEmojis {
    names: Vec<String>,
}

impl RecentEmojis {
    pub fn from_preference(value: Option<&str>) -> Self {
        let mut names = parse_list::<String>(value, "emojis");
        if names.len() > MAX_RECENT_EMOJIS {
            names.drain(..names.len() - MAX_RECENT_EMOJIS);
        }
        Self { names }
    }

    pub fn to_preference_value(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.names)?)
    }

    /// Record an emoji by any alias. Unknown aliases are ignored.
    pub fn add(&self, alias: &str, catalog: &EmojiCatalog) -> Self {
        let Some(name) = catalog.resolve_name(alias) else {
            return self.clone();
        };

        let mut updated = self.clone();
        push_most_recent(
            &mut updated.names,
            name.to_string(),
            MAX_RECENT_EMOJIS,
            |n| n == name,
        );
        updated
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emoji::{CustomEmoji, SystemEmoji};

    /// Catalog with `e0`..`e39` as system emojis plus the built-ins.
    fn catalog() -> EmojiCatalog {
        let mut catalog = EmojiCatalog::with_system_emojis();
        for i in 0..40 {
            catalog.add_system(SystemEmoji {
                aliases: vec![format!("e{}", i)],
                category: String::new(),
            });
        }
        catalog
    }

    fn status(emoji: &str, text: &str) -> CustomStatus {
        CustomStatus::new(emoji, text)
    }

    #[test]
    fn test_add_appends_at_tail() {
        let catalog = catalog();
        let list = RecentStatuses::new();
        let list = add_recent_status(&list, &status("calendar", "In a meeting"), &catalog);
        let list = add_recent_status(&list, &status("house", "WFH"), &catalog);

        assert_eq!(list.len(), 2);
        assert_eq!(list.as_slice()[1].text, "WFH");
        let newest: Vec<_> = list.iter_recent_first().map(|s| s.text.as_str()).collect();
        assert_eq!(newest, vec!["WFH", "In a meeting"]);
    }

    #[test]
    fn test_readd_moves_to_tail() {
        let catalog = catalog();
        let mut list = RecentStatuses::new();
        for (emoji, text) in [("calendar", "a"), ("house", "b"), ("taco", "c")] {
            list = add_recent_status(&list, &status(emoji, text), &catalog);
        }

        let list = add_recent_status(&list, &status("calendar", "a again"), &catalog);
        assert_eq!(list.len(), 3);
        let emojis: Vec<_> = list.as_slice().iter().map(|s| s.emoji.as_str()).collect();
        assert_eq!(emojis, vec!["house", "taco", "calendar"]);
        assert_eq!(list.as_slice()[2].text, "a again");
    }

    #[test]
    fn test_readd_collapses_stored_duplicates() {
        let catalog = catalog();
        let stored = r#"[
            {"emoji":"calendar","text":"A","duration":""},
            {"emoji":"calendar","text":"B","duration":""},
            {"emoji":"house","text":"H","duration":""}
        ]"#;
        let list = RecentStatuses::from_preference(Some(stored), MAX_RECENT_CUSTOM_STATUSES);
        assert_eq!(list.len(), 3);

        let list = add_recent_status(&list, &status("calendar", "C"), &catalog);
        let entries: Vec<_> = list
            .as_slice()
            .iter()
            .map(|s| (s.emoji.as_str(), s.text.as_str()))
            .collect();
        assert_eq!(entries, vec![("house", "H"), ("calendar", "C")]);
    }

    #[test]
    fn test_aliases_collapse_to_one_entry() {
        let catalog = catalog();
        let list = add_recent_status(&RecentStatuses::new(), &status("car", "driving"), &catalog);
        let list = add_recent_status(&list, &status("red_car", "commuting"), &catalog);

        assert_eq!(list.len(), 1);
        assert_eq!(list.as_slice()[0].emoji, "car");
        assert_eq!(list.as_slice()[0].text, "commuting");
    }

    #[test]
    fn test_custom_emoji_key() {
        let mut catalog = catalog();
        catalog.add_custom(CustomEmoji {
            id: "x".to_string(),
            name: "parrot".to_string(),
            creator_id: String::new(),
        });
        let list = add_recent_status(&RecentStatuses::new(), &status("parrot", "party"), &catalog);
        assert_eq!(list.as_slice()[0].emoji, "parrot");
    }

    #[test]
    fn test_unknown_emoji_is_noop() {
        let catalog = catalog();
        let list = add_recent_status(&RecentStatuses::new(), &status("house", "home"), &catalog);
        let after = add_recent_status(&list, &status("not_an_emoji", "??"), &catalog);
        assert_eq!(after, list);
    }

    #[test]
    fn test_bounded_to_27_oldest_evicted() {
        let catalog = catalog();
        let mut list = RecentStatuses::new();
        for i in 0..28 {
            list = add_recent_status(&list, &status(&format!("e{}", i), &format!("t{}", i)), &catalog);
            assert!(list.len() <= MAX_RECENT_CUSTOM_STATUSES);
        }

        assert_eq!(list.len(), 27);
        assert_eq!(list.as_slice()[0].text, "t1");
        assert_eq!(list.as_slice()[26].text, "t27");
    }

    #[test]
    fn test_custom_limit() {
        let catalog = catalog();
        let mut list = RecentStatuses::with_limit(3);
        for i in 0..5 {
            list = add_recent_status(&list, &status(&format!("e{}", i), "x"), &catalog);
        }
        let emojis: Vec<_> = list.as_slice().iter().map(|s| s.emoji.as_str()).collect();
        assert_eq!(emojis, vec!["e2", "e3", "e4"]);
    }

    #[test]
    fn test_remove_by_text() {
        let catalog = catalog();
        let mut list = RecentStatuses::new();
        for (emoji, text) in [("calendar", "a"), ("house", "b"), ("taco", "c")] {
            list = add_recent_status(&list, &status(emoji, text), &catalog);
        }

        let removed = remove_recent_status(&list, &status("anything", "b"));
        let texts: Vec<_> = removed.as_slice().iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "c"]);

        // Removing again changes nothing
        assert_eq!(remove_recent_status(&removed, &status("anything", "b")), removed);
    }

    #[test]
    fn test_preference_round_trip() {
        let catalog = catalog();
        let list = add_recent_status(&RecentStatuses::new(), &status("house", "home"), &catalog);
        let value = list.to_preference_value().unwrap();

        let loaded = RecentStatuses::from_preference(Some(&value), MAX_RECENT_CUSTOM_STATUSES);
        assert_eq!(loaded, list);
    }

    #[test]
    fn test_malformed_preference_is_empty() {
        assert!(RecentStatuses::from_preference(None, 27).is_empty());
        assert!(RecentStatuses::from_preference(Some(""), 27).is_empty());
        assert!(RecentStatuses::from_preference(Some("{\"oops\":1}"), 27).is_empty());
        assert!(RecentStatuses::from_preference(Some("[{\"emoji\":\"\",\"text\":\"\"}]"), 27).is_empty());
    }

    #[test]
    fn test_recent_emojis() {
        let catalog = catalog();
        let recent = RecentEmojis::default()
            .add("thumbsup", &catalog)
            .add("taco", &catalog)
            .add("+1", &catalog)
            .add("nope", &catalog);

        assert_eq!(recent.as_slice(), &["taco".to_string(), "+1".to_string()]);

        let mut many = RecentEmojis::default();
        for i in 0..30 {
            many = many.add(&format!("e{}", i), &catalog);
        }
        assert_eq!(many.len(), MAX_RECENT_EMOJIS);
        assert_eq!(many.as_slice()[0], "e3");
    }

    #[test]
    fn test_recent_emojis_collapse_stored_duplicates() {
        let catalog = catalog();
        let recent = RecentEmojis::from_preference(Some(r#"["taco","+1","taco"]"#));

        let recent = recent.add("taco", &catalog);
        assert_eq!(recent.as_slice(), &["+1".to_string(), "taco".to_string()]);

        let value = recent.to_preference_value().unwrap();
        assert_eq!(value, r#"["+1","taco"]"#);
    }
}
