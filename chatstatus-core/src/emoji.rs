//! Emoji catalog
//!
//! Read-only lookup from an alias or custom-emoji name to the emoji it
//! denotes. The recency tracker uses it to turn whatever alias a user picked
//! into one canonical name, so `car` and `red_car` count as the same emoji.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// A built-in emoji. May be reachable through several aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemEmoji {
    pub aliases: Vec<String>,
    #[serde(default)]
    pub category: String,
}

/// An emoji uploaded by a user of the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomEmoji {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub creator_id: String,
}

/// Either kind of emoji, as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Emoji {
    Custom(CustomEmoji),
    System(SystemEmoji),
}

impl Emoji {
    /// Canonical name: the custom emoji's name, else the first system alias.
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Emoji::Custom(custom) => Some(custom.name.as_str()),
            Emoji::System(system) => system.aliases.first().map(String::as_str),
        }
    }
}

/// System emojis available without loading anything.
const BUILTIN_SYSTEM_EMOJIS: &[(&[&str], &str)] = &[
    (&["grinning"], "smileys-emotion"),
    (&["smile"], "smileys-emotion"),
    (&["sneezing_face"], "smileys-emotion"),
    (&["speech_balloon"], "smileys-emotion"),
    (&["+1", "thumbsup"], "people-body"),
    (&["-1", "thumbsdown"], "people-body"),
    (&["palm_tree"], "animals-nature"),
    (&["sunny"], "travel-places"),
    (&["hamburger"], "food-drink"),
    (&["taco"], "food-drink"),
    (&["coffee"], "food-drink"),
    (&["house"], "travel-places"),
    (&["car", "red_car"], "travel-places"),
    (&["airplane"], "travel-places"),
    (&["calendar"], "objects"),
    (&["spiral_calendar_pad", "spiral_calendar"], "objects"),
    (&["computer"], "objects"),
    (&["headphones"], "objects"),
    (&["zzz"], "smileys-emotion"),
];

/// Alias/name lookup over system and custom emojis.
#[derive(Debug, Clone, Default)]
pub struct EmojiCatalog {
    emojis: Vec<Emoji>,
    /// alias or custom name -> index into `emojis`
    index: HashMap<String, usize>,
    /// names confirmed not to exist on the server
    non_existent: HashSet<String>,
}

impl EmojiCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog preloaded with the built-in system emojis.
    pub fn with_system_emojis() -> Self {
        let mut catalog = Self::new();
        for (aliases, category) in BUILTIN_SYSTEM_EMOJIS {
            catalog.add_system(SystemEmoji {
                aliases: aliases.iter().map(|a| a.to_string()).collect(),
                category: category.to_string(),
            });
        }
        catalog
    }

    /// Load additional emojis from a JSON array file on top of the built-ins.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let emojis: Vec<Emoji> = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "failed to parse emoji catalog {}: {}",
                path.display(),
                e
            ))
        })?;

        let mut catalog = Self::with_system_emojis();
        let count = emojis.len();
        for emoji in emojis {
            catalog.insert(emoji);
        }

        tracing::debug!(path = %path.display(), count, "Loaded emoji catalog");
        Ok(catalog)
    }

    /// Register a system emoji under all of its aliases.
    ///
    /// Aliases already claimed by another emoji keep their first owner.
    pub fn add_system(&mut self, emoji: SystemEmoji) {
        self.insert(Emoji::System(emoji));
    }

    /// Register a custom emoji. A system alias with the same name wins.
    pub fn add_custom(&mut self, emoji: CustomEmoji) {
        self.non_existent.remove(&emoji.name);
        self.insert(Emoji::Custom(emoji));
    }

    fn insert(&mut self, emoji: Emoji) {
        let keys: Vec<String> = match &emoji {
            Emoji::Custom(custom) => vec![custom.name.clone()],
            Emoji::System(system) => system.aliases.clone(),
        };
        if keys.is_empty() {
            return;
        }

        let idx = self.emojis.len();
        self.emojis.push(emoji);
        for key in keys {
            self.index.entry(key).or_insert(idx);
        }
    }

    /// Remember that a custom emoji name does not exist on the server.
    pub fn mark_non_existent(&mut self, name: impl Into<String>) {
        self.non_existent.insert(name.into());
    }

    /// Look up an emoji by any alias or custom name.
    pub fn get(&self, alias: &str) -> Option<&Emoji> {
        self.index.get(alias).map(|&idx| &self.emojis[idx])
    }

    /// Resolve an alias to its canonical name (the dedup key).
    pub fn resolve_name(&self, alias: &str) -> Option<&str> {
        self.get(alias).and_then(Emoji::display_name)
    }

    /// True if `alias` names a built-in emoji.
    pub fn is_system(&self, alias: &str) -> bool {
        matches!(self.get(alias), Some(Emoji::System(_)))
    }

    /// True if `name` is a loaded custom emoji.
    pub fn has_custom(&self, name: &str) -> bool {
        matches!(self.get(name), Some(Emoji::Custom(_)))
    }

    pub fn is_known_non_existent(&self, name: &str) -> bool {
        self.non_existent.contains(name)
    }

    /// Number of distinct emojis (not aliases).
    pub fn len(&self) -> usize {
        self.emojis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emojis.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parrot() -> CustomEmoji {
        CustomEmoji {
            id: "e1".to_string(),
            name: "parrot".to_string(),
            creator_id: "u1".to_string(),
        }
    }

    #[test]
    fn test_resolve_first_alias() {
        let catalog = EmojiCatalog::with_system_emojis();
        assert_eq!(catalog.resolve_name("red_car"), Some("car"));
        assert_eq!(catalog.resolve_name("car"), Some("car"));
        assert_eq!(catalog.resolve_name("thumbsup"), Some("+1"));
        assert_eq!(catalog.resolve_name("no_such_emoji"), None);
    }

    #[test]
    fn test_custom_emoji_resolves_to_name() {
        let mut catalog = EmojiCatalog::with_system_emojis();
        catalog.add_custom(parrot());

        assert!(catalog.has_custom("parrot"));
        assert!(!catalog.is_system("parrot"));
        assert_eq!(catalog.resolve_name("parrot"), Some("parrot"));
    }

    #[test]
    fn test_system_alias_wins_over_custom() {
        let mut catalog = EmojiCatalog::with_system_emojis();
        catalog.add_custom(CustomEmoji {
            id: "e2".to_string(),
            name: "taco".to_string(),
            creator_id: String::new(),
        });
        assert!(catalog.is_system("taco"));
    }

    #[test]
    fn test_non_existent_cleared_when_loaded() {
        let mut catalog = EmojiCatalog::new();
        catalog.mark_non_existent("parrot");
        assert!(catalog.is_known_non_existent("parrot"));

        catalog.add_custom(parrot());
        assert!(!catalog.is_known_non_existent("parrot"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("emoji.json");
        std::fs::write(
            &path,
            r#"[
                {"id": "abc", "name": "partyparrot", "creator_id": "u9"},
                {"aliases": ["rocket"], "category": "travel-places"}
            ]"#,
        )
        .unwrap();

        let catalog = EmojiCatalog::load_from(&path).unwrap();
        assert!(catalog.has_custom("partyparrot"));
        assert!(catalog.is_system("rocket"));
        assert!(catalog.is_system("calendar"));
    }

    #[test]
    fn test_load_from_bad_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("emoji.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            EmojiCatalog::load_from(&path),
            Err(Error::Config(_))
        ));
    }
}
