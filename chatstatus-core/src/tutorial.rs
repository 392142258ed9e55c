//! First-run hint state
//!
//! Until the user opens the status editor once, clients show a pulsating dot
//! on the status menu and an "update your status" button in post headers.

use crate::types::CUSTOM_STATUS_MODAL_VIEWED;
use serde_json::{Map, Value};

/// Parsed tutorial state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TutorialState {
    flags: Map<String, Value>,
}

impl TutorialState {
    /// Parse the stored value. Missing or malformed means nothing viewed.
    pub fn from_preference(value: Option<&str>) -> Self {
        let flags = value
            .and_then(|v| serde_json::from_str::<Value>(v).ok())
            .and_then(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .unwrap_or_default();
        Self { flags }
    }

    pub fn to_preference_value(&self) -> String {
        Value::Object(self.flags.clone()).to_string()
    }

    /// Whether the status editor has been opened before.
    pub fn modal_viewed(&self) -> bool {
        self.flags
            .get(CUSTOM_STATUS_MODAL_VIEWED)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Record that the editor has been opened. Other keys are preserved.
    pub fn mark_modal_viewed(mut self) -> Self {
        self.flags
            .insert(CUSTOM_STATUS_MODAL_VIEWED.to_string(), Value::Bool(true));
        self
    }

    /// Show the pulsating dot on the status dropdown.
    pub fn show_status_dropdown_pulsating_dot(&self) -> bool {
        !self.modal_viewed()
    }

    /// Show the "set a status" button in post headers.
    pub fn show_post_header_update_status_button(&self) -> bool {
        !self.modal_viewed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_not_viewed() {
        let state = TutorialState::from_preference(None);
        assert!(!state.modal_viewed());
        assert!(state.show_status_dropdown_pulsating_dot());
        assert!(state.show_post_header_update_status_button());
    }

    #[test]
    fn test_malformed_not_viewed() {
        assert!(!TutorialState::from_preference(Some("true")).modal_viewed());
        assert!(!TutorialState::from_preference(Some("{{")).modal_viewed());
        assert!(!TutorialState::from_preference(Some(r#"{"custom_status_modal_viewed":"yes"}"#))
            .modal_viewed());
    }

    #[test]
    fn test_mark_viewed_round_trip() {
        let state = TutorialState::from_preference(Some(r#"{"other":1}"#)).mark_modal_viewed();
        let value = state.to_preference_value();

        let loaded = TutorialState::from_preference(Some(&value));
        assert!(loaded.modal_viewed());
        assert!(!loaded.show_status_dropdown_pulsating_dot());
        assert!(value.contains("\"other\":1"));
    }
}
