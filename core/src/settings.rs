use serde::{Deserialize, Serialize};
use thiserror::Error;

/// User-facing toggles, stored in the vault config.
///
/// Passed explicitly to the operations that depend on them.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct SequencerSettings {
    /// Also write the inverse link on the linked-to note.
    pub reciprocal_links: bool,
    /// Only suggest notes from the current note's folder.
    pub only_sibling_files: bool,
}

impl Default for SequencerSettings {
    fn default() -> Self {
        SequencerSettings {
            reciprocal_links: true,
            only_sibling_files: true,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Unknown setting '{0}' (known settings: reciprocal_links, only_sibling_files)")]
    UnknownKey(String),

    #[error("Invalid value '{value}' for '{key}': expected true or false")]
    InvalidValue { key: String, value: String },
}

impl SequencerSettings {
    pub const KEYS: [&'static str; 2] = ["reciprocal_links", "only_sibling_files"];

    pub fn get(&self, key: &str) -> Result<bool, SettingsError> {
        match key {
            "reciprocal_links" => Ok(self.reciprocal_links),
            "only_sibling_files" => Ok(self.only_sibling_files),
            _ => Err(SettingsError::UnknownKey(key.to_string())),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let field = match key {
            "reciprocal_links" => &mut self.reciprocal_links,
            "only_sibling_files" => &mut self.only_sibling_files,
            _ => return Err(SettingsError::UnknownKey(key.to_string())),
        };

        *field = match value.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => true,
            "false" | "no" | "off" | "0" => false,
            _ => {
                return Err(SettingsError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            }
        };
        Ok(())
    }

    pub fn entries(&self) -> [(&'static str, bool); 2] {
        [
            ("reciprocal_links", self.reciprocal_links),
            ("only_sibling_files", self.only_sibling_files),
        ]
    }
}
