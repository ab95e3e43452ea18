//! Global pick-lists of editors, platforms and channels
//!
//! Lists are deduplicated by exact, case-sensitive match and kept sorted.
//! Removing an entry never touches projects that use it.

use serde::{Deserialize, Serialize};

/// Default editors
pub const DEFAULT_EDITORS: [&str; 3] = ["Mia", "Leo", "Kai"];

/// Default platforms
pub const DEFAULT_PLATFORMS: [&str; 5] = ["Instagram", "TikTok", "YouTube", "Facebook", "LinkedIn"];

/// Default channels
pub const DEFAULT_CHANNELS: [&str; 3] = ["Main Brand", "Clips Channel", "Client Channel"];

/// Which pick-list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    /// Editors
    Editor,
    /// Platforms
    Platform,
    /// Channels
    Channel,
}

impl ListKind {
    /// Singular label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            ListKind::Editor => "Editor",
            ListKind::Platform => "Platform",
            ListKind::Channel => "Channel",
        }
    }
}

impl std::str::FromStr for ListKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().trim_end_matches('s') {
            "editor" => Ok(ListKind::Editor),
            "platform" => Ok(ListKind::Platform),
            "channel" => Ok(ListKind::Channel),
            _ => Err(format!("unknown list: '{s}'")),
        }
    }
}

/// The three global pick-lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickLists {
    /// Known editors
    pub editors: Vec<String>,
    /// Known platforms
    pub platforms: Vec<String>,
    /// Known channels
    pub channels: Vec<String>,
}

impl Default for PickLists {
    fn default() -> Self {
        let owned = |values: &[&str]| values.iter().map(ToString::to_string).collect();
        Self {
            editors: owned(&DEFAULT_EDITORS),
            platforms: owned(&DEFAULT_PLATFORMS),
            channels: owned(&DEFAULT_CHANNELS),
        }
    }
}

impl PickLists {
    /// Borrow one list
    #[must_use]
    pub fn get(&self, kind: ListKind) -> &[String] {
        match kind {
            ListKind::Editor => &self.editors,
            ListKind::Platform => &self.platforms,
            ListKind::Channel => &self.channels,
        }
    }

    fn get_mut(&mut self, kind: ListKind) -> &mut Vec<String> {
        match kind {
            ListKind::Editor => &mut self.editors,
            ListKind::Platform => &mut self.platforms,
            ListKind::Channel => &mut self.channels,
        }
    }

    /// Whether the list holds `value` exactly
    #[must_use]
    pub fn contains(&self, kind: ListKind, value: &str) -> bool {
        self.get(kind).iter().any(|v| v == value)
    }

    /// Add a value, keeping the list sorted
    ///
    /// Returns `false` if the value is empty or already present.
    pub fn add(&mut self, kind: ListKind, value: &str) -> bool {
        if value.is_empty() || self.contains(kind, value) {
            return false;
        }
        let list = self.get_mut(kind);
        list.push(value.to_string());
        list.sort();
        true
    }

    /// Remove a value; returns whether it was present
    pub fn remove(&mut self, kind: ListKind, value: &str) -> bool {
        let list = self.get_mut(kind);
        let before = list.len();
        list.retain(|v| v != value);
        list.len() != before
    }

    /// Record values seen on a saved project; returns whether anything was added
    pub fn absorb(&mut self, editor: &str, platform: &str, channel: &str) -> bool {
        let editor = self.add(ListKind::Editor, editor);
        let platform = self.add(ListKind::Platform, platform);
        let channel = self.add(ListKind::Channel, channel);
        editor || platform || channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_keeps_sorted_and_unique() {
        let mut lists = PickLists::default();
        assert!(lists.add(ListKind::Editor, "Ava"));
        assert!(!lists.add(ListKind::Editor, "Ava"));
        assert_eq!(lists.editors, ["Ava", "Kai", "Leo", "Mia"]);
    }

    #[test]
    fn dedup_is_case_sensitive() {
        let mut lists = PickLists::default();
        assert!(lists.add(ListKind::Platform, "youtube"));
        assert!(lists.contains(ListKind::Platform, "YouTube"));
        assert!(lists.contains(ListKind::Platform, "youtube"));
    }

    #[test]
    fn absorb_ignores_empty() {
        let mut lists = PickLists::default();
        assert!(!lists.absorb("", "", ""));
        assert!(lists.absorb("Mia", "", "Podcast"));
        assert!(lists.contains(ListKind::Channel, "Podcast"));
    }

    #[test]
    fn remove_reports_presence() {
        let mut lists = PickLists::default();
        assert!(lists.remove(ListKind::Channel, "Main Brand"));
        assert!(!lists.remove(ListKind::Channel, "Main Brand"));
    }

    #[test]
    fn parse_kind_accepts_plurals() {
        assert_eq!("channels".parse::<ListKind>(), Ok(ListKind::Channel));
        assert_eq!("Editor".parse::<ListKind>(), Ok(ListKind::Editor));
        assert!("clients".parse::<ListKind>().is_err());
    }
}
