use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::progression::engine::ProgressionNotice;
use crate::progression::errors::ProgressionError;

/// Editor actions that earn XP.
///
/// Events are persisted by their snake_case key, never by position, so new
/// variants may be appended or reordered without invalidating old saves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    /// Sentinel. Earns nothing and has no challenge.
    None,
    Typing,
    Cut,
    Copy,
    Paste,
    Backspace,
    Tab,
    Enter,
    Save,
    Build,
    Run,
    Debug,
    /// Any other recognized editor command.
    Action,
}

impl Event {
    pub const ALL: [Event; 13] = [
        Event::None,
        Event::Typing,
        Event::Cut,
        Event::Copy,
        Event::Paste,
        Event::Backspace,
        Event::Tab,
        Event::Enter,
        Event::Save,
        Event::Build,
        Event::Run,
        Event::Debug,
        Event::Action,
    ];

    /// XP awarded each time the event is recorded.
    pub const fn base_xp(self) -> u64 {
        match self {
            Event::None => 0,
            Event::Typing => 2,
            Event::Cut | Event::Copy | Event::Paste | Event::Backspace => 1,
            Event::Tab | Event::Enter => 2,
            Event::Save => 10,
            Event::Build => 5,
            Event::Run => 10,
            Event::Debug => 20,
            Event::Action => 5,
        }
    }

    /// Stable key used in persisted documents and on the command line.
    pub const fn key(self) -> &'static str {
        match self {
            Event::None => "none",
            Event::Typing => "typing",
            Event::Cut => "cut",
            Event::Copy => "copy",
            Event::Paste => "paste",
            Event::Backspace => "backspace",
            Event::Tab => "tab",
            Event::Enter => "enter",
            Event::Save => "save",
            Event::Build => "build",
            Event::Run => "run",
            Event::Debug => "debug",
            Event::Action => "action",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Event::None => "None",
            Event::Typing => "Typing",
            Event::Cut => "Cut",
            Event::Copy => "Copy",
            Event::Paste => "Paste",
            Event::Backspace => "Backspace",
            Event::Tab => "Tab",
            Event::Enter => "Enter",
            Event::Save => "Save",
            Event::Build => "Build",
            Event::Run => "Run",
            Event::Debug => "Debug",
            Event::Action => "Action",
        }
    }

    /// Events that can carry an active challenge.
    pub fn trackable() -> impl Iterator<Item = Event> {
        Event::ALL.into_iter().filter(|e| *e != Event::None)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Event {
    type Err = ProgressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Event::ALL
            .into_iter()
            .find(|event| event.key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ProgressionError::UnknownEvent(s.to_string()))
    }
}

/// Where a floating "+N XP" label appears relative to the caret.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum GainedXpPosition {
    Top,
    TopLeft,
    Left,
    BottomLeft,
    Bottom,
    BottomRight,
    Right,
    #[default]
    TopRight,
}

impl GainedXpPosition {
    pub const ALL: [GainedXpPosition; 8] = [
        GainedXpPosition::Top,
        GainedXpPosition::TopLeft,
        GainedXpPosition::Left,
        GainedXpPosition::BottomLeft,
        GainedXpPosition::Bottom,
        GainedXpPosition::BottomRight,
        GainedXpPosition::Right,
        GainedXpPosition::TopRight,
    ];

    /// Unit offset `(x, y)` from the caret; y grows downwards.
    pub const fn offset(self) -> (i8, i8) {
        match self {
            GainedXpPosition::Top => (0, -1),
            GainedXpPosition::TopLeft => (-1, -1),
            GainedXpPosition::Left => (-1, 0),
            GainedXpPosition::BottomLeft => (-1, 1),
            GainedXpPosition::Bottom => (0, 1),
            GainedXpPosition::BottomRight => (1, 1),
            GainedXpPosition::Right => (1, 0),
            GainedXpPosition::TopRight => (1, -1),
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            GainedXpPosition::Top => "top",
            GainedXpPosition::TopLeft => "top_left",
            GainedXpPosition::Left => "left",
            GainedXpPosition::BottomLeft => "bottom_left",
            GainedXpPosition::Bottom => "bottom",
            GainedXpPosition::BottomRight => "bottom_right",
            GainedXpPosition::Right => "right",
            GainedXpPosition::TopRight => "top_right",
        }
    }
}

impl fmt::Display for GainedXpPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for GainedXpPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        GainedXpPosition::ALL
            .into_iter()
            .find(|pos| pos.key() == normalized)
            .ok_or_else(|| format!("unknown label position '{}'", s))
    }
}

/// Notification and display preferences. The engine never reads these; they
/// are stored alongside the progress so front ends can share them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Configuration {
    #[serde(default = "default_true")]
    pub show_level_up_notification: bool,
    #[serde(default = "default_true")]
    pub show_complete_challenge_notification: bool,
    #[serde(default = "default_true")]
    pub show_gained_xp: bool,
    #[serde(default)]
    pub position_to_display_gained_xp: GainedXpPosition,
}

pub(crate) fn default_true() -> bool {
    true
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            show_level_up_notification: true,
            show_complete_challenge_notification: true,
            show_gained_xp: true,
            position_to_display_gained_xp: GainedXpPosition::TopRight,
        }
    }
}

impl Configuration {
    /// Whether a front end should surface `notice` to the user.
    pub fn allows(&self, notice: &ProgressionNotice) -> bool {
        match notice {
            ProgressionNotice::XpChanged { .. } => self.show_gained_xp,
            ProgressionNotice::LevelUp { .. } => self.show_level_up_notification,
            ProgressionNotice::ChallengeCompleted { .. } => {
                self.show_complete_challenge_notification
            }
            ProgressionNotice::ChallengeProgressed { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::level::level_info;

    #[test]
    fn base_xp_table() {
        assert_eq!(Event::None.base_xp(), 0);
        assert_eq!(Event::Typing.base_xp(), 2);
        assert_eq!(Event::Paste.base_xp(), 1);
        assert_eq!(Event::Save.base_xp(), 10);
        assert_eq!(Event::Build.base_xp(), 5);
        assert_eq!(Event::Debug.base_xp(), 20);
        assert_eq!(Event::Action.base_xp(), 5);
    }

    #[test]
    fn event_keys_parse_case_insensitively() {
        for event in Event::ALL {
            assert_eq!(event.key().parse::<Event>().unwrap(), event);
            assert_eq!(event.key().to_uppercase().parse::<Event>().unwrap(), event);
        }
        assert!(matches!(
            "refactor".parse::<Event>(),
            Err(ProgressionError::UnknownEvent(key)) if key == "refactor"
        ));
    }

    #[test]
    fn events_serialize_by_key() {
        let json = serde_json::to_string(&Event::Backspace).unwrap();
        assert_eq!(json, "\"backspace\"");
        let back: Event = serde_json::from_str("\"debug\"").unwrap();
        assert_eq!(back, Event::Debug);
    }

    #[test]
    fn trackable_skips_sentinel() {
        let events: Vec<_> = Event::trackable().collect();
        assert_eq!(events.len(), 12);
        assert!(!events.contains(&Event::None));
    }

    #[test]
    fn position_parsing_accepts_kebab_case() {
        assert_eq!(
            "bottom-left".parse::<GainedXpPosition>().unwrap(),
            GainedXpPosition::BottomLeft
        );
        assert_eq!(GainedXpPosition::TopRight.offset(), (1, -1));
        assert!("middle".parse::<GainedXpPosition>().is_err());
    }

    #[test]
    fn configuration_filters_notices() {
        let config = Configuration {
            show_level_up_notification: false,
            show_complete_challenge_notification: true,
            show_gained_xp: false,
            position_to_display_gained_xp: GainedXpPosition::Left,
        };
        let level = level_info(0);
        assert!(!config.allows(&ProgressionNotice::LevelUp {
            previous_level: 1,
            level,
        }));
        assert!(!config.allows(&ProgressionNotice::XpChanged { gained: 2, level }));
    }

    #[test]
    fn configuration_defaults_fill_missing_fields() {
        let config: Configuration = serde_json::from_str("{\"show_gained_xp\":false}").unwrap();
        assert!(config.show_level_up_notification);
        assert!(!config.show_gained_xp);
        assert_eq!(config.position_to_display_gained_xp, GainedXpPosition::TopRight);
    }
}
