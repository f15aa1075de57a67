use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A day of the week a habit is scheduled on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All weekdays, Monday first
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// The stable tag stored on disk (`monday`, `tuesday`, ...)
    pub fn tag(self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }

    /// Parse a tag or an English abbreviation of at least three letters
    pub fn from_tag(s: &str) -> Option<Weekday> {
        let lower = s.trim().to_lowercase();
        if lower.len() < 3 {
            return None;
        }
        Weekday::ALL
            .into_iter()
            .find(|d| d.tag().starts_with(&lower))
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Weekly schedule of a task. Empty means a one-off event.
pub type Schedule = BTreeSet<Weekday>;

/// Whether a task recurs on weekdays or happens once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Habit,
    Event,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Habit => write!(f, "habit"),
            TaskKind::Event => write!(f, "event"),
        }
    }
}

/// An RGB color, stored on disk as `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Error returned when a hex color string can't be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color '{0}': expected #RRGGBB, for example {hint}", hint = palette_hint())]
pub struct ColorParseError(pub String);

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ColorParseError(s.to_string()))
        };
        Ok(Color {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Preset colors offered when creating a task
pub const PALETTE: [Color; 18] = [
    Color::rgb(0xFD, 0x4C, 0x49),
    Color::rgb(0xFF, 0x88, 0x1E),
    Color::rgb(0x00, 0x7B, 0xFA),
    Color::rgb(0x6E, 0x44, 0xFE),
    Color::rgb(0x33, 0xCF, 0x69),
    Color::rgb(0xE6, 0x6D, 0xD4),
    Color::rgb(0xF9, 0xD4, 0xD4),
    Color::rgb(0x34, 0xA7, 0xFE),
    Color::rgb(0x46, 0xE6, 0x9D),
    Color::rgb(0x35, 0x34, 0x7C),
    Color::rgb(0xFF, 0x67, 0x4D),
    Color::rgb(0xFF, 0x99, 0xCC),
    Color::rgb(0xF6, 0xC4, 0x8B),
    Color::rgb(0x79, 0x94, 0xF5),
    Color::rgb(0x83, 0x2C, 0xF1),
    Color::rgb(0xAD, 0x56, 0xDA),
    Color::rgb(0x8D, 0x72, 0xE6),
    Color::rgb(0x2F, 0xD0, 0x58),
];

/// Preset emoji offered when creating a task
pub const EMOJI: [&str; 18] = [
    "🙂", "😻", "🌺", "🐶", "❤️", "😱", "😇", "😡", "🥶", "🤔", "🙌", "🍔", "🥦", "🏓", "🥇", "🎸",
    "🏝️", "😪",
];

/// The preset colors on one line
pub fn palette_hint() -> String {
    PALETTE
        .iter()
        .map(Color::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// The preset emoji on one line
pub fn emoji_hint() -> String {
    EMOJI.join(" ")
}

/// A trackable habit or event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub color: Color,
    pub emoji: String,
    /// Weekdays this task recurs on; empty for one-off events
    #[serde(default)]
    pub schedule: Schedule,
}

impl Task {
    pub fn new(name: String, color: Color, emoji: String, schedule: Schedule) -> Self {
        Task {
            id: Uuid::new_v4(),
            name,
            color,
            emoji,
            schedule,
        }
    }

    pub fn kind(&self) -> TaskKind {
        if self.schedule.is_empty() {
            TaskKind::Event
        } else {
            TaskKind::Habit
        }
    }

    pub fn is_habit(&self) -> bool {
        self.kind() == TaskKind::Habit
    }

    /// Short display form of the id (first 8 hex digits)
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }
}

/// User input for creating or editing a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub name: String,
    pub color: Color,
    pub emoji: String,
    pub schedule: Schedule,
}

impl TaskDraft {
    /// Start a draft from an existing task (for partial edits)
    pub fn from_task(task: &Task) -> Self {
        TaskDraft {
            name: task.name.clone(),
            color: task.color,
            emoji: task.emoji.clone(),
            schedule: task.schedule.clone(),
        }
    }
}
