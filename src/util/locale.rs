use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::task::{Schedule, Weekday};

/// User-facing language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Ru];

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ru => "ru",
        }
    }

    /// Full localized weekday name, as shown by a date picker
    pub fn weekday_name(self, day: Weekday) -> &'static str {
        match self {
            Locale::En => match day {
                Weekday::Monday => "Monday",
                Weekday::Tuesday => "Tuesday",
                Weekday::Wednesday => "Wednesday",
                Weekday::Thursday => "Thursday",
                Weekday::Friday => "Friday",
                Weekday::Saturday => "Saturday",
                Weekday::Sunday => "Sunday",
            },
            Locale::Ru => match day {
                Weekday::Monday => "Понедельник",
                Weekday::Tuesday => "Вторник",
                Weekday::Wednesday => "Среда",
                Weekday::Thursday => "Четверг",
                Weekday::Friday => "Пятница",
                Weekday::Saturday => "Суббота",
                Weekday::Sunday => "Воскресенье",
            },
        }
    }

    pub fn weekday_short(self, day: Weekday) -> &'static str {
        match self {
            Locale::En => match day {
                Weekday::Monday => "Mon",
                Weekday::Tuesday => "Tue",
                Weekday::Wednesday => "Wed",
                Weekday::Thursday => "Thu",
                Weekday::Friday => "Fri",
                Weekday::Saturday => "Sat",
                Weekday::Sunday => "Sun",
            },
            Locale::Ru => match day {
                Weekday::Monday => "Пн",
                Weekday::Tuesday => "Вт",
                Weekday::Wednesday => "Ср",
                Weekday::Thursday => "Чт",
                Weekday::Friday => "Пт",
                Weekday::Saturday => "Сб",
                Weekday::Sunday => "Вс",
            },
        }
    }

    /// Compact schedule text: "Every day" for all seven days, else short names
    pub fn schedule_label(self, schedule: &Schedule) -> String {
        if schedule.len() == Weekday::ALL.len() {
            return match self {
                Locale::En => "Every day".to_string(),
                Locale::Ru => "Каждый день".to_string(),
            };
        }
        schedule
            .iter()
            .map(|d| self.weekday_short(*d))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Case-insensitive comparison of a date's weekday against a scheduled one,
    /// done on localized names.
    pub fn same_weekday(self, scheduled: Weekday, on_date: Weekday) -> bool {
        self.weekday_name(scheduled).to_lowercase() == self.weekday_name(on_date).to_lowercase()
    }

    /// Title of the reserved pinned category
    pub fn pinned_title(self) -> &'static str {
        match self {
            Locale::En => "Pinned",
            Locale::Ru => "Закрепленные",
        }
    }

    /// "N days" with the correct plural form
    pub fn days_count(self, n: usize) -> String {
        match self {
            Locale::En => {
                if n == 1 {
                    "1 day".to_string()
                } else {
                    format!("{} days", n)
                }
            }
            Locale::Ru => {
                let word = match (n % 10, n % 100) {
                    (1, m) if m != 11 => "день",
                    (2..=4, m) if !(12..=14).contains(&m) => "дня",
                    _ => "дней",
                };
                format!("{} {}", n, word)
            }
        }
    }

    /// Placeholder when nothing has been created yet
    pub fn nothing_tracked(self) -> &'static str {
        match self {
            Locale::En => "What shall we track?",
            Locale::Ru => "Что будем отслеживать?",
        }
    }

    /// Placeholder when a filter or search hides everything
    pub fn nothing_found(self) -> &'static str {
        match self {
            Locale::En => "Nothing found",
            Locale::Ru => "Ничего не найдено",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale '{0}' (expected en or ru)")]
pub struct LocaleParseError(pub String);

impl FromStr for Locale {
    type Err = LocaleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::ALL
            .into_iter()
            .find(|l| l.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LocaleParseError(s.to_string()))
    }
}
