//! Weekday tag used by recurrence rules.
//!
//! # Invariants
//! - The set of weekdays is closed; values are never created at runtime.
//! - The stored/wire form is the capitalised English day name (`Monday`).

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One day of the week.
///
/// Ordering follows the ISO week (Monday first), which keeps day sets
/// deterministic when flattened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WeekDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl WeekDay {
    /// Every weekday in week order.
    pub const ALL: [WeekDay; 7] = [
        WeekDay::Monday,
        WeekDay::Tuesday,
        WeekDay::Wednesday,
        WeekDay::Thursday,
        WeekDay::Friday,
        WeekDay::Saturday,
        WeekDay::Sunday,
    ];

    /// Returns the full set of weekdays.
    pub fn all() -> BTreeSet<WeekDay> {
        Self::ALL.into_iter().collect()
    }

    /// Returns the stored/wire name of this day.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }

    /// Tests whether `value` is the exact name of a weekday.
    pub fn is_valid(value: &str) -> bool {
        value.parse::<WeekDay>().is_ok()
    }
}

impl Display for WeekDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not an exact weekday name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWeekDayError(pub String);

impl Display for ParseWeekDayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown weekday `{}`", self.0)
    }
}

impl std::error::Error for ParseWeekDayError {}

impl FromStr for WeekDay {
    type Err = ParseWeekDayError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|day| day.as_str() == value)
            .ok_or_else(|| ParseWeekDayError(value.to_string()))
    }
}
