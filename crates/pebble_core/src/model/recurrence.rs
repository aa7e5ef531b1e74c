//! Recurrence rule model and factory.
//!
//! # Responsibility
//! - Encode the fixed cadence shape of each recurrence kind.
//! - Turn untrusted `(name, day strings)` input into a validated value.
//!
//! # Invariants
//! - Exactly one cadence magnitude is meaningful per kind, fixed by the kind.
//! - When days are set, their count equals the kind's required day count.
//! - `Daily` always carries all seven days and refuses reassignment.
//!
//! The core only models recurrence shape; it never decides whether a habit
//! is due on a given date.

use crate::model::weekday::WeekDay;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Set of weekdays a recurrence applies to.
pub type DaysOfWeek = BTreeSet<WeekDay>;

/// Recurrence cadence discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecurrenceKind {
    Daily,
    Weekly,
    BiWeekly,
    Monthly,
    BiMonthly,
    Yearly,
    Quarterly,
}

impl RecurrenceKind {
    pub const ALL: [RecurrenceKind; 7] = [
        RecurrenceKind::Daily,
        RecurrenceKind::Weekly,
        RecurrenceKind::BiWeekly,
        RecurrenceKind::Monthly,
        RecurrenceKind::BiMonthly,
        RecurrenceKind::Yearly,
        RecurrenceKind::Quarterly,
    ];

    /// Stored/wire name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::BiWeekly => "Bi-Weekly",
            Self::Monthly => "Monthly",
            Self::BiMonthly => "Bi-Monthly",
            Self::Yearly => "Yearly",
            Self::Quarterly => "Quarterly",
        }
    }

    /// Resolves a kind from its name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Occurrences per week, for week-based cadences.
    pub fn weekly_count(self) -> Option<u32> {
        match self {
            Self::Daily => Some(7),
            Self::Weekly => Some(1),
            Self::BiWeekly => Some(2),
            _ => None,
        }
    }

    /// Occurrences per month, for month-based cadences.
    pub fn monthly_count(self) -> Option<u32> {
        match self {
            Self::Monthly => Some(1),
            Self::BiMonthly => Some(2),
            _ => None,
        }
    }

    /// Occurrences per year, for month- and year-based cadences.
    pub fn yearly_count(self) -> Option<u32> {
        match self {
            Self::Monthly => Some(12),
            Self::BiMonthly => Some(24),
            Self::Yearly => Some(1),
            Self::Quarterly => Some(4),
            _ => None,
        }
    }

    /// Number of days a non-empty day set must contain.
    ///
    /// `Quarterly` shares the yearly rule of a single day.
    pub fn required_days(self) -> usize {
        match self {
            Self::Daily => 7,
            Self::Weekly | Self::Monthly | Self::Yearly | Self::Quarterly => 1,
            Self::BiWeekly | Self::BiMonthly => 2,
        }
    }

    /// Day set used when none is supplied.
    pub fn default_days(self) -> Option<DaysOfWeek> {
        match self {
            Self::Daily => Some(WeekDay::all()),
            Self::BiWeekly => Some([WeekDay::Tuesday, WeekDay::Friday].into_iter().collect()),
            _ => None,
        }
    }
}

impl Display for RecurrenceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised while building or mutating a recurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    /// Name does not match any recurrence kind.
    UnknownRecurrence(String),
    /// A supplied day string is not a weekday name.
    UnknownWeekDay(String),
    /// Day set size does not match the kind's required count.
    InvalidDaysOfWeek {
        recurrence: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Kind whose days are fixed (`Daily`) was given a day set.
    FixedDaysOfWeek(&'static str),
}

impl RecurrenceError {
    /// True for malformed name/day input (the factory's rejection class).
    pub fn is_invalid_recurrence(&self) -> bool {
        matches!(self, Self::UnknownRecurrence(_) | Self::UnknownWeekDay(_))
    }

    /// True for day-set shape violations.
    pub fn is_invalid_days_of_week(&self) -> bool {
        matches!(
            self,
            Self::InvalidDaysOfWeek { .. } | Self::FixedDaysOfWeek(_)
        )
    }
}

impl Display for RecurrenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownRecurrence(name) => write!(f, "invalid recurrence `{name}`"),
            Self::UnknownWeekDay(day) => {
                write!(f, "invalid recurrence: unknown weekday `{day}`")
            }
            Self::InvalidDaysOfWeek {
                recurrence,
                expected,
                actual,
            } => write!(
                f,
                "invalid days of week for {recurrence}: expected {expected} day(s), got {actual}"
            ),
            Self::FixedDaysOfWeek(recurrence) => write!(
                f,
                "invalid days of week: {recurrence} recurrence always applies to every day"
            ),
        }
    }
}

impl Error for RecurrenceError {}

/// Validated recurrence rule.
///
/// Derived equality compares kind (and so every cadence count) plus the day
/// set; day order never matters because the set is ordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recurrence {
    kind: RecurrenceKind,
    days_of_week: Option<DaysOfWeek>,
}

impl Recurrence {
    /// Builds a recurrence of `kind`.
    ///
    /// `None` days fall back to [`RecurrenceKind::default_days`].
    ///
    /// # Errors
    /// - `InvalidDaysOfWeek` when a non-empty set has the wrong size.
    /// - `FixedDaysOfWeek` when `Daily` gets anything but the full week.
    pub fn new(kind: RecurrenceKind, days_of_week: Option<DaysOfWeek>) -> Result<Self, RecurrenceError> {
        let days_of_week = match days_of_week {
            Some(days) if days.is_empty() => None,
            other => other,
        };

        match (kind, days_of_week) {
            (RecurrenceKind::Daily, Some(days)) if days != WeekDay::all() => {
                Err(RecurrenceError::FixedDaysOfWeek(kind.name()))
            }
            (_, Some(days)) => {
                check_day_count(kind, &days)?;
                Ok(Self {
                    kind,
                    days_of_week: Some(days),
                })
            }
            (_, None) => Ok(Self::default_for(kind)),
        }
    }

    /// Builds the default recurrence of `kind`.
    pub fn default_for(kind: RecurrenceKind) -> Self {
        Self {
            kind,
            days_of_week: kind.default_days(),
        }
    }

    pub fn daily() -> Self {
        Self::default_for(RecurrenceKind::Daily)
    }

    /// Reconstructs a recurrence from untrusted strings.
    ///
    /// `daily` (any case) short-circuits to [`Recurrence::daily`] without
    /// looking at `days_of_week`.
    ///
    /// # Errors
    /// - `UnknownWeekDay` when a day string is not an exact weekday name.
    /// - `UnknownRecurrence` when `name` matches no kind.
    /// - Day-count errors from [`Recurrence::new`].
    pub fn from_strings<I, S>(name: &str, days_of_week: I) -> Result<Self, RecurrenceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if name.trim().eq_ignore_ascii_case(RecurrenceKind::Daily.name()) {
            return Ok(Self::daily());
        }

        let days = days_of_week
            .into_iter()
            .map(|day| {
                day.as_ref()
                    .parse::<WeekDay>()
                    .map_err(|err| RecurrenceError::UnknownWeekDay(err.0))
            })
            .collect::<Result<DaysOfWeek, _>>()?;

        let kind = RecurrenceKind::from_name(name)
            .ok_or_else(|| RecurrenceError::UnknownRecurrence(name.to_string()))?;

        Self::new(kind, Some(days))
    }

    pub fn kind(&self) -> RecurrenceKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn weekly_count(&self) -> Option<u32> {
        self.kind.weekly_count()
    }

    pub fn monthly_count(&self) -> Option<u32> {
        self.kind.monthly_count()
    }

    pub fn yearly_count(&self) -> Option<u32> {
        self.kind.yearly_count()
    }

    pub fn days_of_week(&self) -> Option<&DaysOfWeek> {
        self.days_of_week.as_ref()
    }

    /// Replaces the day set.
    ///
    /// # Errors
    /// - `FixedDaysOfWeek` for `Daily`, whatever the input.
    /// - `InvalidDaysOfWeek` when the size differs from the required count.
    pub fn set_days_of_week(&mut self, days_of_week: DaysOfWeek) -> Result<(), RecurrenceError> {
        if self.kind == RecurrenceKind::Daily {
            return Err(RecurrenceError::FixedDaysOfWeek(self.kind.name()));
        }
        check_day_count(self.kind, &days_of_week)?;
        self.days_of_week = Some(days_of_week);
        Ok(())
    }
}

/// Reconstructs a recurrence from a stored name and day strings.
///
/// Free-function form of [`Recurrence::from_strings`].
pub fn recurrence_from_strings<I, S>(name: &str, days_of_week: I) -> Result<Recurrence, RecurrenceError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Recurrence::from_strings(name, days_of_week)
}

fn check_day_count(kind: RecurrenceKind, days: &DaysOfWeek) -> Result<(), RecurrenceError> {
    if days.len() != kind.required_days() {
        return Err(RecurrenceError::InvalidDaysOfWeek {
            recurrence: kind.name(),
            expected: kind.required_days(),
            actual: days.len(),
        });
    }
    Ok(())
}
