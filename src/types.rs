//! Calendar date and clock time values.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::validate::{DateError, TimeError, parse_date, parse_time};

/// Folded (lowercase) username.
pub type Username = String;

/// First year accepted by the scheduler.
pub const FIRST_YEAR: u16 = 2023;
/// Last year accepted by the scheduler.
pub const LAST_YEAR: u16 = 2024;

/// Calendar date inside the supported window.
///
/// Values are only produced by [`crate::validate::parse_date`] or
/// [`Date::new`], both of which reject dates outside
/// [`FIRST_YEAR`]..=[`LAST_YEAR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Date {
    year: u16,
    month: u8,
    day: u8,
}

impl Date {
    /// Builds a date, returning `None` when any field is out of range.
    pub fn new(year: u16, month: u8, day: u8) -> Option<Self> {
        if !(FIRST_YEAR..=LAST_YEAR).contains(&year) || !(1..=12).contains(&month) {
            return None;
        }
        if day == 0 || day > days_in_month(year, month) {
            return None;
        }
        Some(Self { year, month, day })
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl TryFrom<String> for Date {
    type Error = DateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_date(&value)
    }
}

impl From<Date> for String {
    fn from(value: Date) -> Self {
        value.to_string()
    }
}

/// Gregorian leap year test.
pub fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` of `year`. Returns 0 for an invalid month.
pub fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Half-day designator of a 12-hour clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Meridiem {
    /// Before noon.
    AM,
    /// Noon and after.
    PM,
}

impl Meridiem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AM => "AM",
            Self::PM => "PM",
        }
    }
}

/// 12-hour clock time.
///
/// Hours 0 and 12 both denote the first hour of their half-day: `00:15 AM` and
/// `12:15 AM` are the same instant. Ordering, equality and hashing all go
/// through [`Time::minutes_since_midnight`], so they agree with each other.
/// The hour as entered is kept for display.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Time {
    hour: u8,
    minute: u8,
    meridiem: Meridiem,
}

impl Time {
    /// Builds a time, returning `None` for hour > 12 or minute > 59.
    pub fn new(hour: u8, minute: u8, meridiem: Meridiem) -> Option<Self> {
        if hour > 12 || minute > 59 {
            return None;
        }
        Some(Self {
            hour,
            minute,
            meridiem,
        })
    }

    /// Hour as entered, 0..=12.
    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn meridiem(&self) -> Meridiem {
        self.meridiem
    }

    /// Position of this time within the day, in minutes.
    pub fn minutes_since_midnight(&self) -> u16 {
        let half_day = match self.meridiem {
            Meridiem::AM => 0,
            Meridiem::PM => 12 * 60,
        };
        half_day + u16::from(self.hour % 12) * 60 + u16::from(self.minute)
    }
}

impl PartialEq for Time {
    fn eq(&self, other: &Self) -> bool {
        self.minutes_since_midnight() == other.minutes_since_midnight()
    }
}

impl Eq for Time {}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Time {
    fn cmp(&self, other: &Self) -> Ordering {
        self.minutes_since_midnight()
            .cmp(&other.minutes_since_midnight())
    }
}

impl Hash for Time {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.minutes_since_midnight().hash(state);
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02} {}",
            self.hour,
            self.minute,
            self.meridiem.as_str()
        )
    }
}

impl TryFrom<String> for Time {
    type Error = TimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_time(&value)
    }
}

impl From<Time> for String {
    fn from(value: Time) -> Self {
        value.to_string()
    }
}
