//! Parsing of raw date, time and username input.

use thiserror::Error;

use crate::types::{Date, Meridiem, Time, days_in_month, FIRST_YEAR, LAST_YEAR};

/// Why a date string was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// Not of the form `YYYY-MM-DD`.
    #[error("date must be formatted as YYYY-MM-DD")]
    Malformed,
    /// Year outside the supported window.
    #[error("year {0} is outside {first}..={last}", first = FIRST_YEAR, last = LAST_YEAR)]
    YearOutOfRange(u16),
    /// Month outside 1..=12.
    #[error("month {0} is outside 1..=12")]
    MonthOutOfRange(u8),
    /// Day is zero or past the end of the month.
    #[error("day {day} does not exist in {year:04}-{month:02}")]
    DayOutOfRange {
        /// Parsed year.
        year: u16,
        /// Parsed month.
        month: u8,
        /// Rejected day.
        day: u8,
    },
}

/// Why a time string was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    /// Not of the form `HH:MM AM` / `HH:MM PM`.
    #[error("time must be formatted as HH:MM AM or HH:MM PM")]
    Malformed,
    /// Hour above 12.
    #[error("hour {0} is outside 0..=12")]
    HourOutOfRange(u8),
    /// Minute above 59.
    #[error("minute {0} is outside 0..=59")]
    MinuteOutOfRange(u8),
    /// Meridiem other than `AM` or `PM`.
    #[error("expected AM or PM, got {0:?}")]
    BadMeridiem(String),
    /// An appointment whose end does not come after its start.
    #[error("end time {end} is not after start time {start}")]
    EndNotAfterStart {
        /// Requested start.
        start: Time,
        /// Requested end.
        end: Time,
    },
}

/// Parses `YYYY-MM-DD` into a [`Date`] within the supported years.
pub fn parse_date(s: &str) -> Result<Date, DateError> {
    let mut fields = s.split('-');
    let (Some(y), Some(m), Some(d), None) = (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(DateError::Malformed);
    };

    let year = digits(y, 4).ok_or(DateError::Malformed)?;
    let month = digits(m, 2).ok_or(DateError::Malformed)?;
    let day = digits(d, 2).ok_or(DateError::Malformed)?;

    if !(FIRST_YEAR..=LAST_YEAR).contains(&year) {
        return Err(DateError::YearOutOfRange(year));
    }
    // Two digits always fit in a u8.
    let month = month as u8;
    let day = day as u8;
    if !(1..=12).contains(&month) {
        return Err(DateError::MonthOutOfRange(month));
    }
    if day == 0 || day > days_in_month(year, month) {
        return Err(DateError::DayOutOfRange { year, month, day });
    }

    Date::new(year, month, day).ok_or(DateError::Malformed)
}

/// Parses `HH:MM AM` or `HH:MM PM` into a [`Time`].
pub fn parse_time(s: &str) -> Result<Time, TimeError> {
    let (clock, tod) = s.split_once(' ').ok_or(TimeError::Malformed)?;
    let (h, m) = clock.split_once(':').ok_or(TimeError::Malformed)?;

    let hour = digits(h, 2).ok_or(TimeError::Malformed)? as u8;
    let minute = digits(m, 2).ok_or(TimeError::Malformed)? as u8;
    let meridiem = match tod {
        "AM" => Meridiem::AM,
        "PM" => Meridiem::PM,
        other => return Err(TimeError::BadMeridiem(other.to_string())),
    };

    if hour > 12 {
        return Err(TimeError::HourOutOfRange(hour));
    }
    if minute > 59 {
        return Err(TimeError::MinuteOutOfRange(minute));
    }

    Time::new(hour, minute, meridiem).ok_or(TimeError::Malformed)
}

/// True when every character is an ASCII letter, digit, `.` or `_`.
///
/// The empty string passes; [`crate::core::directory::Directory::add_user`]
/// rejects it separately.
pub fn valid_username(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
}

/// Case-folds a username for storage and lookup.
pub fn fold_username(s: &str) -> String {
    s.to_lowercase()
}

/// Parses a field of exactly `width` ASCII digits.
fn digits(field: &str, width: usize) -> Option<u16> {
    if field.len() != width || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}
