//! Appointment record and lookup key.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Date, Time};

/// One booked slot in a user's diary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub date: Date,
    pub start: Time,
    pub end: Time,
    pub purpose: String,
}

impl Appointment {
    /// Builds an appointment from already validated parts.
    pub fn new(date: Date, start: Time, end: Time, purpose: impl Into<String>) -> Self {
        Self {
            date,
            start,
            end,
            purpose: purpose.into(),
        }
    }

    /// The `(date, start)` pair used to look this appointment up.
    pub fn key(&self) -> AppointmentKey {
        AppointmentKey {
            date: self.date,
            start: self.start,
        }
    }

    /// Returns a copy moved to a new slot, keeping the purpose.
    pub fn moved_to(&self, date: Date, start: Time, end: Time) -> Self {
        Self {
            date,
            start,
            end,
            purpose: self.purpose.clone(),
        }
    }
}

/// Exact-match lookup key: both date and start must be equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppointmentKey {
    pub date: Date,
    pub start: Time,
}

impl fmt::Display for AppointmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.start)
    }
}
