//! Runtime event stream payloads.

use crate::{appointment::AppointmentKey, types::Username};

/// Events emitted from the single-writer runtime loop after each successful
/// mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// A user was created.
    UserAdded {
        /// Folded username.
        username: Username,
    },
    /// A user and their diary were removed.
    UserDeleted {
        /// Folded username.
        username: Username,
    },
    /// An appointment was appended to a diary.
    AppointmentScheduled {
        /// Owner of the diary.
        username: Username,
        /// Key of the new appointment.
        key: AppointmentKey,
    },
    /// An appointment was removed from a diary.
    AppointmentCancelled {
        /// Owner of the diary.
        username: Username,
        /// Key of the removed appointment.
        key: AppointmentKey,
    },
    /// An appointment was moved to a new slot.
    AppointmentRescheduled {
        /// Owner of the diary.
        username: Username,
        /// Previous key.
        from: AppointmentKey,
        /// New key.
        to: AppointmentKey,
    },
}
