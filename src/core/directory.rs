use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    appointment::{Appointment, AppointmentKey},
    config::SchedulerConfig,
    engine::conflict::{find_conflict, find_conflict_excluding},
    types::{Date, Time, Username},
    validate::{DateError, TimeError, fold_username, parse_date, parse_time, valid_username},
};

use super::diary::{Diary, User};

/// Outcome of a rejected directory request. Nothing is mutated when one is
/// returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("invalid username {0:?}: use letters, digits, '.' or '_'")]
    InvalidUsername(String),
    #[error("user {0} already exists")]
    AlreadyExists(Username),
    #[error("user {0} does not exist")]
    UserNotFound(Username),
    #[error("invalid date")]
    InvalidDate(#[source] DateError),
    #[error("invalid time")]
    InvalidTime(#[source] TimeError),
    #[error("time conflict with the appointment at {existing}")]
    TimeConflict {
        existing: AppointmentKey,
    },
    #[error("no appointment at {key}")]
    AppointmentNotFound {
        key: AppointmentKey,
    },
    #[error("snapshot rejected: {0}")]
    Snapshot(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySnapshotV1 {
    pub users: Vec<User>,
}

#[derive(Debug, Default)]
pub struct Directory {
    users: HashMap<Username, User>,
    order: Vec<Username>,
    config: SchedulerConfig,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Rebuilds a directory from a snapshot, re-checking usernames and
    /// per-diary key uniqueness.
    pub fn from_snapshot(
        snapshot: DirectorySnapshotV1,
        config: SchedulerConfig,
    ) -> Result<Self, DirectoryError> {
        let mut dir = Self::with_config(config);

        for user in snapshot.users {
            let name = user.username().to_string();
            if name.is_empty() || !valid_username(&name) || fold_username(&name) != name {
                warn!(username = %name, "snapshot contains an invalid username");
                return Err(DirectoryError::Snapshot(format!("invalid username {name:?}")));
            }
            if dir.users.contains_key(&name) {
                warn!(username = %name, "snapshot contains a duplicate user");
                return Err(DirectoryError::Snapshot(format!("duplicate user {name}")));
            }

            let mut keys = HashSet::new();
            for appt in user.diary() {
                if !keys.insert(appt.key()) {
                    return Err(DirectoryError::Snapshot(format!(
                        "user {name} has two appointments at {}",
                        appt.key()
                    )));
                }
            }

            dir.order.push(name.clone());
            dir.users.insert(name, user);
        }

        dir.order.sort();
        Ok(dir)
    }

    pub fn export_snapshot(&self) -> DirectorySnapshotV1 {
        let users = self
            .order
            .iter()
            .filter_map(|name| self.users.get(name).cloned())
            .collect();
        DirectorySnapshotV1 { users }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn add_user(&mut self, name: &str) -> Result<(), DirectoryError> {
        let username = fold_username(name);
        if self.users.contains_key(&username) {
            debug!(%username, "rejected duplicate user");
            return Err(DirectoryError::AlreadyExists(username));
        }
        if username.is_empty() || !valid_username(&username) {
            debug!(%username, "rejected invalid username");
            return Err(DirectoryError::InvalidUsername(username));
        }

        let pos = self.order.binary_search(&username).unwrap_or_else(|pos| pos);
        self.order.insert(pos, username.clone());
        self.users.insert(username.clone(), User::new(username.clone()));
        info!(%username, "user added");
        Ok(())
    }

    pub fn delete_user(&mut self, name: &str) -> Result<(), DirectoryError> {
        let username = fold_username(name);
        let Some(user) = self.users.remove(&username) else {
            return Err(DirectoryError::UserNotFound(username));
        };
        if let Ok(pos) = self.order.binary_search(&username) {
            self.order.remove(pos);
        }
        info!(%username, appointments = user.diary().len(), "user deleted");
        Ok(())
    }

    pub fn list_users(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn user(&self, name: &str) -> Option<&User> {
        self.users.get(&fold_username(name))
    }

    pub fn diary(&self, name: &str) -> Result<&Diary, DirectoryError> {
        self.resolve(name).map(User::diary)
    }

    /// Validates the raw fields and appends a new appointment when it does
    /// not conflict with the user's diary.
    pub fn schedule_appointment(
        &mut self,
        username: &str,
        date: &str,
        start: &str,
        end: &str,
        purpose: &str,
    ) -> Result<(), DirectoryError> {
        let config = self.config;
        let user = self.resolve_mut(username)?;
        let date = parse_date_field(date)?;
        let start = parse_time_field(start)?;
        let end = parse_time_field(end)?;
        check_order(&config, start, end)?;

        let candidate = Appointment::new(date, start, end, purpose);
        if let Some(existing) = find_conflict(user.diary(), &candidate, config.conflict) {
            debug!(username = user.username(), %date, %start, "rejected conflicting appointment");
            return Err(DirectoryError::TimeConflict {
                existing: existing.key(),
            });
        }
        // Keys stay unique even when the overlap rule lets a same-start slot through.
        if user.diary().position(candidate.key()).is_some() {
            debug!(username = user.username(), %date, %start, "rejected duplicate start");
            return Err(DirectoryError::TimeConflict {
                existing: candidate.key(),
            });
        }

        info!(username = user.username(), %date, %start, %end, "appointment scheduled");
        user.diary_mut().push(candidate);
        Ok(())
    }

    pub fn find_appointment(
        &self,
        username: &str,
        date: &str,
        start: &str,
    ) -> Result<&Appointment, DirectoryError> {
        let user = self.resolve(username)?;
        let key = parse_key(date, start)?;
        user.diary().get(key).ok_or_else(|| {
            debug!(username = user.username(), %key, "appointment not found");
            DirectoryError::AppointmentNotFound { key }
        })
    }

    pub fn cancel_appointment(
        &mut self,
        username: &str,
        date: &str,
        start: &str,
    ) -> Result<Appointment, DirectoryError> {
        let user = self.resolve_mut(username)?;
        let key = parse_key(date, start)?;
        let idx = user
            .diary()
            .position(key)
            .ok_or(DirectoryError::AppointmentNotFound { key })?;

        let removed = user.diary_mut().remove(idx);
        info!(username = user.username(), %key, "appointment cancelled");
        Ok(removed)
    }

    pub fn get_purpose(
        &self,
        username: &str,
        date: &str,
        start: &str,
    ) -> Result<&str, DirectoryError> {
        self.find_appointment(username, date, start)
            .map(|appt| appt.purpose.as_str())
    }

    /// Moves an appointment to a new slot, keeping its purpose.
    ///
    /// The appointment being moved is left out of the conflict scan. On
    /// success it is removed and the replacement appended to the diary.
    pub fn reschedule(
        &mut self,
        username: &str,
        date: &str,
        start: &str,
        new_date: &str,
        new_start: &str,
        new_end: &str,
    ) -> Result<(), DirectoryError> {
        let config = self.config;
        let user = self.resolve_mut(username)?;
        let key = parse_key(date, start)?;
        let idx = user
            .diary()
            .position(key)
            .ok_or(DirectoryError::AppointmentNotFound { key })?;

        let new_date = parse_date_field(new_date)?;
        let new_start = parse_time_field(new_start)?;
        let new_end = parse_time_field(new_end)?;
        check_order(&config, new_start, new_end)?;

        let replacement = match user.diary().as_slice().get(idx) {
            Some(old) => old.moved_to(new_date, new_start, new_end),
            None => return Err(DirectoryError::AppointmentNotFound { key }),
        };

        if let Some(existing) =
            find_conflict_excluding(user.diary(), &replacement, idx, config.conflict)
        {
            debug!(username = user.username(), date = %new_date, start = %new_start, "rejected conflicting reschedule");
            return Err(DirectoryError::TimeConflict {
                existing: existing.key(),
            });
        }
        if let Some(other) = user.diary().position(replacement.key()) {
            if other != idx {
                debug!(username = user.username(), date = %new_date, start = %new_start, "rejected duplicate start");
                return Err(DirectoryError::TimeConflict {
                    existing: replacement.key(),
                });
            }
        }

        user.diary_mut().replace(idx, replacement);
        info!(
            username = user.username(),
            from = %key,
            to_date = %new_date,
            to_start = %new_start,
            "appointment rescheduled"
        );
        Ok(())
    }

    fn resolve(&self, name: &str) -> Result<&User, DirectoryError> {
        let username = fold_username(name);
        self.users
            .get(&username)
            .ok_or(DirectoryError::UserNotFound(username))
    }

    fn resolve_mut(&mut self, name: &str) -> Result<&mut User, DirectoryError> {
        let username = fold_username(name);
        self.users
            .get_mut(&username)
            .ok_or(DirectoryError::UserNotFound(username))
    }
}

fn parse_date_field(s: &str) -> Result<Date, DirectoryError> {
    parse_date(s).map_err(DirectoryError::InvalidDate)
}

fn parse_time_field(s: &str) -> Result<Time, DirectoryError> {
    parse_time(s).map_err(DirectoryError::InvalidTime)
}

fn parse_key(date: &str, start: &str) -> Result<AppointmentKey, DirectoryError> {
    Ok(AppointmentKey {
        date: parse_date_field(date)?,
        start: parse_time_field(start)?,
    })
}

fn check_order(config: &SchedulerConfig, start: Time, end: Time) -> Result<(), DirectoryError> {
    if config.require_end_after_start && end <= start {
        return Err(DirectoryError::InvalidTime(TimeError::EndNotAfterStart {
            start,
            end,
        }));
    }
    Ok(())
}
