use serde::{Deserialize, Serialize};

use crate::{
    appointment::{Appointment, AppointmentKey},
    types::Username,
};

/// A user's appointments in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diary {
    appointments: Vec<Appointment>,
}

impl Diary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Appointment> {
        self.appointments.iter()
    }

    pub fn as_slice(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn position(&self, key: AppointmentKey) -> Option<usize> {
        self.appointments.iter().position(|a| a.key() == key)
    }

    pub fn get(&self, key: AppointmentKey) -> Option<&Appointment> {
        self.position(key).and_then(|idx| self.appointments.get(idx))
    }

    pub(crate) fn push(&mut self, appt: Appointment) {
        self.appointments.push(appt);
    }

    pub(crate) fn remove(&mut self, idx: usize) -> Appointment {
        self.appointments.remove(idx)
    }

    // Drops `idx` and appends the replacement; positions after `idx` shift down.
    pub(crate) fn replace(&mut self, idx: usize, replacement: Appointment) -> Appointment {
        let old = self.appointments.remove(idx);
        self.appointments.push(replacement);
        old
    }
}

impl<'a> IntoIterator for &'a Diary {
    type Item = &'a Appointment;
    type IntoIter = std::slice::Iter<'a, Appointment>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    username: Username,
    diary: Diary,
}

impl User {
    pub(crate) fn new(username: Username) -> Self {
        Self {
            username,
            diary: Diary::new(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn diary(&self) -> &Diary {
        &self.diary
    }

    pub(crate) fn diary_mut(&mut self) -> &mut Diary {
        &mut self.diary
    }
}
