use serde::{Deserialize, Serialize};

use crate::{appointment::Appointment, core::diary::Diary};

use super::traits::OverlapRule;

/// Reference overlap test between an existing appointment `a` and a
/// candidate `b`. Dates are not compared.
///
/// Reports a collision when `b` starts strictly inside `a`, ends strictly
/// inside `a`, or starts at the same time as `a`. A candidate that strictly
/// contains `a` is not reported; use [`HalfOpenOverlap`] for that.
pub fn overlaps(a: &Appointment, b: &Appointment) -> bool {
    let (s1, e1) = (a.start, a.end);
    let (s2, e2) = (b.start, b.end);
    (s1 < s2 && s2 < e1) || (s1 < e2 && e2 < e1) || s1 == s2
}

/// The reference rule, see [`overlaps`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReferenceOverlap;

impl OverlapRule for ReferenceOverlap {
    fn overlaps(&self, existing: &Appointment, candidate: &Appointment) -> bool {
        overlaps(existing, candidate)
    }
}

/// Standard half-open interval intersection on `[start, end)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HalfOpenOverlap;

impl OverlapRule for HalfOpenOverlap {
    fn overlaps(&self, existing: &Appointment, candidate: &Appointment) -> bool {
        existing.start < candidate.end && candidate.start < existing.end
    }
}

/// Which interval test a [`ConflictPolicy`] applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapKind {
    #[default]
    Reference,
    HalfOpen,
}

/// Which existing appointments a candidate is compared against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictScope {
    /// Every appointment in the diary, whatever its date.
    #[default]
    AnyDate,
    /// Only appointments on the candidate's date.
    SameDate,
}

/// Configurable conflict rule used by the directory.
///
/// The default reproduces the reference behaviour: [`ReferenceOverlap`]
/// applied across all dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictPolicy {
    pub rule: OverlapKind,
    pub scope: ConflictScope,
}

impl OverlapRule for ConflictPolicy {
    fn overlaps(&self, existing: &Appointment, candidate: &Appointment) -> bool {
        if self.scope == ConflictScope::SameDate && existing.date != candidate.date {
            return false;
        }
        match self.rule {
            OverlapKind::Reference => ReferenceOverlap.overlaps(existing, candidate),
            OverlapKind::HalfOpen => HalfOpenOverlap.overlaps(existing, candidate),
        }
    }
}

/// First appointment in `diary` that collides with `candidate`.
pub fn find_conflict<'a, R: OverlapRule>(
    diary: &'a Diary,
    candidate: &Appointment,
    rule: R,
) -> Option<&'a Appointment> {
    diary.iter().find(|appt| rule.overlaps(appt, candidate))
}

/// True when any appointment in `diary` collides with `candidate`.
pub fn has_conflict<R: OverlapRule>(diary: &Diary, candidate: &Appointment, rule: R) -> bool {
    find_conflict(diary, candidate, rule).is_some()
}

/// Like [`find_conflict`], skipping the appointment at index `skip`.
///
/// Used when moving an appointment so it cannot collide with itself.
pub fn find_conflict_excluding<'a, R: OverlapRule>(
    diary: &'a Diary,
    candidate: &Appointment,
    skip: usize,
    rule: R,
) -> Option<&'a Appointment> {
    diary
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != skip)
        .map(|(_, appt)| appt)
        .find(|appt| rule.overlaps(appt, candidate))
}
