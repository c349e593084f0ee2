//! Appointment conflict detection.

/// Overlap rules, conflict policy and diary scans.
pub mod conflict;
/// Overlap rule trait.
pub mod traits;
