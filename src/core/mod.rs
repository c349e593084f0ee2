//! In-memory users, diaries and the directory that owns them.

/// Per-user appointment diary.
pub mod diary;
/// Username-keyed directory and its operations.
pub mod directory;
