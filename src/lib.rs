//! In-memory appointment diaries with date/time validation and conflict
//! detection.
//!
//! # Examples
//!
//! Direct usage with [`core::directory::Directory`]:
//! ```
//! use apptbook::core::directory::{Directory, DirectoryError};
//!
//! let mut dir = Directory::new();
//! dir.add_user("Bob").expect("add user");
//! assert_eq!(
//!     dir.add_user("bob"),
//!     Err(DirectoryError::AlreadyExists("bob".to_string()))
//! );
//!
//! dir.schedule_appointment("bob", "2023-06-01", "10:00 AM", "11:00 AM", "lunch")
//!     .expect("schedule");
//! assert_eq!(
//!     dir.get_purpose("bob", "2023-06-01", "10:00 AM").expect("purpose"),
//!     "lunch"
//! );
//! ```
//!
//! Runtime usage, where one task owns the directory:
//! ```no_run
//! use apptbook::{
//!     core::directory::Directory,
//!     runtime::handle::{spawn_scheduler, RuntimeConfig},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let handle = spawn_scheduler(Directory::new(), RuntimeConfig::default());
//! handle.add_user("alice").await.expect("add user");
//! handle
//!     .schedule_appointment("alice", "2024-02-29", "09:00 AM", "09:30 AM", "standup")
//!     .await
//!     .expect("schedule");
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```

/// Appointment record and lookup key.
pub mod appointment;
/// Scheduler configuration.
pub mod config;
/// Users, diaries and the directory.
pub mod core;
/// Conflict detection rules.
pub mod engine;
/// Single-writer runtime handle and events.
pub mod runtime;
/// Date and time value types.
pub mod types;
/// Raw input parsing.
pub mod validate;
