//! Core reminder engine for nudge
//!
//! This crate contains:
//! - The reminder record and its validation
//! - The recurrence engine (next occurrence, readiness, advancing)
//! - The manager that persists reminders and maintains owner indices
//! - Message rendering and the periodic delivery scheduler
//!
//! Owner indices are only reachable through [`ReminderManager`]:
//!
//! ```compile_fail
//! use nudge_core::OwnerIndex;
//! ```

mod index;
mod manager;
pub mod render;
mod recurrence;
mod reminder;
mod scheduler;

pub use index::*;
pub use manager::*;
pub use recurrence::*;
pub use reminder::*;
pub use scheduler::*;
