//! Delivery collaborator interfaces for nudge
//!
//! This crate defines the boundary between the reminder core and whatever
//! actually talks to users (a chat transport) or to an AI provider. It
//! contains no transport code itself, only the traits, the AI role set and
//! in-memory mocks for tests.

mod mock;
mod role;
mod traits;

pub use mock::*;
pub use role::*;
pub use traits::*;
