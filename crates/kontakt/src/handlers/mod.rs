//! Route handlers.
//!
//! Handlers receive values that already passed their route schemas, so they
//! only read fields the schema guarantees.

pub mod contacts;
pub mod greeting;
pub mod search;
