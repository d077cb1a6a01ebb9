//! Domain model for people and time-blocked activities.
//!
//! # Responsibility
//! - Define canonical records used by the merge engine and CRUD services.
//! - Keep write models (`New*`) separate from store-assigned records.
//!
//! # Invariants
//! - Identifiers are assigned by the store, never by callers.
//! - The person/activity association lives in storage, not on the records.

pub mod activity;
pub mod person;
