//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the record store contract the merge engine consumes.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate write models before persistence.
//! - Absence is reported as `Option::None` on reads and as semantic
//!   not-found errors on writes, never through transport failures.

pub mod activity_repo;
pub mod person_repo;
