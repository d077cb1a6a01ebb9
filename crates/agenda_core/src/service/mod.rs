//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep CLI and embedding layers decoupled from storage details.

pub mod activity_service;
pub mod merge_service;
pub mod person_service;
