//! Core domain logic for Agenda.
//! People, time-blocked activities, and the overlap merge workflow.

pub mod db;
pub mod logging;
pub mod merge;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use merge::{MergeOptions, OverlapRule};
pub use model::activity::{
    Activity, ActivityId, ActivityStatus, ActivityValidationError, NewActivity,
};
pub use model::person::{Location, NewPerson, Person, PersonId, PersonValidationError};
pub use repo::activity_repo::{RecordStore, RepoError, RepoResult, SqliteRecordStore};
pub use repo::person_repo::{PersonListQuery, PersonRepository, SqlitePersonRepository};
pub use service::activity_service::{
    ActivityDetail, ActivityService, ActivityServiceError, CreateActivityRequest,
};
pub use service::merge_service::{
    merge_activities_for_person_atomic, MergeError, MergeReport, MergeService,
};
pub use service::person_service::{
    CreatePersonRequest, PeopleListResult, PersonService, PersonServiceError,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
