//! Activity use-case service.
//!
//! # Responsibility
//! - Provide create/get/delete and invitee management for activities.
//! - Resolve not-found cases through explicit existence checks.
//!
//! # Invariants
//! - Service APIs never bypass repository validation.
//! - Invitee changes are plain link/unlink calls on the record store.

use crate::model::activity::{Activity, ActivityId, ActivityStatus, NewActivity};
use crate::model::person::{Person, PersonId};
use crate::repo::activity_repo::{RecordStore, RepoError};
use crate::repo::person_repo::PersonRepository;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for activity use-cases.
#[derive(Debug)]
pub enum ActivityServiceError {
    ActivityNotFound(ActivityId),
    PersonNotFound(PersonId),
    /// Persistence-layer failure, validation included.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ActivityServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ActivityNotFound(id) => write!(f, "activity not found: {id}"),
            Self::PersonNotFound(id) => write!(f, "person not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent activity state: {details}")
            }
        }
    }
}

impl Error for ActivityServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ActivityServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ActivityNotFound(id) => Self::ActivityNotFound(id),
            RepoError::PersonNotFound(id) => Self::PersonNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Request model for creating an activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateActivityRequest {
    pub title: String,
    pub description: String,
    pub status: ActivityStatus,
    pub start_ms: i64,
    pub end_ms: i64,
}

/// Activity read model including linked people.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDetail {
    #[serde(flatten)]
    pub activity: Activity,
    /// Linked people in link order.
    pub invitees: Vec<PersonId>,
}

/// Activity service facade over the record store and person repository.
pub struct ActivityService<S: RecordStore, P: PersonRepository> {
    store: S,
    people: P,
}

impl<S: RecordStore, P: PersonRepository> ActivityService<S, P> {
    pub fn new(store: S, people: P) -> Self {
        Self { store, people }
    }

    /// Creates one standalone activity with no links.
    pub fn create_activity(
        &self,
        request: CreateActivityRequest,
    ) -> Result<Activity, ActivityServiceError> {
        let activity = NewActivity::new(
            request.title,
            request.description,
            request.status,
            request.start_ms,
            request.end_ms,
        );
        Ok(self.store.create_activity(&activity)?)
    }

    /// Gets one activity with its invitees.
    pub fn get_activity(&self, id: ActivityId) -> Result<ActivityDetail, ActivityServiceError> {
        let activity = self
            .store
            .get_activity(id)?
            .ok_or(ActivityServiceError::ActivityNotFound(id))?;
        let invitees = self.store.people_for_activity(id)?;
        Ok(ActivityDetail { activity, invitees })
    }

    /// Deletes one activity and all of its links.
    pub fn delete_activity(&self, id: ActivityId) -> Result<(), ActivityServiceError> {
        Ok(self.store.delete_activity(id)?)
    }

    /// Lists the people linked to an activity.
    pub fn list_invitees(&self, id: ActivityId) -> Result<Vec<Person>, ActivityServiceError> {
        let mut invitees = Vec::new();
        for person_id in self.store.people_for_activity(id)? {
            let person = self
                .people
                .get_person(person_id)?
                .ok_or(ActivityServiceError::InconsistentState(
                    "linked person missing from people",
                ))?;
            invitees.push(person);
        }
        Ok(invitees)
    }

    /// Links an existing person to an existing activity.
    pub fn add_invitee(
        &self,
        activity_id: ActivityId,
        person_id: PersonId,
    ) -> Result<(), ActivityServiceError> {
        self.ensure_activity(activity_id)?;
        if self.people.get_person(person_id)?.is_none() {
            return Err(ActivityServiceError::PersonNotFound(person_id));
        }
        Ok(self.store.link_activity_to_person(activity_id, person_id)?)
    }

    /// Removes a person from an activity's invitees.
    pub fn remove_invitee(
        &self,
        activity_id: ActivityId,
        person_id: PersonId,
    ) -> Result<(), ActivityServiceError> {
        self.ensure_activity(activity_id)?;
        Ok(self
            .store
            .unlink_activity_from_person(activity_id, person_id)?)
    }

    fn ensure_activity(&self, id: ActivityId) -> Result<(), ActivityServiceError> {
        match self.store.get_activity(id)? {
            Some(_) => Ok(()),
            None => Err(ActivityServiceError::ActivityNotFound(id)),
        }
    }
}
