//! Person use-case service.
//!
//! # Responsibility
//! - Provide create/get/list for people and their activity links.
//!
//! # Invariants
//! - Duplicate email or nickname is rejected before insert.
//! - List pages never exceed 12 rows.

use crate::model::activity::{Activity, ActivityId};
use crate::model::person::{Location, NewPerson, Person, PersonId};
use crate::repo::activity_repo::{RecordStore, RepoError};
use crate::repo::person_repo::{normalize_people_limit, PersonListQuery, PersonRepository};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for person use-cases.
#[derive(Debug)]
pub enum PersonServiceError {
    PersonNotFound(PersonId),
    ActivityNotFound(ActivityId),
    DuplicatePerson { email: String, nickname: String },
    Repo(RepoError),
}

impl Display for PersonServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PersonNotFound(id) => write!(f, "person not found: {id}"),
            Self::ActivityNotFound(id) => write!(f, "activity not found: {id}"),
            Self::DuplicatePerson { email, nickname } => write!(
                f,
                "duplicate person: email `{email}` or nickname `{nickname}` is taken"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PersonServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PersonServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::PersonNotFound(id) => Self::PersonNotFound(id),
            RepoError::ActivityNotFound(id) => Self::ActivityNotFound(id),
            RepoError::DuplicatePerson { email, nickname } => {
                Self::DuplicatePerson { email, nickname }
            }
            other => Self::Repo(other),
        }
    }
}

/// Request model for registering a person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePersonRequest {
    pub email: String,
    pub nickname: String,
    pub location: Option<Location>,
}

/// List result envelope used by service callers.
#[derive(Debug, Clone, PartialEq)]
pub struct PeopleListResult {
    pub items: Vec<Person>,
    /// Effective normalized limit used by the query.
    pub applied_limit: u32,
}

/// Person service facade.
pub struct PersonService<P: PersonRepository, S: RecordStore> {
    people: P,
    store: S,
}

impl<P: PersonRepository, S: RecordStore> PersonService<P, S> {
    pub fn new(people: P, store: S) -> Self {
        Self { people, store }
    }

    pub fn create_person(
        &self,
        request: CreatePersonRequest,
    ) -> Result<Person, PersonServiceError> {
        let person = NewPerson {
            email: request.email,
            nickname: request.nickname,
            location: request.location,
        };
        Ok(self.people.create_person(&person)?)
    }

    pub fn get_person(&self, id: PersonId) -> Result<Person, PersonServiceError> {
        self.people
            .get_person(id)?
            .ok_or(PersonServiceError::PersonNotFound(id))
    }

    /// Lists the page of people after `after`, the last id of the prior page.
    pub fn list_people(
        &self,
        limit: Option<u32>,
        after: Option<PersonId>,
    ) -> Result<PeopleListResult, PersonServiceError> {
        let applied_limit = normalize_people_limit(limit);
        let items = self.people.list_people(&PersonListQuery {
            limit: Some(applied_limit),
            after,
        })?;
        Ok(PeopleListResult {
            items,
            applied_limit,
        })
    }

    /// Unknown people are not admins.
    pub fn is_admin(&self, id: PersonId) -> Result<bool, PersonServiceError> {
        Ok(self
            .people
            .get_person(id)?
            .is_some_and(|person| person.is_admin))
    }

    /// Lists activities linked to the person, in link order.
    pub fn list_activities(&self, id: PersonId) -> Result<Vec<Activity>, PersonServiceError> {
        Ok(self.store.activities_for_person(id)?)
    }

    /// Links an existing activity to an existing person.
    pub fn add_activity(
        &self,
        person_id: PersonId,
        activity_id: ActivityId,
    ) -> Result<(), PersonServiceError> {
        if self.people.get_person(person_id)?.is_none() {
            return Err(PersonServiceError::PersonNotFound(person_id));
        }
        if self.store.get_activity(activity_id)?.is_none() {
            return Err(PersonServiceError::ActivityNotFound(activity_id));
        }
        Ok(self.store.link_activity_to_person(activity_id, person_id)?)
    }
}
