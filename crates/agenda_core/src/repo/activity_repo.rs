//! Activity record store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide keyed storage for activities and the person/activity links.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `NewActivity::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Linked reads are ordered by link sequence, so repeated reads of an
//!   unchanged store return the same order.
//! - Deleting an activity removes its links in the same statement (FK cascade).

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::activity::{
    Activity, ActivityId, ActivityStatus, ActivityValidationError, NewActivity,
};
use crate::model::person::{PersonId, PersonValidationError};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ACTIVITY_SELECT_SQL: &str = "SELECT
    a.id,
    a.title,
    a.description,
    a.status,
    a.start_ms,
    a.end_ms
FROM activities a";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by the activity store and person repository.
#[derive(Debug)]
pub enum RepoError {
    /// Activity fields failed validation before write.
    Validation(ActivityValidationError),
    /// Person fields failed validation before write.
    PersonValidation(PersonValidationError),
    Db(DbError),
    ActivityNotFound(ActivityId),
    PersonNotFound(PersonId),
    /// Email or nickname is already taken.
    DuplicatePerson { email: String, nickname: String },
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::PersonValidation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::ActivityNotFound(id) => write!(f, "activity not found: {id}"),
            Self::PersonNotFound(id) => write!(f, "person not found: {id}"),
            Self::DuplicatePerson { email, nickname } => write!(
                f,
                "person with email `{email}` or nickname `{nickname}` already exists"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "record store requires schema version {expected_version}, got {actual_version}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::PersonValidation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ActivityValidationError> for RepoError {
    fn from(value: ActivityValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<PersonValidationError> for RepoError {
    fn from(value: PersonValidationError) -> Self {
        Self::PersonValidation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract consumed by the merge engine.
pub trait RecordStore {
    /// Returns every activity linked to the person, in link order.
    ///
    /// Fails with `PersonNotFound` when the person does not exist.
    fn activities_for_person(&self, person_id: PersonId) -> RepoResult<Vec<Activity>>;
    fn get_activity(&self, id: ActivityId) -> RepoResult<Option<Activity>>;
    /// Persists a new activity under a freshly allocated id.
    fn create_activity(&self, activity: &NewActivity) -> RepoResult<Activity>;
    /// Deletes the activity and all of its links.
    fn delete_activity(&self, id: ActivityId) -> RepoResult<()>;
    /// Links an activity to a person. Linking twice is a no-op.
    fn link_activity_to_person(&self, activity_id: ActivityId, person_id: PersonId)
        -> RepoResult<()>;
    /// Removes a link. Removing a missing link is a no-op.
    fn unlink_activity_from_person(
        &self,
        activity_id: ActivityId,
        person_id: PersonId,
    ) -> RepoResult<()>;
    /// Returns the people linked to an activity, in link order.
    fn people_for_activity(&self, activity_id: ActivityId) -> RepoResult<Vec<PersonId>>;
}

/// SQLite-backed record store.
///
/// Borrows either a plain connection or a `rusqlite::Transaction`, which
/// derefs to one; callers choose the transaction boundary.
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    /// Constructs a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn activities_for_person(&self, person_id: PersonId) -> RepoResult<Vec<Activity>> {
        if !person_exists(self.conn, person_id)? {
            return Err(RepoError::PersonNotFound(person_id));
        }

        let mut stmt = self.conn.prepare(&format!(
            "{ACTIVITY_SELECT_SQL}
             INNER JOIN activity_people ap ON ap.activity_id = a.id
             WHERE ap.person_id = ?1
             ORDER BY ap.linked_seq ASC;"
        ))?;
        let mut rows = stmt.query([person_id.to_string()])?;
        let mut activities = Vec::new();
        while let Some(row) = rows.next()? {
            activities.push(parse_activity_row(row)?);
        }

        Ok(activities)
    }

    fn get_activity(&self, id: ActivityId) -> RepoResult<Option<Activity>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACTIVITY_SELECT_SQL} WHERE a.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_activity_row(row)?));
        }

        Ok(None)
    }

    fn create_activity(&self, activity: &NewActivity) -> RepoResult<Activity> {
        activity.validate()?;

        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO activities (
                id,
                title,
                description,
                status,
                start_ms,
                end_ms
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id.to_string(),
                activity.title.as_str(),
                activity.description.as_str(),
                status_to_db(activity.status),
                activity.start_ms,
                activity.end_ms,
            ],
        )?;

        Ok(activity.clone().into_activity(id))
    }

    fn delete_activity(&self, id: ActivityId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM activities WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::ActivityNotFound(id));
        }

        Ok(())
    }

    fn link_activity_to_person(
        &self,
        activity_id: ActivityId,
        person_id: PersonId,
    ) -> RepoResult<()> {
        if !activity_exists(self.conn, activity_id)? {
            return Err(RepoError::ActivityNotFound(activity_id));
        }
        if !person_exists(self.conn, person_id)? {
            return Err(RepoError::PersonNotFound(person_id));
        }

        self.conn.execute(
            "INSERT OR IGNORE INTO activity_people (activity_id, person_id, linked_seq)
             VALUES (?1, ?2, COALESCE((SELECT MAX(linked_seq) FROM activity_people), 0) + 1);",
            params![activity_id.to_string(), person_id.to_string()],
        )?;

        Ok(())
    }

    fn unlink_activity_from_person(
        &self,
        activity_id: ActivityId,
        person_id: PersonId,
    ) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM activity_people WHERE activity_id = ?1 AND person_id = ?2;",
            params![activity_id.to_string(), person_id.to_string()],
        )?;
        Ok(())
    }

    fn people_for_activity(&self, activity_id: ActivityId) -> RepoResult<Vec<PersonId>> {
        if !activity_exists(self.conn, activity_id)? {
            return Err(RepoError::ActivityNotFound(activity_id));
        }

        let mut stmt = self.conn.prepare(
            "SELECT person_id
             FROM activity_people
             WHERE activity_id = ?1
             ORDER BY linked_seq ASC;",
        )?;
        let mut rows = stmt.query([activity_id.to_string()])?;
        let mut people = Vec::new();
        while let Some(row) = rows.next()? {
            let text: String = row.get(0)?;
            people.push(parse_uuid(&text, "activity_people.person_id")?);
        }

        Ok(people)
    }
}

/// Rejects connections that were not bootstrapped through `db::open_*`.
pub(crate) fn ensure_schema_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version = current_user_version(conn)?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

pub(crate) fn person_exists(conn: &Connection, person_id: PersonId) -> RepoResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM people WHERE id = ?1;",
            [person_id.to_string()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn activity_exists(conn: &Connection, activity_id: ActivityId) -> RepoResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM activities WHERE id = ?1;",
            [activity_id.to_string()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn parse_activity_row(row: &Row<'_>) -> RepoResult<Activity> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "activities.id")?;

    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid activity status `{status_text}` in activities.status"
        ))
    })?;

    let activity = Activity {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        status,
        start_ms: row.get("start_ms")?,
        end_ms: row.get("end_ms")?,
    };
    activity.validate()?;
    Ok(activity)
}

fn status_to_db(status: ActivityStatus) -> &'static str {
    match status {
        ActivityStatus::Todo => "todo",
        ActivityStatus::InProgress => "in_progress",
        ActivityStatus::Completed => "completed",
    }
}

fn parse_status(value: &str) -> Option<ActivityStatus> {
    match value {
        "todo" => Some(ActivityStatus::Todo),
        "in_progress" => Some(ActivityStatus::InProgress),
        "completed" => Some(ActivityStatus::Completed),
        _ => None,
    }
}
