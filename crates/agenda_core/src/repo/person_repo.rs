//! Person repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/get/list APIs over the `people` table.
//! - Detect duplicate identities before insert.
//!
//! # Invariants
//! - Write paths call `NewPerson::validate()` before SQL mutations.
//! - List order is `created_at ASC, rowid ASC` (insertion order).
//! - Paging is keyset-based: a page starts strictly after its cursor person.

use crate::model::person::{Location, NewPerson, Person, PersonId};
use crate::repo::activity_repo::{
    ensure_schema_ready, parse_uuid, person_exists, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const PEOPLE_DEFAULT_LIMIT: u32 = 12;
const PEOPLE_LIMIT_MAX: u32 = 12;

const PERSON_SELECT_SQL: &str = "SELECT
    id,
    email,
    nickname,
    is_admin,
    lat,
    lng
FROM people";

/// Query options for listing people.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonListQuery {
    /// Maximum rows to return. Defaults to 12 and clamps to 12.
    pub limit: Option<u32>,
    /// Last person of the previous page. `None` starts from the beginning.
    pub after: Option<PersonId>,
}

/// Repository interface for person records.
pub trait PersonRepository {
    fn create_person(&self, person: &NewPerson) -> RepoResult<Person>;
    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>>;
    /// Lists one page of people; `PersonNotFound` when the cursor is unknown.
    fn list_people(&self, query: &PersonListQuery) -> RepoResult<Vec<Person>>;
    /// Finds a person whose email or nickname matches either value.
    fn find_by_email_or_nickname(&self, email: &str, nickname: &str)
        -> RepoResult<Option<Person>>;
}

/// SQLite-backed person repository.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn create_person(&self, person: &NewPerson) -> RepoResult<Person> {
        person.validate()?;

        if self
            .find_by_email_or_nickname(&person.email, &person.nickname)?
            .is_some()
        {
            return Err(RepoError::DuplicatePerson {
                email: person.email.clone(),
                nickname: person.nickname.clone(),
            });
        }

        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO people (id, email, nickname, is_admin, lat, lng)
             VALUES (?1, ?2, ?3, 0, ?4, ?5);",
            params![
                id.to_string(),
                person.email.trim(),
                person.nickname.trim(),
                person.location.map(|location| location.lat),
                person.location.map(|location| location.lng),
            ],
        )?;

        let mut stored = person.clone();
        stored.email = person.email.trim().to_string();
        stored.nickname = person.nickname.trim().to_string();
        Ok(stored.into_person(id))
    }

    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PERSON_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_person_row(row)?));
        }
        Ok(None)
    }

    fn list_people(&self, query: &PersonListQuery) -> RepoResult<Vec<Person>> {
        let limit = normalize_people_limit(query.limit);
        if let Some(cursor) = query.after {
            if !person_exists(self.conn, cursor)? {
                return Err(RepoError::PersonNotFound(cursor));
            }
        }

        let mut stmt = self.conn.prepare(&format!(
            "{PERSON_SELECT_SQL}
             WHERE ?1 IS NULL
                OR (created_at, rowid) > (SELECT created_at, rowid FROM people WHERE id = ?1)
             ORDER BY created_at ASC, rowid ASC
             LIMIT ?2;"
        ))?;
        let cursor = query.after.map(|id| id.to_string());
        let mut rows = stmt.query(params![cursor, i64::from(limit)])?;
        let mut people = Vec::new();
        while let Some(row) = rows.next()? {
            people.push(parse_person_row(row)?);
        }
        Ok(people)
    }

    fn find_by_email_or_nickname(
        &self,
        email: &str,
        nickname: &str,
    ) -> RepoResult<Option<Person>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PERSON_SELECT_SQL}
             WHERE email = ?1 COLLATE NOCASE OR nickname = ?2
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query(params![email.trim(), nickname.trim()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_person_row(row)?));
        }
        Ok(None)
    }
}

/// Normalizes list limit according to the people paging contract.
///
/// An explicit `0` yields an empty page.
pub fn normalize_people_limit(limit: Option<u32>) -> u32 {
    limit.map_or(PEOPLE_DEFAULT_LIMIT, |value| value.min(PEOPLE_LIMIT_MAX))
}

fn parse_person_row(row: &Row<'_>) -> RepoResult<Person> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "people.id")?;

    let is_admin = match row.get::<_, i64>("is_admin")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_admin value `{other}` in people.is_admin"
            )));
        }
    };

    let location = match (
        row.get::<_, Option<f64>>("lat")?,
        row.get::<_, Option<f64>>("lng")?,
    ) {
        (Some(lat), Some(lng)) => Some(Location { lat, lng }),
        (None, None) => None,
        _ => {
            return Err(RepoError::InvalidData(format!(
                "person {id_text} has a partial location"
            )));
        }
    };

    Ok(Person {
        id,
        email: row.get("email")?,
        nickname: row.get("nickname")?,
        is_admin,
        location,
    })
}
