//! Activity merge use-case service.
//!
//! # Responsibility
//! - Load a person's activities, plan overlap runs, and apply each merge
//!   through the record store.
//! - Provide a SQLite unit-of-work wrapper that makes one merge call atomic.
//!
//! # Invariants
//! - Store mutations run strictly in sequence: people union, deletes,
//!   create, links. The merged id is known before any link is written.
//! - Any store failure aborts the remaining runs and is returned unchanged
//!   in meaning; nothing is retried.
//! - The service holds no state between calls.
//! - Same-person calls must be serialized by the caller. The atomic wrapper
//!   does this for SQLite by holding an `IMMEDIATE` transaction.

use crate::merge::{plan_runs, MergeOptions, MergeRun};
use crate::model::activity::{Activity, ActivityId};
use crate::model::person::PersonId;
use crate::repo::activity_repo::{RecordStore, RepoError, SqliteRecordStore};
use log::{debug, error, info};
use rusqlite::{Connection, TransactionBehavior};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Errors surfaced by a merge call.
#[derive(Debug)]
pub enum MergeError {
    /// The person the merge was requested for does not exist.
    PersonNotFound(PersonId),
    /// An activity vanished mid-merge, usually from an unserialized
    /// concurrent call for the same person.
    ActivityNotFound(ActivityId),
    /// Any other store failure.
    Store(RepoError),
}

impl Display for MergeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PersonNotFound(id) => write!(f, "person not found: {id}"),
            Self::ActivityNotFound(id) => write!(f, "activity not found during merge: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MergeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for MergeError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::PersonNotFound(id) => Self::PersonNotFound(id),
            RepoError::ActivityNotFound(id) => Self::ActivityNotFound(id),
            other => Self::Store(other),
        }
    }
}

impl From<rusqlite::Error> for MergeError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(value.into())
    }
}

impl MergeError {
    fn code(&self) -> &'static str {
        match self {
            Self::PersonNotFound(_) => "person_not_found",
            Self::ActivityNotFound(_) => "activity_not_found",
            Self::Store(_) => "store_failed",
        }
    }
}

/// Summary of one merge call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub person_id: PersonId,
    /// Number of overlap runs found, singletons included.
    pub runs: usize,
    /// Original activities deleted across all merged runs.
    pub removed: usize,
    /// Replacement activities created, in run order.
    pub created: Vec<ActivityId>,
}

impl MergeReport {
    /// Returns whether the call changed nothing.
    pub fn is_noop(&self) -> bool {
        self.created.is_empty()
    }
}

/// Merge engine over an injected record store.
pub struct MergeService<S: RecordStore> {
    store: S,
    options: MergeOptions,
}

impl<S: RecordStore> MergeService<S> {
    /// Creates a service with default options.
    pub fn new(store: S) -> Self {
        Self::with_options(store, MergeOptions::default())
    }

    pub fn with_options(store: S, options: MergeOptions) -> Self {
        Self { store, options }
    }

    /// Collapses every run of overlapping activities linked to `person_id`.
    ///
    /// # Side effects
    /// - For each run of two or more: deletes the originals, creates one
    ///   replacement, and links it to every person linked to any original.
    /// - Emits `merge` logging events with counts and duration.
    ///
    /// # Errors
    /// - `PersonNotFound` when the person is absent.
    /// - `ActivityNotFound` when an activity disappears mid-merge.
    /// - `Store` for any other store failure, including a co-linked person
    ///   who vanished before relinking. Runs merged before the
    ///   failure stay merged unless the caller's transaction rolls back.
    pub fn merge_activities_for_person(
        &self,
        person_id: PersonId,
    ) -> Result<MergeReport, MergeError> {
        let started_at = Instant::now();
        info!(
            "event=merge module=merge status=start person_id={person_id} rule={}",
            self.options.rule.as_str()
        );

        match self.merge_all(person_id) {
            Ok(report) => {
                info!(
                    "event=merge module=merge status=ok person_id={person_id} runs={} merged={} removed={} duration_ms={}",
                    report.runs,
                    report.created.len(),
                    report.removed,
                    started_at.elapsed().as_millis()
                );
                Ok(report)
            }
            Err(err) => {
                error!(
                    "event=merge module=merge status=error person_id={person_id} duration_ms={} error_code={} error={err}",
                    started_at.elapsed().as_millis(),
                    err.code()
                );
                Err(err)
            }
        }
    }

    fn merge_all(&self, person_id: PersonId) -> Result<MergeReport, MergeError> {
        let activities = self.store.activities_for_person(person_id)?;
        let runs = plan_runs(activities, self.options.rule);

        let mut report = MergeReport {
            person_id,
            runs: runs.len(),
            removed: 0,
            created: Vec::new(),
        };
        for run in runs.iter().filter(|run| run.needs_merge()) {
            let merged = self.merge_run(run)?;
            report.removed += run.len();
            report.created.push(merged.id);
        }

        Ok(report)
    }

    fn merge_run(&self, run: &MergeRun) -> Result<Activity, MergeError> {
        let people = self.people_union(run)?;
        let replacement = run.compose();

        for member in run.members() {
            self.store.delete_activity(member.id)?;
        }
        let merged = self.store.create_activity(&replacement)?;
        // A missing union member is not the caller's person.
        for person_id in &people {
            self.store
                .link_activity_to_person(merged.id, *person_id)
                .map_err(MergeError::Store)?;
        }

        debug!(
            "event=merge_run module=merge status=ok members={} people={} merged_id={}",
            run.len(),
            people.len(),
            merged.id
        );
        Ok(merged)
    }

    /// People linked to any member, in first-seen order.
    fn people_union(&self, run: &MergeRun) -> Result<Vec<PersonId>, MergeError> {
        let mut seen = HashSet::new();
        let mut people = Vec::new();
        for member in run.members() {
            for person_id in self.store.people_for_activity(member.id)? {
                if seen.insert(person_id) {
                    people.push(person_id);
                }
            }
        }
        Ok(people)
    }
}

/// Runs one merge call inside a single `IMMEDIATE` SQLite transaction.
///
/// Either every run's delete/create/link sequence commits, or none does.
/// The immediate lock also serializes concurrent writers on the database.
pub fn merge_activities_for_person_atomic(
    conn: &mut Connection,
    person_id: PersonId,
    options: MergeOptions,
) -> Result<MergeReport, MergeError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let report = {
        let store = SqliteRecordStore::try_new(&tx)?;
        MergeService::with_options(store, options).merge_activities_for_person(person_id)?
    };
    tx.commit()?;
    Ok(report)
}
