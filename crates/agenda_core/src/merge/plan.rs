//! Overlap-run planning and merged-field composition.
//!
//! # Responsibility
//! - Order a person's activities and partition them into overlap runs.
//! - Compose the replacement activity for a run.
//!
//! # Invariants
//! - Sorting is stable by `start_ms`; ties keep fetch order.
//! - Overlap is strict: `start_ms == reference_end` starts a new run.
//! - Every returned run is non-empty and keeps scan order.
//! - Planning is pure; it never touches storage.

use crate::model::activity::{Activity, ActivityStatus, NewActivity};

const FIELD_SEPARATOR: &str = ";";

/// Which end time a candidate is compared against while scanning a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlapRule {
    /// Compare against the end of the most recently appended member.
    ///
    /// A long first member followed by a short second one shrinks the
    /// reference end, so a later activity that only overlaps the first
    /// member starts a new run.
    #[default]
    LastMember,
    /// Compare against the maximum end seen so far in the run. The merged
    /// activity then ends at that maximum.
    RunningMax,
}

impl OverlapRule {
    /// Stable label used in logs and CLI flags.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LastMember => "last_member",
            Self::RunningMax => "running_max",
        }
    }
}

/// One maximal run of consecutive overlapping activities, in scan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRun {
    members: Vec<Activity>,
    reference_end: i64,
}

impl MergeRun {
    fn start(first: Activity) -> Self {
        let reference_end = first.end_ms;
        Self {
            members: vec![first],
            reference_end,
        }
    }

    fn admits(&self, candidate: &Activity) -> bool {
        candidate.start_ms < self.reference_end
    }

    fn push(&mut self, member: Activity, rule: OverlapRule) {
        self.reference_end = match rule {
            OverlapRule::LastMember => member.end_ms,
            OverlapRule::RunningMax => self.reference_end.max(member.end_ms),
        };
        self.members.push(member);
    }

    pub fn members(&self) -> &[Activity] {
        &self.members
    }

    pub(crate) fn len(&self) -> usize {
        self.members.len()
    }

    /// Runs of two or more members are collapsed; singletons stay as-is.
    pub fn needs_merge(&self) -> bool {
        self.members.len() >= 2
    }

    /// Builds the replacement activity for this run.
    ///
    /// - `title`: member titles joined by `;`.
    /// - `description`: `"<title>: <description>"` per member joined by `;`.
    /// - `status`: see [`merged_status`].
    /// - window: first member's start to the run's reference end, which is
    ///   the last member's end under [`OverlapRule::LastMember`].
    pub fn compose(&self) -> NewActivity {
        let first = &self.members[0];
        let last = &self.members[self.members.len() - 1];

        let title = self
            .members
            .iter()
            .map(|member| member.title.as_str())
            .collect::<Vec<_>>()
            .join(FIELD_SEPARATOR);
        let description = self
            .members
            .iter()
            .map(|member| format!("{}: {}", member.title, member.description))
            .collect::<Vec<_>>()
            .join(FIELD_SEPARATOR);

        NewActivity {
            title,
            description,
            status: merged_status(first.status, last.status),
            start_ms: first.start_ms,
            end_ms: self.reference_end,
        }
    }
}

/// Derives the merged status from the first and last run members.
///
/// `TODO` if the first member is `TODO`; otherwise `COMPLETED` if the last
/// member is `COMPLETED`; otherwise `IN_PROGRESS`.
pub fn merged_status(first: ActivityStatus, last: ActivityStatus) -> ActivityStatus {
    if first == ActivityStatus::Todo {
        ActivityStatus::Todo
    } else if last == ActivityStatus::Completed {
        ActivityStatus::Completed
    } else {
        ActivityStatus::InProgress
    }
}

/// Sorts activities by start and partitions them into overlap runs.
pub fn plan_runs(mut activities: Vec<Activity>, rule: OverlapRule) -> Vec<MergeRun> {
    // `sort_by_key` is stable.
    activities.sort_by_key(|activity| activity.start_ms);

    let mut runs = Vec::new();
    let mut current: Option<MergeRun> = None;
    for activity in activities {
        current = Some(match current.take() {
            None => MergeRun::start(activity),
            Some(mut run) if run.admits(&activity) => {
                run.push(activity, rule);
                run
            }
            Some(run) => {
                runs.push(run);
                MergeRun::start(activity)
            }
        });
    }
    runs.extend(current);

    runs
}
