//! Pure planning for the activity merge workflow.
//!
//! Storage side effects live in `service::merge_service`.

pub mod plan;

pub use plan::{merged_status, plan_runs, MergeRun, OverlapRule};

/// Options controlling one merge invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    pub rule: OverlapRule,
}
