use crate::cli::{Cli, Command, MergeArgs, RuleArg};
use agenda_core::db::open_db;
use agenda_core::{
    core_version, default_log_level, init_logging, merge_activities_for_person_atomic, ping,
    MergeOptions, OverlapRule,
};
use anyhow::Context;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    match cli.command {
        Command::Ping => {
            println!("agenda_core ping={}", ping());
            println!("agenda_core version={}", core_version());
            Ok(())
        }
        Command::Merge(args) => cmd_merge(args),
    }
}

fn cmd_merge(args: MergeArgs) -> anyhow::Result<()> {
    let mut conn = open_db(&args.db)
        .with_context(|| format!("failed to open database `{}`", args.db.display()))?;
    let options = MergeOptions {
        rule: match args.rule {
            RuleArg::LastMember => OverlapRule::LastMember,
            RuleArg::RunningMax => OverlapRule::RunningMax,
        },
    };

    let report = merge_activities_for_person_atomic(&mut conn, args.person, options)
        .with_context(|| format!("merge failed for person {}", args.person))?;

    if report.is_noop() {
        println!("person {}: {} activities, nothing to merge", report.person_id, report.runs);
    } else {
        println!(
            "person {}: merged {} activities into {} ({} runs)",
            report.person_id,
            report.removed,
            report.created.len(),
            report.runs
        );
        for id in &report.created {
            println!("  created {id}");
        }
    }
    Ok(())
}
