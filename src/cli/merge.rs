//! Merge command - rebuild the merged output from the load order

use crate::cli::CliProgress;
use crate::cli::context::CommandContext;
use crate::cli::style::{CROSS, Stylize, arrow, check};
use anstream::println;
use modstack::error::{Error, Result};
use modstack::merge::{MergeExecutionResult, MergePipeline, MergePlan, create_merge_plan};
use modstack::types::PipelineState;

/// Options for the merge command
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Dry run - show the plan without touching the output
    pub dry_run: bool,
}

/// Run the merge command
pub async fn run_merge(ctx: &CommandContext, options: MergeOptions) -> Result<()> {
    // =========================================================================
    // Phase 1: GATHER + PLAN
    // =========================================================================

    let plan_options = ctx.config.plan_options();
    let plan = create_merge_plan(ctx.registry.as_slice(), &plan_options);

    if options.dry_run {
        report_merge_dry_run(&plan);
        return Ok(());
    }

    // =========================================================================
    // Phase 2: EXECUTE
    // =========================================================================

    println!(
        "{} {}",
        "Merging".emphasis(),
        format!("{} mod(s)...", plan.mod_ids.len()).accent()
    );

    let merger = ctx.config.merger();
    let progress = CliProgress::spinner();
    let mut pipeline = MergePipeline::new(&merger, &progress, &ctx.config.load_order_file);

    // Dropping the pipeline future on Ctrl-C kills the running tool
    let outcome = tokio::select! {
        result = pipeline.execute(&plan) => result,
        _ = tokio::signal::ctrl_c() => Err(Error::Cancelled),
    };

    if matches!(outcome, Err(Error::Cancelled)) {
        pipeline.mark_cancelled();
    }

    match outcome {
        Ok(result) => {
            progress.finish(format!("{} Merge complete", check()));
            print_merge_summary(&result, &ctx.config.output_dir.display().to_string());
            Ok(())
        }
        Err(e) => {
            progress.clear();
            if let PipelineState::Failed(phase) = pipeline.state() {
                println!("{} Merge failed during {} phase", CROSS.warn(), phase.warn());
            }
            Err(e)
        }
    }
}

/// Print merge summary
fn print_merge_summary(result: &MergeExecutionResult, output: &str) {
    println!();
    println!("   Output: {}", output.accent());
    println!(
        "   Files: {} copied, {} overridden, {} left to delegated mergers",
        result.overlay.files_copied.accent(),
        result.overlay.overridden.accent(),
        result.overlay.files_skipped.accent()
    );
    for stage in result.completed_stages() {
        println!("   {} {} merge", check(), stage);
    }
    for stage in &result.skipped_stages {
        println!("   {}", format!("- {stage} merge skipped").muted());
    }
    println!(
        "   {}",
        format!("Finished at {}", result.finished_at.format("%Y-%m-%d %H:%M:%S UTC")).muted()
    );
}

/// Report what would be merged (dry run)
fn report_merge_dry_run(plan: &MergePlan) {
    println!("{}:", "Merge plan".emphasis());
    println!();

    if plan.is_empty() {
        println!("  {}", "No mods registered; output will be empty".muted());
    } else {
        println!("  {}:", "Load order (last wins)".emphasis());
        for id in &plan.mod_ids {
            println!("    {} {}", arrow(), id.accent());
        }
    }

    println!();
    println!("  {}:", "Steps".emphasis());
    for step in &plan.steps {
        println!("    {} {}", arrow(), step);
    }

    println!();
    println!("{}", "Run without --dry-run to execute.".muted());
}
