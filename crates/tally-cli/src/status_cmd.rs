//! `tally status` command: show per-plan progress summaries.

use anyhow::Result;

use tally_core::ProgressEngine;
use tally_core::summary;
use tally_store::store::DocumentStore;

/// Run the status command: print a table of every registered plan.
///
/// Summaries are recomputed from the plan bodies so the output is accurate
/// even when the document on disk predates the stored summaries.
pub async fn run_status<S: DocumentStore>(engine: &ProgressEngine<S>) -> Result<()> {
    let doc = engine.snapshot().await?;

    if engine.registry().iter().next().is_none() {
        println!("No plans registered.");
        return Ok(());
    }

    println!("{:<20} {:>10} {:>8} {:>6}", "PLAN", "COMPLETED", "TOTAL", "%");
    println!("{}", "-".repeat(48));

    let mut grand_total = 0u64;
    let mut grand_completed = 0u64;
    for spec in engine.registry().iter() {
        let body = doc
            .plans
            .get(&spec.name)
            .cloned()
            .unwrap_or_else(|| spec.empty_body());
        let s = summary::reconcile(spec, &body);
        grand_total += s.total_items;
        grand_completed += s.completed_items;
        println!(
            "{:<20} {:>10} {:>8} {:>5}%",
            spec.name, s.completed_items, s.total_items, s.percentage
        );
    }

    println!("{}", "-".repeat(48));
    println!(
        "{:<20} {:>10} {:>8} {:>5}%",
        "overall",
        grand_completed,
        grand_total,
        summary::percentage(grand_completed, grand_total)
    );
    if let Some(last_updated) = doc.metadata.last_updated {
        println!();
        println!("Last updated: {}", last_updated.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    Ok(())
}
