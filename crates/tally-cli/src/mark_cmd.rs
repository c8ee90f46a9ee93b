//! `tally mark` and `tally reset` commands.

use std::io::Write;

use anyhow::Result;

use tally_core::{ProgressEngine, UpdateRequest};
use tally_store::store::DocumentStore;

/// Run the mark command: set one item's completion state.
pub async fn run_mark<S: DocumentStore>(
    engine: &ProgressEngine<S>,
    plan: &str,
    item: &str,
    group: Option<&str>,
    completed: bool,
) -> Result<()> {
    let outcome = engine
        .set_item_completion(&UpdateRequest {
            plan: plan.to_string(),
            group: group.map(str::to_string),
            item_id: item.to_string(),
            completed,
        })
        .await?;

    let verb = if completed { "complete" } else { "incomplete" };
    println!("Marked {plan}/{item} {verb}.");
    println!(
        "{}: {}/{} ({}%)",
        outcome.plan,
        outcome.summary.completed_items,
        outcome.summary.total_items,
        outcome.summary.percentage
    );
    if let Some(overall) = outcome.overall {
        println!(
            "overall: {}/{} ({}%)",
            overall.completed_items, overall.total_items, overall.percentage
        );
    }

    Ok(())
}

/// Run the reset command: clear every item across every plan.
pub async fn run_reset<S: DocumentStore>(engine: &ProgressEngine<S>, yes: bool) -> Result<()> {
    if !yes {
        print!("Reset ALL progress across every plan? [y/N] ");
        std::io::stdout().flush()?;
        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    engine.reset_all().await?;
    println!("All progress reset.");

    Ok(())
}
