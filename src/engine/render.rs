//! Plan rendering - the listing an operator sees before anything changes
//!
//! Rendering is plain text so the same plan produces the same bytes in a
//! terminal and in a CI log. Entries keep the engine's order (that is the
//! order they will be applied in); details are sorted by property name.

use reconcile::{PlanSummary, RenderPlan};

const RULE_WIDTH: usize = 60;

/// Render a plan for human inspection
pub fn render_plan(plan: &dyn RenderPlan) -> String {
    let entries = plan.entries();
    let mut lines = Vec::new();

    if entries.is_empty() {
        lines.push("No changes".to_string());
        return finish(lines);
    }

    lines.push(format!("┌─ Plan {}", "─".repeat(RULE_WIDTH - 7)));
    lines.push("│".to_string());

    for entry in &entries {
        lines.push(format!("│ {} {}", entry.action.symbol(), entry.urn));
        for (key, value) in &entry.details {
            lines.push(format!("│     {}: {}", key, value));
        }
    }

    let summary = PlanSummary::from_entries(&entries);
    lines.push("│".to_string());
    lines.push(format!("├{}", "─".repeat(RULE_WIDTH)));
    lines.push(format!(
        "│ Summary: {} {} ({} to add, {} to change, {} to remove, {} to transfer)",
        summary.total(),
        if summary.total() == 1 { "change" } else { "changes" },
        summary.additions,
        summary.changes,
        summary.removals,
        summary.transfers
    ));
    lines.push(format!("└{}", "─".repeat(RULE_WIDTH)));

    finish(lines)
}

fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
