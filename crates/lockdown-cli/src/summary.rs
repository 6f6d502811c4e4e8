use lockdown_core::{PhaseSummary, RunSummary};

/// Formats the end-of-run report printed to stdout.
pub fn render_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    out.push_str("\nRun summary\n\n");
    out.push_str(&format!("  Projects found:        {}\n", summary.projects));
    out.push_str(&format!("  Listing pages:         {}\n", summary.pages));

    match (&summary.privatized, &summary.template) {
        (None, None) => out.push_str("  Dry run:               no changes made\n"),
        (privatized, template) => {
            if let Some(phase) = privatized {
                out.push_str(&phase_line("Made private", phase));
            }
            if let Some(phase) = template {
                out.push_str(&phase_line("Template applied", phase));
            }
        }
    }
    out
}

fn phase_line(label: &str, phase: &PhaseSummary) -> String {
    format!(
        "  {:<22} {} of {} in {} calls ({} failed)\n",
        format!("{}:", label),
        phase.completed,
        phase.total,
        phase.batches,
        phase.failed
    )
}
