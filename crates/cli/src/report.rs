use filesort_core::organizer::{ItemStatus, OrganizeReport};
use filesort_core::pipeline::PipelineSummary;
use serde_json::Value;

pub fn summary_json(summary: &PipelineSummary) -> Value {
    serde_json::json!({
        "status": "ok",
        "model": summary.source,
        "processed": summary.report.items.len(),
        "moved": summary.report.moved(),
        "failed": summary.report.failed(),
        "items": summary.report.items,
    })
}

/// One line per file plus a closing summary line.
pub fn render_text(report: &OrganizeReport, verbose: bool) -> String {
    let mut out = String::new();
    for item in &report.items {
        let line = match &item.status {
            ItemStatus::Moved { to } if verbose => {
                format!("moved   {} -> {}", item.path.display(), to.display())
            }
            ItemStatus::Planned { to } => {
                format!("plan    {} -> {}", item.path.display(), to.display())
            }
            ItemStatus::AlreadyInPlace if verbose => format!("ok      {}", item.path.display()),
            ItemStatus::Skipped { reason } => {
                format!("skipped {}: {}", item.path.display(), reason)
            }
            ItemStatus::Failed { reason } => {
                format!("error   {}: {}", item.path.display(), reason)
            }
            _ => continue,
        };
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str(&format!(
        "organize summary: processed={}, moved={}, failed={}",
        report.items.len(),
        report.moved(),
        report.failed()
    ));
    out
}
