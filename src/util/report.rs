use crate::alerts::Alert;
use crate::models::repository::Repository;
use crate::models::usage::Usage;
use crate::util::human::fmt_bytes;

/// Generate a human-readable storage report to a String.
pub fn generate(results: &[(Repository, Option<Usage>)], alerts: &[Alert]) -> String {
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let mut out = String::new();

    out.push_str("═══════════════════════════════════════════════\n");
    out.push_str(&format!("  repodf Storage Report — {}\n", now));
    out.push_str("═══════════════════════════════════════════════\n\n");

    // ── Repositories ───────────────────────────────────────────────────
    out.push_str(&format!("── Repositories ({}) ──────────────────────────\n", results.len()));
    out.push_str(&format!(
        "  {:<16} {:<6} {:<18} {:>10} {:>10} {:>10} {:>6}\n",
        "Name", "Type", "Mount", "Total", "Used", "Avail", "Use%"
    ));
    out.push_str(&format!("  {}\n", "─".repeat(82)));
    for (repo, usage) in results {
        match usage {
            Some(u) => out.push_str(&format!(
                "  {:<16} {:<6} {:<18} {:>10} {:>10} {:>10} {:>5.1}%\n",
                repo.name, repo.kind.label(), u.mount_point,
                fmt_bytes(u.total_bytes), fmt_bytes(u.used_bytes),
                fmt_bytes(u.avail_bytes), u.percent_used,
            )),
            None => out.push_str(&format!(
                "  {:<16} {:<6} {:<18} {:>10} {:>10} {:>10} {:>6}\n",
                repo.name, repo.kind.label(), "—", "—", "—", "—", "—",
            )),
        }
    }
    out.push('\n');

    // ── Alerts ─────────────────────────────────────────────────────────
    out.push_str(&format!("── Alerts ({}) ────────────────────────────────\n", alerts.len()));
    if alerts.is_empty() {
        out.push_str("  ● All repositories nominal\n");
    } else {
        for a in alerts {
            out.push_str(&format!("  [{}]  [{}] {}\n", a.severity.label(), a.repo, a.message));
        }
    }
    out.push('\n');

    out.push_str("═══════════════════════════════════════════════\n");
    out
}
