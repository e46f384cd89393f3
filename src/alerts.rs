use crate::config::Thresholds;
use crate::models::repository::Repository;
use crate::models::usage::Usage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Critical,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Warning  => "WARN",
            Severity::Critical => "CRIT",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Alert {
    pub severity: Severity,
    pub repo:     String,
    pub message:  String,
}

/// Evaluate probe results against the usage thresholds.
/// Returns a freshly built list sorted Critical → Warning.
pub fn evaluate(results: &[(Repository, Option<Usage>)], thr: &Thresholds) -> Vec<Alert> {
    let mut alerts: Vec<Alert> = Vec::new();

    for (repo, usage) in results {
        match usage {
            Some(u) => {
                if u.percent_used >= thr.usage_crit_pct {
                    alerts.push(Alert {
                        severity: Severity::Critical,
                        repo:     repo.name.clone(),
                        message:  format!(
                            "Storage {:.1}% used ≥ critical threshold {:.1}%",
                            u.percent_used, thr.usage_crit_pct
                        ),
                    });
                } else if u.percent_used >= thr.usage_warn_pct {
                    alerts.push(Alert {
                        severity: Severity::Warning,
                        repo:     repo.name.clone(),
                        message:  format!(
                            "Storage {:.1}% used ≥ warning threshold {:.1}%",
                            u.percent_used, thr.usage_warn_pct
                        ),
                    });
                }
            }
            // A repository we cannot measure is skipped this cycle,
            // but the operator should hear about it.
            None => alerts.push(Alert {
                severity: Severity::Warning,
                repo:     repo.name.clone(),
                message:  "Usage probe returned no result".into(),
            }),
        }
    }

    alerts.sort_by(|a, b| b.severity.cmp(&a.severity));
    alerts
}
