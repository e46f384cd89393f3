mod alerts;
mod config;
mod keystore;
mod models;
mod probe;
mod util;

use anyhow::Result;
use clap::Parser;
use config::Config;
use keystore::KeyStore;
use models::repository::Repository;
use models::usage::Usage;
use probe::Prober;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "repodf", about = "df for backup repositories", version = "0.1")]
struct Cli {
    /// Print a one-shot JSON snapshot of repository storage and exit
    #[arg(long)]
    json: bool,

    /// One-shot health check: exit 0=OK, 1=WARNING, 2=CRITICAL (nagios/cron compatible)
    #[arg(long)]
    check: bool,

    /// Print config file path and current values, then exit
    #[arg(long)]
    config: bool,

    /// Probe only the named repository
    #[arg(short, long)]
    repo: Option<String>,

    /// Override the SSH round-trip timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Read an SSH private key from stdin and store it in the keystore under NAME
    #[arg(long, value_name = "NAME")]
    add_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(name) = &cli.add_key {
        return run_add_key(name);
    }
    if cli.config {
        return run_print_config();
    }

    let cfg = Config::load();
    let timeout = Duration::from_secs(cli.timeout.unwrap_or(cfg.general.ssh_timeout_secs));
    let results = collect(&cfg, cli.repo.as_deref(), timeout).await;

    if cli.json {
        return run_json_snapshot(&results);
    }
    if cli.check {
        return run_check(&results, &cfg.thresholds);
    }
    run_report(&results, &cfg.thresholds)
}

/// Probe every configured repository (or just the named one).
async fn collect(
    cfg: &Config,
    only: Option<&str>,
    timeout: Duration,
) -> Vec<(Repository, Option<Usage>)> {
    let prober = Prober::new(KeyStore::load(), timeout);
    let mut results = Vec::new();
    for repo in &cfg.repositories {
        if let Some(name) = only {
            if repo.name != name { continue; }
        }
        let usage = prober.probe(repo).await;
        results.push((repo.clone(), usage));
    }
    results
}

fn run_report(results: &[(Repository, Option<Usage>)], thr: &config::Thresholds) -> Result<()> {
    let active_alerts = alerts::evaluate(results, thr);
    print!("{}", util::report::generate(results, &active_alerts));
    Ok(())
}

fn run_json_snapshot(results: &[(Repository, Option<Usage>)]) -> Result<()> {
    use serde_json::{json, Value};
    use util::human::fmt_bytes;

    let checked_at = chrono::Local::now();
    let repositories: Vec<Value> = results.iter().map(|(repo, usage)| {
        let storage = match usage {
            Some(u) => {
                let mut v = serde_json::to_value(u.record(checked_at)).unwrap_or(Value::Null);
                if let Value::Object(map) = &mut v {
                    map.insert("filesystem".into(),   json!(u.filesystem));
                    map.insert("mount_point".into(),  json!(u.mount_point));
                    map.insert("total_hr".into(),     json!(fmt_bytes(u.total_bytes)));
                    map.insert("used_hr".into(),      json!(fmt_bytes(u.used_bytes)));
                    map.insert("available_hr".into(), json!(fmt_bytes(u.avail_bytes)));
                }
                v
            }
            None => Value::Null,
        };
        json!({
            "name": repo.name,
            "type": repo.kind.label(),
            "path": repo.path,
            "storage": storage,
        })
    }).collect();

    let snapshot = json!({
        "repodf_version": "0.1",
        "timestamp":      checked_at.to_rfc3339(),
        "repositories":   repositories,
    });

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn run_check(results: &[(Repository, Option<Usage>)], thr: &config::Thresholds) -> Result<()> {
    use alerts::Severity;

    let active_alerts = alerts::evaluate(results, thr);
    let has_crit = active_alerts.iter().any(|a| a.severity == Severity::Critical);
    let has_warn = active_alerts.iter().any(|a| a.severity == Severity::Warning);

    if active_alerts.is_empty() {
        println!("OK — {} repository(s) within thresholds", results.len());
        std::process::exit(0);
    }

    // Print all active alerts to stdout
    for a in &active_alerts {
        println!("[{}] [{}] {}", a.severity.label(), a.repo, a.message);
    }

    if has_crit {
        std::process::exit(2);
    } else if has_warn {
        std::process::exit(1);
    }
    Ok(())
}

fn run_print_config() -> Result<()> {
    let cfg = Config::load();
    let path = Config::config_path()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "(unknown)".to_string());
    println!("Config: {}", path);
    println!();
    println!("[general]");
    println!("  ssh_timeout_secs = {}", cfg.general.ssh_timeout_secs);
    println!();
    println!("[thresholds]");
    println!("  usage_warn_pct = {}%", cfg.thresholds.usage_warn_pct);
    println!("  usage_crit_pct = {}%", cfg.thresholds.usage_crit_pct);
    println!();
    println!("[[repository]] ({})", cfg.repositories.len());
    for repo in &cfg.repositories {
        match repo.host.as_deref() {
            Some(host) => println!(
                "  {:<16} {:<6} {}  ({}@{}:{})",
                repo.name, repo.kind.label(), repo.path,
                repo.username.as_deref().unwrap_or("?"), host, repo.ssh_port(),
            ),
            None => println!("  {:<16} {:<6} {}", repo.name, repo.kind.label(), repo.path),
        }
    }
    println!();
    let keys = KeyStore::load();
    println!("Keystore: {} key(s)", keys.len());
    Ok(())
}

fn run_add_key(name: &str) -> Result<()> {
    use std::io::Read;

    let mut key_material = Vec::new();
    std::io::stdin().read_to_end(&mut key_material)?;
    if key_material.is_empty() {
        anyhow::bail!("no key material on stdin");
    }

    let mut store = KeyStore::load();
    store.add(name, &key_material)?;
    println!("Stored key {:?} ({} key(s) total)", name, store.len());
    Ok(())
}
