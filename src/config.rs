use crate::models::repository::Repository;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub thresholds: Thresholds,

    /// Configured repositories, one `[[repository]]` table each.
    #[serde(default, rename = "repository")]
    pub repositories: Vec<Repository>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Bound on the whole SSH round trip (connect + exec + read), seconds.
    pub ssh_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    pub usage_warn_pct: f64,
    pub usage_crit_pct: f64,
}

// ── Defaults ─────────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            general:      GeneralConfig::default(),
            thresholds:   Thresholds::default(),
            repositories: Vec::new(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { ssh_timeout_secs: 10 }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { usage_warn_pct: 85.0, usage_crit_pct: 95.0 }
    }
}

// ── Load / Save ───────────────────────────────────────────────────────

impl Config {
    pub fn load() -> Self {
        match try_load() {
            Ok(c)  => c,
            Err(_) => {
                // Write defaults on first run (best-effort)
                let _ = try_write_defaults();
                Config::default()
            }
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("repodf").join("repodf.toml"))
    }
}

fn try_load() -> Result<Config> {
    let path = Config::config_path().ok_or_else(|| anyhow::anyhow!("no config dir"))?;
    let text = fs::read_to_string(path)?;
    let cfg: Config = toml::from_str(&text)?;
    Ok(cfg)
}

fn try_write_defaults() -> Result<()> {
    let path = Config::config_path().ok_or_else(|| anyhow::anyhow!("no config dir"))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = toml::to_string_pretty(&Config::default())?;
    fs::write(path, format!("# repodf configuration\n# Generated on first run — edit freely\n\n{}", text))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::repository::RepoKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn repositories_parse_from_toml_tables() {
        let cfg: Config = toml::from_str(r#"
            [general]
            ssh_timeout_secs = 5

            [thresholds]
            usage_warn_pct = 80.0
            usage_crit_pct = 90.0

            [[repository]]
            name = "onsite"
            type = "local"
            path = "/backup/repo"

            [[repository]]
            name = "offsite"
            type = "ssh"
            path = "/srv/backup/repo::weekly"
            host = "backup.example.com"
            port = 2222
            username = "borg"
            ssh_key = "backup-host"
        "#).unwrap();

        assert_eq!(cfg.general.ssh_timeout_secs, 5);
        assert_eq!(cfg.repositories.len(), 2);
        assert_eq!(cfg.repositories[0].kind, RepoKind::Local);
        let offsite = &cfg.repositories[1];
        assert_eq!(offsite.kind, RepoKind::Ssh);
        assert_eq!(offsite.ssh_port(), 2222);
        assert_eq!(offsite.base_path(), "/srv/backup/repo");
    }

    #[test]
    fn empty_config_falls_back_to_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.general.ssh_timeout_secs, 10);
        assert_eq!(cfg.thresholds.usage_warn_pct, 85.0);
        assert!(cfg.repositories.is_empty());
    }

    #[test]
    fn defaults_round_trip_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let cfg: Config = toml::from_str(&text).unwrap();
        assert_eq!(cfg.thresholds.usage_crit_pct, 95.0);
    }
}
