use crate::keystore::{KeySource, SecretKey};
use crate::models::repository::Repository;
use crate::models::usage::Usage;
use crate::probe::ProbeError;
use anyhow::{Context, Result};
use std::future::Future;
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

pub struct SshConnection<'a> {
    pub host:     &'a str,
    pub port:     u16,
    pub username: &'a str,
}

pub struct ShellOutput {
    pub exit_code: i32,
    pub stdout:    Vec<u8>,
    pub stderr:    Vec<u8>,
}

/// One-shot authenticated remote command execution. Injected so tests
/// can substitute canned output; the production implementation spawns
/// the system `ssh` client.
pub trait RemoteShell: Send + Sync {
    fn exec(
        &self,
        conn: &SshConnection<'_>,
        key: &SecretKey,
        command: &str,
    ) -> impl Future<Output = Result<ShellOutput>> + Send;
}

pub struct SshShell;

impl RemoteShell for SshShell {
    async fn exec(
        &self,
        conn: &SshConnection<'_>,
        key: &SecretKey,
        command: &str,
    ) -> Result<ShellOutput> {
        // ssh refuses identities readable by group/other; tempfile
        // creates 0600. Dropping the handle removes the file, including
        // when the caller abandons this future at its timeout.
        let mut keyfile = tempfile::Builder::new()
            .prefix(".repodf-id-")
            .tempfile()
            .context("creating transient key file")?;
        keyfile.write_all(key.as_bytes())?;
        keyfile.flush()?;

        let output = tokio::process::Command::new("ssh")
            .args(ssh_args(conn, keyfile.path(), command))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .context("spawning ssh")?
            .wait_with_output()
            .await
            .context("waiting for ssh")?;

        Ok(ShellOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout:    output.stdout,
            stderr:    output.stderr,
        })
    }
}

fn ssh_args(conn: &SshConnection<'_>, keyfile: &Path, command: &str) -> Vec<String> {
    vec![
        "-p".into(), conn.port.to_string(),
        "-i".into(), keyfile.display().to_string(),
        "-o".into(), "BatchMode=yes".into(),
        "-o".into(), "StrictHostKeyChecking=accept-new".into(),
        format!("{}@{}", conn.username, conn.host),
        command.into(),
    ]
}

fn shell_quote(path: &str) -> String {
    format!("'{}'", path.replace('\'', r"'\''"))
}

/// Measure the remote volume containing an SSH repository directory.
/// The whole round trip is bounded by `timeout`; on expiry the
/// in-flight command is abandoned and its process killed.
pub async fn remote_usage<S: RemoteShell, K: KeySource>(
    shell: &S,
    keys: &K,
    repo: &Repository,
    timeout: Duration,
) -> Result<Usage, ProbeError> {
    let host     = field(&repo.host, "host")?;
    let username = field(&repo.username, "username")?;
    let key_name = field(&repo.ssh_key, "ssh_key")?;

    let entry = keys
        .resolve(key_name)
        .ok_or_else(|| ProbeError::KeyNotFound(key_name.to_string()))?;
    let key = keys.decrypt(&entry).map_err(|_| ProbeError::KeyDecrypt)?;

    let conn = SshConnection { host, port: repo.ssh_port(), username };
    let command = format!("df -k {}", shell_quote(repo.base_path()));

    let output = tokio::time::timeout(timeout, shell.exec(&conn, &key, &command))
        .await
        .map_err(|_| ProbeError::Timeout(timeout))?
        .map_err(ProbeError::Shell)?;

    if output.exit_code != 0 {
        return Err(ProbeError::ExitStatus(output.exit_code));
    }

    parse_df(&String::from_utf8_lossy(&output.stdout))
}

fn field<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, ProbeError> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _                        => Err(ProbeError::MissingField(name)),
    }
}

/// Parse `df -k` output:
/// ```text
/// Filesystem 1K-blocks      Used Available Use% Mounted on
/// /dev/sda1  976762584 400000000 576762584  42% /backup
/// ```
fn parse_df(output: &str) -> Result<Usage, ProbeError> {
    let mut lines: Vec<&str> = output.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    if lines.len() > 1 {
        lines.remove(0); // header
    }
    let first = *lines
        .first()
        .ok_or_else(|| ProbeError::Parse("empty df output".into()))?;

    let mut tokens: Vec<&str> = first.split_whitespace().collect();
    // A long device name wraps onto its own line, pushing the numeric
    // fields down one.
    let merged;
    if tokens.len() < 6 && lines.len() > 1 {
        merged = format!("{} {}", lines[0], lines[1]);
        tokens = merged.split_whitespace().collect();
    }
    if tokens.len() != 6 {
        return Err(ProbeError::Parse(format!("expected 6 fields, got {}", tokens.len())));
    }

    let kb = |t: &str| {
        t.parse::<u64>()
            .map_err(|_| ProbeError::Parse(format!("bad block count {:?}", t)))
    };
    let total_kb = kb(tokens[1])?;
    let used_kb  = kb(tokens[2])?;
    let avail_kb = kb(tokens[3])?;
    let percent = tokens[4]
        .trim_end_matches('%')
        .parse::<f64>()
        .map_err(|_| ProbeError::Parse(format!("bad use percentage {:?}", tokens[4])))?;

    Ok(Usage {
        total_bytes:  total_kb * 1024,
        used_bytes:   used_kb * 1024,
        avail_bytes:  avail_kb * 1024,
        percent_used: percent,
        filesystem:   tokens[0].to_string(),
        mount_point:  tokens[5].to_string(),
    })
}
