use serde::{Deserialize, Serialize};

/// Where a repository physically lives.
///
/// Unrecognized kind strings in the config deserialize to `Unknown`
/// instead of failing the whole config load; probing an `Unknown`
/// repository yields no result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoKind {
    Local,
    Ssh,
    #[serde(other)]
    Unknown,
}

impl RepoKind {
    pub fn label(&self) -> &'static str {
        match self {
            RepoKind::Local   => "local",
            RepoKind::Ssh     => "ssh",
            RepoKind::Unknown => "?",
        }
    }
}

/// One configured backup repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RepoKind,
    /// Repository path. May carry an `::archive-name` suffix naming a
    /// logical archive inside the repository.
    pub path: String,

    // Remote connection fields (ssh only)
    #[serde(default)]
    pub host:     Option<String>,
    #[serde(default)]
    pub port:     Option<u16>,
    #[serde(default)]
    pub username: Option<String>,
    /// Name of the keystore entry holding the SSH private key.
    #[serde(default)]
    pub ssh_key:  Option<String>,
}

/// Delimiter separating a repository path from an archive name.
pub const ARCHIVE_DELIMITER: &str = "::";

impl Repository {
    /// The path to measure: the repository directory itself, with any
    /// archive suffix stripped.
    pub fn base_path(&self) -> &str {
        match self.path.split_once(ARCHIVE_DELIMITER) {
            Some((base, _)) => base,
            None            => &self.path,
        }
    }

    pub fn ssh_port(&self) -> u16 {
        self.port.unwrap_or(22)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(path: &str) -> Repository {
        Repository {
            name: "r".into(),
            kind: RepoKind::Local,
            path: path.into(),
            host: None, port: None, username: None, ssh_key: None,
        }
    }

    #[test]
    fn base_path_strips_archive_suffix() {
        assert_eq!(repo("/backup/repo::archive-name").base_path(), "/backup/repo");
        assert_eq!(repo("/backup/repo").base_path(), "/backup/repo");
    }

    #[test]
    fn base_path_keeps_only_leading_segment() {
        assert_eq!(repo("/backup/repo::a::b").base_path(), "/backup/repo");
    }

    #[test]
    fn unknown_kind_strings_deserialize_to_unknown() {
        let r: Repository = toml::from_str(
            "name = \"x\"\ntype = \"sftp\"\npath = \"/b\"\n",
        ).unwrap();
        assert_eq!(r.kind, RepoKind::Unknown);
    }
}
