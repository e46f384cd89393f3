use crate::models::repository::Repository;
use crate::models::usage::Usage;
use crate::probe::ProbeError;
use anyhow::Result;
use std::path::Path;

/// Volume space figures for the filesystem containing a path.
#[derive(Debug, Clone, Copy)]
pub struct DiskSpace {
    pub total: u64,
    pub free:  u64,
    pub avail: u64,
}

/// Platform volume statistics. Injected so tests can substitute
/// deterministic figures.
pub trait VolumeStats {
    fn disk_space(&self, path: &Path) -> Result<DiskSpace>;
}

/// Production implementation backed by statvfs.
pub struct SysVolumes;

impl VolumeStats for SysVolumes {
    fn disk_space(&self, path: &Path) -> Result<DiskSpace> {
        use nix::sys::statvfs::statvfs;
        let stat = statvfs(path)?;

        let frsize = stat.fragment_size() as u64;
        Ok(DiskSpace {
            total: stat.blocks() as u64            * frsize,
            free:  stat.blocks_free() as u64       * frsize,
            avail: stat.blocks_available() as u64  * frsize,
        })
    }
}

/// Measure the volume containing a local repository directory.
pub fn local_usage<V: VolumeStats>(volumes: &V, repo: &Repository) -> Result<Usage, ProbeError> {
    let path = repo.base_path();
    let space = volumes.disk_space(Path::new(path)).map_err(ProbeError::Stat)?;

    let used = space.total.saturating_sub(space.free);
    let percent = if space.total == 0 {
        0.0
    } else {
        used as f64 / space.total as f64 * 100.0
    };

    Ok(Usage {
        total_bytes:  space.total,
        used_bytes:   used,
        avail_bytes:  space.avail,
        percent_used: (percent * 10.0).round() / 10.0,
        filesystem:   "local".to_string(),
        mount_point:  path.to_string(),
    })
}
