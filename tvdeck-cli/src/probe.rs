use std::path::{Path, PathBuf};

use sysinfo::Disks;

use tvdeck_core::telemetry::{CpuTicks, DiskUsage, LoadSource, MemoryUsage, parse_millidegrees};

const PROC_STAT: &str = "/proc/stat";

/// Reads load figures from the running system.
pub struct SystemLoad {
    disks: Disks,
    stat_path: PathBuf,
    thermal_zone: PathBuf,
}

impl SystemLoad {
    pub fn new(thermal_zone: &Path) -> Self {
        Self {
            disks: Disks::new(),
            stat_path: PathBuf::from(PROC_STAT),
            thermal_zone: thermal_zone.to_path_buf(),
        }
    }
}

impl LoadSource for SystemLoad {
    fn cpu_ticks(&mut self) -> Option<CpuTicks> {
        let content = std::fs::read_to_string(&self.stat_path).ok()?;
        CpuTicks::parse(&content)
    }

    fn memory(&mut self) -> Option<MemoryUsage> {
        // SAFETY: sysinfo(2) only writes into the zeroed struct we own
        let mut info: libc::sysinfo = unsafe { std::mem::zeroed() };
        if unsafe { libc::sysinfo(&mut info) } != 0 || info.totalram == 0 {
            return None;
        }
        Some(MemoryUsage::from_kernel(
            info.totalram as u64,
            info.freeram as u64,
            info.bufferram as u64,
            u64::from(info.mem_unit),
        ))
    }

    fn temperature(&mut self) -> Option<i32> {
        let raw = std::fs::read_to_string(&self.thermal_zone).ok()?;
        parse_millidegrees(&raw)
    }

    fn root_disk(&mut self) -> Option<DiskUsage> {
        self.disks.refresh_list();
        self.disks
            .iter()
            .find(|d| d.mount_point() == Path::new("/"))
            .map(|d| DiskUsage {
                total: d.total_space(),
                available: d.available_space(),
            })
    }
}
