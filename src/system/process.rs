use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

use crate::error::CollectError;
use crate::system::collector::Collector;
use crate::system::platform;
use crate::system::records::ProcessRecord;

/// sysinfo-backed process inventory. The kernel/user CPU-time split comes
/// from the platform shim; sysinfo only exposes the combined figure.
pub struct ProcessCollector {
    sys: System,
}

impl ProcessCollector {
    pub fn new() -> Self {
        ProcessCollector { sys: System::new() }
    }
}

impl Default for ProcessCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for ProcessCollector {
    type Output = Vec<ProcessRecord>;

    fn collect(&mut self) -> Result<Vec<ProcessRecord>, CollectError> {
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::everything(),
        );

        let mut records = Vec::with_capacity(self.sys.processes().len());
        for (pid, process) in self.sys.processes() {
            let pid_u32 = pid.as_u32();
            let (kernel_time_ms, user_time_ms) =
                platform::process_cpu_times_ms(pid_u32).unwrap_or((0, 0));

            records.push(ProcessRecord {
                pid: pid_u32,
                ppid: process.parent().map(|p| p.as_u32()).unwrap_or(0),
                name: process.name().to_string_lossy().to_string(),
                exe_path: process
                    .exe()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
                command_line: process
                    .cmd()
                    .iter()
                    .map(|s| s.to_string_lossy().to_string())
                    .collect::<Vec<_>>()
                    .join(" "),
                started_at: process.start_time(),
                memory_bytes: process.memory(),
                kernel_time_ms,
                user_time_ms,
            });
        }
        Ok(records)
    }
}
