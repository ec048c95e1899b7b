use sysinfo::System;

use crate::error::CollectError;
use crate::format::format_uptime;
use crate::system::collector::Collector;
use crate::system::platform;
use crate::system::records::SystemVitals;

/// OS version, memory, CPU identity, and the cumulative tick counters the
/// estimator feeds on. Counters default to zero where the platform cannot
/// report them, which the estimator reads as a zero delta.
pub struct VitalsCollector {
    sys: System,
}

impl VitalsCollector {
    pub fn new() -> Self {
        VitalsCollector { sys: System::new() }
    }
}

impl Default for VitalsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for VitalsCollector {
    type Output = SystemVitals;

    fn collect(&mut self) -> Result<SystemVitals, CollectError> {
        self.sys.refresh_memory();
        self.sys.refresh_cpu_all();

        let unknown = || "unknown".to_string();
        Ok(SystemVitals {
            os_version: System::long_os_version().unwrap_or_else(unknown),
            host_name: System::host_name().unwrap_or_else(unknown),
            user_name: std::env::var("USER")
                .or_else(|_| std::env::var("USERNAME"))
                .unwrap_or_else(|_| unknown()),
            uptime: format_uptime(System::uptime()),
            total_memory: self.sys.total_memory(),
            available_memory: self.sys.available_memory(),
            cpu_model: self
                .sys
                .cpus()
                .first()
                .map(|c| c.brand().to_string())
                .unwrap_or_else(unknown),
            cpu_cores: self.sys.cpus().len(),
            cpu_times: platform::cpu_times().unwrap_or_default(),
        })
    }
}
