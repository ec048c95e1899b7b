use crate::error::{CollectError, ControlError};
use crate::system::records::{CpuTimes, ServiceRecord, SessionRecord};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceAction {
    Start,
    Stop,
}

impl ServiceAction {
    pub fn verb(self) -> &'static str {
        match self {
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
        }
    }
}

/// Per-OS shims for the pieces sysinfo does not cover: cumulative CPU tick
/// counters, the service table, the session table, and service control
/// requests.
pub trait PlatformExtensions {
    fn cpu_times() -> Option<CpuTimes>;
    /// Cumulative (kernel, user) CPU time of one process, in milliseconds.
    fn process_cpu_times_ms(pid: u32) -> Option<(u64, u64)>;
    fn list_services() -> Result<Vec<ServiceRecord>, CollectError>;
    fn list_sessions() -> Result<Vec<SessionRecord>, CollectError>;
    fn control_service(name: &str, action: ServiceAction) -> Result<(), ControlError>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;
#[cfg(target_os = "windows")]
use windows as platform_impl;

pub fn cpu_times() -> Option<CpuTimes> {
    platform_impl::Platform::cpu_times()
}

pub fn process_cpu_times_ms(pid: u32) -> Option<(u64, u64)> {
    platform_impl::Platform::process_cpu_times_ms(pid)
}

pub fn list_services() -> Result<Vec<ServiceRecord>, CollectError> {
    platform_impl::Platform::list_services()
}

pub fn list_sessions() -> Result<Vec<SessionRecord>, CollectError> {
    platform_impl::Platform::list_sessions()
}

pub fn control_service(name: &str, action: ServiceAction) -> Result<(), ControlError> {
    platform_impl::Platform::control_service(name, action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_time_wrappers_do_not_panic() {
        let _ = cpu_times();
        let _ = process_cpu_times_ms(std::process::id());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn cpu_times_reports_nonzero_counters() {
        let times = cpu_times().expect("/proc/stat should be readable");
        assert!(times.idle + times.kernel + times.user > 0);
    }
}
