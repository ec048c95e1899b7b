use std::process::Command;

use super::{PlatformExtensions, ServiceAction};
use crate::error::{CollectError, ControlError};
use crate::system::records::{
    CpuTimes, ServiceRecord, ServiceStatus, SessionRecord, SessionState, StartType,
};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn cpu_times() -> Option<CpuTimes> {
        // Host-wide tick counters need mach host_statistics, which has no
        // stable binding here. The estimator treats a missing sample as a
        // zero delta and reports 0.0.
        None
    }

    fn process_cpu_times_ms(_pid: u32) -> Option<(u64, u64)> {
        // No kernel/user split without proc_pid_rusage.
        None
    }

    fn list_services() -> Result<Vec<ServiceRecord>, CollectError> {
        // launchctl list: PID STATUS LABEL, "-" PID for non-running jobs.
        let output = Command::new("launchctl").arg("list").output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(CollectError::OsQuery(format!("launchctl failed: {stderr}")));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut services = Vec::new();
        for line in stdout.lines().skip(1) {
            let mut cols = line.split_whitespace();
            let (Some(pid), Some(_status), Some(label)) =
                (cols.next(), cols.next(), cols.next())
            else {
                continue;
            };
            let status = if pid == "-" {
                ServiceStatus::Stopped
            } else {
                ServiceStatus::Running
            };
            services.push(ServiceRecord {
                name: label.to_string(),
                display_name: label.to_string(),
                status,
                start_type: StartType::Unknown,
                binary_path: String::new(),
            });
        }
        Ok(services)
    }

    fn list_sessions() -> Result<Vec<SessionRecord>, CollectError> {
        // `who`: USER TTY DATE TIME ...
        let output = Command::new("who").output()?;
        if !output.status.success() {
            return Err(CollectError::OsQuery("who failed".to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut sessions = Vec::new();
        for (index, line) in stdout.lines().enumerate() {
            let cols: Vec<&str> = line.split_whitespace().collect();
            let Some(&user) = cols.first() else { continue };
            let login_time = if cols.len() >= 4 {
                format!("{} {}", cols[2], cols[3])
            } else {
                "unknown".to_string()
            };
            sessions.push(SessionRecord {
                session_id: index as u32,
                user_name: user.to_string(),
                domain: "local".to_string(),
                login_time,
                state: SessionState::Active,
            });
        }
        Ok(sessions)
    }

    fn control_service(name: &str, action: ServiceAction) -> Result<(), ControlError> {
        let output = Command::new("launchctl").arg(action.verb()).arg(name).output()?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.contains("Could not find") || stderr.contains("No such process") {
            return Err(ControlError::ServiceNotFound(name.to_string()));
        }
        Err(ControlError::ServiceControl {
            name: name.to_string(),
            reason: stderr,
        })
    }
}
