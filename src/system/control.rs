//! Control actions against live OS state. These never touch the snapshot
//! store; callers observe their effects on the next refresh.

use std::time::Duration;

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use crate::error::ControlError;
use crate::system::platform::{self, ServiceAction};

/// Request OS-level termination of one process. Returns whether the request
/// was accepted; a vanished PID counts as failure.
pub fn terminate_pid(pid: u32) -> bool {
    let target = Pid::from_u32(pid);
    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[target]),
        false,
        ProcessRefreshKind::nothing(),
    );
    match sys.process(target) {
        Some(process) => process.kill(),
        None => false,
    }
}

/// Terminate every process whose name equals `name` case-insensitively.
/// Returns true when at least one termination request was accepted.
pub fn terminate_by_name(name: &str) -> bool {
    let needle = name.to_lowercase();
    let mut sys = System::new();
    sys.refresh_processes_specifics(ProcessesToUpdate::All, true, ProcessRefreshKind::nothing());

    let mut any = false;
    for process in sys.processes().values() {
        if process.name().to_string_lossy().to_lowercase() == needle {
            any |= process.kill();
        }
    }
    any
}

/// "Already running" is success, not an error.
pub fn start_service(name: &str) -> Result<(), ControlError> {
    platform::control_service(name, ServiceAction::Start)
}

/// "Already stopped" is success, not an error.
pub fn stop_service(name: &str) -> Result<(), ControlError> {
    platform::control_service(name, ServiceAction::Stop)
}

/// Stop, wait out the settle delay, then start. Fails fast when the stop
/// step fails; the settle delay gives the service manager time to tear the
/// unit down before the start request.
pub fn restart_service(name: &str, settle: Duration) -> Result<(), ControlError> {
    restart_with(|| stop_service(name), || start_service(name), settle)
}

fn restart_with<S, T>(stop: S, start: T, settle: Duration) -> Result<(), ControlError>
where
    S: FnOnce() -> Result<(), ControlError>,
    T: FnOnce() -> Result<(), ControlError>,
{
    stop()?;
    std::thread::sleep(settle);
    start()
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn restart_attempts_start_when_stop_reports_already_stopped() {
        // A stopped service reports success on the stop step, so the start
        // step must still run.
        let started = Cell::new(false);
        let result = restart_with(
            || Ok(()),
            || {
                started.set(true);
                Ok(())
            },
            Duration::ZERO,
        );
        assert!(result.is_ok());
        assert!(started.get());
    }

    #[test]
    fn restart_fails_fast_when_stop_fails() {
        let started = Cell::new(false);
        let result = restart_with(
            || {
                Err(ControlError::ServiceControl {
                    name: "svc".into(),
                    reason: "denied".into(),
                })
            },
            || {
                started.set(true);
                Ok(())
            },
            Duration::ZERO,
        );
        assert!(result.is_err());
        assert!(!started.get());
    }

    #[test]
    fn terminate_nonexistent_pid_reports_failure() {
        // Far above the PID ranges any supported OS hands out.
        assert!(!terminate_pid(i32::MAX as u32));
    }

    #[test]
    fn terminate_by_name_without_match_reports_failure() {
        assert!(!terminate_by_name("hostwatch-no-such-process-zz"));
    }
}
