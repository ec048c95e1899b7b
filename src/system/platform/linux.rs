use std::process::Command;

use super::{PlatformExtensions, ServiceAction};
use crate::error::{CollectError, ControlError};
use crate::system::records::{
    CpuTimes, ServiceRecord, ServiceStatus, SessionRecord, SessionState, StartType,
};

// USER_HZ is 100 on every mainstream kernel config.
const TICK_MS: u64 = 10;

pub struct Platform;

impl PlatformExtensions for Platform {
    fn cpu_times() -> Option<CpuTimes> {
        // Aggregate "cpu " line of /proc/stat:
        // user nice system idle iowait irq softirq steal ...
        let contents = std::fs::read_to_string("/proc/stat").ok()?;
        let line = contents.lines().find(|l| l.starts_with("cpu "))?;
        let fields: Vec<u64> = line
            .split_whitespace()
            .skip(1)
            .filter_map(|f| f.parse().ok())
            .collect();
        if fields.len() < 7 {
            return None;
        }
        Some(CpuTimes {
            idle: fields[3] + fields[4],
            kernel: fields[2] + fields[5] + fields[6],
            user: fields[0] + fields[1],
        })
    }

    fn process_cpu_times_ms(pid: u32) -> Option<(u64, u64)> {
        // /proc/{pid}/stat; comm may contain spaces and parens, so split
        // after the closing ')'. Fields after comm: state(0) ppid(1)
        // pgrp(2) session(3) tty_nr(4) tpgid(5) flags(6) minflt(7)
        // cminflt(8) majflt(9) cmajflt(10) utime(11) stime(12)
        let path = format!("/proc/{pid}/stat");
        let contents = std::fs::read_to_string(path).ok()?;
        let after_comm = contents.rfind(')')? + 1;
        let fields: Vec<&str> = contents[after_comm..].split_whitespace().collect();
        let utime: u64 = fields.get(11)?.parse().ok()?;
        let stime: u64 = fields.get(12)?.parse().ok()?;
        Some((stime * TICK_MS, utime * TICK_MS))
    }

    fn list_services() -> Result<Vec<ServiceRecord>, CollectError> {
        let units = run_command(
            "systemctl",
            &[
                "list-units",
                "--type=service",
                "--all",
                "--no-legend",
                "--plain",
                "--full",
            ],
        )?;
        let unit_files = run_command(
            "systemctl",
            &["list-unit-files", "--type=service", "--no-legend", "--plain"],
        )
        .unwrap_or_default();

        let mut start_types = std::collections::HashMap::new();
        for line in unit_files.lines() {
            let mut cols = line.split_whitespace();
            if let (Some(unit), Some(state)) = (cols.next(), cols.next()) {
                start_types.insert(unit.to_string(), parse_start_type(state));
            }
        }

        let mut services = Vec::new();
        for line in units.lines() {
            // UNIT LOAD ACTIVE SUB DESCRIPTION...
            let mut cols = line.split_whitespace();
            let (Some(unit), Some(_load), Some(active), Some(_sub)) =
                (cols.next(), cols.next(), cols.next(), cols.next())
            else {
                continue;
            };
            let description = cols.collect::<Vec<_>>().join(" ");
            services.push(ServiceRecord {
                name: unit.to_string(),
                display_name: description,
                status: parse_active_state(active),
                start_type: start_types
                    .get(unit)
                    .copied()
                    .unwrap_or(StartType::Unknown),
                // Filling this would cost one `systemctl show` per unit.
                binary_path: String::new(),
            });
        }
        Ok(services)
    }

    fn list_sessions() -> Result<Vec<SessionRecord>, CollectError> {
        let listing = run_command("loginctl", &["list-sessions", "--no-legend"])?;

        let mut sessions = Vec::new();
        for line in listing.lines() {
            // SESSION UID USER SEAT TTY ...
            let mut cols = line.split_whitespace();
            let Some(id_text) = cols.next() else { continue };
            let Ok(session_id) = id_text.parse::<u32>() else {
                continue;
            };
            let user_name = cols.nth(1).unwrap_or("unknown").to_string();

            let (state, login_time) = query_session(id_text);
            sessions.push(SessionRecord {
                session_id,
                user_name,
                domain: "local".to_string(),
                login_time,
                state,
            });
        }
        Ok(sessions)
    }

    fn control_service(name: &str, action: ServiceAction) -> Result<(), ControlError> {
        // systemctl start/stop already succeed when the unit is in the
        // requested state, which matches the control-action contract.
        let output = Command::new("systemctl").arg(action.verb()).arg(name).output()?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.contains("not found") || stderr.contains("not loaded") {
            return Err(ControlError::ServiceNotFound(name.to_string()));
        }
        Err(ControlError::ServiceControl {
            name: name.to_string(),
            reason: stderr,
        })
    }
}

fn run_command(program: &str, args: &[&str]) -> Result<String, CollectError> {
    let output = Command::new(program).args(args).output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(CollectError::OsQuery(format!("{program} failed: {stderr}")));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn parse_active_state(active: &str) -> ServiceStatus {
    match active {
        "active" => ServiceStatus::Running,
        "inactive" | "failed" => ServiceStatus::Stopped,
        "activating" | "reloading" => ServiceStatus::StartPending,
        "deactivating" => ServiceStatus::StopPending,
        _ => ServiceStatus::Unknown,
    }
}

fn parse_start_type(state: &str) -> StartType {
    match state {
        "enabled" | "enabled-runtime" | "generated" => StartType::Automatic,
        "disabled" | "masked" | "masked-runtime" => StartType::Disabled,
        "static" | "indirect" | "linked" | "linked-runtime" | "alias" => StartType::Manual,
        _ => StartType::Unknown,
    }
}

/// One `loginctl show-session` call covers both the state and the login
/// timestamp; sessions are few, so a call per session is acceptable.
fn query_session(id: &str) -> (SessionState, String) {
    let Ok(output) = run_command("loginctl", &["show-session", id, "-p", "State", "-p", "Timestamp"])
    else {
        return (SessionState::Unknown, "unknown".to_string());
    };

    let mut state = SessionState::Unknown;
    let mut login_time = "unknown".to_string();
    for line in output.lines() {
        if let Some(value) = line.strip_prefix("State=") {
            state = match value.trim() {
                "active" => SessionState::Active,
                "online" => SessionState::Connected,
                "closing" => SessionState::Disconnected,
                _ => SessionState::Unknown,
            };
        } else if let Some(value) = line.strip_prefix("Timestamp=") {
            let value = value.trim();
            if !value.is_empty() {
                login_time = value.to_string();
            }
        }
    }
    (state, login_time)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_state_mapping() {
        assert_eq!(parse_active_state("active"), ServiceStatus::Running);
        assert_eq!(parse_active_state("inactive"), ServiceStatus::Stopped);
        assert_eq!(parse_active_state("activating"), ServiceStatus::StartPending);
        assert_eq!(parse_active_state("weird"), ServiceStatus::Unknown);
    }

    #[test]
    fn start_type_mapping() {
        assert_eq!(parse_start_type("enabled"), StartType::Automatic);
        assert_eq!(parse_start_type("disabled"), StartType::Disabled);
        assert_eq!(parse_start_type("static"), StartType::Manual);
    }

    #[test]
    fn own_process_cpu_times_are_readable() {
        let times = Platform::process_cpu_times_ms(std::process::id());
        assert!(times.is_some());
    }
}
