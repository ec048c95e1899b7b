use std::process::Command;

use super::{PlatformExtensions, ServiceAction};
use crate::error::{CollectError, ControlError};
use crate::system::records::{
    CpuTimes, ServiceRecord, ServiceStatus, SessionRecord, SessionState, StartType,
};

use windows_sys::Win32::Foundation::{CloseHandle, FILETIME};
use windows_sys::Win32::System::RemoteDesktop::{
    WTS_SESSION_INFOW, WTSDomainName, WTSEnumerateSessionsW, WTSFreeMemory,
    WTSQuerySessionInformationW, WTSUserName,
};
use windows_sys::Win32::System::Threading::{
    GetProcessTimes, GetSystemTimes, OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION,
};

pub struct Platform;

fn filetime_u64(ft: &FILETIME) -> u64 {
    ((ft.dwHighDateTime as u64) << 32) | ft.dwLowDateTime as u64
}

impl PlatformExtensions for Platform {
    fn cpu_times() -> Option<CpuTimes> {
        unsafe {
            let mut idle = std::mem::zeroed::<FILETIME>();
            let mut kernel = std::mem::zeroed::<FILETIME>();
            let mut user = std::mem::zeroed::<FILETIME>();
            if GetSystemTimes(&mut idle, &mut kernel, &mut user) == 0 {
                return None;
            }
            let idle = filetime_u64(&idle);
            // GetSystemTimes reports kernel time inclusive of idle; the
            // estimator expects them disjoint.
            Some(CpuTimes {
                idle,
                kernel: filetime_u64(&kernel).saturating_sub(idle),
                user: filetime_u64(&user),
            })
        }
    }

    fn process_cpu_times_ms(pid: u32) -> Option<(u64, u64)> {
        unsafe {
            let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid);
            if handle.is_null() {
                return None;
            }
            let mut creation = std::mem::zeroed::<FILETIME>();
            let mut exit = std::mem::zeroed::<FILETIME>();
            let mut kernel = std::mem::zeroed::<FILETIME>();
            let mut user = std::mem::zeroed::<FILETIME>();
            let ok = GetProcessTimes(handle, &mut creation, &mut exit, &mut kernel, &mut user);
            CloseHandle(handle);
            if ok == 0 {
                return None;
            }
            // FILETIME units are 100 ns.
            Some((
                filetime_u64(&kernel) / 10_000,
                filetime_u64(&user) / 10_000,
            ))
        }
    }

    fn list_services() -> Result<Vec<ServiceRecord>, CollectError> {
        let output = Command::new("sc")
            .args(["query", "type=", "service", "state=", "all"])
            .output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(CollectError::OsQuery(format!("sc query failed: {stderr}")));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut services = Vec::new();
        let mut current: Option<ServiceRecord> = None;
        for line in stdout.lines() {
            let line = line.trim();
            if let Some(name) = line.strip_prefix("SERVICE_NAME:") {
                if let Some(record) = current.take() {
                    services.push(record);
                }
                current = Some(ServiceRecord {
                    name: name.trim().to_string(),
                    display_name: String::new(),
                    status: ServiceStatus::Unknown,
                    // Per-service `sc qc` queries are too costly here.
                    start_type: StartType::Unknown,
                    binary_path: String::new(),
                });
            } else if let Some(display) = line.strip_prefix("DISPLAY_NAME:") {
                if let Some(record) = current.as_mut() {
                    record.display_name = display.trim().to_string();
                }
            } else if let Some(state) = line.strip_prefix("STATE") {
                if let Some(record) = current.as_mut() {
                    let code = state
                        .trim_start_matches([':', ' '])
                        .split_whitespace()
                        .next()
                        .and_then(|c| c.parse::<u32>().ok())
                        .unwrap_or(0);
                    record.status = match code {
                        1 => ServiceStatus::Stopped,
                        2 => ServiceStatus::StartPending,
                        3 => ServiceStatus::StopPending,
                        4 => ServiceStatus::Running,
                        7 => ServiceStatus::Paused,
                        _ => ServiceStatus::Unknown,
                    };
                }
            }
        }
        if let Some(record) = current.take() {
            services.push(record);
        }
        Ok(services)
    }

    fn list_sessions() -> Result<Vec<SessionRecord>, CollectError> {
        unsafe {
            let mut info: *mut WTS_SESSION_INFOW = std::ptr::null_mut();
            let mut count: u32 = 0;
            // Null server handle targets the local machine.
            if WTSEnumerateSessionsW(std::ptr::null_mut(), 0, 1, &mut info, &mut count) == 0 {
                return Err(CollectError::OsQuery(
                    "WTSEnumerateSessionsW failed".to_string(),
                ));
            }

            let mut sessions = Vec::with_capacity(count as usize);
            for i in 0..count as isize {
                let entry = &*info.offset(i);
                sessions.push(SessionRecord {
                    session_id: entry.SessionId,
                    user_name: query_session_string(entry.SessionId, WTSUserName),
                    domain: query_session_string(entry.SessionId, WTSDomainName),
                    login_time: "unknown".to_string(),
                    state: match entry.State {
                        0 => SessionState::Active,
                        1 | 2 => SessionState::Connected,
                        4 => SessionState::Disconnected,
                        5 => SessionState::Idle,
                        6 => SessionState::Listening,
                        _ => SessionState::Unknown,
                    },
                });
            }
            WTSFreeMemory(info as *mut _);
            Ok(sessions)
        }
    }

    fn control_service(name: &str, action: ServiceAction) -> Result<(), ControlError> {
        let output = Command::new("sc").arg(action.verb()).arg(name).output()?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        if output.status.success()
            // Already in the requested state counts as success.
            || stdout.contains("1056")
            || stdout.contains("1062")
        {
            return Ok(());
        }
        if stdout.contains("1060") {
            return Err(ControlError::ServiceNotFound(name.to_string()));
        }
        Err(ControlError::ServiceControl {
            name: name.to_string(),
            reason: stdout.trim().to_string(),
        })
    }
}

unsafe fn query_session_string(session_id: u32, class: i32) -> String {
    unsafe {
        let mut buffer: *mut u16 = std::ptr::null_mut();
        let mut bytes: u32 = 0;
        let ok = WTSQuerySessionInformationW(
            std::ptr::null_mut(),
            session_id,
            class,
            &mut buffer as *mut _ as *mut _,
            &mut bytes,
        );
        if ok == 0 || buffer.is_null() {
            return String::new();
        }
        let len = (bytes as usize / 2).saturating_sub(1);
        let slice = std::slice::from_raw_parts(buffer, len);
        let value = String::from_utf16_lossy(slice);
        WTSFreeMemory(buffer as *mut _);
        value
    }
}
