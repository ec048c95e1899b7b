use serde::Serialize;

/// One process as seen at collection time. PIDs are reused by the OS, so
/// identity only holds within a single snapshot generation.
#[derive(Clone, Debug, Serialize)]
pub struct ProcessRecord {
    pub pid: u32,
    pub ppid: u32,
    pub name: String,
    pub exe_path: String,
    pub command_line: String,
    /// Unix epoch seconds; 0 when the OS did not report a start time.
    pub started_at: u64,
    pub memory_bytes: u64,
    /// Cumulative kernel-mode CPU time in milliseconds; 0 when the OS
    /// cannot split kernel from user time.
    pub kernel_time_ms: u64,
    pub user_time_ms: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct ServiceRecord {
    /// Unique key within one snapshot.
    pub name: String,
    pub display_name: String,
    pub status: ServiceStatus,
    pub start_type: StartType,
    pub binary_path: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ServiceStatus {
    Stopped,
    StartPending,
    StopPending,
    Running,
    Paused,
    Unknown,
}

impl ServiceStatus {
    /// Stable numeric code (SCM-compatible where one exists). Filtering
    /// matches against the decimal rendering of this code.
    pub fn code(self) -> u32 {
        match self {
            ServiceStatus::Stopped => 1,
            ServiceStatus::StartPending => 2,
            ServiceStatus::StopPending => 3,
            ServiceStatus::Running => 4,
            ServiceStatus::Paused => 7,
            ServiceStatus::Unknown => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ServiceStatus::Stopped => "stopped",
            ServiceStatus::StartPending => "start pending",
            ServiceStatus::StopPending => "stop pending",
            ServiceStatus::Running => "running",
            ServiceStatus::Paused => "paused",
            ServiceStatus::Unknown => "unknown",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum StartType {
    Automatic,
    Manual,
    Disabled,
    Unknown,
}

impl StartType {
    pub fn code(self) -> u32 {
        match self {
            StartType::Automatic => 2,
            StartType::Manual => 3,
            StartType::Disabled => 4,
            StartType::Unknown => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StartType::Automatic => "automatic",
            StartType::Manual => "manual",
            StartType::Disabled => "disabled",
            StartType::Unknown => "unknown",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn label(self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ConnectionRecord {
    pub protocol: Protocol,
    /// "addr:port".
    pub local_addr: String,
    /// "addr:port"; "0.0.0.0:0" when not applicable.
    pub remote_addr: String,
    /// TCP state label; UDP sockets always report "LISTENING".
    pub state: String,
    /// Owning process id; 0 when unknown.
    pub pid: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Active,
    Connected,
    Disconnected,
    Idle,
    Listening,
    Unknown,
}

impl SessionState {
    pub fn label(self) -> &'static str {
        match self {
            SessionState::Active => "active",
            SessionState::Connected => "connected",
            SessionState::Disconnected => "disconnected",
            SessionState::Idle => "idle",
            SessionState::Listening => "listening",
            SessionState::Unknown => "unknown",
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SessionRecord {
    /// Unique key within one snapshot.
    pub session_id: u32,
    pub user_name: String,
    pub domain: String,
    /// Best-effort; "unknown" when the OS did not report it.
    pub login_time: String,
    pub state: SessionState,
}

/// Cumulative CPU tick counters since boot, normalized so that `kernel`
/// excludes idle time. Consumed only by the CPU estimator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CpuTimes {
    pub idle: u64,
    pub kernel: u64,
    pub user: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct SystemVitals {
    pub os_version: String,
    pub host_name: String,
    pub user_name: String,
    /// Human-readable, e.g. "3d 4h 12m".
    pub uptime: String,
    pub total_memory: u64,
    pub available_memory: u64,
    pub cpu_model: String,
    pub cpu_cores: usize,
    pub cpu_times: CpuTimes,
}
