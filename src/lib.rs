//! Host telemetry aggregator.
//!
//! Five OS collectors (processes, services, network connections, login
//! sessions, system vitals) feed a mutex-guarded snapshot store that is
//! safe to read from any thread while a background scheduler refreshes it.
//! Control actions (terminate a process, start/stop/restart a service) act
//! on live OS state; their effects become visible on the next refresh.

pub mod config;
pub mod error;
pub mod filter;
pub mod format;
pub mod monitor;
pub mod system;

pub use error::{CollectError, ControlError, InitError};
pub use monitor::Monitor;
pub use system::{Domain, RefreshReport, SnapshotStore};
