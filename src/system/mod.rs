pub mod collector;
pub mod control;
pub mod cpu;
pub mod network;
pub mod platform;
pub mod process;
pub mod records;
pub mod scheduler;
pub mod service;
pub mod session;
pub mod store;
pub mod vitals;

pub use collector::{Collector, CollectorSet, Domain};
pub use records::{
    ConnectionRecord, CpuTimes, ProcessRecord, Protocol, ServiceRecord, ServiceStatus,
    SessionRecord, SessionState, StartType, SystemVitals,
};
pub use scheduler::RefreshScheduler;
pub use store::{RefreshReport, SnapshotStore};
