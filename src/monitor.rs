use std::io;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::{CollectError, ControlError, InitError};
use crate::filter;
use crate::system::collector::{CollectorSet, Domain};
use crate::system::control;
use crate::system::records::{
    ConnectionRecord, ProcessRecord, ServiceRecord, SessionRecord, SystemVitals,
};
use crate::system::scheduler::RefreshScheduler;
use crate::system::store::{RefreshReport, SnapshotStore};

/// The aggregator facade: owns the snapshot store and the refresh
/// scheduler, and exposes the full presentation boundary. One instance is
/// created by the process entry point and shared by reference; every method
/// takes `&self` and is safe from any thread.
pub struct Monitor {
    store: Arc<SnapshotStore>,
    scheduler: RefreshScheduler,
    restart_settle: Duration,
}

impl Monitor {
    /// Build against the real OS collectors. Initialization either fully
    /// succeeds or fails with every partially-initialized collector cleaned
    /// up.
    pub fn initialize(config: &Config) -> Result<Self, InitError> {
        Self::with_collectors(config, CollectorSet::system_default())
    }

    /// Same contract with an injected collector set; this is how the tests
    /// drive the engine with instrumented fakes.
    pub fn with_collectors(
        config: &Config,
        mut collectors: CollectorSet,
    ) -> Result<Self, InitError> {
        collectors.initialize_all()?;
        Ok(Monitor {
            store: Arc::new(SnapshotStore::new(collectors)),
            scheduler: RefreshScheduler::new(Duration::from_secs(
                config.general.refresh_interval_secs,
            )),
            restart_settle: Duration::from_millis(config.control.restart_settle_ms),
        })
    }

    // --- snapshot reads -------------------------------------------------

    pub fn processes(&self) -> Vec<ProcessRecord> {
        self.store.processes()
    }

    pub fn services(&self) -> Vec<ServiceRecord> {
        self.store.services()
    }

    pub fn connections(&self) -> Vec<ConnectionRecord> {
        self.store.connections()
    }

    pub fn sessions(&self) -> Vec<SessionRecord> {
        self.store.sessions()
    }

    pub fn system_vitals(&self) -> Option<SystemVitals> {
        self.store.system_vitals()
    }

    pub fn cpu_usage_percent(&self) -> f64 {
        self.store.cpu_usage_percent()
    }

    pub fn filter_processes(&self, text: &str) -> Vec<ProcessRecord> {
        filter::filter_processes(&self.store.processes(), text)
    }

    pub fn filter_services(&self, text: &str) -> Vec<ServiceRecord> {
        filter::filter_services(&self.store.services(), text)
    }

    // --- refresh --------------------------------------------------------

    /// One best-effort sweep over all domains, serialized against any
    /// concurrent sweep (scheduled or manual).
    pub fn manual_refresh(&self) -> RefreshReport {
        self.store.refresh_all()
    }

    /// Refresh a single domain; failure keeps the previous data.
    pub fn collect_domain(&self, domain: Domain) -> Result<(), CollectError> {
        self.store.collect_domain(domain)
    }

    pub fn start_auto_refresh(&self) -> io::Result<()> {
        self.scheduler.start(Arc::clone(&self.store))
    }

    /// Blocks until the background loop has exited; afterwards no further
    /// scheduled collection occurs.
    pub fn stop_auto_refresh(&self) {
        self.scheduler.stop();
    }

    pub fn set_refresh_interval(&self, interval: Duration) {
        self.scheduler.set_interval(interval);
    }

    pub fn refresh_interval(&self) -> Duration {
        self.scheduler.interval()
    }

    // --- control actions (live OS state, never the store) ---------------

    pub fn terminate_pid(&self, pid: u32) -> bool {
        control::terminate_pid(pid)
    }

    pub fn terminate_by_name(&self, name: &str) -> bool {
        control::terminate_by_name(name)
    }

    pub fn start_service(&self, name: &str) -> Result<(), ControlError> {
        control::start_service(name)
    }

    pub fn stop_service(&self, name: &str) -> Result<(), ControlError> {
        control::stop_service(name)
    }

    pub fn restart_service(&self, name: &str) -> Result<(), ControlError> {
        control::restart_service(name, self.restart_settle)
    }

    // --- lifecycle ------------------------------------------------------

    /// Stop the scheduler and release collector resources. Safe to call
    /// more than once; `Drop` calls it as well.
    pub fn shutdown(&self) {
        self.scheduler.stop();
        self.store.cleanup();
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
