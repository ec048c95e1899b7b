use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::CollectError;
use crate::system::collector::{CollectorSet, Domain};
use crate::system::cpu::CpuEstimator;
use crate::system::records::{
    ConnectionRecord, ProcessRecord, ServiceRecord, SessionRecord, SystemVitals,
};

/// Outcome of one best-effort refresh sweep. One flag per domain; a failed
/// domain kept its previous (stale-but-valid) data.
#[derive(Clone, Copy, Debug, Default)]
pub struct RefreshReport {
    pub processes: bool,
    pub services: bool,
    pub connections: bool,
    pub sessions: bool,
    pub vitals: bool,
}

impl RefreshReport {
    pub fn all_ok(&self) -> bool {
        self.processes && self.services && self.connections && self.sessions && self.vitals
    }

    pub fn ok(&self, domain: Domain) -> bool {
        match domain {
            Domain::Processes => self.processes,
            Domain::Services => self.services,
            Domain::Connections => self.connections,
            Domain::Sessions => self.sessions,
            Domain::Vitals => self.vitals,
        }
    }

    fn set(&mut self, domain: Domain, ok: bool) {
        match domain {
            Domain::Processes => self.processes = ok,
            Domain::Services => self.services = ok,
            Domain::Connections => self.connections = ok,
            Domain::Sessions => self.sessions = ok,
            Domain::Vitals => self.vitals = ok,
        }
    }
}

struct StoreInner {
    collectors: CollectorSet,
    processes: Vec<ProcessRecord>,
    services: Vec<ServiceRecord>,
    connections: Vec<ConnectionRecord>,
    sessions: Vec<SessionRecord>,
    vitals: Option<SystemVitals>,
    estimator: CpuEstimator,
    cpu_usage_percent: f64,
}

/// The concurrency core: latest collections, estimator state, and the
/// collectors themselves behind one exclusive lock. Every reader path takes
/// the same lock as every collect-and-swap, so a torn collection can never
/// be observed. A second mutex, the refresh gate, serializes whole sweeps
/// so a manual refresh cannot interleave with a scheduled one.
pub struct SnapshotStore {
    inner: Mutex<StoreInner>,
    refresh_gate: Mutex<()>,
}

impl SnapshotStore {
    pub fn new(collectors: CollectorSet) -> Self {
        SnapshotStore {
            inner: Mutex::new(StoreInner {
                collectors,
                processes: Vec::new(),
                services: Vec::new(),
                connections: Vec::new(),
                sessions: Vec::new(),
                vitals: None,
                estimator: CpuEstimator::new(),
                cpu_usage_percent: 0.0,
            }),
            refresh_gate: Mutex::new(()),
        }
    }

    // A collector panic can only happen before the slot swap, so a poisoned
    // lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Invoke one domain's collector and, on success, swap in its result.
    /// On failure the slot is left untouched and the error is surfaced;
    /// there is no retry here.
    pub fn collect_domain(&self, domain: Domain) -> Result<(), CollectError> {
        #[cfg(feature = "refresh-tracing")]
        let _span =
            tracing::debug_span!("store.collect_domain", domain = domain.name()).entered();

        let mut inner = self.lock();
        match domain {
            Domain::Processes => {
                let records = inner.collectors.processes.collect()?;
                inner.processes = records;
            }
            Domain::Services => {
                let records = inner.collectors.services.collect()?;
                inner.services = records;
            }
            Domain::Connections => {
                let records = inner.collectors.connections.collect()?;
                inner.connections = records;
            }
            Domain::Sessions => {
                let records = inner.collectors.sessions.collect()?;
                inner.sessions = records;
            }
            Domain::Vitals => {
                let vitals = inner.collectors.vitals.collect()?;
                // Estimator steps exactly once per successful vitals
                // collection, atomically with the slot swap.
                inner.cpu_usage_percent = inner.estimator.sample(vitals.cpu_times);
                inner.vitals = Some(vitals);
            }
        }
        Ok(())
    }

    /// One best-effort sweep over all domains in the fixed order. Sweeps
    /// are single-flight: a concurrent caller blocks on the gate until the
    /// in-flight sweep completes, then runs its own.
    pub fn refresh_all(&self) -> RefreshReport {
        #[cfg(feature = "refresh-tracing")]
        let _span = tracing::debug_span!("store.refresh_all").entered();

        let _gate = self
            .refresh_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut report = RefreshReport::default();
        for domain in Domain::ALL {
            report.set(domain, self.collect_domain(domain).is_ok());
        }
        report
    }

    pub fn processes(&self) -> Vec<ProcessRecord> {
        self.lock().processes.clone()
    }

    pub fn services(&self) -> Vec<ServiceRecord> {
        self.lock().services.clone()
    }

    pub fn connections(&self) -> Vec<ConnectionRecord> {
        self.lock().connections.clone()
    }

    pub fn sessions(&self) -> Vec<SessionRecord> {
        self.lock().sessions.clone()
    }

    /// `None` until the first successful vitals collection.
    pub fn system_vitals(&self) -> Option<SystemVitals> {
        self.lock().vitals.clone()
    }

    /// Percentage computed at the last successful vitals collection; 0.0
    /// before the second sample exists.
    pub fn cpu_usage_percent(&self) -> f64 {
        self.lock().cpu_usage_percent
    }

    pub fn initialize(&self) -> Result<(), crate::error::InitError> {
        self.lock().collectors.initialize_all()
    }

    pub fn cleanup(&self) {
        self.lock().collectors.cleanup_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::collector::Collector;
    use crate::system::records::CpuTimes;

    struct FixedProcesses(Vec<ProcessRecord>);

    impl Collector for FixedProcesses {
        type Output = Vec<ProcessRecord>;
        fn collect(&mut self) -> Result<Vec<ProcessRecord>, CollectError> {
            Ok(self.0.clone())
        }
    }

    struct FailingProcesses;

    impl Collector for FailingProcesses {
        type Output = Vec<ProcessRecord>;
        fn collect(&mut self) -> Result<Vec<ProcessRecord>, CollectError> {
            Err(CollectError::OsQuery("simulated".into()))
        }
    }

    /// Succeeds on the first call, fails afterwards.
    struct FlakyProcesses {
        calls: usize,
    }

    impl Collector for FlakyProcesses {
        type Output = Vec<ProcessRecord>;
        fn collect(&mut self) -> Result<Vec<ProcessRecord>, CollectError> {
            self.calls += 1;
            if self.calls == 1 {
                Ok(vec![record(7)])
            } else {
                Err(CollectError::OsQuery("simulated".into()))
            }
        }
    }

    struct EmptyList<T>(std::marker::PhantomData<T>);

    impl<T: Send> Collector for EmptyList<T> {
        type Output = Vec<T>;
        fn collect(&mut self) -> Result<Vec<T>, CollectError> {
            Ok(Vec::new())
        }
    }

    struct FixedVitals(CpuTimes);

    impl Collector for FixedVitals {
        type Output = SystemVitals;
        fn collect(&mut self) -> Result<SystemVitals, CollectError> {
            Ok(SystemVitals {
                os_version: "test".into(),
                host_name: "host".into(),
                user_name: "user".into(),
                uptime: "0m".into(),
                total_memory: 0,
                available_memory: 0,
                cpu_model: "cpu".into(),
                cpu_cores: 1,
                cpu_times: self.0,
            })
        }
    }

    fn record(pid: u32) -> ProcessRecord {
        ProcessRecord {
            pid,
            ppid: 0,
            name: format!("proc-{pid}"),
            exe_path: String::new(),
            command_line: String::new(),
            started_at: 0,
            memory_bytes: 0,
            kernel_time_ms: 0,
            user_time_ms: 0,
        }
    }

    fn store_with(
        processes: Box<dyn Collector<Output = Vec<ProcessRecord>>>,
    ) -> SnapshotStore {
        SnapshotStore::new(CollectorSet {
            processes,
            services: Box::new(EmptyList(std::marker::PhantomData)),
            connections: Box::new(EmptyList(std::marker::PhantomData)),
            sessions: Box::new(EmptyList(std::marker::PhantomData)),
            vitals: Box::new(FixedVitals(CpuTimes::default())),
        })
    }

    #[test]
    fn successful_collect_replaces_slot() {
        let store = store_with(Box::new(FixedProcesses(vec![record(1), record(2)])));
        assert!(store.processes().is_empty());
        store.collect_domain(Domain::Processes).unwrap();
        assert_eq!(store.processes().len(), 2);
    }

    #[test]
    fn failed_collect_keeps_previous_value() {
        let store = store_with(Box::new(FlakyProcesses { calls: 0 }));
        store.collect_domain(Domain::Processes).unwrap();
        assert_eq!(store.processes()[0].pid, 7);

        assert!(store.collect_domain(Domain::Processes).is_err());
        // Stale-but-valid: the slot still holds the last good collection.
        assert_eq!(store.processes()[0].pid, 7);
    }

    #[test]
    fn never_collected_is_empty() {
        let store = store_with(Box::new(FailingProcesses));
        assert!(store.collect_domain(Domain::Processes).is_err());
        assert!(store.processes().is_empty());
        assert!(store.system_vitals().is_none());
    }

    #[test]
    fn refresh_all_reports_per_domain_outcomes() {
        let store = store_with(Box::new(FailingProcesses));
        let report = store.refresh_all();
        assert!(!report.processes);
        assert!(report.services && report.connections && report.sessions && report.vitals);
        assert!(!report.all_ok());
        assert!(!report.ok(Domain::Processes));
        assert!(report.ok(Domain::Vitals));
    }

    #[test]
    fn vitals_collection_steps_estimator_once() {
        let store = store_with(Box::new(FixedProcesses(Vec::new())));
        store.collect_domain(Domain::Vitals).unwrap();
        // Bootstrap sample: 0.0, and repeated reads do not re-run the
        // transform.
        assert_eq!(store.cpu_usage_percent(), 0.0);
        assert_eq!(store.cpu_usage_percent(), 0.0);
        assert!(store.system_vitals().is_some());
    }
}
