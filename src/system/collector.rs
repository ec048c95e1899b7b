use std::fmt;

use crate::error::CollectError;
use crate::system::records::{
    ConnectionRecord, ProcessRecord, ServiceRecord, SessionRecord, SystemVitals,
};

/// One telemetry domain, in the fixed refresh order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Domain {
    Processes,
    Services,
    Connections,
    Sessions,
    Vitals,
}

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::Processes,
        Domain::Services,
        Domain::Connections,
        Domain::Sessions,
        Domain::Vitals,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Domain::Processes => "processes",
            Domain::Services => "services",
            Domain::Connections => "connections",
            Domain::Sessions => "sessions",
            Domain::Vitals => "vitals",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Uniform lifecycle for the five OS collectors.
///
/// Contract: `initialize` is safe to call more than once; `cleanup` is safe
/// to call repeatedly and even when `initialize` never succeeded; `collect`
/// may lazily self-initialize and must return fully owned records, never
/// references into OS buffers.
pub trait Collector: Send {
    type Output;

    fn initialize(&mut self) -> Result<(), CollectError> {
        Ok(())
    }

    fn cleanup(&mut self) {}

    fn collect(&mut self) -> Result<Self::Output, CollectError>;
}

/// The five collectors behind trait objects so tests can swap in
/// instrumented fakes.
pub struct CollectorSet {
    pub processes: Box<dyn Collector<Output = Vec<ProcessRecord>>>,
    pub services: Box<dyn Collector<Output = Vec<ServiceRecord>>>,
    pub connections: Box<dyn Collector<Output = Vec<ConnectionRecord>>>,
    pub sessions: Box<dyn Collector<Output = Vec<SessionRecord>>>,
    pub vitals: Box<dyn Collector<Output = SystemVitals>>,
}

impl CollectorSet {
    /// The real OS-backed collector set.
    pub fn system_default() -> Self {
        CollectorSet {
            processes: Box::new(super::process::ProcessCollector::new()),
            services: Box::new(super::service::ServiceCollector::new()),
            connections: Box::new(super::network::ConnectionCollector::new()),
            sessions: Box::new(super::session::SessionCollector::new()),
            vitals: Box::new(super::vitals::VitalsCollector::new()),
        }
    }

    /// Initialize in the fixed domain order, aborting on the first failure
    /// after cleaning up the collectors that already succeeded.
    pub fn initialize_all(&mut self) -> Result<(), crate::error::InitError> {
        let mut done: Vec<Domain> = Vec::new();
        for domain in Domain::ALL {
            let result = match domain {
                Domain::Processes => self.processes.initialize(),
                Domain::Services => self.services.initialize(),
                Domain::Connections => self.connections.initialize(),
                Domain::Sessions => self.sessions.initialize(),
                Domain::Vitals => self.vitals.initialize(),
            };
            if let Err(source) = result {
                for &d in done.iter().rev() {
                    self.cleanup_one(d);
                }
                return Err(crate::error::InitError { domain, source });
            }
            done.push(domain);
        }
        Ok(())
    }

    /// Release all collector resources, reverse of the init order.
    pub fn cleanup_all(&mut self) {
        for &domain in Domain::ALL.iter().rev() {
            self.cleanup_one(domain);
        }
    }

    fn cleanup_one(&mut self, domain: Domain) {
        match domain {
            Domain::Processes => self.processes.cleanup(),
            Domain::Services => self.services.cleanup(),
            Domain::Connections => self.connections.cleanup(),
            Domain::Sessions => self.sessions.cleanup(),
            Domain::Vitals => self.vitals.cleanup(),
        }
    }
}
