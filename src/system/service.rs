use crate::error::CollectError;
use crate::system::collector::Collector;
use crate::system::platform;
use crate::system::records::ServiceRecord;

/// Service table via the platform shim (systemd units on Linux, launchd
/// jobs on macOS, the SCM on Windows).
pub struct ServiceCollector;

impl ServiceCollector {
    pub fn new() -> Self {
        ServiceCollector
    }
}

impl Default for ServiceCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for ServiceCollector {
    type Output = Vec<ServiceRecord>;

    fn collect(&mut self) -> Result<Vec<ServiceRecord>, CollectError> {
        platform::list_services()
    }
}
