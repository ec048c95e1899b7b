use crate::error::CollectError;
use crate::system::collector::Collector;
use crate::system::platform;
use crate::system::records::SessionRecord;

/// Login session table via the platform shim (logind on Linux, utmp on
/// macOS, WTS on Windows).
pub struct SessionCollector;

impl SessionCollector {
    pub fn new() -> Self {
        SessionCollector
    }
}

impl Default for SessionCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for SessionCollector {
    type Output = Vec<SessionRecord>;

    fn collect(&mut self) -> Result<Vec<SessionRecord>, CollectError> {
        platform::list_sessions()
    }
}
