use std::sync::{Mutex, MutexGuard, PoisonError};

use super::NetworkControl;
use crate::error::NetworkError;

/// In-memory backend that records every call.
///
/// Used by tests and embedders that want to observe toggles without a real
/// interface. Can be told to fail the next N calls.
#[derive(Debug, Default)]
pub struct MemoryControl {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    calls: Vec<(String, bool)>,
    fail_next: usize,
}

impl MemoryControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(interface, enabled)` pair requested so far, failed ones included.
    pub fn calls(&self) -> Vec<(String, bool)> {
        self.lock().calls.clone()
    }

    pub fn disable_count(&self) -> usize {
        self.lock().calls.iter().filter(|(_, enabled)| !enabled).count()
    }

    pub fn enable_count(&self) -> usize {
        self.lock().calls.iter().filter(|(_, enabled)| *enabled).count()
    }

    /// Make the next `n` calls return `CommandFailed`.
    pub fn fail_next(&self, n: usize) {
        self.lock().fail_next = n;
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NetworkControl for MemoryControl {
    fn set_interface_admin(&self, interface: &str, enabled: bool) -> Result<(), NetworkError> {
        let mut inner = self.lock();
        inner.calls.push((interface.to_string(), enabled));
        if inner.fail_next > 0 {
            inner.fail_next -= 1;
            return Err(NetworkError::CommandFailed {
                interface: interface.to_string(),
                enabled,
                status: "exit code: 1".into(),
            });
        }
        Ok(())
    }
}
