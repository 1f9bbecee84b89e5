use std::sync::{Arc, Mutex};

/// Payloads a chunk hands to the host during load. Each fires zero or one
/// time per load; if a misbehaving chunk calls twice, the later payload
/// wins.
#[derive(Debug, Clone, Default)]
pub struct LoadSignals {
    pub roster: Option<String>,
    pub manifest: Option<String>,
}

/// Shared buffer the Lua-side callbacks write into.
#[derive(Debug, Clone, Default)]
pub struct SignalBuffer {
    inner: Arc<Mutex<LoadSignals>>,
}

impl SignalBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_roster(&self, json: String) {
        if let Ok(mut signals) = self.inner.lock() {
            signals.roster = Some(json);
        }
    }

    pub fn push_manifest(&self, json: String) {
        if let Ok(mut signals) = self.inner.lock() {
            signals.manifest = Some(json);
        }
    }

    /// Takes everything received so far, leaving the buffer empty.
    pub fn drain(&self) -> LoadSignals {
        self.inner
            .lock()
            .map(|mut signals| std::mem::take(&mut *signals))
            .unwrap_or_default()
    }
}
