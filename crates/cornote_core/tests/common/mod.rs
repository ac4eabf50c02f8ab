//! Shared harness for integration tests: one session over memory hosts.

use cornote_core::host::memory::{
    FixedClock, MemoryDocumentStore, MemoryStateStore, MemoryViewHost,
};
use cornote_core::CornoteSession;
use std::sync::Arc;

pub struct Harness {
    pub docs: Arc<MemoryDocumentStore>,
    pub views: Arc<MemoryViewHost>,
    pub state: Arc<MemoryStateStore>,
    pub clock: Arc<FixedClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            docs: Arc::new(MemoryDocumentStore::new()),
            views: Arc::new(MemoryViewHost::new()),
            state: Arc::new(MemoryStateStore::new()),
            clock: Arc::new(FixedClock::at(100_000)),
        }
    }

    /// Builds a session sharing this harness's hosts; call again to
    /// simulate a process restart over the same persisted state.
    pub fn session(&self) -> CornoteSession {
        CornoteSession::new(
            self.docs.clone(),
            self.views.clone(),
            self.state.clone(),
            self.clock.clone(),
        )
    }
}
