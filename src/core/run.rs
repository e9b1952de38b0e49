use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Hands out monotonically increasing run ids. Issuing a new token
/// supersedes every token issued before it.
#[derive(Debug, Clone, Default)]
pub struct RunSequencer {
    latest: Arc<AtomicU64>,
}

impl RunSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> RunToken {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("Run #{} started", id);
        RunToken {
            id,
            latest: Arc::clone(&self.latest),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunToken {
    id: u64,
    latest: Arc<AtomicU64>,
}

impl RunToken {
    /// A token no sequencer can supersede; used for standalone runs.
    pub fn detached() -> Self {
        Self {
            id: 1,
            latest: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_superseded(&self) -> bool {
        self.latest.load(Ordering::SeqCst) != self.id
    }
}
