use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Issues decode tickets and tracks which request is current.
///
/// Lock-free: the current generation is a single atomic, bumped on every
/// `begin`. A ticket whose generation is no longer current belongs to a
/// superseded request; its decode aborts and its partial results are never
/// delivered. Navigating to a new file therefore never waits on the decode
/// it replaces.
#[derive(Debug, Default)]
pub struct DecodeCoordinator {
    current: Arc<AtomicU64>,
}

/// Proof of participation in one decode request.
#[derive(Debug, Clone)]
pub struct DecodeTicket {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl DecodeCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request, invalidating every outstanding ticket.
    #[must_use]
    pub fn begin(&self) -> DecodeTicket {
        let generation = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        DecodeTicket {
            generation,
            current: Arc::clone(&self.current),
        }
    }
}

impl DecodeTicket {
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::Acquire) == self.generation
    }

    #[must_use]
    pub fn is_superseded(&self) -> bool {
        !self.is_current()
    }
}
