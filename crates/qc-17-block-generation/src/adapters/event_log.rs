//! Event log adapter
//!
//! Implements the BlockAppliedObserver port by recording every event.

use crate::events::BlockAppliedEvent;
use crate::ports::BlockAppliedObserver;
use async_trait::async_trait;
use parking_lot::RwLock;

/// In-memory block-applied event log
pub struct InMemoryEventLog {
    events: RwLock<Vec<BlockAppliedEvent>>,
}

impl InMemoryEventLog {
    /// Empty log
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
        }
    }

    /// Recorded events, oldest first
    pub fn get_events(&self) -> Vec<BlockAppliedEvent> {
        self.events.read().clone()
    }

    /// Number of recorded events
    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }
}

impl Default for InMemoryEventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlockAppliedObserver for InMemoryEventLog {
    async fn on_block_applied(&self, event: BlockAppliedEvent) -> Result<(), String> {
        self.events.write().push(event);
        Ok(())
    }
}
