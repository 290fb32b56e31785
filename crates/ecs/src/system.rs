use crate::store::ComponentStore;
use std::time::Duration;

/// Events emitted by systems during an update.
#[derive(Debug, Clone, PartialEq)]
pub enum SystemEvent {
    /// A render system finished a frame.
    FrameRendered {
        frame: u64,
        chunk_draws: usize,
        marker_draws: usize,
    },
}

/// Queue of system events, drained by the host once per loop iteration.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<SystemEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: SystemEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[SystemEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<SystemEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// A unit of per-frame logic driven by the host loop.
pub trait System {
    type Error;

    fn update(
        &mut self,
        entities: &mut ComponentStore,
        events: &mut EventQueue,
        delta_time: Duration,
    ) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_drains() {
        let mut queue = EventQueue::new();
        queue.emit(SystemEvent::FrameRendered {
            frame: 1,
            chunk_draws: 3,
            marker_draws: 1,
        });
        assert_eq!(queue.len(), 1);
        let drained = queue.drain();
        assert_eq!(drained.len(), 1);
        assert!(queue.is_empty());
    }
}
