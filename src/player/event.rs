use std::sync::mpsc::{Receiver, Sender, channel};

use super::sync::TickToken;

/// Where a slider value came from. Only [`SliderChange::UserDrag`] can ever
/// end in a seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderChange {
    UserDrag(u64),
    SyncUpdate(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    PlayPauseTapped,
    SliderTouchDown,
    SliderChanged(SliderChange),
    SliderTouchUp,
    Tick(TickToken),
    Completed,
}

/// The screen's single event queue. Host callbacks get a cloned sender.
pub struct EventQueue {
    tx: Sender<PlayerEvent>,
    rx: Receiver<PlayerEvent>,
}

impl Default for EventQueue {
    fn default() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sender(&self) -> Sender<PlayerEvent> {
        self.tx.clone()
    }

    pub fn push(&self, event: PlayerEvent) {
        // The receiver lives as long as `self`, so this cannot fail.
        let _ = self.tx.send(event);
    }

    pub fn next(&self) -> Option<PlayerEvent> {
        self.rx.try_recv().ok()
    }
}
