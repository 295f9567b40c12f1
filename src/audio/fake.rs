use std::cell::Cell;
use std::rc::Rc;

use super::{CompletionCallback, PlaybackHandle};

/// Scripted playback whose clock only moves when a test calls [`advance`].
///
/// [`advance`]: FakePlayback::advance
pub struct FakePlayback {
    duration_ms: u64,
    position_ms: u64,
    playing: bool,
    finished: bool,
    on_completion: Option<CompletionCallback>,
    pub starts: u32,
    pub pauses: u32,
    pub seeks: Vec<u64>,
    releases: Rc<Cell<u32>>,
}

impl FakePlayback {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            position_ms: 0,
            playing: false,
            finished: false,
            on_completion: None,
            starts: 0,
            pauses: 0,
            seeks: Vec::new(),
            releases: Rc::new(Cell::new(0)),
        }
    }

    /// Shared counter that outlives the fake, for teardown assertions.
    pub fn release_counter(&self) -> Rc<Cell<u32>> {
        self.releases.clone()
    }

    pub fn advance(&mut self, ms: u64) {
        if !self.playing {
            return;
        }
        self.position_ms = (self.position_ms + ms).min(self.duration_ms);
        if self.position_ms == self.duration_ms {
            self.playing = false;
            self.finished = true;
        }
    }
}

impl PlaybackHandle for FakePlayback {
    fn start(&mut self) {
        if !self.playing {
            self.starts += 1;
            self.playing = true;
        }
    }

    fn pause(&mut self) {
        if self.playing {
            self.pauses += 1;
            self.playing = false;
        }
    }

    fn seek(&mut self, ms: u64) {
        self.seeks.push(ms);
        self.position_ms = ms.min(self.duration_ms);
    }

    fn current_position_ms(&self) -> u64 {
        self.position_ms
    }

    fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn on_completion(&mut self, callback: CompletionCallback) {
        self.on_completion = Some(callback);
    }

    fn poll(&mut self) {
        if !self.finished {
            return;
        }
        self.finished = false;
        self.position_ms = 0;
        if let Some(callback) = &mut self.on_completion {
            callback();
        }
    }

    fn release(&mut self) {
        self.releases.set(self.releases.get() + 1);
        self.playing = false;
    }
}
