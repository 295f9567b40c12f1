use std::time::{Duration, Instant};

use crate::audio::PlaybackHandle;

use super::event::{EventQueue, PlayerEvent, SliderChange};
use super::sync::SyncTimer;

const COMPLETION_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonIcon {
    Play,
    Pause,
}

impl ButtonIcon {
    pub fn label(self) -> &'static str {
        match self {
            ButtonIcon::Play => "Play",
            ButtonIcon::Pause => "Pause",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiState {
    Stopped,
    Playing,
    Paused,
    /// The user holds the slider. `target_ms` is the drag position and
    /// `resume_playing` says where touch-up returns to.
    Seeking { resume_playing: bool, target_ms: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderState {
    pub progress: u64,
    pub max: u64,
}

/// Wires the play button and progress slider to a playback handle. Widget
/// events go straight to `handle`; ticks and completion are drained by `pump`.
pub struct UiBinding<P: PlaybackHandle> {
    playback: P,
    slider: SliderState,
    icon: ButtonIcon,
    state: UiState,
    timer: SyncTimer,
    events: EventQueue,
    torn_down: bool,
}

impl<P: PlaybackHandle> UiBinding<P> {
    pub fn new(mut playback: P, tick_interval: Duration) -> Self {
        let events = EventQueue::new();
        let completed = events.sender();
        playback.on_completion(Box::new(move || {
            let _ = completed.send(PlayerEvent::Completed);
        }));

        let slider = SliderState {
            progress: 0,
            max: playback.duration_ms(),
        };
        Self {
            playback,
            slider,
            icon: ButtonIcon::Play,
            state: UiState::Stopped,
            timer: SyncTimer::new(tick_interval),
            events,
            torn_down: false,
        }
    }

    pub fn slider(&self) -> SliderState {
        self.slider
    }

    pub fn icon(&self) -> ButtonIcon {
        self.icon
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> UiState {
        self.state
    }

    pub fn is_seeking(&self) -> bool {
        matches!(self.state, UiState::Seeking { .. })
    }

    pub fn playback(&self) -> &P {
        &self.playback
    }

    #[cfg(test)]
    pub(crate) fn playback_mut(&mut self) -> &mut P {
        &mut self.playback
    }

    #[cfg(test)]
    pub(crate) fn timer(&self) -> &SyncTimer {
        &self.timer
    }

    pub fn pump(&mut self, now: Instant) {
        if self.torn_down {
            return;
        }
        self.playback.poll();
        if let Some(token) = self.timer.poll(now) {
            self.events.push(PlayerEvent::Tick(token));
        }
        while let Some(event) = self.events.next() {
            self.handle(event, now);
        }
    }

    pub fn next_wakeup(&self, now: Instant) -> Option<Duration> {
        let tick = self.timer.time_until_due(now);
        if self.playback.is_playing() {
            Some(tick.map_or(COMPLETION_POLL, |t| t.min(COMPLETION_POLL)))
        } else {
            tick
        }
    }

    pub fn handle(&mut self, event: PlayerEvent, now: Instant) {
        if self.torn_down {
            tracing::error!(?event, "event delivered after teardown");
            return;
        }
        match event {
            PlayerEvent::PlayPauseTapped => self.toggle(now),
            PlayerEvent::SliderTouchDown => self.touch_down(),
            PlayerEvent::SliderChanged(change) => self.slider_changed(change, now),
            PlayerEvent::SliderTouchUp => self.touch_up(now),
            PlayerEvent::Tick(token) => {
                if !self.timer.fire(token, now) {
                    tracing::trace!("dropped stale sync tick");
                    return;
                }
                let position = self.playback.current_position_ms();
                self.slider_changed(SliderChange::SyncUpdate(position), now);
            }
            PlayerEvent::Completed => self.completed(),
        }
    }

    fn toggle(&mut self, now: Instant) {
        match self.state {
            UiState::Stopped | UiState::Paused => {
                self.playback.start();
                self.icon = ButtonIcon::Pause;
                self.state = UiState::Playing;
                self.timer.schedule(now);
                tracing::info!(position_ms = self.playback.current_position_ms(), "play");
            }
            UiState::Playing => {
                self.playback.pause();
                self.icon = ButtonIcon::Play;
                self.state = UiState::Paused;
                self.timer.cancel();
                tracing::info!(position_ms = self.playback.current_position_ms(), "pause");
            }
            UiState::Seeking {
                resume_playing,
                target_ms,
            } => {
                // Timer stays off until touch-up.
                if resume_playing {
                    self.playback.pause();
                    self.icon = ButtonIcon::Play;
                } else {
                    self.playback.start();
                    self.icon = ButtonIcon::Pause;
                }
                self.state = UiState::Seeking {
                    resume_playing: !resume_playing,
                    target_ms,
                };
            }
        }
    }

    fn touch_down(&mut self) {
        if self.is_seeking() {
            return;
        }
        self.timer.cancel();
        self.state = UiState::Seeking {
            resume_playing: self.state == UiState::Playing,
            target_ms: self.slider.progress,
        };
    }

    fn slider_changed(&mut self, change: SliderChange, now: Instant) {
        match (change, self.state) {
            (SliderChange::UserDrag(value), UiState::Seeking { resume_playing, .. }) => {
                let target_ms = value.min(self.slider.max);
                self.slider.progress = target_ms;
                self.state = UiState::Seeking {
                    resume_playing,
                    target_ms,
                };
            }
            (SliderChange::UserDrag(value), _) => {
                // A tap or key press without a held drag.
                self.touch_down();
                self.slider_changed(SliderChange::UserDrag(value), now);
                self.touch_up(now);
            }
            (SliderChange::SyncUpdate(_), UiState::Seeking { .. }) => {}
            (SliderChange::SyncUpdate(value), _) => {
                self.slider.progress = value.min(self.slider.max);
            }
        }
    }

    fn touch_up(&mut self, now: Instant) {
        let UiState::Seeking {
            resume_playing,
            target_ms,
        } = self.state
        else {
            return;
        };
        self.playback.seek(target_ms);
        self.slider.progress = target_ms;
        tracing::info!(target_ms, "seek");
        if resume_playing {
            self.state = UiState::Playing;
            self.timer.schedule(now);
        } else {
            self.state = UiState::Paused;
        }
    }

    fn completed(&mut self) {
        match self.state {
            UiState::Playing => {
                self.icon = ButtonIcon::Play;
                self.slider.progress = 0;
                self.timer.cancel();
                self.state = UiState::Stopped;
                tracing::info!("playback complete");
            }
            UiState::Seeking { target_ms, .. } => {
                // The drag owns the slider; only forget that we were playing.
                self.icon = ButtonIcon::Play;
                self.state = UiState::Seeking {
                    resume_playing: false,
                    target_ms,
                };
            }
            UiState::Stopped | UiState::Paused => {
                tracing::debug!(state = ?self.state, "ignoring completion");
            }
        }
    }

    // Timer before decoder. Runs once, also from `Drop`.
    pub fn destroy(&mut self) {
        if self.torn_down {
            return;
        }
        self.timer.cancel();
        debug_assert!(!self.timer.is_scheduled());
        self.playback.release();
        self.torn_down = true;
        tracing::info!("player screen destroyed");
    }
}

impl<P: PlaybackHandle> Drop for UiBinding<P> {
    fn drop(&mut self) {
        self.destroy();
    }
}
