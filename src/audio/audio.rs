use std::io::Cursor;

use kira::{
    AudioManager, AudioManagerSettings, DefaultBackend, Tween,
    sound::PlaybackState,
    sound::static_sound::{StaticSoundData, StaticSoundHandle},
};

use crate::error::ResourceLoadError;

pub type CompletionCallback = Box<dyn FnMut() + Send>;

/// One loaded, playable audio asset as seen by the player screen.
///
/// Positions are milliseconds and always stay inside `0..=duration_ms()`.
pub trait PlaybackHandle {
    /// Begins or resumes playback. No-op while already playing.
    fn start(&mut self);

    /// Halts playback and keeps the position. No-op while not playing.
    fn pause(&mut self);

    /// Moves the cursor, clamping `ms` into the track.
    fn seek(&mut self, ms: u64);

    fn current_position_ms(&self) -> u64;

    fn duration_ms(&self) -> u64;

    fn is_playing(&self) -> bool;

    /// Registers the end-of-track callback. It fires once per playthrough,
    /// after which the handle is paused and rewound to zero.
    fn on_completion(&mut self, callback: CompletionCallback);

    /// Gives the host a chance to report state changes. Completion is
    /// delivered from here.
    fn poll(&mut self);

    /// Frees the decoder. Safe to call more than once.
    fn release(&mut self);
}

/// Position and completion bookkeeping shared by every kira sound handle.
///
/// kira drops a sound once it has played through, so a finished or never
/// started track has no live handle and its position lives in `resume_at_ms`.
pub(crate) struct TrackCursor {
    duration_ms: u64,
    resume_at_ms: u64,
    on_completion: Option<CompletionCallback>,
    released: bool,
}

impl TrackCursor {
    pub(crate) fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            resume_at_ms: 0,
            on_completion: None,
            released: false,
        }
    }

    fn clamp(&self, ms: u64) -> u64 {
        ms.min(self.duration_ms)
    }

    /// Remembers where the next fresh play begins.
    pub(crate) fn park(&mut self, ms: u64) -> u64 {
        self.resume_at_ms = self.clamp(ms);
        self.resume_at_ms
    }

    pub(crate) fn start_secs(&self) -> f64 {
        self.resume_at_ms as f64 / 1000.0
    }

    /// `live_secs` is the sound handle's position, if one is playing.
    pub(crate) fn position_ms(&self, live_secs: Option<f64>) -> u64 {
        let ms = live_secs
            .map(|secs| (secs.max(0.0) * 1000.0) as u64)
            .unwrap_or(self.resume_at_ms);
        self.clamp(ms)
    }

    pub(crate) fn set_callback(&mut self, callback: CompletionCallback) {
        if self.on_completion.is_some() {
            tracing::warn!("completion callback replaced");
        }
        self.on_completion = Some(callback);
    }

    /// The live sound played through: rewind and notify.
    pub(crate) fn finish(&mut self) {
        self.resume_at_ms = 0;
        if let Some(callback) = &mut self.on_completion {
            callback();
        }
    }

    /// Returns `true` only the first time.
    pub(crate) fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;
        self.on_completion = None;
        true
    }
}

pub struct KiraPlayback {
    manager: Option<AudioManager<DefaultBackend>>,
    sound_data: StaticSoundData,
    current_handle: Option<StaticSoundHandle>,
    cursor: TrackCursor,
    volume_db: f32,
}

impl KiraPlayback {
    pub fn load(bytes: &'static [u8], volume_linear: f32) -> Result<Self, ResourceLoadError> {
        let sound_data = StaticSoundData::from_cursor(Cursor::new(bytes))
            .map_err(|e| ResourceLoadError::Decode(e.to_string()))?;
        let duration_ms = (sound_data.duration().as_secs_f64() * 1000.0) as u64;
        if duration_ms == 0 {
            return Err(ResourceLoadError::Decode("track has no audio frames".into()));
        }

        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|e| ResourceLoadError::Backend(e.to_string()))?;

        tracing::info!(duration_ms, "loaded bundled track");
        Ok(Self {
            manager: Some(manager),
            sound_data,
            current_handle: None,
            cursor: TrackCursor::new(duration_ms),
            volume_db: linear_to_db(volume_linear),
        })
    }
}

fn linear_to_db(volume_linear: f32) -> f32 {
    if volume_linear > 0.0 {
        20.0 * volume_linear.log10()
    } else {
        -80.0
    }
}

impl PlaybackHandle for KiraPlayback {
    fn start(&mut self) {
        if self.is_playing() {
            return;
        }
        if let Some(handle) = &mut self.current_handle {
            let _ = handle.resume(Tween::default());
            return;
        }
        let Some(manager) = self.manager.as_mut() else {
            tracing::warn!("start requested after release");
            return;
        };
        let sound = self.sound_data.start_position(self.cursor.start_secs());
        match manager.play(sound) {
            Ok(mut handle) => {
                let _ = handle.set_volume(self.volume_db, Tween::default());
                self.current_handle = Some(handle);
            }
            Err(err) => tracing::error!(?err, "audio backend refused to play"),
        }
    }

    fn pause(&mut self) {
        if !self.is_playing() {
            return;
        }
        if let Some(handle) = &mut self.current_handle {
            let _ = handle.pause(Tween::default());
        }
    }

    fn seek(&mut self, ms: u64) {
        let ms = self.cursor.park(ms);
        if let Some(handle) = &mut self.current_handle {
            let _ = handle.seek_to(ms as f64 / 1000.0);
        }
    }

    fn current_position_ms(&self) -> u64 {
        self.cursor
            .position_ms(self.current_handle.as_ref().map(|h| h.position()))
    }

    fn duration_ms(&self) -> u64 {
        self.cursor.duration_ms
    }

    fn is_playing(&self) -> bool {
        self.current_handle
            .as_ref()
            .map(|h| matches!(h.state(), PlaybackState::Playing | PlaybackState::Resuming))
            .unwrap_or(false)
    }

    fn on_completion(&mut self, callback: CompletionCallback) {
        self.cursor.set_callback(callback);
    }

    fn poll(&mut self) {
        let finished = self
            .current_handle
            .as_ref()
            .map(|h| matches!(h.state(), PlaybackState::Stopped))
            .unwrap_or(false);
        if !finished {
            return;
        }
        self.current_handle = None;
        tracing::debug!("track played through");
        self.cursor.finish();
    }

    fn release(&mut self) {
        if !self.cursor.release() {
            return;
        }
        if let Some(handle) = &mut self.current_handle {
            let _ = handle.stop(Tween::default());
        }
        self.current_handle = None;
        self.manager = None;
        tracing::info!("audio resources released");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn counting_callback() -> (Arc<AtomicU32>, CompletionCallback) {
        let fired = Arc::new(AtomicU32::new(0));
        let counter = fired.clone();
        let callback: CompletionCallback = Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (fired, callback)
    }

    #[test]
    fn volume_maps_to_decibels() {
        assert_eq!(linear_to_db(1.0), 0.0);
        assert!((linear_to_db(0.5) + 6.0206).abs() < 1e-3);
        assert_eq!(linear_to_db(0.0), -80.0);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        static NOT_AUDIO: &[u8] = b"definitely not a wave file";
        let err = KiraPlayback::load(NOT_AUDIO, 1.0).err().unwrap();
        assert!(matches!(err, ResourceLoadError::Decode(_)));
    }

    #[test]
    fn parked_seek_is_clamped_and_becomes_start_position() {
        let mut cursor = TrackCursor::new(180_000);
        assert_eq!(cursor.position_ms(None), 0);
        assert_eq!(cursor.start_secs(), 0.0);

        assert_eq!(cursor.park(90_000), 90_000);
        assert_eq!(cursor.position_ms(None), 90_000);
        assert_eq!(cursor.start_secs(), 90.0);

        assert_eq!(cursor.park(999_999), 180_000);
        assert_eq!(cursor.position_ms(None), 180_000);
    }

    #[test]
    fn live_position_wins_and_stays_inside_track() {
        let mut cursor = TrackCursor::new(10_000);
        cursor.park(4_000);
        assert_eq!(cursor.position_ms(Some(2.5)), 2_500);
        assert_eq!(cursor.position_ms(Some(12.0)), 10_000);
        assert_eq!(cursor.position_ms(Some(-0.1)), 0);
    }

    #[test]
    fn finish_rewinds_and_notifies_each_playthrough() {
        let (fired, callback) = counting_callback();
        let mut cursor = TrackCursor::new(10_000);
        cursor.set_callback(callback);
        cursor.park(7_000);

        cursor.finish();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(cursor.position_ms(None), 0);
        assert_eq!(cursor.start_secs(), 0.0);

        cursor.finish();
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn release_is_idempotent_and_drops_callback() {
        let (fired, callback) = counting_callback();
        let mut cursor = TrackCursor::new(10_000);
        cursor.set_callback(callback);

        assert!(cursor.release());
        assert!(!cursor.release());
        assert_eq!(Arc::strong_count(&fired), 1);

        cursor.finish();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
