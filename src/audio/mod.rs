mod audio;
#[cfg(test)]
pub mod fake;

pub use audio::{CompletionCallback, KiraPlayback, PlaybackHandle};
