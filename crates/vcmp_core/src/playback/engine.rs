//! The playback engine seam.

use std::path::Path;
use std::time::Duration;

use super::{PlaybackError, PlaybackResult};

/// Where an engine is in its media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Nothing loaded.
    #[default]
    Idle,
    Stopped,
    Playing,
    Paused,
    /// Playback reached the end of the media.
    Ended,
}

impl PlaybackState {
    pub fn label(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Stopped => "stopped",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Ended => "ended",
        }
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Something that can play one media file at a time.
///
/// `position` and `state` take `&mut self` so an engine can notice that its
/// media ended while it is being asked.
pub trait PlaybackEngine: Send {
    /// Load `path`, replacing any current media. Leaves the engine stopped.
    fn load(&mut self, path: &Path) -> PlaybackResult<()>;

    /// Start or resume. On ended media, playback restarts from the beginning.
    fn play(&mut self) -> PlaybackResult<()>;

    fn pause(&mut self) -> PlaybackResult<()>;

    /// Stop and rewind to the start.
    fn stop(&mut self) -> PlaybackResult<()>;

    /// Jump to `position`, clamped to the media length.
    fn seek(&mut self, position: Duration) -> PlaybackResult<()>;

    fn position(&mut self) -> Duration;

    /// Media length, when known.
    fn length(&self) -> Option<Duration>;

    fn state(&mut self) -> PlaybackState;

    /// Currently loaded media.
    fn media(&self) -> Option<&Path>;

    fn unload(&mut self);

    /// Load the current media again and play it from the start.
    fn reload(&mut self) -> PlaybackResult<()> {
        let path = self.media().ok_or(PlaybackError::NoMedia)?.to_path_buf();
        self.load(&path)?;
        self.play()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::testing::FakeEngine;

    #[test]
    fn reload_restarts_current_media() {
        let mut engine = FakeEngine::with_media(Duration::from_secs(10));
        engine.position = Duration::from_secs(10);
        engine.state = PlaybackState::Ended;

        engine.reload().unwrap();
        assert_eq!(engine.loads, 1);
        assert_eq!(engine.position, Duration::ZERO);
        assert_eq!(engine.state, PlaybackState::Playing);
    }

    #[test]
    fn reload_without_media_fails() {
        let mut engine = FakeEngine::default();
        assert!(matches!(engine.reload(), Err(PlaybackError::NoMedia)));
    }
}
