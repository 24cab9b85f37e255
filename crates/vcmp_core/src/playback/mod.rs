//! Video playback through a swappable engine.
//!
//! The [`PlaybackEngine`] trait is the seam between callers and whatever
//! actually shows video. [`ExternalPlayer`] drives a separate player
//! process. A [`SharedPlayer`] wraps one engine in a mutex so the caller's
//! thread and a [`PositionPoller`] can both reach it.

mod engine;
mod external;
mod poller;
mod shared;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use engine::{PlaybackEngine, PlaybackState};
pub use external::{ExternalPlayer, PlaybackClock};
pub use poller::{PlaybackPosition, PositionPoller, Scrubber};
pub use shared::SharedPlayer;

/// Errors from playback control.
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("No media loaded")]
    NoMedia,

    #[error("Media file not found: {0}")]
    MediaNotFound(PathBuf),

    #[error("Failed to launch player '{binary}': {source}")]
    Launch {
        binary: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to stop player: {0}")]
    Stop(#[source] io::Error),
}

/// Result type for playback operations.
pub type PlaybackResult<T> = Result<T, PlaybackError>;

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory engine for tests.

    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use super::{PlaybackEngine, PlaybackError, PlaybackResult, PlaybackState};

    #[derive(Debug, Default)]
    pub struct FakeEngine {
        pub media: Option<PathBuf>,
        pub position: Duration,
        pub length: Option<Duration>,
        pub state: PlaybackState,
        pub loads: usize,
        pub plays: usize,
        pub seeks: Vec<Duration>,
    }

    impl FakeEngine {
        pub fn with_media(length: Duration) -> Self {
            Self {
                media: Some(PathBuf::from("clip.mp4")),
                length: Some(length),
                state: PlaybackState::Stopped,
                ..Self::default()
            }
        }
    }

    impl PlaybackEngine for FakeEngine {
        fn load(&mut self, path: &Path) -> PlaybackResult<()> {
            self.media = Some(path.to_path_buf());
            self.position = Duration::ZERO;
            self.state = PlaybackState::Stopped;
            self.loads += 1;
            Ok(())
        }

        fn play(&mut self) -> PlaybackResult<()> {
            if self.media.is_none() {
                return Err(PlaybackError::NoMedia);
            }
            if self.state == PlaybackState::Ended {
                self.position = Duration::ZERO;
            }
            self.state = PlaybackState::Playing;
            self.plays += 1;
            Ok(())
        }

        fn pause(&mut self) -> PlaybackResult<()> {
            self.state = PlaybackState::Paused;
            Ok(())
        }

        fn stop(&mut self) -> PlaybackResult<()> {
            self.position = Duration::ZERO;
            self.state = PlaybackState::Stopped;
            Ok(())
        }

        fn seek(&mut self, position: Duration) -> PlaybackResult<()> {
            self.position = position;
            self.seeks.push(position);
            Ok(())
        }

        fn position(&mut self) -> Duration {
            self.position
        }

        fn length(&self) -> Option<Duration> {
            self.length
        }

        fn state(&mut self) -> PlaybackState {
            self.state
        }

        fn media(&self) -> Option<&Path> {
            self.media.as_deref()
        }

        fn unload(&mut self) {
            self.media = None;
            self.state = PlaybackState::Idle;
        }
    }
}
