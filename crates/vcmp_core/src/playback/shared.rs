//! A playback engine shared between threads.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::engine::{PlaybackEngine, PlaybackState};
use super::PlaybackResult;

/// Cloneable handle to one engine. Every call takes the lock for its duration.
#[derive(Clone)]
pub struct SharedPlayer {
    engine: Arc<Mutex<Box<dyn PlaybackEngine>>>,
}

impl SharedPlayer {
    pub fn new(engine: impl PlaybackEngine + 'static) -> Self {
        Self {
            engine: Arc::new(Mutex::new(Box::new(engine))),
        }
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with<R>(&self, f: impl FnOnce(&mut dyn PlaybackEngine) -> R) -> R {
        let mut engine = self.engine.lock();
        f(&mut **engine)
    }

    /// Replace the current media with `path` and start playing it.
    pub fn swap_media(&self, path: &Path) -> PlaybackResult<()> {
        self.with(|engine| {
            engine.load(path)?;
            engine.play()
        })
    }

    pub fn play(&self) -> PlaybackResult<()> {
        self.with(|engine| engine.play())
    }

    pub fn pause(&self) -> PlaybackResult<()> {
        self.with(|engine| engine.pause())
    }

    pub fn stop(&self) -> PlaybackResult<()> {
        self.with(|engine| engine.stop())
    }

    pub fn seek(&self, position: Duration) -> PlaybackResult<()> {
        self.with(|engine| engine.seek(position))
    }

    pub fn state(&self) -> PlaybackState {
        self.with(|engine| engine.state())
    }

    pub fn unload(&self) {
        self.with(|engine| engine.unload())
    }
}

impl std::fmt::Debug for SharedPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedPlayer").finish_non_exhaustive()
    }
}
