//! Background position polling and scrubbing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::engine::PlaybackState;
use super::shared::SharedPlayer;
use super::PlaybackResult;

/// One sample of the player's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackPosition {
    pub position: Duration,
    pub length: Option<Duration>,
    pub state: PlaybackState,
}

impl PlaybackPosition {
    /// Progress through the media in `0.0..=1.0`, when the length is known.
    pub fn fraction(&self) -> Option<f64> {
        let length = self.length.filter(|l| !l.is_zero())?;
        Some((self.position.as_secs_f64() / length.as_secs_f64()).clamp(0.0, 1.0))
    }
}

/// Samples a [`SharedPlayer`] on a background thread.
///
/// Updates are withheld while a [`Scrubber`] is active. The thread stops on
/// [`PositionPoller::stop`] or when the poller is dropped.
pub struct PositionPoller {
    stop: Arc<AtomicBool>,
    scrubbing: Arc<AtomicBool>,
    player: SharedPlayer,
    handle: Option<JoinHandle<()>>,
}

impl PositionPoller {
    /// Start polling every `interval`, sending samples to `on_update`.
    pub fn spawn(
        player: SharedPlayer,
        interval: Duration,
        on_update: impl Fn(PlaybackPosition) + Send + 'static,
    ) -> Self {
        Self::spawn_inner(player, interval, false, on_update)
    }

    /// Like [`PositionPoller::spawn`], but restarts the media whenever it ends.
    pub fn spawn_looping(
        player: SharedPlayer,
        interval: Duration,
        on_update: impl Fn(PlaybackPosition) + Send + 'static,
    ) -> Self {
        Self::spawn_inner(player, interval, true, on_update)
    }

    fn spawn_inner(
        player: SharedPlayer,
        interval: Duration,
        looping: bool,
        on_update: impl Fn(PlaybackPosition) + Send + 'static,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let scrubbing = Arc::new(AtomicBool::new(false));

        let thread_stop = Arc::clone(&stop);
        let thread_scrubbing = Arc::clone(&scrubbing);
        let thread_player = player.clone();

        let handle = thread::spawn(move || {
            tracing::debug!("Position poller started ({} ms)", interval.as_millis());
            while !thread_stop.load(Ordering::SeqCst) {
                if !thread_scrubbing.load(Ordering::SeqCst) {
                    let sample = thread_player.with(|engine| {
                        let mut state = engine.state();
                        if looping && state == PlaybackState::Ended {
                            match engine.play() {
                                Ok(()) => state = engine.state(),
                                Err(e) => tracing::warn!("Could not restart playback: {}", e),
                            }
                        }
                        PlaybackPosition {
                            position: engine.position(),
                            length: engine.length(),
                            state,
                        }
                    });

                    // A scrub may have begun while the lock was held
                    if !thread_scrubbing.load(Ordering::SeqCst) {
                        on_update(sample);
                    }
                }
                thread::park_timeout(interval);
            }
            tracing::debug!("Position poller stopped");
        });

        Self {
            stop,
            scrubbing,
            player,
            handle: Some(handle),
        }
    }

    /// A scrubber tied to this poller's player.
    pub fn scrubber(&self) -> Scrubber {
        Scrubber {
            scrubbing: Arc::clone(&self.scrubbing),
            player: self.player.clone(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the thread and wait for it to exit.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                tracing::warn!("Position poller thread panicked");
            }
        }
    }
}

impl Drop for PositionPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Moves the playhead while keeping the poller from overwriting it.
#[derive(Debug, Clone)]
pub struct Scrubber {
    scrubbing: Arc<AtomicBool>,
    player: SharedPlayer,
}

impl Scrubber {
    /// Suspend position updates.
    pub fn begin(&self) {
        self.scrubbing.store(true, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.scrubbing.load(Ordering::SeqCst)
    }

    /// Seek to `target` and resume updates. Ended media is reloaded first.
    pub fn end(&self, target: Duration) -> PlaybackResult<()> {
        let result = self.player.with(|engine| {
            if engine.state() == PlaybackState::Ended {
                engine.reload()?;
            }
            engine.seek(target)
        });
        self.scrubbing.store(false, Ordering::SeqCst);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::testing::FakeEngine;
    use std::sync::mpsc;
    use std::time::Instant;

    const INTERVAL: Duration = Duration::from_millis(5);

    fn channel_poller(player: &SharedPlayer, looping: bool) -> (PositionPoller, mpsc::Receiver<PlaybackPosition>) {
        let (tx, rx) = mpsc::channel();
        let on_update = move |p: PlaybackPosition| {
            let _ = tx.send(p);
        };
        let poller = if looping {
            PositionPoller::spawn_looping(player.clone(), INTERVAL, on_update)
        } else {
            PositionPoller::spawn(player.clone(), INTERVAL, on_update)
        };
        (poller, rx)
    }

    #[test]
    fn publishes_samples() {
        let player = SharedPlayer::new(FakeEngine::with_media(Duration::from_secs(8)));
        player.seek(Duration::from_secs(2)).unwrap();
        let (_poller, rx) = channel_poller(&player, false);

        let sample = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(sample.position, Duration::from_secs(2));
        assert_eq!(sample.length, Some(Duration::from_secs(8)));
        assert_eq!(sample.fraction(), Some(0.25));
    }

    #[test]
    fn silent_while_scrubbing() {
        let player = SharedPlayer::new(FakeEngine::with_media(Duration::from_secs(8)));
        let (poller, rx) = channel_poller(&player, false);
        let scrubber = poller.scrubber();

        rx.recv_timeout(Duration::from_secs(2)).unwrap();
        scrubber.begin();
        // Drain anything sampled before the flag was seen
        thread::sleep(INTERVAL * 4);
        while rx.try_recv().is_ok() {}

        thread::sleep(INTERVAL * 10);
        assert!(rx.try_recv().is_err());

        scrubber.end(Duration::from_secs(6)).unwrap();
        assert!(!scrubber.is_active());
        let sample = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(sample.position, Duration::from_secs(6));
    }

    #[test]
    fn scrub_end_reloads_ended_media() {
        let player = SharedPlayer::new(FakeEngine::with_media(Duration::from_secs(8)));
        player.with(|engine| {
            engine.seek(Duration::from_secs(8)).unwrap();
        });
        let ended = {
            let mut engine = FakeEngine::with_media(Duration::from_secs(8));
            engine.state = PlaybackState::Ended;
            SharedPlayer::new(engine)
        };

        for shared in [&player, &ended] {
            let (poller, _rx) = channel_poller(shared, false);
            let scrubber = poller.scrubber();
            scrubber.begin();
            scrubber.end(Duration::from_secs(3)).unwrap();
        }

        assert_eq!(player.state(), PlaybackState::Stopped);
        assert_eq!(ended.state(), PlaybackState::Playing);
        ended.with(|engine| assert_eq!(engine.position(), Duration::from_secs(3)));
    }

    #[test]
    fn looping_restarts_ended_media() {
        let mut engine = FakeEngine::with_media(Duration::from_secs(8));
        engine.position = Duration::from_secs(8);
        engine.state = PlaybackState::Ended;
        let player = SharedPlayer::new(engine);

        let (_poller, rx) = channel_poller(&player, true);
        let sample = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(sample.state, PlaybackState::Playing);
        assert_eq!(sample.position, Duration::ZERO);
    }

    #[test]
    fn stops_promptly() {
        let player = SharedPlayer::new(FakeEngine::with_media(Duration::from_secs(8)));
        let mut poller = PositionPoller::spawn(player, Duration::from_secs(60), |_| {});
        assert!(poller.is_running());

        let started = Instant::now();
        poller.stop();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!poller.is_running());
    }
}
