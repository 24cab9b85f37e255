//! Playback through a separate player process (VLC by default).
//!
//! The player runs in its own window and is not remote-controlled, so the
//! position is tracked locally: a clock that runs while the process plays.
//! Pausing stops the process and remembers the position; resuming or
//! seeking relaunches it with `--start-time`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use super::engine::{PlaybackEngine, PlaybackState};
use super::{PlaybackError, PlaybackResult};
use crate::config::Settings;
use crate::probe;

/// A pausable clock measuring how far into the media playback is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackClock {
    base: Duration,
    started: Option<Instant>,
}

impl PlaybackClock {
    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    /// Start counting from the current position. No-op while running.
    pub fn start_at(&mut self, now: Instant) {
        if self.started.is_none() {
            self.started = Some(now);
        }
    }

    /// Freeze the clock at its current reading.
    pub fn pause_at(&mut self, now: Instant) {
        if let Some(started) = self.started.take() {
            self.base += now.saturating_duration_since(started);
        }
    }

    /// Stop the clock and put it at `position`.
    pub fn set(&mut self, position: Duration) {
        self.base = position;
        self.started = None;
    }

    pub fn elapsed_at(&self, now: Instant) -> Duration {
        match self.started {
            Some(started) => self.base + now.saturating_duration_since(started),
            None => self.base,
        }
    }
}

/// [`PlaybackEngine`] backed by an external player binary.
#[derive(Debug)]
pub struct ExternalPlayer {
    binary: String,
    hardware_acceleration: bool,
    quiet: bool,
    ffprobe: String,
    media: Option<PathBuf>,
    length: Option<Duration>,
    child: Option<Child>,
    clock: PlaybackClock,
    state: PlaybackState,
}

impl ExternalPlayer {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            hardware_acceleration: false,
            quiet: true,
            ffprobe: "ffprobe".to_string(),
            media: None,
            length: None,
            child: None,
            clock: PlaybackClock::default(),
            state: PlaybackState::Idle,
        }
    }

    /// Player binary and flags from `[player]`, ffprobe from `[tools]`.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut player = Self::new(&settings.player.binary);
        player.hardware_acceleration = settings.player.hardware_acceleration;
        player.quiet = settings.player.quiet;
        player.ffprobe = settings.tools.ffprobe.clone();
        player
    }

    pub fn with_ffprobe(mut self, ffprobe: impl Into<String>) -> Self {
        self.ffprobe = ffprobe.into();
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Arguments for one launch of the player starting at `start`.
    pub fn engine_args(&self, media: &Path, start: Duration) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        if !self.hardware_acceleration {
            args.push("--avcodec-hw=none".into());
        }
        if self.quiet {
            args.push("--quiet".into());
        }
        args.push("--play-and-exit".into());
        args.push(format!("--start-time={:.3}", start.as_secs_f64()).into());
        args.push(media.as_os_str().to_os_string());
        args
    }

    fn clamp(&self, position: Duration) -> Duration {
        match self.length {
            Some(length) => position.min(length),
            None => position,
        }
    }

    fn launch(&mut self) -> PlaybackResult<()> {
        let media = self.media.clone().ok_or(PlaybackError::NoMedia)?;
        self.kill_child()?;

        let now = Instant::now();
        let start = self.clock.elapsed_at(now);
        let args = self.engine_args(&media, start);
        tracing::debug!("Launching {} {:?}", self.binary, args);

        let child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PlaybackError::Launch {
                binary: self.binary.clone(),
                source: e,
            })?;

        self.child = Some(child);
        self.clock.start_at(now);
        self.state = PlaybackState::Playing;
        Ok(())
    }

    fn kill_child(&mut self) -> PlaybackResult<()> {
        if let Some(mut child) = self.child.take() {
            // Fails only if the process already exited; wait() reaps either way
            let _ = child.kill();
            child.wait().map_err(PlaybackError::Stop)?;
        }
        Ok(())
    }

    /// Notice the end of the media, either by the clock or by the player exiting.
    fn refresh(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }

        let now = Instant::now();
        let reached_end = self
            .length
            .is_some_and(|length| self.clock.elapsed_at(now) >= length);
        let exited = match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(Some(_))),
            None => true,
        };

        if reached_end || exited {
            self.clock.pause_at(now);
            let end = self.clamp(self.clock.elapsed_at(now));
            self.clock.set(end);
            if let Err(e) = self.kill_child() {
                tracing::warn!("{}", e);
            }
            self.state = PlaybackState::Ended;
            tracing::debug!("Playback ended at {:.1}s", end.as_secs_f64());
        }
    }
}

/// Probed duration as a [`Duration`], if it is one.
fn media_length(secs: f64) -> Option<Duration> {
    match Duration::try_from_secs_f64(secs) {
        Ok(length) if !length.is_zero() => Some(length),
        _ => {
            tracing::warn!("Ignoring reported media length {}", secs);
            None
        }
    }
}

impl PlaybackEngine for ExternalPlayer {
    fn load(&mut self, path: &Path) -> PlaybackResult<()> {
        if !path.is_file() {
            return Err(PlaybackError::MediaNotFound(path.to_path_buf()));
        }
        self.kill_child()?;

        self.length = match probe::probe_video(&self.ffprobe, path) {
            Ok(info) => media_length(info.duration_secs),
            Err(e) => {
                tracing::warn!("Media length unknown for {}: {}", path.display(), e);
                None
            }
        };
        if self.length.is_none() {
            tracing::debug!("Playing {} without a known length", path.display());
        }
        self.media = Some(path.to_path_buf());
        self.clock.set(Duration::ZERO);
        self.state = PlaybackState::Stopped;
        tracing::debug!("Loaded {}", path.display());
        Ok(())
    }

    fn play(&mut self) -> PlaybackResult<()> {
        if self.media.is_none() {
            return Err(PlaybackError::NoMedia);
        }
        self.refresh();
        match self.state {
            PlaybackState::Playing => Ok(()),
            PlaybackState::Ended => {
                self.clock.set(Duration::ZERO);
                self.launch()
            }
            _ => self.launch(),
        }
    }

    fn pause(&mut self) -> PlaybackResult<()> {
        self.refresh();
        if self.state == PlaybackState::Playing {
            self.clock.pause_at(Instant::now());
            self.kill_child()?;
            self.state = PlaybackState::Paused;
        }
        Ok(())
    }

    fn stop(&mut self) -> PlaybackResult<()> {
        self.kill_child()?;
        self.clock.set(Duration::ZERO);
        self.state = if self.media.is_some() {
            PlaybackState::Stopped
        } else {
            PlaybackState::Idle
        };
        Ok(())
    }

    fn seek(&mut self, position: Duration) -> PlaybackResult<()> {
        if self.media.is_none() {
            return Err(PlaybackError::NoMedia);
        }
        self.refresh();
        let target = self.clamp(position);
        match self.state {
            PlaybackState::Playing => {
                self.kill_child()?;
                self.clock.set(target);
                self.launch()
            }
            PlaybackState::Ended => {
                self.clock.set(target);
                self.state = PlaybackState::Paused;
                Ok(())
            }
            _ => {
                self.clock.set(target);
                Ok(())
            }
        }
    }

    fn position(&mut self) -> Duration {
        self.refresh();
        self.clamp(self.clock.elapsed_at(Instant::now()))
    }

    fn length(&self) -> Option<Duration> {
        self.length
    }

    fn state(&mut self) -> PlaybackState {
        self.refresh();
        self.state
    }

    fn media(&self) -> Option<&Path> {
        self.media.as_deref()
    }

    fn unload(&mut self) {
        if let Err(e) = self.kill_child() {
            tracing::warn!("{}", e);
        }
        self.media = None;
        self.length = None;
        self.clock.set(Duration::ZERO);
        self.state = PlaybackState::Idle;
    }
}

impl Drop for ExternalPlayer {
    fn drop(&mut self) {
        let _ = self.kill_child();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn default_args_disable_hw_and_quiet_output() {
        let player = ExternalPlayer::new("vlc");
        let args = player.engine_args(Path::new("/tmp/c.mp4"), Duration::from_millis(12_500));
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec![
                "--avcodec-hw=none",
                "--quiet",
                "--play-and-exit",
                "--start-time=12.500",
                "/tmp/c.mp4"
            ]
        );
    }

    #[test]
    fn settings_toggle_args() {
        let mut settings = Settings::default();
        settings.player.binary = "/opt/vlc/vlc".to_string();
        settings.player.hardware_acceleration = true;
        settings.player.quiet = false;

        let player = ExternalPlayer::from_settings(&settings);
        assert_eq!(player.binary(), "/opt/vlc/vlc");
        let args = player.engine_args(Path::new("c.mp4"), Duration::ZERO);
        assert!(!args.contains(&OsString::from("--avcodec-hw=none")));
        assert!(!args.contains(&OsString::from("--quiet")));
        assert!(args.contains(&OsString::from("--start-time=0.000")));
    }

    #[test]
    fn requires_media() {
        let mut player = ExternalPlayer::new("vlc");
        assert!(matches!(player.play(), Err(PlaybackError::NoMedia)));
        assert!(matches!(
            player.load(Path::new("/nonexistent/clip.mp4")),
            Err(PlaybackError::MediaNotFound(_))
        ));
        assert_eq!(player.state(), PlaybackState::Idle);
    }

    #[test]
    fn launch_failure_is_reported() {
        let dir = tempdir().unwrap();
        let media = dir.path().join("clip.mp4");
        fs::write(&media, b"not really a video").unwrap();

        let mut player = ExternalPlayer::new("/nonexistent/player-binary")
            .with_ffprobe("/nonexistent/ffprobe-binary");
        player.load(&media).unwrap();
        assert_eq!(player.length(), None);
        assert_eq!(player.state(), PlaybackState::Stopped);

        player.seek(Duration::from_secs(3)).unwrap();
        assert_eq!(player.position(), Duration::from_secs(3));

        let err = player.play().unwrap_err();
        assert!(matches!(err, PlaybackError::Launch { .. }));
        assert_eq!(player.state(), PlaybackState::Stopped);
    }

    #[test]
    fn unusable_lengths_are_unknown() {
        assert_eq!(media_length(12.5), Some(Duration::from_millis(12_500)));
        assert_eq!(media_length(0.0), None);
        assert_eq!(media_length(-1.0), None);
        assert_eq!(media_length(f64::NAN), None);
        assert_eq!(media_length(1e30), None);
    }

    #[test]
    fn clock_pauses_and_resumes() {
        let t0 = Instant::now();
        let mut clock = PlaybackClock::default();
        clock.start_at(t0);
        assert_eq!(clock.elapsed_at(t0 + Duration::from_secs(2)), Duration::from_secs(2));

        clock.pause_at(t0 + Duration::from_secs(2));
        assert!(!clock.is_running());
        assert_eq!(clock.elapsed_at(t0 + Duration::from_secs(10)), Duration::from_secs(2));

        clock.start_at(t0 + Duration::from_secs(10));
        assert_eq!(clock.elapsed_at(t0 + Duration::from_secs(11)), Duration::from_secs(3));

        clock.set(Duration::from_secs(7));
        assert_eq!(clock.elapsed_at(t0 + Duration::from_secs(20)), Duration::from_secs(7));
    }
}
