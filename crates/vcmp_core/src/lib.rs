//! VCMP Core - Backend logic for Video Comparer
//!
//! This crate contains all business logic with zero UI dependencies:
//! building side-by-side comparisons with ffmpeg, reviewing them,
//! grading videos into label folders, and driving an external player.
//! It is used by the `video-comparer` CLI.

pub mod compare;
pub mod config;
pub mod grading;
pub mod logging;
pub mod models;
pub mod playback;
pub mod probe;
pub mod workspace;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
