//! Data models for Video Comparer.
//!
//! - Media properties derived from probing (frame rate, resolution, video info)
//! - Grade labels used to sort graded videos

mod enums;
mod media;

pub use enums::GradeLabel;
pub use media::{FrameRate, Resolution, VideoInfo};
