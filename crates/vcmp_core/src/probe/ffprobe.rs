//! ffprobe invocation and JSON parsing.

use std::path::Path;
use std::process::Command;

use serde::Deserialize;

use super::{ProbeError, ProbeResult};
use crate::models::{FrameRate, Resolution, VideoInfo};

#[derive(Debug, Default, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    #[serde(default)]
    format: ProbeFormat,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeStream {
    #[serde(default)]
    codec_type: String,
    #[serde(default)]
    r_frame_rate: Option<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeFormat {
    /// ffprobe reports durations as decimal strings.
    #[serde(default)]
    duration: Option<String>,
}

/// Probe a source video for duration, frame rate, size and audio presence.
///
/// Runs `ffprobe -v error -show_entries format=duration:stream=... -of json`.
pub fn probe_video(ffprobe: &str, path: &Path) -> ProbeResult<VideoInfo> {
    let stdout = run_ffprobe(
        ffprobe,
        path,
        &[
            "-show_entries",
            "format=duration:stream=codec_type,r_frame_rate,width,height",
        ],
    )?;
    parse_probe_json(&stdout, path)
}

/// Probe only the first video stream's dimensions.
///
/// Returns [`Resolution::FALLBACK`] when the size cannot be read, so callers
/// sizing a player window always get something usable.
pub fn probe_resolution(ffprobe: &str, path: &Path) -> Resolution {
    let stdout = match run_ffprobe(
        ffprobe,
        path,
        &["-select_streams", "v:0", "-show_entries", "stream=codec_type,width,height"],
    ) {
        Ok(out) => out,
        Err(e) => {
            tracing::warn!("Could not probe resolution of {}: {}", path.display(), e);
            return Resolution::FALLBACK;
        }
    };

    serde_json::from_slice::<ProbeOutput>(&stdout)
        .ok()
        .and_then(|out| first_video(&out).and_then(stream_resolution))
        .unwrap_or(Resolution::FALLBACK)
}

fn run_ffprobe(ffprobe: &str, path: &Path, entries: &[&str]) -> ProbeResult<Vec<u8>> {
    if !path.exists() {
        return Err(ProbeError::FileNotFound(path.to_path_buf()));
    }

    let mut cmd = Command::new(ffprobe);
    cmd.args(["-v", "error"]).args(entries).args(["-of", "json"]).arg(path);

    tracing::debug!("Running ffprobe: {:?}", cmd);

    let output = cmd.output().map_err(|e| ProbeError::Spawn {
        tool: ffprobe.to_string(),
        source: e,
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProbeError::CommandFailed {
            tool: ffprobe.to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            message: stderr.trim().to_string(),
        });
    }

    Ok(output.stdout)
}

/// Parse `ffprobe -of json` output into [`VideoInfo`].
pub fn parse_probe_json(json: &[u8], path: &Path) -> ProbeResult<VideoInfo> {
    let parsed: ProbeOutput = serde_json::from_slice(json).map_err(|e| ProbeError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let duration_secs = parsed
        .format
        .duration
        .as_deref()
        .and_then(|d| d.trim().parse::<f64>().ok())
        .ok_or_else(|| ProbeError::Missing {
            path: path.to_path_buf(),
            what: "duration",
        })?;

    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(ProbeError::Parse {
            path: path.to_path_buf(),
            message: format!("non-positive duration {}", duration_secs),
        });
    }

    let video = first_video(&parsed).ok_or_else(|| ProbeError::Missing {
        path: path.to_path_buf(),
        what: "video stream",
    })?;

    let frame_rate: FrameRate = video
        .r_frame_rate
        .as_deref()
        .ok_or_else(|| ProbeError::Missing {
            path: path.to_path_buf(),
            what: "frame rate",
        })?
        .parse()
        .map_err(|message| ProbeError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

    let has_audio = parsed.streams.iter().any(|s| s.codec_type == "audio");

    Ok(VideoInfo {
        path: path.to_path_buf(),
        duration_secs,
        frame_rate,
        resolution: stream_resolution(video),
        has_audio,
    })
}

fn first_video(output: &ProbeOutput) -> Option<&ProbeStream> {
    output.streams.iter().find(|s| s.codec_type == "video")
}

fn stream_resolution(stream: &ProbeStream) -> Option<Resolution> {
    match (stream.width, stream.height) {
        (Some(width), Some(height)) if width > 0 && height > 0 => Some(Resolution { width, height }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "programs": [],
        "streams": [
            { "codec_type": "video", "r_frame_rate": "30000/1001", "width": 1920, "height": 1080 },
            { "codec_type": "audio", "r_frame_rate": "0/0" }
        ],
        "format": { "duration": "12.512000" }
    }"#;

    #[test]
    fn parses_full_probe() {
        let info = parse_probe_json(SAMPLE.as_bytes(), Path::new("input/a.mp4")).unwrap();
        assert!((info.duration_secs - 12.512).abs() < 1e-9);
        assert_eq!(info.frame_rate, FrameRate::new(30000, 1001).unwrap());
        assert_eq!(info.resolution, Some(Resolution { width: 1920, height: 1080 }));
        assert!(info.has_audio);
        assert_eq!(info.file_name(), "a.mp4");
    }

    #[test]
    fn video_without_audio() {
        let json = r#"{"streams":[{"codec_type":"video","r_frame_rate":"25/1"}],"format":{"duration":"3.0"}}"#;
        let info = parse_probe_json(json.as_bytes(), Path::new("b.mkv")).unwrap();
        assert!(!info.has_audio);
        assert_eq!(info.resolution, None);
    }

    #[test]
    fn missing_duration_is_an_error() {
        let json = r#"{"streams":[{"codec_type":"video","r_frame_rate":"25/1"}],"format":{}}"#;
        let err = parse_probe_json(json.as_bytes(), Path::new("c.mp4")).unwrap_err();
        assert!(matches!(err, ProbeError::Missing { what: "duration", .. }));
    }

    #[test]
    fn audio_only_file_is_rejected() {
        let json = r#"{"streams":[{"codec_type":"audio"}],"format":{"duration":"3.0"}}"#;
        let err = parse_probe_json(json.as_bytes(), Path::new("d.mp4")).unwrap_err();
        assert!(matches!(err, ProbeError::Missing { what: "video stream", .. }));
    }

    #[test]
    fn zero_duration_is_rejected() {
        let json = r#"{"streams":[{"codec_type":"video","r_frame_rate":"25/1"}],"format":{"duration":"0.000"}}"#;
        assert!(parse_probe_json(json.as_bytes(), Path::new("e.mp4")).is_err());
    }

    #[test]
    fn garbage_output_is_parse_error() {
        let err = parse_probe_json(b"N/A", Path::new("f.mp4")).unwrap_err();
        assert!(matches!(err, ProbeError::Parse { .. }));
    }

    #[test]
    fn missing_file_short_circuits() {
        let err = probe_video("ffprobe", Path::new("/definitely/not/here.mp4")).unwrap_err();
        assert!(matches!(err, ProbeError::FileNotFound(_)));
        assert_eq!(
            probe_resolution("ffprobe", Path::new("/definitely/not/here.mp4")),
            Resolution::FALLBACK
        );
    }
}
