//! Parameter derivation for a comparison render.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::filter::{escape_drawtext, escape_option_value, format_factor};
use super::{CompareError, CompareResult};
use crate::config::Settings;
use crate::models::{FrameRate, VideoInfo};
use crate::workspace::{MAX_COMPARE, MIN_COMPARE};

/// Extra pixels added below every input; labels are drawn inside this band.
pub const LABEL_BAND: u32 = 50;

/// Distance of the label baseline from the bottom edge.
const LABEL_OFFSET: u32 = 40;

/// Reject selections outside the two-to-five range.
pub fn validate_selection_count(count: usize) -> CompareResult<()> {
    if (MIN_COMPARE..=MAX_COMPARE).contains(&count) {
        Ok(())
    } else {
        Err(CompareError::InvalidSelection { count })
    }
}

/// Encoder and overlay settings for the rendered comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    pub video_codec: String,
    pub crf: u32,
    pub preset: String,
    /// Decode inputs with `-hwaccel auto`.
    pub hwaccel: bool,
    pub label_font: Option<PathBuf>,
    pub label_font_size: u32,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl EncodeOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        let encoding = &settings.encoding;
        Self {
            video_codec: encoding.video_codec.clone(),
            crf: encoding.crf,
            preset: encoding.preset.clone(),
            hwaccel: settings.player.hardware_acceleration,
            label_font: (!encoding.label_font.trim().is_empty())
                .then(|| PathBuf::from(encoding.label_font.trim())),
            label_font_size: encoding.label_font_size,
        }
    }
}

/// One input of the plan with its derived parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanInput {
    pub info: VideoInfo,
    /// Duration divided by the shortest duration; always >= 1.
    pub speed: f64,
    /// Text burned in below the frame, if any.
    pub label: Option<String>,
}

/// Everything needed to render one comparison.
#[derive(Debug, Clone)]
pub struct ComparisonPlan {
    inputs: Vec<PlanInput>,
    target_fps: FrameRate,
    shortest_secs: f64,
    /// Common padded height when every input's size is known.
    padded_height: Option<u32>,
    /// Index of the input whose first audio stream is muxed in.
    audio_source: Option<usize>,
    options: EncodeOptions,
}

impl ComparisonPlan {
    /// Derive speed factors, target frame rate, padding and audio source.
    ///
    /// `labels` is either empty (no overlays) or holds one entry per input;
    /// blank entries mean no overlay for that input.
    pub fn derive(
        infos: Vec<VideoInfo>,
        labels: &[String],
        options: EncodeOptions,
    ) -> CompareResult<Self> {
        validate_selection_count(infos.len())?;

        if !labels.is_empty() && labels.len() != infos.len() {
            return Err(CompareError::LabelCountMismatch {
                inputs: infos.len(),
                labels: labels.len(),
            });
        }

        let shortest_secs = infos
            .iter()
            .map(|i| i.duration_secs)
            .fold(f64::INFINITY, f64::min);

        // Non-empty after the count check
        let target_fps = infos
            .iter()
            .map(|i| i.frame_rate)
            .max()
            .ok_or(CompareError::InvalidSelection { count: 0 })?;

        let padded_height = infos
            .iter()
            .map(|i| i.resolution.map(|r| r.even().height))
            .collect::<Option<Vec<_>>>()
            .and_then(|heights| heights.into_iter().max())
            .map(|h| h + LABEL_BAND);

        let audio_source = infos.iter().position(|i| i.has_audio);

        let inputs = infos
            .into_iter()
            .enumerate()
            .map(|(idx, info)| {
                let label = labels
                    .get(idx)
                    .map(|l| l.trim())
                    .filter(|l| !l.is_empty())
                    .map(str::to_string);
                PlanInput {
                    speed: info.duration_secs / shortest_secs,
                    info,
                    label,
                }
            })
            .collect();

        Ok(Self {
            inputs,
            target_fps,
            shortest_secs,
            padded_height,
            audio_source,
            options,
        })
    }

    pub fn inputs(&self) -> &[PlanInput] {
        &self.inputs
    }

    pub fn target_fps(&self) -> FrameRate {
        self.target_fps
    }

    pub fn shortest_secs(&self) -> f64 {
        self.shortest_secs
    }

    pub fn speed_factors(&self) -> Vec<f64> {
        self.inputs.iter().map(|i| i.speed).collect()
    }

    pub fn audio_source(&self) -> Option<usize> {
        self.audio_source
    }

    pub fn labels(&self) -> Vec<Option<String>> {
        self.inputs.iter().map(|i| i.label.clone()).collect()
    }

    /// The `-filter_complex` argument.
    pub fn filter_graph(&self) -> String {
        let height = self
            .padded_height
            .map(|h| h.to_string())
            .unwrap_or_else(|| format!("ih+{}", LABEL_BAND));

        let mut chains: Vec<String> = self
            .inputs
            .iter()
            .enumerate()
            .map(|(i, input)| {
                let overlay = input
                    .label
                    .as_deref()
                    .map(|text| format!(",{}", self.drawtext(text)))
                    .unwrap_or_default();
                format!(
                    "[{i}:v]fps={fps},scale=trunc(iw/2)*2:trunc(ih/2)*2,pad=iw:{height}:0:0:black,setpts=PTS/{speed}{overlay}[v{i}]",
                    fps = self.target_fps,
                    speed = format_factor(input.speed),
                )
            })
            .collect();

        let stack_inputs: String = (0..self.inputs.len()).map(|i| format!("[v{}]", i)).collect();
        chains.push(format!(
            "{}hstack=inputs={}[vout]",
            stack_inputs,
            self.inputs.len()
        ));

        chains.join(";")
    }

    fn drawtext(&self, text: &str) -> String {
        let font = self
            .options
            .label_font
            .as_deref()
            .map(|f| format!("fontfile={}:", escape_option_value(&f.to_string_lossy())))
            .unwrap_or_default();
        format!(
            "drawtext={font}fontsize={size}:fontcolor=white:x=(w-text_w)/2:y=h-{offset}:text={text}",
            size = self.options.label_font_size,
            offset = LABEL_OFFSET,
            text = escape_drawtext(text),
        )
    }

    /// Full ffmpeg argument vector writing to `output`.
    pub fn ffmpeg_args(&self, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-y".into(), "-hide_banner".into()];

        for input in &self.inputs {
            if self.options.hwaccel {
                args.push("-hwaccel".into());
                args.push("auto".into());
            }
            args.push("-i".into());
            args.push(input.info.path.clone().into_os_string());
        }

        args.push("-filter_complex".into());
        args.push(self.filter_graph().into());
        args.push("-map".into());
        args.push("[vout]".into());

        if let Some(idx) = self.audio_source {
            args.push("-map".into());
            args.push(format!("{}:a:0", idx).into());
        }

        args.push("-c:v".into());
        args.push(self.options.video_codec.clone().into());
        args.push("-crf".into());
        args.push(self.options.crf.to_string().into());
        args.push("-preset".into());
        args.push(self.options.preset.clone().into());
        args.push(output.as_os_str().to_os_string());

        args
    }
}
