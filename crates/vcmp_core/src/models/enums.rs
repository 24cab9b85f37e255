//! Core enums used throughout the application.

use serde::{Deserialize, Serialize};

/// Quality label assigned while grading.
///
/// The label names the subfolder of the graded folder a video is moved into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GradeLabel {
    Bad,
    Average,
    Good,
    /// Free-text label entered by the user.
    Custom(String),
}

impl GradeLabel {
    /// Parse user input: built-in names (or their first letter) match
    /// case-insensitively, anything else non-empty becomes a custom label.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        let label = match trimmed.to_ascii_lowercase().as_str() {
            "bad" | "b" => GradeLabel::Bad,
            "average" | "a" => GradeLabel::Average,
            "good" | "g" => GradeLabel::Good,
            _ => GradeLabel::Custom(trimmed.to_string()),
        };
        Some(label)
    }

    /// Folder name for this label, safe to join onto a path.
    pub fn folder_name(&self) -> String {
        match self {
            GradeLabel::Bad => "Bad".to_string(),
            GradeLabel::Average => "Average".to_string(),
            GradeLabel::Good => "Good".to_string(),
            GradeLabel::Custom(text) => {
                let cleaned: String = text
                    .chars()
                    .map(|c| match c {
                        '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                        c if c.is_control() => '_',
                        c => c,
                    })
                    .collect();
                let cleaned = cleaned.trim().trim_matches('.').to_string();
                if cleaned.is_empty() {
                    "Unlabeled".to_string()
                } else {
                    cleaned
                }
            }
        }
    }
}

impl std::fmt::Display for GradeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GradeLabel::Custom(text) => write!(f, "{}", text),
            other => write!(f, "{}", other.folder_name()),
        }
    }
}
