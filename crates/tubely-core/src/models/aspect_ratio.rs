use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Display aspect ratio bucket of an uploaded video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "other")]
    Other,
}

impl AspectRatio {
    /// Buckets a raw `display_aspect_ratio` value. Only exact matches count.
    pub fn from_display_ratio(ratio: &str) -> Self {
        match ratio {
            "16:9" => AspectRatio::Landscape,
            "9:16" => AspectRatio::Portrait,
            _ => AspectRatio::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Other => "other",
        }
    }

    /// Object-store prefix videos of this ratio are filed under.
    pub fn storage_prefix(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "/landscape/",
            AspectRatio::Portrait => "/portrait/",
            AspectRatio::Other => "/other/",
        }
    }
}

impl Display for AspectRatio {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_ratios_pass_through() {
        assert_eq!(AspectRatio::from_display_ratio("16:9").as_str(), "16:9");
        assert_eq!(AspectRatio::from_display_ratio("9:16").as_str(), "9:16");
    }

    #[test]
    fn everything_else_is_other() {
        for raw in ["", "4:3", "1:1", "16:10", " 16:9", "16:9 ", "N/A", "0:1"] {
            assert_eq!(AspectRatio::from_display_ratio(raw), AspectRatio::Other);
        }
    }

    #[test]
    fn prefixes_follow_classification() {
        assert_eq!(AspectRatio::Landscape.storage_prefix(), "/landscape/");
        assert_eq!(AspectRatio::Portrait.storage_prefix(), "/portrait/");
        assert_eq!(AspectRatio::Other.storage_prefix(), "/other/");
    }
}
