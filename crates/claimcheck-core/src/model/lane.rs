use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One independent verification track.
///
/// The derived ordering (news < fact < scam) is the merge order used by the
/// report assembler for global source numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    News,
    Fact,
    Scam,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::News, Lane::Fact, Lane::Scam];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::News => "news",
            Self::Fact => "fact",
            Self::Scam => "scam",
        }
    }

    /// Key under which the lane verdict is stored in the submission context.
    pub fn state_key(&self) -> &'static str {
        match self {
            Self::News => "news_check_summary",
            Self::Fact => "fact_check_summary",
            Self::Scam => "scam_check_summary",
        }
    }

    /// Section heading used by the Markdown renderer.
    pub fn heading(&self) -> &'static str {
        match self {
            Self::News => "News Assessment",
            Self::Fact => "Fact Assessment",
            Self::Scam => "Scam Risk",
        }
    }

    /// Whether the lane speaks the true/false/mixed/unknown vocabulary.
    pub fn is_verdict_lane(&self) -> bool {
        matches!(self, Self::News | Self::Fact)
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lane {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "news" => Ok(Self::News),
            "fact" => Ok(Self::Fact),
            "scam" => Ok(Self::Scam),
            other => Err(format!(
                "unknown lane '{}' (expected news, fact or scam)",
                other
            )),
        }
    }
}
