//! Conversion status state machine
//!
//! `Analyzing -> Converting -> Testing -> Success`, with `Failed` reachable
//! from any non-terminal state. `Success` and `Failed` are absorbing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionStatus {
    Analyzing,
    Converting,
    Testing,
    Success,
    Failed,
}

impl ConversionStatus {
    /// Statuses of a successful run, in order
    pub const PIPELINE: [ConversionStatus; 4] = [
        ConversionStatus::Analyzing,
        ConversionStatus::Converting,
        ConversionStatus::Testing,
        ConversionStatus::Success,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }

    pub fn can_transition_to(self, next: ConversionStatus) -> bool {
        use ConversionStatus::*;
        matches!(
            (self, next),
            (Analyzing, Converting)
                | (Converting, Testing)
                | (Testing, Success)
                | (Analyzing | Converting | Testing, Failed)
        )
    }

    /// Whether translated text may be present in this status
    pub fn has_translation(self) -> bool {
        matches!(self, Self::Testing | Self::Success)
    }
}

impl std::fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Analyzing => "analyzing",
            Self::Converting => "converting",
            Self::Testing => "testing",
            Self::Success => "success",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
