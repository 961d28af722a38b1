//! Pipeline phases and their classification from status text

use std::fmt;

use serde::Serialize;

/// Stage of the remote pipeline currently shown as active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Researching,
    Judging,
    Building,
}

/// Keyword groups in precedence order; the first group with a hit wins
const PHASE_KEYWORDS: [(Phase, &[&str]); 3] = [
    (Phase::Researching, &["research", "gather"]),
    (Phase::Judging, &["judge", "verdict"]),
    (Phase::Building, &["writ", "builder"]),
];

impl Phase {
    /// All phases in pipeline order
    pub const ALL: [Phase; 3] = [Phase::Researching, Phase::Judging, Phase::Building];

    /// Label of the pipeline step this phase highlights
    pub fn step_label(self) -> &'static str {
        match self {
            Phase::Researching => "Researcher",
            Phase::Judging => "Judge",
            Phase::Building => "Builder",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Researching => "researching",
            Phase::Judging => "judging",
            Phase::Building => "building",
        };
        f.write_str(name)
    }
}

/// Classify a progress message by case-insensitive keyword match
///
/// Returns `None` when no group matches; callers clear every indicator in
/// that case.
pub fn classify(text: &str) -> Option<Phase> {
    let lower = text.to_lowercase();
    PHASE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(phase, _)| *phase)
}
