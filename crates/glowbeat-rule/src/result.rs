use std::fmt;

use serde::{Deserialize, Serialize};

use crate::score::ScoreState;

/// Final letter rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    S,
    A,
    B,
    C,
    D,
    F,
}

impl Rank {
    /// Strict thresholds, checked from the top: >95 S, >85 A, >70 B, >55 C, >40 D.
    pub fn from_percent(percent: f64) -> Self {
        if percent > 95.0 {
            Self::S
        } else if percent > 85.0 {
            Self::A
        } else if percent > 70.0 {
            Self::B
        } else if percent > 55.0 {
            Self::C
        } else if percent > 40.0 {
            Self::D
        } else {
            Self::F
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        };
        f.write_str(s)
    }
}

/// Denominator used for the hit percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TotalNotesPolicy {
    /// Judged points: hits + misses
    #[default]
    Judged,
    /// Canonical note count of the chart
    Chart,
}

/// Results record shown after a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayResult {
    pub normal_hits: u32,
    pub good_hits: u32,
    pub perfect_hits: u32,
    pub missed_hits: u32,
    pub total_notes: u32,
    pub percent_hit: f64,
    pub rank: Rank,
    pub final_score: u64,
    pub max_multiplier: u32,
}

impl PlayResult {
    pub fn new(state: &ScoreState, chart_note_count: usize, policy: TotalNotesPolicy) -> Self {
        let total_notes = match policy {
            TotalNotesPolicy::Judged => state.judged(),
            TotalNotesPolicy::Chart => chart_note_count as u32,
        };
        let percent_hit = if total_notes > 0 {
            f64::from(state.total_hits()) / f64::from(total_notes) * 100.0
        } else {
            0.0
        };
        Self {
            normal_hits: state.normal_hits,
            good_hits: state.good_hits,
            perfect_hits: state.perfect_hits,
            missed_hits: state.missed_hits,
            total_notes,
            percent_hit,
            rank: Rank::from_percent(percent_hit),
            final_score: state.current_score,
            max_multiplier: state.max_multiplier,
        }
    }
}
