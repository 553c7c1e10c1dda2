use serde::{Deserialize, Serialize};

/// Outcome of judging one judgment point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Judgment {
    Perfect,
    Normal,
    Good,
    Missed,
}

impl Judgment {
    pub fn is_hit(self) -> bool {
        self != Self::Missed
    }
}

/// Which end of a note was judged. Short notes only have a head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JudgePoint {
    Head,
    Tail,
}

/// A judgment emitted for one point of one note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeEvent {
    /// Index into the canonical note list
    pub note_index: usize,
    pub point: JudgePoint,
    pub judgment: Judgment,
    /// Signed offset from the ideal time in ms (positive = early, negative = late)
    pub accuracy_ms: f64,
}
