use serde::{Deserialize, Serialize};

/// Gameplay note kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteKind {
    Short,
    Long,
}

/// A playable note after conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalNote {
    /// Hit time in milliseconds (head time for long notes)
    pub time_ms: f64,
    pub kind: NoteKind,
    /// Hold duration in milliseconds (0 for short notes)
    pub duration_ms: f64,
}

impl CanonicalNote {
    /// A tap note at `time_ms`.
    pub fn short(time_ms: f64) -> Self {
        Self {
            time_ms,
            kind: NoteKind::Short,
            duration_ms: 0.0,
        }
    }

    /// A hold note from `time_ms` lasting `duration_ms`.
    pub fn long(time_ms: f64, duration_ms: f64) -> Self {
        Self {
            time_ms,
            kind: NoteKind::Long,
            duration_ms,
        }
    }

    pub fn is_long(&self) -> bool {
        self.kind == NoteKind::Long
    }

    pub fn end_time_ms(&self) -> f64 {
        self.time_ms + self.duration_ms
    }
}
