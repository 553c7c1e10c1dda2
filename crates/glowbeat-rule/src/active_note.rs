//! Per-note judgment state machine.
//!
//! An `ActiveNote` exists from the moment the scheduler activates a canonical
//! note until it is retired. Its lifetime is the time remaining until the ideal
//! hit position: positive before, negative after. Each judgment point (head,
//! and tail for long notes) is judged at most once.

use glowbeat_chart::{CanonicalNote, NoteKind};
use serde::{Deserialize, Serialize};

use crate::judge_window::JudgeWindow;
use crate::judgment::{JudgeEvent, JudgePoint, Judgment};

/// How many Missed judgments an expired long note produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LongMissPolicy {
    /// One miss per long note, whether or not the head was started
    #[default]
    Single,
    /// One miss per unjudged point: a never-started note misses head and tail
    PerJudgePoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteState {
    Activated,
    /// Long note whose head was judged and is being held
    Held,
    Retired,
}

#[derive(Debug, Clone)]
pub struct ActiveNote {
    note_index: usize,
    kind: NoteKind,
    duration_ms: f64,
    /// Playback position of the ideal head hit
    hit_time_ms: f64,
    lifetime_ms: f64,
    state: NoteState,
    head_judged: bool,
    tail_judged: bool,
}

impl ActiveNote {
    /// Activates `note` at `position_ms`. The ideal hit position is the note
    /// time shifted by the calibration offset.
    pub fn activate(
        note_index: usize,
        note: &CanonicalNote,
        offset_ms: f64,
        position_ms: f64,
    ) -> Self {
        let hit_time_ms = note.time_ms + offset_ms;
        Self {
            note_index,
            kind: note.kind,
            duration_ms: note.duration_ms,
            hit_time_ms,
            lifetime_ms: hit_time_ms - position_ms,
            state: NoteState::Activated,
            head_judged: false,
            tail_judged: false,
        }
    }

    pub fn note_index(&self) -> usize {
        self.note_index
    }

    pub fn kind(&self) -> NoteKind {
        self.kind
    }

    pub fn state(&self) -> NoteState {
        self.state
    }

    pub fn is_retired(&self) -> bool {
        self.state == NoteState::Retired
    }

    pub fn is_held(&self) -> bool {
        self.state == NoteState::Held
    }

    pub fn hit_time_ms(&self) -> f64 {
        self.hit_time_ms
    }

    /// Playback position of the ideal tail release (equals the head for short notes).
    pub fn end_hit_time_ms(&self) -> f64 {
        self.hit_time_ms + self.duration_ms
    }

    pub fn lifetime_ms(&self) -> f64 {
        self.lifetime_ms
    }

    /// Moves the countdown to `position_ms`.
    pub fn advance(&mut self, position_ms: f64) {
        self.lifetime_ms = self.hit_time_ms - position_ms;
    }

    /// Whether a tap (short) or hold start (long) may judge the head now.
    pub fn is_pressable(&self, window: &JudgeWindow) -> bool {
        self.state == NoteState::Activated
            && !self.head_judged
            && window.is_pressable(self.lifetime_ms)
    }

    pub fn is_expired(&self, window: &JudgeWindow) -> bool {
        match self.kind {
            NoteKind::Short => window.is_expired(self.lifetime_ms),
            NoteKind::Long => window.is_expired(self.lifetime_ms + self.duration_ms),
        }
    }

    /// Judges a short note on tap and retires it.
    pub fn press(&mut self, window: &JudgeWindow) -> Option<JudgeEvent> {
        if self.kind != NoteKind::Short || !self.is_pressable(window) {
            return None;
        }
        self.head_judged = true;
        self.state = NoteState::Retired;
        Some(self.judge(JudgePoint::Head, window.classify(self.lifetime_ms), self.lifetime_ms))
    }

    /// Judges the head of a long note and starts holding it.
    pub fn hold_start(&mut self, window: &JudgeWindow) -> Option<JudgeEvent> {
        if self.kind != NoteKind::Long || !self.is_pressable(window) {
            return None;
        }
        self.head_judged = true;
        self.state = NoteState::Held;
        Some(self.judge(JudgePoint::Head, window.classify(self.lifetime_ms), self.lifetime_ms))
    }

    /// Judges the tail of a held long note against its end time and retires it.
    pub fn hold_end(&mut self, window: &JudgeWindow) -> Option<JudgeEvent> {
        if self.state != NoteState::Held || self.tail_judged {
            return None;
        }
        let offset = self.lifetime_ms + self.duration_ms;
        self.tail_judged = true;
        self.state = NoteState::Retired;
        Some(self.judge(JudgePoint::Tail, window.classify(offset), offset))
    }

    /// Retires the note with Missed judgments if it has expired.
    pub fn expire(&mut self, window: &JudgeWindow, policy: LongMissPolicy) -> Vec<JudgeEvent> {
        if self.is_retired() || !self.is_expired(window) {
            return Vec::new();
        }
        let head_offset = self.lifetime_ms;
        let tail_offset = self.lifetime_ms + self.duration_ms;
        let mut events = Vec::with_capacity(2);

        match self.kind {
            NoteKind::Short => {
                events.push(self.judge(JudgePoint::Head, Judgment::Missed, head_offset));
            }
            NoteKind::Long if !self.head_judged => {
                events.push(self.judge(JudgePoint::Head, Judgment::Missed, head_offset));
                if policy == LongMissPolicy::PerJudgePoint {
                    events.push(self.judge(JudgePoint::Tail, Judgment::Missed, tail_offset));
                }
            }
            NoteKind::Long => {
                if !self.tail_judged {
                    events.push(self.judge(JudgePoint::Tail, Judgment::Missed, tail_offset));
                }
            }
        }

        self.head_judged = true;
        self.tail_judged = true;
        self.state = NoteState::Retired;
        events
    }

    /// Retires without judging. Used when a session stops.
    pub fn retire(&mut self) {
        self.state = NoteState::Retired;
    }

    fn judge(&self, point: JudgePoint, judgment: Judgment, accuracy_ms: f64) -> JudgeEvent {
        JudgeEvent {
            note_index: self.note_index,
            point,
            judgment,
            accuracy_ms,
        }
    }
}
