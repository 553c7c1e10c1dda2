use std::ops::Range;

use glowbeat_chart::CanonicalNote;

/// Lead-time lookahead over the canonical note list.
///
/// `next_index` only moves forward: every note is activated exactly once and
/// each tick costs O(1) amortized.
#[derive(Debug, Clone)]
pub struct NoteScheduler {
    notes: Vec<CanonicalNote>,
    next_index: usize,
    lead_time_ms: f64,
    offset_ms: f64,
}

impl NoteScheduler {
    pub fn new(notes: Vec<CanonicalNote>, lead_time_ms: f64, offset_ms: f64) -> Self {
        Self {
            notes,
            next_index: 0,
            lead_time_ms,
            offset_ms,
        }
    }

    pub fn notes(&self) -> &[CanonicalNote] {
        &self.notes
    }

    pub fn note(&self, index: usize) -> Option<&CanonicalNote> {
        self.notes.get(index)
    }

    pub fn next_index(&self) -> usize {
        self.next_index
    }

    pub fn is_exhausted(&self) -> bool {
        self.next_index >= self.notes.len()
    }

    pub fn offset_ms(&self) -> f64 {
        self.offset_ms
    }

    /// Activates every note already due at position 0.
    pub fn catch_up(&mut self) -> Range<usize> {
        self.tick(0.0)
    }

    /// Returns the indices of notes that become active at `position_ms`:
    /// those with `lead_time >= time - position + offset`.
    pub fn tick(&mut self, position_ms: f64) -> Range<usize> {
        let start = self.next_index;
        while let Some(note) = self.notes.get(self.next_index) {
            if self.lead_time_ms < note.time_ms - position_ms + self.offset_ms {
                break;
            }
            self.next_index += 1;
        }
        start..self.next_index
    }
}
