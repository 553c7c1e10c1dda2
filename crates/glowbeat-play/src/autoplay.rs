//! Input scripts for a simulated player.

use glowbeat_chart::{CanonicalNote, NoteKind};

use crate::input::{InputEvent, InputKind};

/// Inputs a perfect player would produce: a tap at each short note, a hold
/// from head to end for each long note, all shifted by `jitter_ms`
/// (positive = late). Sorted by position; simultaneous inputs keep note order.
pub fn script(notes: &[CanonicalNote], offset_ms: f64, jitter_ms: f64) -> Vec<InputEvent> {
    let shift = offset_ms + jitter_ms;
    let mut inputs = Vec::with_capacity(notes.len() * 2);
    for note in notes {
        let at = note.time_ms + shift;
        match note.kind {
            NoteKind::Short => inputs.push(InputEvent {
                kind: InputKind::Tap,
                position_ms: at,
            }),
            NoteKind::Long => {
                inputs.push(InputEvent {
                    kind: InputKind::HoldStart,
                    position_ms: at,
                });
                inputs.push(InputEvent {
                    kind: InputKind::HoldEnd,
                    position_ms: note.end_time_ms() + shift,
                });
            }
        }
    }
    inputs.sort_by(|a, b| a.position_ms.total_cmp(&b.position_ms));
    inputs
}

/// Playback position by which every note in `notes` has been judged or expired.
pub fn session_end_ms(notes: &[CanonicalNote], offset_ms: f64, miss_window_ms: f64) -> f64 {
    let last = notes
        .iter()
        .map(CanonicalNote::end_time_ms)
        .fold(0.0, f64::max);
    last + offset_ms.max(0.0) + miss_window_ms + 1.0
}
