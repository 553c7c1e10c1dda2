use glowbeat_chart::CanonicalNote;
use glowbeat_rule::{ActiveNote, JudgeEvent, JudgeWindow, LongMissPolicy};
use tracing::debug;

use crate::arena::{ActiveNoteArena, NoteHandle, Queue};

/// Owns the active notes and routes time and input to them.
///
/// Inputs carry no note identity: a tap judges the pressable short note with
/// the smallest remaining lifetime, hold start the earliest pressable long
/// note, hold end the held note whose tail is due first. At most one note
/// per input.
#[derive(Debug, Clone)]
pub struct NoteJudge {
    arena: ActiveNoteArena,
    window: JudgeWindow,
    policy: LongMissPolicy,
    position_ms: f64,
}

impl NoteJudge {
    pub fn new(window: JudgeWindow, policy: LongMissPolicy) -> Self {
        Self {
            arena: ActiveNoteArena::new(),
            window,
            policy,
            position_ms: 0.0,
        }
    }

    pub fn window(&self) -> &JudgeWindow {
        &self.window
    }

    pub fn position_ms(&self) -> f64 {
        self.position_ms
    }

    pub fn active_count(&self) -> usize {
        self.arena.len()
    }

    pub fn active_notes(&self) -> impl Iterator<Item = &ActiveNote> {
        self.arena.iter()
    }

    pub fn get(&self, handle: NoteHandle) -> Option<&ActiveNote> {
        self.arena.get(handle)
    }

    /// Adds a newly scheduled note, its lifetime measured from the current position.
    pub fn activate(
        &mut self,
        note_index: usize,
        note: &CanonicalNote,
        offset_ms: f64,
    ) -> NoteHandle {
        let active = ActiveNote::activate(note_index, note, offset_ms, self.position_ms);
        self.arena.insert(active)
    }

    /// Moves the clock to `position_ms` and retires every note that expired
    /// on the way, returning their Missed judgments in expiry order.
    pub fn advance(&mut self, position_ms: f64) -> Vec<JudgeEvent> {
        self.position_ms = position_ms;
        for note in self.arena.iter_mut() {
            note.advance(position_ms);
        }

        let mut events = Vec::new();
        self.expire_queue(Queue::Short, &mut events);
        self.expire_queue(Queue::LongEnd, &mut events);
        events
    }

    /// Heads of both queues are the earliest to expire, so stop at the first live one.
    fn expire_queue(&mut self, queue: Queue, events: &mut Vec<JudgeEvent>) {
        while let Some(handle) = self.arena.peek(queue) {
            let Some(note) = self.arena.get_mut(handle) else {
                break;
            };
            if !note.is_expired(&self.window) {
                break;
            }
            let missed = note.expire(&self.window, self.policy);
            for ev in &missed {
                debug!("Note {} {:?} missed ({:.1}ms)", ev.note_index, ev.point, ev.accuracy_ms);
            }
            events.extend(missed);
            self.arena.remove(handle);
        }
    }

    /// Judges the pressable short note closest to its hit time. `None` when
    /// nothing is pressable.
    pub fn tap(&mut self) -> Option<JudgeEvent> {
        let handle = self.arena.peek(Queue::Short)?;
        let event = self.arena.get_mut(handle)?.press(&self.window)?;
        self.arena.remove(handle);
        log_judgment(&event);
        Some(event)
    }

    /// Judges the head of the earliest pressable long note and starts holding it.
    pub fn hold_start(&mut self) -> Option<JudgeEvent> {
        let handle = self.arena.peek(Queue::LongHead)?;
        let event = self.arena.get_mut(handle)?.hold_start(&self.window)?;
        self.arena.mark_held(handle);
        log_judgment(&event);
        Some(event)
    }

    /// Judges the tail of the held long note that ends first.
    pub fn hold_end(&mut self) -> Option<JudgeEvent> {
        let handle = self.arena.peek(Queue::Held)?;
        let event = self.arena.get_mut(handle)?.hold_end(&self.window)?;
        self.arena.remove(handle);
        log_judgment(&event);
        Some(event)
    }

    /// Retires every active note without judging. Returns how many were retired.
    pub fn retire_all(&mut self) -> usize {
        let mut notes = self.arena.drain();
        for note in &mut notes {
            note.retire();
        }
        notes.len()
    }
}

fn log_judgment(event: &JudgeEvent) {
    debug!(
        "Note {} {:?} judged {:?} ({:+.1}ms)",
        event.note_index, event.point, event.judgment, event.accuracy_ms
    );
}
