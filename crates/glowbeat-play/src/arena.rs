//! Arena of active notes indexed by min-heaps.
//!
//! Every active note's lifetime decreases at the same rate, so ordering by
//! absolute hit position is the same as ordering by remaining lifetime and heap
//! keys never change. Entries are invalidated lazily: a retired or re-queued
//! note leaves a stale entry behind, which is discarded when it reaches the top.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glowbeat_chart::NoteKind;
use glowbeat_rule::{ActiveNote, NoteState};

/// Generational index into the arena. A handle to a removed note never
/// resolves, even after its slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Queue {
    /// Short notes awaiting a tap, by hit position
    Short,
    /// Long notes awaiting hold start, by hit position
    LongHead,
    /// Long notes being held, by end position
    Held,
    /// Long notes not yet retired, by end position
    LongEnd,
}

#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    key_ms: f64,
    seq: u64,
    handle: NoteHandle,
}

// Reversed so BinaryHeap pops the smallest key; ties go to the earlier insertion.
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key_ms
            .total_cmp(&self.key_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    note: Option<ActiveNote>,
}

#[derive(Debug, Clone, Default)]
pub struct ActiveNoteArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
    seq: u64,
    short: BinaryHeap<HeapEntry>,
    long_head: BinaryHeap<HeapEntry>,
    held: BinaryHeap<HeapEntry>,
    long_end: BinaryHeap<HeapEntry>,
}

impl ActiveNoteArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stores `note` and queues it by kind: short notes for taps, long notes
    /// for hold start and expiry.
    pub fn insert(&mut self, note: ActiveNote) -> NoteHandle {
        let kind = note.kind();
        let hit_time = note.hit_time_ms();
        let end_time = note.end_hit_time_ms();

        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.note = Some(note);
                NoteHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    note: Some(note),
                });
                NoteHandle {
                    index,
                    generation: 0,
                }
            }
        };
        self.len += 1;

        match kind {
            NoteKind::Short => self.push(Queue::Short, hit_time, handle),
            NoteKind::Long => {
                self.push(Queue::LongHead, hit_time, handle);
                self.push(Queue::LongEnd, end_time, handle);
            }
        }
        handle
    }

    /// `None` once the note behind `handle` has been removed.
    pub fn get(&self, handle: NoteHandle) -> Option<&ActiveNote> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.note.as_ref()
    }

    pub fn get_mut(&mut self, handle: NoteHandle) -> Option<&mut ActiveNote> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.note.as_mut()
    }

    /// Frees the slot. Queue entries for the note become stale and are skipped.
    pub fn remove(&mut self, handle: NoteHandle) -> Option<ActiveNote> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let note = slot.note.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.len -= 1;
        Some(note)
    }

    /// Queues a long note whose hold has started for hold-end lookup. Held
    /// notes are keyed by their tail, so a release goes to the note ending first.
    pub fn mark_held(&mut self, handle: NoteHandle) {
        if let Some(end_time) = self.get(handle).map(ActiveNote::end_hit_time_ms) {
            self.push(Queue::Held, end_time, handle);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveNote> {
        self.slots.iter().filter_map(|s| s.note.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ActiveNote> {
        self.slots.iter_mut().filter_map(|s| s.note.as_mut())
    }

    /// Empties the arena, returning every live note.
    pub fn drain(&mut self) -> Vec<ActiveNote> {
        let notes: Vec<ActiveNote> = self
            .slots
            .iter_mut()
            .filter_map(|s| {
                let note = s.note.take();
                if note.is_some() {
                    s.generation = s.generation.wrapping_add(1);
                }
                note
            })
            .collect();
        self.free = (0..self.slots.len() as u32).rev().collect();
        self.len = 0;
        self.short.clear();
        self.long_head.clear();
        self.held.clear();
        self.long_end.clear();
        notes
    }

    /// Earliest note in `queue` that still qualifies for it.
    pub(crate) fn peek(&mut self, queue: Queue) -> Option<NoteHandle> {
        loop {
            let handle = self.heap(queue).peek()?.handle;
            if self.qualifies(queue, handle) {
                return Some(handle);
            }
            self.heap_mut(queue).pop();
        }
    }

    fn qualifies(&self, queue: Queue, handle: NoteHandle) -> bool {
        let Some(note) = self.get(handle) else {
            return false;
        };
        match queue {
            Queue::Short | Queue::LongHead => note.state() == NoteState::Activated,
            Queue::Held => note.state() == NoteState::Held,
            Queue::LongEnd => !note.is_retired(),
        }
    }

    fn push(&mut self, queue: Queue, key_ms: f64, handle: NoteHandle) {
        let seq = self.seq;
        self.seq += 1;
        self.heap_mut(queue).push(HeapEntry {
            key_ms,
            seq,
            handle,
        });
    }

    fn heap(&self, queue: Queue) -> &BinaryHeap<HeapEntry> {
        match queue {
            Queue::Short => &self.short,
            Queue::LongHead => &self.long_head,
            Queue::Held => &self.held,
            Queue::LongEnd => &self.long_end,
        }
    }

    fn heap_mut(&mut self, queue: Queue) -> &mut BinaryHeap<HeapEntry> {
        match queue {
            Queue::Short => &mut self.short,
            Queue::LongHead => &mut self.long_head,
            Queue::Held => &mut self.held,
            Queue::LongEnd => &mut self.long_end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glowbeat_chart::CanonicalNote;

    fn short(index: usize, time: f64) -> ActiveNote {
        ActiveNote::activate(index, &CanonicalNote::short(time), 0.0, 0.0)
    }

    fn long(index: usize, time: f64, duration: f64) -> ActiveNote {
        ActiveNote::activate(index, &CanonicalNote::long(time, duration), 0.0, 0.0)
    }

    #[test]
    fn peek_returns_earliest_short() {
        let mut arena = ActiveNoteArena::new();
        arena.insert(short(0, 1500.0));
        let early = arena.insert(short(1, 1000.0));
        arena.insert(long(2, 500.0, 100.0));

        assert_eq!(arena.peek(Queue::Short), Some(early));
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn equal_times_keep_insertion_order() {
        let mut arena = ActiveNoteArena::new();
        let first = arena.insert(short(0, 1000.0));
        arena.insert(short(1, 1000.0));
        assert_eq!(arena.peek(Queue::Short), Some(first));
    }

    #[test]
    fn removed_entries_are_skipped() {
        let mut arena = ActiveNoteArena::new();
        let a = arena.insert(short(0, 1000.0));
        let b = arena.insert(short(1, 2000.0));
        assert_eq!(arena.remove(a).map(|n| n.note_index()), Some(0));
        assert_eq!(arena.peek(Queue::Short), Some(b));
        assert!(arena.remove(a).is_none());
    }

    #[test]
    fn stale_handle_after_slot_reuse() {
        let mut arena = ActiveNoteArena::new();
        let a = arena.insert(short(0, 1000.0));
        arena.remove(a);
        let b = arena.insert(short(1, 3000.0));
        assert_ne!(a, b);
        assert!(arena.get(a).is_none());
        assert_eq!(arena.get(b).map(ActiveNote::note_index), Some(1));
        assert_eq!(arena.peek(Queue::Short), Some(b));
    }

    #[test]
    fn long_notes_move_from_head_to_held_queue() {
        let mut arena = ActiveNoteArena::new();
        let h = arena.insert(long(0, 1000.0, 2000.0));
        assert_eq!(arena.peek(Queue::LongHead), Some(h));
        assert_eq!(arena.peek(Queue::Held), None);
        assert_eq!(arena.peek(Queue::LongEnd), Some(h));

        let window = glowbeat_rule::JudgeWindow::default();
        let note = arena.get_mut(h).unwrap();
        note.advance(1000.0);
        assert!(note.hold_start(&window).is_some());
        arena.mark_held(h);

        assert_eq!(arena.peek(Queue::LongHead), None);
        assert_eq!(arena.peek(Queue::Held), Some(h));
    }

    #[test]
    fn held_queue_orders_by_end_time() {
        let window = glowbeat_rule::JudgeWindow::default();
        let mut arena = ActiveNoteArena::new();
        let outer = arena.insert(long(0, 1000.0, 2000.0));
        let inner = arena.insert(long(1, 1200.0, 300.0));
        for h in [outer, inner] {
            let note = arena.get_mut(h).unwrap();
            note.advance(1200.0);
            assert!(note.hold_start(&window).is_some());
            arena.mark_held(h);
        }
        assert_eq!(arena.peek(Queue::Held), Some(inner));
        arena.remove(inner);
        assert_eq!(arena.peek(Queue::Held), Some(outer));
    }

    #[test]
    fn long_end_orders_by_end_time() {
        let mut arena = ActiveNoteArena::new();
        arena.insert(long(0, 1000.0, 5000.0));
        let b = arena.insert(long(1, 2000.0, 500.0));
        assert_eq!(arena.peek(Queue::LongEnd), Some(b));
    }

    #[test]
    fn drain_empties_everything() {
        let mut arena = ActiveNoteArena::new();
        let a = arena.insert(short(0, 1000.0));
        arena.insert(long(1, 2000.0, 500.0));
        let drained = arena.drain();
        assert_eq!(drained.len(), 2);
        assert!(arena.is_empty());
        assert!(arena.get(a).is_none());
        assert_eq!(arena.peek(Queue::Short), None);
        assert_eq!(arena.peek(Queue::LongEnd), None);
        // Slots are reusable afterwards
        arena.insert(short(2, 3000.0));
        assert_eq!(arena.len(), 1);
    }
}
