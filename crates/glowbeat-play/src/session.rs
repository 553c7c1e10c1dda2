//! Play session context.
//!
//! A `PlaySession` is the single writer for scheduler, judge and score state.
//! Hosts that deliver input on another thread push through an `InputSender`;
//! the queue is drained at the start of every tick, and each event is applied
//! at the playback position it was stamped with.

use std::ops::Range;

use glowbeat_chart::CanonicalNote;
use glowbeat_rule::{JudgeEvent, PlayResult, ScoreEngine, ScoreState};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PlayConfig;
use crate::input::{InputKind, InputReceiver, InputSender, input_channel};
use crate::judge::NoteJudge;
use crate::scheduler::NoteScheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SessionState {
    Ready,
    Playing,
    Stopped,
}

/// Output for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PlayEvent {
    NoteActivated {
        note_index: usize,
        note: CanonicalNote,
    },
    NoteJudged(JudgeEvent),
    /// Emitted once after any batch of judgments that changed the score
    ScoreChanged(ScoreState),
}

#[derive(Debug)]
pub struct PlaySession {
    config: PlayConfig,
    scheduler: NoteScheduler,
    judge: NoteJudge,
    score: ScoreEngine,
    inputs: InputReceiver,
    state: SessionState,
    position_ms: f64,
}

impl PlaySession {
    pub fn new(notes: Vec<CanonicalNote>, config: PlayConfig) -> (Self, InputSender) {
        let (sender, inputs) = input_channel(config.input_queue_capacity);
        let session = Self {
            scheduler: NoteScheduler::new(notes, config.lead_time_ms, config.offset_ms),
            judge: NoteJudge::new(config.judge, config.long_note_miss),
            score: ScoreEngine::new(config.score.clone()),
            inputs,
            state: SessionState::Ready,
            position_ms: 0.0,
            config,
        };
        (session, sender)
    }

    pub fn config(&self) -> &PlayConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn position_ms(&self) -> f64 {
        self.position_ms
    }

    pub fn scheduler(&self) -> &NoteScheduler {
        &self.scheduler
    }

    pub fn judge(&self) -> &NoteJudge {
        &self.judge
    }

    pub fn snapshot(&self) -> ScoreState {
        self.score.state().clone()
    }

    /// Every note has been activated and none remain active.
    pub fn is_complete(&self) -> bool {
        self.scheduler.is_exhausted() && self.judge.active_count() == 0
    }

    /// Starts play at position 0, activating every note already due.
    pub fn start(&mut self) -> Vec<PlayEvent> {
        if self.state != SessionState::Ready {
            return Vec::new();
        }
        let stale = self.inputs.drain().len();
        if stale > 0 {
            debug!("Discarding {stale} inputs received before start");
        }
        self.state = SessionState::Playing;
        info!(
            "Session started: {} notes, lead {}ms, offset {}ms",
            self.scheduler.notes().len(),
            self.config.lead_time_ms,
            self.config.offset_ms
        );

        let mut events = Vec::new();
        let due = self.scheduler.catch_up();
        self.activate(due, &mut events);
        let missed = self.judge.advance(0.0);
        self.record(missed, &mut events);
        self.push_score(&mut events);
        events
    }

    /// One simulation tick: applies queued inputs in arrival order, then
    /// moves to `position_ms`.
    pub fn tick(&mut self, position_ms: f64) -> Vec<PlayEvent> {
        if self.state != SessionState::Playing {
            return Vec::new();
        }
        let target = self.clamp_position(position_ms);
        let mut events = Vec::new();

        for input in self.inputs.drain() {
            // Inputs stamped past the tick are applied at the tick position
            let at = input.position_ms.min(target);
            self.handle_input(input.kind, at, &mut events);
        }
        self.advance_to(target, &mut events);
        self.push_score(&mut events);
        events
    }

    /// Applies one input synchronously, for hosts that own the session on the
    /// same thread that receives input.
    pub fn apply_input(&mut self, kind: InputKind, position_ms: f64) -> Vec<PlayEvent> {
        if self.state != SessionState::Playing {
            return Vec::new();
        }
        let mut events = Vec::new();
        self.handle_input(kind, position_ms, &mut events);
        self.push_score(&mut events);
        events
    }

    /// Retires all active notes without touching the score. Later ticks and
    /// inputs are ignored. Returns the number of notes retired.
    pub fn stop(&mut self) -> usize {
        if self.state == SessionState::Stopped {
            return 0;
        }
        self.state = SessionState::Stopped;
        let retired = self.judge.retire_all();
        let dropped = self.inputs.drain().len();
        info!(
            "Session stopped at {:.1}ms: {retired} active notes retired, {dropped} pending inputs dropped",
            self.position_ms
        );
        retired
    }

    /// Stops the session and returns its results.
    pub fn finish(&mut self) -> PlayResult {
        self.stop();
        let result = self.result();
        info!(
            "Session finished: score {}, {:.1}% hit, rank {}",
            result.final_score, result.percent_hit, result.rank
        );
        result
    }

    pub fn result(&self) -> PlayResult {
        self.score
            .result(self.scheduler.notes().len(), self.config.total_notes)
    }

    fn handle_input(&mut self, kind: InputKind, position_ms: f64, events: &mut Vec<PlayEvent>) {
        let at = self.clamp_position(position_ms);
        self.advance_to(at, events);
        let judged = match kind {
            InputKind::Tap => self.judge.tap(),
            InputKind::HoldStart => self.judge.hold_start(),
            InputKind::HoldEnd => self.judge.hold_end(),
        };
        match judged {
            Some(ev) => self.record(vec![ev], events),
            None => debug!("{kind} at {at:.1}ms matched no note"),
        }
    }

    /// Activates newly due notes, then expires overdue ones.
    fn advance_to(&mut self, position_ms: f64, events: &mut Vec<PlayEvent>) {
        self.position_ms = position_ms;
        let due = self.scheduler.tick(position_ms);
        self.activate(due, events);
        let missed = self.judge.advance(position_ms);
        self.record(missed, events);
    }

    fn activate(&mut self, due: Range<usize>, events: &mut Vec<PlayEvent>) {
        let offset = self.scheduler.offset_ms();
        for note_index in due {
            let Some(&note) = self.scheduler.note(note_index) else {
                continue;
            };
            self.judge.activate(note_index, &note, offset);
            events.push(PlayEvent::NoteActivated { note_index, note });
        }
    }

    fn record(&mut self, judged: Vec<JudgeEvent>, events: &mut Vec<PlayEvent>) {
        for ev in judged {
            self.score.apply(ev.judgment);
            events.push(PlayEvent::NoteJudged(ev));
        }
    }

    fn push_score(&self, events: &mut Vec<PlayEvent>) {
        if events.iter().any(|e| matches!(e, PlayEvent::NoteJudged(_))) {
            events.push(PlayEvent::ScoreChanged(self.snapshot()));
        }
    }

    /// Positions never run backwards. NaN is treated as no movement.
    fn clamp_position(&self, position_ms: f64) -> f64 {
        if position_ms >= self.position_ms {
            position_ms
        } else {
            if !position_ms.is_nan() && self.position_ms - position_ms > 1.0 {
                warn!(
                    "Playback position went backwards ({:.1}ms -> {:.1}ms), holding",
                    self.position_ms, position_ms
                );
            }
            self.position_ms
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glowbeat_rule::{JudgePoint, Judgment, LongMissPolicy};

    fn config() -> PlayConfig {
        PlayConfig {
            offset_ms: 0.0,
            ..Default::default()
        }
    }

    fn judged(events: &[PlayEvent]) -> Vec<JudgeEvent> {
        events
            .iter()
            .filter_map(|e| match e {
                PlayEvent::NoteJudged(j) => Some(*j),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn start_catches_up() {
        let notes = vec![CanonicalNote::short(1000.0), CanonicalNote::short(5000.0)];
        let (mut s, _tx) = PlaySession::new(notes, config());
        let events = s.start();
        assert_eq!(
            events,
            vec![PlayEvent::NoteActivated {
                note_index: 0,
                note: CanonicalNote::short(1000.0)
            }]
        );
        assert_eq!(s.state(), SessionState::Playing);
        assert!(s.start().is_empty());
    }

    #[test]
    fn ticks_before_start_do_nothing() {
        let (mut s, _tx) = PlaySession::new(vec![CanonicalNote::short(0.0)], config());
        assert!(s.tick(1000.0).is_empty());
        assert_eq!(s.judge().active_count(), 0);
    }

    #[test]
    fn queued_tap_judged_at_its_timestamp() {
        let (mut s, tx) = PlaySession::new(vec![CanonicalNote::short(1000.0)], config());
        s.start();
        s.tick(900.0);
        // Arrived at 1010ms, processed at the 1100ms tick
        tx.send(InputKind::Tap, 1010.0).unwrap();
        let events = s.tick(1100.0);
        let j = judged(&events);
        assert_eq!(j.len(), 1);
        assert_eq!(j[0].accuracy_ms, -10.0);
        assert_eq!(j[0].judgment, Judgment::Perfect);
        assert!(matches!(events.last(), Some(PlayEvent::ScoreChanged(_))));
        assert_eq!(s.snapshot().perfect_hits, 1);
    }

    #[test]
    fn input_after_expiry_instant_cannot_hit() {
        let (mut s, tx) = PlaySession::new(vec![CanonicalNote::short(1000.0)], config());
        s.start();
        s.tick(1000.0);
        tx.send(InputKind::Tap, 1450.0).unwrap();
        let j = judged(&s.tick(1500.0));
        assert_eq!(j.len(), 1);
        assert_eq!(j[0].judgment, Judgment::Missed);
        assert_eq!(s.snapshot().missed_hits, 1);
        assert_eq!(s.snapshot().total_hits(), 0);
    }

    #[test]
    fn apply_input_synchronously() {
        let (mut s, _tx) = PlaySession::new(vec![CanonicalNote::long(1000.0, 500.0)], config());
        s.start();
        let head = judged(&s.apply_input(InputKind::HoldStart, 1000.0));
        assert_eq!(head[0].point, JudgePoint::Head);
        let tail = judged(&s.apply_input(InputKind::HoldEnd, 1500.0));
        assert_eq!(tail[0].point, JudgePoint::Tail);
        assert_eq!(s.snapshot().perfect_hits, 2);
        assert!(s.is_complete());
    }

    #[test]
    fn stop_retires_without_scoring() {
        let notes = vec![CanonicalNote::short(1000.0), CanonicalNote::long(1200.0, 800.0)];
        let (mut s, tx) = PlaySession::new(notes, config());
        s.start();
        assert_eq!(s.stop(), 2);
        let before = s.snapshot();

        tx.send(InputKind::Tap, 1000.0).unwrap();
        assert!(s.tick(10_000.0).is_empty());
        assert!(s.apply_input(InputKind::Tap, 10_000.0).is_empty());
        assert_eq!(s.snapshot(), before);
        assert_eq!(s.stop(), 0);
    }

    #[test]
    fn position_never_runs_backwards() {
        let (mut s, _tx) = PlaySession::new(vec![CanonicalNote::short(1000.0)], config());
        s.start();
        s.tick(1300.0);
        s.tick(200.0);
        assert_eq!(s.position_ms(), 1300.0);
        s.tick(f64::NAN);
        assert_eq!(s.position_ms(), 1300.0);
    }

    #[test]
    fn per_point_policy_reaches_session() {
        let cfg = PlayConfig {
            long_note_miss: LongMissPolicy::PerJudgePoint,
            ..config()
        };
        let (mut s, _tx) = PlaySession::new(vec![CanonicalNote::long(100.0, 100.0)], cfg);
        s.start();
        s.tick(5000.0);
        assert_eq!(s.snapshot().missed_hits, 2);
        let result = s.finish();
        assert_eq!(result.missed_hits, 2);
        assert_eq!(result.percent_hit, 0.0);
    }
}
