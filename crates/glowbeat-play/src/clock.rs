use crate::input::{InputEvent, InputSender};
use crate::session::{PlayEvent, PlaySession};

/// Playback feed from the audio collaborator. Reads must not block.
pub trait PlaybackClock {
    /// Current playback position in milliseconds, monotonic while playing
    fn position_ms(&self) -> f64;
    fn is_playing(&self) -> bool;
}

/// A clock the host advances by hand. Stops by itself at `end_ms`.
#[derive(Debug, Clone)]
pub struct ManualClock {
    position_ms: f64,
    end_ms: f64,
    playing: bool,
}

impl ManualClock {
    pub fn new(end_ms: f64) -> Self {
        Self {
            position_ms: 0.0,
            end_ms,
            playing: false,
        }
    }

    pub fn play(&mut self) {
        self.playing = self.position_ms < self.end_ms;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Moves forward by `delta_ms` while playing.
    pub fn advance(&mut self, delta_ms: f64) {
        if !self.playing {
            return;
        }
        self.position_ms = (self.position_ms + delta_ms.max(0.0)).min(self.end_ms);
        if self.position_ms >= self.end_ms {
            self.playing = false;
        }
    }
}

impl PlaybackClock for ManualClock {
    fn position_ms(&self) -> f64 {
        self.position_ms
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

/// Fixed-step accumulator decoupling the simulation tick from the frame rate.
#[derive(Debug, Clone)]
pub struct FixedStep {
    step_ms: f64,
    accumulator_ms: f64,
}

impl FixedStep {
    pub fn new(tick_rate_hz: u32) -> Self {
        Self {
            step_ms: 1000.0 / f64::from(tick_rate_hz.max(1)),
            accumulator_ms: 0.0,
        }
    }

    pub fn step_ms(&self) -> f64 {
        self.step_ms
    }

    /// Adds a frame's elapsed time and returns how many whole ticks are due.
    pub fn accumulate(&mut self, frame_ms: f64) -> u32 {
        self.accumulator_ms += frame_ms.max(0.0);
        let ticks = (self.accumulator_ms / self.step_ms).floor();
        self.accumulator_ms -= ticks * self.step_ms;
        ticks as u32
    }
}

/// Drives `session` at its configured tick rate until `clock` stops, feeding
/// `script` inputs through `sender` once the clock reaches their timestamps.
/// `script` must be sorted by position. The session is left running; call
/// `finish` for results.
pub fn run_to_end(
    session: &mut PlaySession,
    clock: &mut ManualClock,
    sender: &InputSender,
    script: &[InputEvent],
) -> Vec<PlayEvent> {
    let step_ms = FixedStep::new(session.config().tick_rate_hz).step_ms();
    let mut events = session.start();
    let mut next_input = 0;
    clock.play();

    while clock.is_playing() {
        clock.advance(step_ms);
        let now = clock.position_ms();

        while let Some(input) = script.get(next_input) {
            if input.position_ms > now {
                break;
            }
            // A full queue drops the event, as on real hardware
            let _ = sender.send(input.kind, input.position_ms);
            next_input += 1;
        }
        events.extend(session.tick(now));
    }
    events
}
