use serde::{Deserialize, Serialize};

/// One `[TimingPoints]` record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingPoint {
    /// Start time in milliseconds
    pub time: f64,
    /// Milliseconds per beat for uninherited points; negative slider velocity
    /// percentage for inherited ones
    pub beat_length: f64,
    pub meter: i32,
    pub sample_set: i32,
    pub sample_index: i32,
    pub volume: i32,
    pub uninherited: bool,
    pub effects: i32,
}

impl TimingPoint {
    pub fn new(time: f64, beat_length: f64) -> Self {
        Self {
            time,
            beat_length,
            meter: 4,
            sample_set: 0,
            sample_index: 0,
            volume: 100,
            uninherited: true,
            effects: 0,
        }
    }

    /// BPM of an uninherited point with a positive beat length.
    pub fn bpm(&self) -> Option<f64> {
        (self.uninherited && self.beat_length > 0.0).then(|| 60000.0 / self.beat_length)
    }
}
