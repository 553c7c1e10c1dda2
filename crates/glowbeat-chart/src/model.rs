use serde::{Deserialize, Serialize};

use crate::convert::NoteConverter;
use crate::hit_object::HitObject;
use crate::note::CanonicalNote;
use crate::timing_point::TimingPoint;

/// Slider multiplier used when `[Difficulty]` does not set one.
pub const DEFAULT_SLIDER_MULTIPLIER: f32 = 1.4;

/// Descriptive fields from `[General]` and `[Metadata]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartMetadata {
    pub title: String,
    pub title_unicode: String,
    pub artist: String,
    pub creator: String,
    /// Difficulty name
    pub version: String,
    pub audio_filename: String,
    pub audio_lead_in: i32,
    pub preview_time: i32,
    pub mode: i32,
}

/// Parsed chart document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartDocument {
    /// `osu file format vN`, 0 when the header line is absent
    pub format_version: i32,
    pub metadata: ChartMetadata,

    // Difficulty
    pub slider_multiplier: f32,
    pub slider_tick_rate: f32,
    pub hp_drain_rate: f32,
    pub circle_size: f32,
    pub overall_difficulty: f32,
    pub approach_rate: f32,

    /// Tempo of the first uninherited timing point, 0 until one is seen
    pub global_bpm: f64,
    pub timing_points: Vec<TimingPoint>,
    /// Hit objects in file order
    pub hit_objects: Vec<HitObject>,

    /// Lowercase hex SHA-256 of the source bytes (empty when parsed from text)
    pub sha256: String,
}

impl Default for ChartDocument {
    fn default() -> Self {
        Self {
            format_version: 0,
            metadata: ChartMetadata::default(),
            slider_multiplier: DEFAULT_SLIDER_MULTIPLIER,
            slider_tick_rate: 1.0,
            hp_drain_rate: 5.0,
            circle_size: 5.0,
            overall_difficulty: 5.0,
            approach_rate: 5.0,
            global_bpm: 0.0,
            timing_points: Vec::new(),
            hit_objects: Vec::new(),
            sha256: String::new(),
        }
    }
}

impl ChartDocument {
    /// Converts the hit objects into the time-ordered gameplay note list.
    pub fn build_notes(&self) -> Vec<CanonicalNote> {
        NoteConverter::convert(self)
    }

    /// Records the first usable tempo; later timing points never override it.
    pub(crate) fn offer_timing_point(&mut self, tp: TimingPoint) {
        if self.global_bpm == 0.0
            && let Some(bpm) = tp.bpm()
        {
            self.global_bpm = bpm;
        }
        self.timing_points.push(tp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let doc = ChartDocument::default();
        assert_eq!(doc.slider_multiplier, DEFAULT_SLIDER_MULTIPLIER);
        assert_eq!(doc.global_bpm, 0.0);
        assert!(doc.hit_objects.is_empty());
    }

    #[test]
    fn first_uninherited_timing_point_wins() {
        let mut doc = ChartDocument::default();
        let mut inherited = TimingPoint::new(0.0, -50.0);
        inherited.uninherited = false;
        doc.offer_timing_point(inherited);
        assert_eq!(doc.global_bpm, 0.0);

        doc.offer_timing_point(TimingPoint::new(100.0, 500.0));
        doc.offer_timing_point(TimingPoint::new(5000.0, 250.0));
        assert_eq!(doc.global_bpm, 120.0);
        assert_eq!(doc.timing_points.len(), 3);
    }
}
