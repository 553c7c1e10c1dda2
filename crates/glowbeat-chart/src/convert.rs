use crate::hit_object::HitObjectKind;
use crate::model::ChartDocument;
use crate::note::CanonicalNote;

/// Slider length (osu!pixels) covered by one beat at slider multiplier 1.0.
/// Fixed by the chart format.
pub const BASE_SCORING_DISTANCE: f64 = 100.0;

/// Beat length used when the chart carries no usable tempo (120 BPM).
pub const DEFAULT_BEAT_LENGTH_MS: f64 = 500.0;

/// Hit object to canonical note conversion
pub struct NoteConverter;

impl NoteConverter {
    /// Flattens hit objects into short/long notes, stable-sorted by time.
    ///
    /// Multi-slide sliders emit a long note spanning every slide plus one short
    /// checkpoint at each reverse point. Those checkpoints are appended out of
    /// order, hence the sort.
    pub fn convert(doc: &ChartDocument) -> Vec<CanonicalNote> {
        let beat_length = Self::beat_length(doc);
        let mut notes = Vec::with_capacity(doc.hit_objects.len());

        for obj in &doc.hit_objects {
            let time = f64::from(obj.time);
            match &obj.kind {
                HitObjectKind::Circle { .. } => notes.push(CanonicalNote::short(time)),
                HitObjectKind::Spinner { end_time, .. }
                | HitObjectKind::ManiaHold { end_time, .. } => {
                    notes.push(CanonicalNote::long(time, f64::from(*end_time) - time));
                }
                HitObjectKind::Slider { slides, length, .. } => {
                    let single = Self::slide_duration(*length, doc.slider_multiplier, beat_length);
                    notes.push(CanonicalNote::long(time, single * f64::from(*slides)));
                    for i in 1..*slides {
                        notes.push(CanonicalNote::short(time + single * f64::from(i)));
                    }
                }
            }
        }

        // sort_by is stable: equal times keep insertion order
        notes.sort_by(|a, b| a.time_ms.total_cmp(&b.time_ms));
        notes
    }

    /// Milliseconds per beat from the global tempo, or the fallback.
    pub fn beat_length(doc: &ChartDocument) -> f64 {
        if doc.global_bpm > 0.0 {
            60000.0 / doc.global_bpm
        } else {
            DEFAULT_BEAT_LENGTH_MS
        }
    }

    /// Duration of one pass over a slider.
    pub fn slide_duration(length: f64, slider_multiplier: f32, beat_length: f64) -> f64 {
        (length / BASE_SCORING_DISTANCE) * f64::from(slider_multiplier) * beat_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit_object::{HitObject, HitObjectType};
    use crate::note::NoteKind;

    fn object(time: i32, kind: HitObjectKind) -> HitObject {
        let flag = match kind {
            HitObjectKind::Circle { .. } => HitObjectType::CIRCLE,
            HitObjectKind::Slider { .. } => HitObjectType::SLIDER,
            HitObjectKind::Spinner { .. } => HitObjectType::SPINNER,
            HitObjectKind::ManiaHold { .. } => HitObjectType::MANIA_HOLD,
        };
        HitObject {
            x: 0,
            y: 0,
            time,
            object_type: HitObjectType(flag),
            hit_sound: 0,
            kind,
        }
    }

    fn circle(time: i32) -> HitObject {
        object(
            time,
            HitObjectKind::Circle {
                hit_sample: String::new(),
            },
        )
    }

    fn slider(time: i32, slides: u32, length: f64) -> HitObject {
        object(
            time,
            HitObjectKind::Slider {
                curve_type: 'L',
                curve_points: Vec::new(),
                slides,
                length,
                hit_sample: String::new(),
            },
        )
    }

    #[test]
    fn circle_and_two_slide_slider() {
        let doc = ChartDocument {
            global_bpm: 120.0,
            slider_multiplier: 1.0,
            hit_objects: vec![circle(1000), slider(2000, 2, 100.0)],
            ..Default::default()
        };
        let notes = NoteConverter::convert(&doc);
        assert_eq!(
            notes,
            vec![
                CanonicalNote::short(1000.0),
                CanonicalNote::long(2000.0, 1000.0),
                CanonicalNote::short(2500.0),
            ]
        );
    }

    #[test]
    fn spinner_and_mania_hold_become_long_notes() {
        let doc = ChartDocument {
            hit_objects: vec![
                object(
                    500,
                    HitObjectKind::Spinner {
                        end_time: 1500,
                        hit_sample: String::new(),
                    },
                ),
                object(
                    2000,
                    HitObjectKind::ManiaHold {
                        end_time: 2250,
                        hit_sample: String::new(),
                    },
                ),
            ],
            ..Default::default()
        };
        let notes = NoteConverter::convert(&doc);
        assert_eq!(notes[0], CanonicalNote::long(500.0, 1000.0));
        assert_eq!(notes[1], CanonicalNote::long(2000.0, 250.0));
    }

    #[test]
    fn extreme_end_times_do_not_overflow() {
        let doc = ChartDocument {
            hit_objects: vec![
                object(
                    i32::MIN,
                    HitObjectKind::Spinner {
                        end_time: i32::MAX,
                        hit_sample: String::new(),
                    },
                ),
                object(
                    i32::MAX,
                    HitObjectKind::ManiaHold {
                        end_time: i32::MIN,
                        hit_sample: String::new(),
                    },
                ),
            ],
            ..Default::default()
        };
        let notes = NoteConverter::convert(&doc);
        assert_eq!(notes[0].duration_ms, f64::from(i32::MAX) - f64::from(i32::MIN));
        assert_eq!(notes[1].duration_ms, f64::from(i32::MIN) - f64::from(i32::MAX));
    }

    #[test]
    fn missing_bpm_uses_fallback_beat_length() {
        let doc = ChartDocument {
            slider_multiplier: 1.0,
            hit_objects: vec![slider(0, 1, 200.0)],
            ..Default::default()
        };
        assert_eq!(NoteConverter::beat_length(&doc), DEFAULT_BEAT_LENGTH_MS);
        let notes = NoteConverter::convert(&doc);
        assert_eq!(notes, vec![CanonicalNote::long(0.0, 1000.0)]);
    }

    #[test]
    fn checkpoints_interleave_with_later_objects() {
        // 3 slides of 500ms each: checkpoints at 1500 and 2000, circle at 1200
        let doc = ChartDocument {
            global_bpm: 120.0,
            slider_multiplier: 1.0,
            hit_objects: vec![slider(1000, 3, 100.0), circle(1200), circle(2000)],
            ..Default::default()
        };
        let notes = NoteConverter::convert(&doc);
        let times: Vec<f64> = notes.iter().map(|n| n.time_ms).collect();
        assert_eq!(times, vec![1000.0, 1200.0, 1500.0, 2000.0, 2000.0]);
        // Tie at 2000: the slider checkpoint was inserted before the later circle
        assert_eq!(notes[3].kind, NoteKind::Short);
        assert_eq!(notes[0].duration_ms, 1500.0);
    }

    #[test]
    fn slider_multiplier_scales_duration() {
        let beat = 60000.0 / 180.0;
        let d = NoteConverter::slide_duration(140.0, 1.4, beat);
        assert!((d - 1.4 * f64::from(1.4_f32) * beat).abs() < 1e-9);
    }
}
