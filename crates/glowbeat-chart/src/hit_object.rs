use serde::{Deserialize, Serialize};

/// Raw `type` bitflag of a hit-object record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct HitObjectType(pub u32);

impl HitObjectType {
    pub const CIRCLE: u32 = 1 << 0;
    pub const SLIDER: u32 = 1 << 1;
    pub const NEW_COMBO: u32 = 1 << 2;
    pub const SPINNER: u32 = 1 << 3;
    pub const MANIA_HOLD: u32 = 1 << 7;

    pub fn contains(self, flag: u32) -> bool {
        self.0 & flag != 0
    }

    pub fn is_new_combo(self) -> bool {
        self.contains(Self::NEW_COMBO)
    }
}

/// Slider control point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f32,
    pub y: f32,
}

/// Variant-specific payload of a hit object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HitObjectKind {
    Circle {
        hit_sample: String,
    },
    Slider {
        curve_type: char,
        curve_points: Vec<CurvePoint>,
        /// Number of passes over the curve (always >= 1)
        slides: u32,
        /// Visual length in osu!pixels
        length: f64,
        hit_sample: String,
    },
    Spinner {
        end_time: i32,
        hit_sample: String,
    },
    ManiaHold {
        end_time: i32,
        hit_sample: String,
    },
}

/// A raw chart element, before gameplay conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitObject {
    pub x: i32,
    pub y: i32,
    /// Hit time in milliseconds
    pub time: i32,
    pub object_type: HitObjectType,
    pub hit_sound: i32,
    pub kind: HitObjectKind,
}

impl HitObject {
    /// End time for objects that span a duration. Sliders have none here because
    /// their duration depends on tempo and the slider multiplier.
    pub fn end_time(&self) -> Option<i32> {
        match self.kind {
            HitObjectKind::Spinner { end_time, .. } | HitObjectKind::ManiaHold { end_time, .. } => {
                Some(end_time)
            }
            _ => None,
        }
    }

    pub fn hit_sample(&self) -> &str {
        match &self.kind {
            HitObjectKind::Circle { hit_sample }
            | HitObjectKind::Slider { hit_sample, .. }
            | HitObjectKind::Spinner { hit_sample, .. }
            | HitObjectKind::ManiaHold { hit_sample, .. } => hit_sample,
        }
    }
}
