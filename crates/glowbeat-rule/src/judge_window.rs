use serde::{Deserialize, Serialize};

use crate::judgment::Judgment;

/// Timing tolerances in milliseconds.
///
/// `miss_ms` bounds when a note becomes pressable and when it expires;
/// `good_ms` and `normal_ms` split presses into the three hit tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct JudgeWindow {
    pub miss_ms: f64,
    pub good_ms: f64,
    pub normal_ms: f64,
}

impl Default for JudgeWindow {
    fn default() -> Self {
        Self {
            miss_ms: 400.0,
            good_ms: 250.0,
            normal_ms: 120.0,
        }
    }
}

impl JudgeWindow {
    /// Classifies a press by absolute deviation. Tiers are checked widest first:
    /// anything beyond `good_ms` is Good, beyond `normal_ms` is Normal, the rest Perfect.
    pub fn classify(&self, offset_ms: f64) -> Judgment {
        let accuracy = offset_ms.abs();
        if accuracy > self.good_ms {
            Judgment::Good
        } else if accuracy > self.normal_ms {
            Judgment::Normal
        } else {
            Judgment::Perfect
        }
    }

    /// A note can be pressed once it is within the miss window before its hit time.
    pub fn is_pressable(&self, lifetime_ms: f64) -> bool {
        lifetime_ms <= self.miss_ms
    }

    /// True once `offset_ms` has passed the late edge of the miss window.
    pub fn is_expired(&self, offset_ms: f64) -> bool {
        offset_ms < -self.miss_ms
    }

    /// Whether `normal <= good <= miss` and all windows are positive.
    pub fn is_ordered(&self) -> bool {
        self.normal_ms > 0.0 && self.normal_ms <= self.good_ms && self.good_ms <= self.miss_ms
    }
}
