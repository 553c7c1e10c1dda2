use std::path::Path;

use anyhow::{Context, Result};
use glowbeat_rule::{JudgeWindow, LongMissPolicy, ScoreRule, TotalNotesPolicy};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const LEAD_TIME_MIN: f64 = 100.0;
pub const LEAD_TIME_MAX: f64 = 10000.0;
pub const OFFSET_MIN: f64 = -1000.0;
pub const OFFSET_MAX: f64 = 1000.0;
pub const TICK_RATE_MIN: u32 = 30;
pub const TICK_RATE_MAX: u32 = 1000;
pub const INPUT_QUEUE_MIN: usize = 1;
pub const INPUT_QUEUE_MAX: usize = 4096;

/// Gameplay tuning for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct PlayConfig {
    /// How far ahead of its hit time a note is activated
    pub lead_time_ms: f64,
    /// Calibration offset added to every hit time
    pub offset_ms: f64,
    /// Fixed simulation tick rate
    pub tick_rate_hz: u32,
    pub input_queue_capacity: usize,
    pub judge: JudgeWindow,
    pub score: ScoreRule,
    pub total_notes: TotalNotesPolicy,
    pub long_note_miss: LongMissPolicy,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            lead_time_ms: 2000.0,
            offset_ms: 100.0,
            tick_rate_hz: 240,
            input_queue_capacity: 64,
            judge: JudgeWindow::default(),
            score: ScoreRule::default(),
            total_notes: TotalNotesPolicy::default(),
            long_note_miss: LongMissPolicy::default(),
        }
    }
}

impl PlayConfig {
    /// Clamp values into their valid ranges, logging each adjustment.
    pub fn validate(&mut self) {
        let lead = clamp_finite(self.lead_time_ms, LEAD_TIME_MIN, LEAD_TIME_MAX, 2000.0);
        if lead != self.lead_time_ms {
            warn!("leadTimeMs {} out of range, using {lead}", self.lead_time_ms);
            self.lead_time_ms = lead;
        }
        let offset = clamp_finite(self.offset_ms, OFFSET_MIN, OFFSET_MAX, 0.0);
        if offset != self.offset_ms {
            warn!("offsetMs {} out of range, using {offset}", self.offset_ms);
            self.offset_ms = offset;
        }
        self.tick_rate_hz = self.tick_rate_hz.clamp(TICK_RATE_MIN, TICK_RATE_MAX);
        self.input_queue_capacity = self
            .input_queue_capacity
            .clamp(INPUT_QUEUE_MIN, INPUT_QUEUE_MAX);

        if !self.judge.is_ordered() {
            let default = JudgeWindow::default();
            let normal = clamp_finite(self.judge.normal_ms, 1.0, f64::MAX, default.normal_ms);
            let good = clamp_finite(self.judge.good_ms, normal, f64::MAX, default.good_ms.max(normal));
            let miss = clamp_finite(self.judge.miss_ms, good, f64::MAX, default.miss_ms.max(good));
            warn!(
                "Judge windows {:?} not ordered, using normal={normal} good={good} miss={miss}",
                self.judge
            );
            self.judge = JudgeWindow {
                miss_ms: miss,
                good_ms: good,
                normal_ms: normal,
            };
        }

        for t in &mut self.score.multiplier_thresholds {
            if *t == 0 {
                warn!("Multiplier threshold 0 raised to 1");
                *t = 1;
            }
        }
    }

    /// Read config from a JSON file. A missing file yields the defaults.
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading play config {}", path.display()))?;
        let mut config: PlayConfig = serde_json::from_str(&data)
            .with_context(|| format!("parsing play config {}", path.display()))?;
        config.validate();
        Ok(config)
    }

    /// Write config to a JSON file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing play config {}", path.display()))?;
        Ok(())
    }

    /// Length of one simulation tick in milliseconds.
    pub fn tick_ms(&self) -> f64 {
        1000.0 / f64::from(self.tick_rate_hz.max(1))
    }
}

/// NaN falls back to `fallback`; infinities clamp like any other value.
fn clamp_finite(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback.clamp(min, max)
    } else {
        value.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = PlayConfig::default();
        assert_eq!(c.lead_time_ms, 2000.0);
        assert_eq!(c.offset_ms, 100.0);
        assert_eq!(c.tick_rate_hz, 240);
        assert_eq!(c.judge, JudgeWindow::default());
        assert_eq!(c.score.score_per_note, 100);
        assert_eq!(c.total_notes, TotalNotesPolicy::Judged);
        assert_eq!(c.long_note_miss, LongMissPolicy::Single);
    }

    #[test]
    fn validate_clamps() {
        let mut c = PlayConfig {
            lead_time_ms: 50_000.0,
            offset_ms: -5000.0,
            tick_rate_hz: 0,
            input_queue_capacity: 0,
            ..Default::default()
        };
        c.score.multiplier_thresholds = vec![0, 3];
        c.validate();
        assert_eq!(c.lead_time_ms, LEAD_TIME_MAX);
        assert_eq!(c.offset_ms, OFFSET_MIN);
        assert_eq!(c.tick_rate_hz, TICK_RATE_MIN);
        assert_eq!(c.input_queue_capacity, INPUT_QUEUE_MIN);
        assert_eq!(c.score.multiplier_thresholds, vec![1, 3]);
    }

    #[test]
    fn validate_reorders_judge_windows() {
        let mut c = PlayConfig::default();
        c.judge = JudgeWindow {
            miss_ms: 100.0,
            good_ms: 250.0,
            normal_ms: 120.0,
        };
        c.validate();
        assert!(c.judge.is_ordered());
        assert_eq!(c.judge.normal_ms, 120.0);
        assert_eq!(c.judge.good_ms, 250.0);
        assert_eq!(c.judge.miss_ms, 250.0);
    }

    #[test]
    fn validate_replaces_nan() {
        let mut c = PlayConfig {
            lead_time_ms: f64::NAN,
            ..Default::default()
        };
        c.validate();
        assert_eq!(c.lead_time_ms, 2000.0);
    }

    #[test]
    fn tick_length() {
        let c = PlayConfig::default();
        assert!((c.tick_ms() - 1000.0 / 240.0).abs() < 1e-12);
    }

    #[test]
    fn write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("play.json");
        let mut c = PlayConfig::default();
        c.offset_ms = -25.0;
        c.long_note_miss = LongMissPolicy::PerJudgePoint;
        c.write(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"longNoteMiss\": \"perJudgePoint\""));

        let loaded = PlayConfig::read(&path).unwrap();
        assert_eq!(loaded, c);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let c = PlayConfig::read(&dir.path().join("absent.json")).unwrap();
        assert_eq!(c, PlayConfig::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("play.json");
        std::fs::write(&path, r#"{"leadTimeMs": 1500, "judge": {"normalMs": 80}}"#).unwrap();
        let c = PlayConfig::read(&path).unwrap();
        assert_eq!(c.lead_time_ms, 1500.0);
        assert_eq!(c.judge.normal_ms, 80.0);
        assert_eq!(c.judge.miss_ms, 400.0);
        assert_eq!(c.tick_rate_hz, 240);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("play.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(PlayConfig::read(&path).is_err());
    }
}
