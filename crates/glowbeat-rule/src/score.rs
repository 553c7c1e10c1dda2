use serde::{Deserialize, Serialize};

use crate::judgment::Judgment;
use crate::result::{PlayResult, TotalNotesPolicy};

/// Points per judgment and the hit streaks needed to raise the multiplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct ScoreRule {
    pub score_per_note: u32,
    pub score_per_good_note: u32,
    pub score_per_perfect_note: u32,
    /// `multiplier_thresholds[m - 1]` consecutive hits advance multiplier `m` to `m + 1`
    pub multiplier_thresholds: Vec<u32>,
}

impl Default for ScoreRule {
    fn default() -> Self {
        Self {
            score_per_note: 100,
            score_per_good_note: 125,
            score_per_perfect_note: 150,
            multiplier_thresholds: vec![4, 8, 16],
        }
    }
}

impl ScoreRule {
    /// Highest multiplier this rule can reach.
    pub fn max_multiplier(&self) -> u32 {
        self.multiplier_thresholds.len() as u32 + 1
    }
}

/// Score, multiplier and hit counters for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreState {
    pub current_score: u64,
    pub current_multiplier: u32,
    pub multiplier_tracker: u32,
    pub max_multiplier: u32,
    pub normal_hits: u32,
    pub good_hits: u32,
    pub perfect_hits: u32,
    pub missed_hits: u32,
}

impl Default for ScoreState {
    fn default() -> Self {
        Self {
            current_score: 0,
            current_multiplier: 1,
            multiplier_tracker: 0,
            max_multiplier: 1,
            normal_hits: 0,
            good_hits: 0,
            perfect_hits: 0,
            missed_hits: 0,
        }
    }
}

impl ScoreState {
    pub fn total_hits(&self) -> u32 {
        self.normal_hits + self.good_hits + self.perfect_hits
    }

    pub fn judged(&self) -> u32 {
        self.total_hits() + self.missed_hits
    }
}

/// Sole writer of a `ScoreState`; mutated only through judgments.
#[derive(Debug, Clone)]
pub struct ScoreEngine {
    rule: ScoreRule,
    state: ScoreState,
}

impl ScoreEngine {
    pub fn new(rule: ScoreRule) -> Self {
        Self {
            rule,
            state: ScoreState::default(),
        }
    }

    pub fn rule(&self) -> &ScoreRule {
        &self.rule
    }

    pub fn state(&self) -> &ScoreState {
        &self.state
    }

    pub fn apply(&mut self, judgment: Judgment) {
        let base = match judgment {
            Judgment::Perfect => self.rule.score_per_perfect_note,
            Judgment::Good => self.rule.score_per_good_note,
            Judgment::Normal => self.rule.score_per_note,
            Judgment::Missed => {
                self.state.current_multiplier = 1;
                self.state.multiplier_tracker = 0;
                self.state.missed_hits += 1;
                return;
            }
        };

        let s = &mut self.state;
        s.current_score += u64::from(base) * u64::from(s.current_multiplier);
        match judgment {
            Judgment::Perfect => s.perfect_hits += 1,
            Judgment::Good => s.good_hits += 1,
            _ => s.normal_hits += 1,
        }
        self.advance_multiplier();
    }

    fn advance_multiplier(&mut self) {
        let s = &mut self.state;
        let tier = (s.current_multiplier - 1) as usize;
        // Capped once every threshold has been passed
        let Some(&threshold) = self.rule.multiplier_thresholds.get(tier) else {
            return;
        };
        s.multiplier_tracker += 1;
        if s.multiplier_tracker >= threshold {
            s.multiplier_tracker = 0;
            s.current_multiplier += 1;
            s.max_multiplier = s.max_multiplier.max(s.current_multiplier);
        }
    }

    /// End-of-session summary.
    pub fn result(&self, chart_note_count: usize, policy: TotalNotesPolicy) -> PlayResult {
        PlayResult::new(&self.state, chart_note_count, policy)
    }
}
