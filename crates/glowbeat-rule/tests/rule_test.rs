use glowbeat_chart::CanonicalNote;
use glowbeat_rule::{
    ActiveNote, JudgePoint, JudgeWindow, Judgment, LongMissPolicy, ScoreEngine, ScoreRule,
    TotalNotesPolicy,
};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Action {
    Advance(f64),
    Press,
    HoldStart,
    HoldEnd,
    Expire,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0.0..300.0f64).prop_map(Action::Advance),
        Just(Action::Press),
        Just(Action::HoldStart),
        Just(Action::HoldEnd),
        Just(Action::Expire),
    ]
}

fn judgment() -> impl Strategy<Value = Judgment> {
    prop_oneof![
        Just(Judgment::Perfect),
        Just(Judgment::Good),
        Just(Judgment::Normal),
        Just(Judgment::Missed),
    ]
}

proptest! {
    /// Whatever order presses, holds and expiry arrive in, each point is judged at most once.
    #[test]
    fn each_point_judged_at_most_once(
        long in any::<bool>(),
        duration in 0.0..2000.0f64,
        per_point in any::<bool>(),
        actions in prop::collection::vec(action(), 0..80),
    ) {
        let note = if long {
            CanonicalNote::long(1000.0, duration)
        } else {
            CanonicalNote::short(1000.0)
        };
        let policy = if per_point { LongMissPolicy::PerJudgePoint } else { LongMissPolicy::Single };
        let window = JudgeWindow::default();
        let mut active = ActiveNote::activate(0, &note, 0.0, 0.0);
        let mut position = 0.0;
        let mut events = Vec::new();

        for a in actions {
            match a {
                Action::Advance(dt) => {
                    position += dt;
                    active.advance(position);
                }
                Action::Press => events.extend(active.press(&window)),
                Action::HoldStart => events.extend(active.hold_start(&window)),
                Action::HoldEnd => events.extend(active.hold_end(&window)),
                Action::Expire => events.extend(active.expire(&window, policy)),
            }
        }

        let heads = events.iter().filter(|e| e.point == JudgePoint::Head).count();
        let tails = events.iter().filter(|e| e.point == JudgePoint::Tail).count();
        prop_assert!(heads <= 1);
        prop_assert!(tails <= 1);
        if !long {
            prop_assert_eq!(tails, 0);
        }
    }

    #[test]
    fn score_engine_invariants(judgments in prop::collection::vec(judgment(), 0..200)) {
        let rule = ScoreRule::default();
        let max = rule.max_multiplier();
        let mut engine = ScoreEngine::new(rule);
        let mut last_score = 0;
        for j in &judgments {
            engine.apply(*j);
            let s = engine.state();
            prop_assert!(s.current_multiplier >= 1 && s.current_multiplier <= max);
            prop_assert!(s.current_score >= last_score);
            if *j == Judgment::Missed {
                prop_assert_eq!(s.current_multiplier, 1);
                prop_assert_eq!(s.multiplier_tracker, 0);
            }
            last_score = s.current_score;
        }
        prop_assert_eq!(engine.state().judged() as usize, judgments.len());

        let result = engine.result(0, TotalNotesPolicy::Judged);
        prop_assert!(result.percent_hit >= 0.0 && result.percent_hit <= 100.0);
    }
}
