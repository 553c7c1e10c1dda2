// Judge windows, per-note judgment state machine, scoring and result ranks

mod active_note;
mod judge_window;
mod judgment;
mod result;
mod score;

pub use active_note::{ActiveNote, LongMissPolicy, NoteState};
pub use judge_window::JudgeWindow;
pub use judgment::{JudgeEvent, JudgePoint, Judgment};
pub use result::{PlayResult, Rank, TotalNotesPolicy};
pub use score::{ScoreEngine, ScoreRule, ScoreState};
