// Play session: config, note scheduler, active-note judge, input queue, clock

mod arena;
pub mod autoplay;
mod clock;
mod config;
mod input;
mod judge;
mod scheduler;
mod session;

pub use arena::{ActiveNoteArena, NoteHandle};
pub use clock::{FixedStep, ManualClock, PlaybackClock, run_to_end};
pub use config::PlayConfig;
pub use input::{InputError, InputEvent, InputKind, InputReceiver, InputSender, input_channel};
pub use judge::NoteJudge;
pub use scheduler::NoteScheduler;
pub use session::{PlayEvent, PlaySession, SessionState};
