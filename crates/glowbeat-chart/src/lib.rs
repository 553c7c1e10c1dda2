// Chart model: beatmap decoder, hit objects, timing points, canonical note conversion

mod convert;
mod error;
mod hit_object;
mod model;
mod note;
mod parse;
mod timing_point;

pub use convert::{BASE_SCORING_DISTANCE, DEFAULT_BEAT_LENGTH_MS, NoteConverter};
pub use error::ChartError;
pub use hit_object::{CurvePoint, HitObject, HitObjectKind, HitObjectType};
pub use model::{ChartDocument, ChartMetadata, DEFAULT_SLIDER_MULTIPLIER};
pub use note::{CanonicalNote, NoteKind};
pub use parse::{ChartDecoder, MAX_SLIDES};
pub use timing_point::TimingPoint;
