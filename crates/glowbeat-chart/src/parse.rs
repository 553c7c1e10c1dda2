use std::path::Path;
use std::str::FromStr;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::ChartError;
use crate::hit_object::{CurvePoint, HitObject, HitObjectKind, HitObjectType};
use crate::model::ChartDocument;
use crate::timing_point::TimingPoint;

/// Sliders repeating more often than this are treated as malformed.
pub const MAX_SLIDES: u32 = 1024;

/// Chart file decoder
pub struct ChartDecoder;

/// Section selected by the most recent `[Name]` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    /// Before the first header
    Preamble,
    General,
    Metadata,
    Difficulty,
    TimingPoints,
    HitObjects,
    /// Editor, Events, Colours and anything unknown
    Ignored,
}

impl Section {
    fn from_header(name: &str) -> Self {
        match name {
            "General" => Self::General,
            "Metadata" => Self::Metadata,
            "Difficulty" => Self::Difficulty,
            "TimingPoints" => Self::TimingPoints,
            "HitObjects" => Self::HitObjects,
            _ => Self::Ignored,
        }
    }
}

impl ChartDecoder {
    pub fn decode(path: &Path) -> Result<ChartDocument, ChartError> {
        let raw = std::fs::read(path).map_err(|source| ChartError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let doc = Self::decode_bytes(&raw).ok_or_else(|| ChartError::Encoding {
            path: path.to_path_buf(),
        })?;
        info!(
            "Loaded chart {}: {} hit objects, {} timing points, {:.2} BPM",
            path.display(),
            doc.hit_objects.len(),
            doc.timing_points.len(),
            doc.global_bpm
        );
        Ok(doc)
    }

    /// Decodes raw chart bytes. Returns `None` when the bytes are not UTF-8.
    pub fn decode_bytes(raw: &[u8]) -> Option<ChartDocument> {
        let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(raw);
        if had_errors {
            return None;
        }
        let mut doc = Self::parse(&text);
        doc.sha256 = format!("{:x}", Sha256::digest(raw));
        Some(doc)
    }

    /// Best-effort parse of chart text. Malformed records are skipped, never fatal.
    pub fn parse(text: &str) -> ChartDocument {
        let mut doc = ChartDocument::default();
        let mut section = Section::Preamble;
        let mut dropped = 0usize;

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                section = Section::from_header(name.trim());
                continue;
            }

            match section {
                Section::Preamble => {
                    if let Some(v) = line.strip_prefix("osu file format v") {
                        doc.format_version = v.trim().parse().unwrap_or(0);
                    }
                }
                Section::General | Section::Metadata | Section::Difficulty => {
                    if let Some((key, value)) = line.split_once(':') {
                        apply_key_value(&mut doc, section, key.trim(), value.trim());
                    }
                }
                Section::TimingPoints => match parse_timing_point(line) {
                    Some(tp) => doc.offer_timing_point(tp),
                    None => {
                        dropped += 1;
                        debug!("Skipping malformed timing point at line {}: {line}", line_no + 1);
                    }
                },
                Section::HitObjects => match parse_hit_object(line) {
                    Some(obj) => doc.hit_objects.push(obj),
                    None => {
                        dropped += 1;
                        debug!("Skipping malformed hit object at line {}: {line}", line_no + 1);
                    }
                },
                Section::Ignored => {}
            }
        }

        if dropped > 0 {
            debug!("Chart parse dropped {dropped} malformed records");
        }
        doc
    }
}

fn apply_key_value(doc: &mut ChartDocument, section: Section, key: &str, value: &str) {
    let meta = &mut doc.metadata;
    match (section, key) {
        (Section::General, "AudioFilename") => meta.audio_filename = value.to_string(),
        (Section::General, "AudioLeadIn") => set_parsed(&mut meta.audio_lead_in, value),
        (Section::General, "PreviewTime") => set_parsed(&mut meta.preview_time, value),
        (Section::General, "Mode") => set_parsed(&mut meta.mode, value),
        (Section::Metadata, "Title") => meta.title = value.to_string(),
        (Section::Metadata, "TitleUnicode") => meta.title_unicode = value.to_string(),
        (Section::Metadata, "Artist") => meta.artist = value.to_string(),
        (Section::Metadata, "Creator") => meta.creator = value.to_string(),
        (Section::Metadata, "Version") => meta.version = value.to_string(),
        (Section::Difficulty, "SliderMultiplier") => set_finite(&mut doc.slider_multiplier, value),
        (Section::Difficulty, "SliderTickRate") => set_finite(&mut doc.slider_tick_rate, value),
        (Section::Difficulty, "HPDrainRate") => set_finite(&mut doc.hp_drain_rate, value),
        (Section::Difficulty, "CircleSize") => set_finite(&mut doc.circle_size, value),
        (Section::Difficulty, "OverallDifficulty") => {
            set_finite(&mut doc.overall_difficulty, value)
        }
        (Section::Difficulty, "ApproachRate") => set_finite(&mut doc.approach_rate, value),
        _ => {}
    }
}

/// Leaves `target` untouched when `value` does not parse.
fn set_parsed<T: FromStr>(target: &mut T, value: &str) {
    if let Ok(v) = value.parse() {
        *target = v;
    }
}

fn set_finite(target: &mut f32, value: &str) {
    if let Ok(v) = value.parse::<f32>()
        && v.is_finite()
    {
        *target = v;
    }
}

fn field<T: FromStr>(parts: &[&str], index: usize) -> Option<T> {
    parts.get(index)?.trim().parse().ok()
}

fn text_field(parts: &[&str], index: usize) -> String {
    parts
        .get(index)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// `time,beatLength,meter,sampleSet,sampleIndex,volume,uninherited,effects`
fn parse_timing_point(line: &str) -> Option<TimingPoint> {
    let parts: Vec<&str> = line.split(',').collect();
    let time: f64 = field(&parts, 0).filter(|t: &f64| t.is_finite())?;
    let beat_length: f64 = field(&parts, 1).filter(|b: &f64| b.is_finite())?;

    let mut tp = TimingPoint::new(time, beat_length);
    tp.meter = field(&parts, 2).unwrap_or(tp.meter);
    tp.sample_set = field(&parts, 3).unwrap_or(tp.sample_set);
    tp.sample_index = field(&parts, 4).unwrap_or(tp.sample_index);
    tp.volume = field(&parts, 5).unwrap_or(tp.volume);
    // Absent means uninherited
    tp.uninherited = parts.get(6).is_none_or(|s| s.trim() == "1");
    tp.effects = field(&parts, 7).unwrap_or(tp.effects);
    Some(tp)
}

/// `x,y,time,type,hitSound,...` with the tail depending on the type flag.
/// Circle wins over Spinner, Spinner over Slider, Slider over ManiaHold.
fn parse_hit_object(line: &str) -> Option<HitObject> {
    let parts: Vec<&str> = line.split(',').collect();
    let x = field(&parts, 0)?;
    let y = field(&parts, 1)?;
    let time = field(&parts, 2)?;
    let object_type = HitObjectType(field(&parts, 3)?);
    let hit_sound = field(&parts, 4)?;

    let kind = if object_type.contains(HitObjectType::CIRCLE) {
        HitObjectKind::Circle {
            hit_sample: text_field(&parts, 5),
        }
    } else if object_type.contains(HitObjectType::SPINNER) {
        HitObjectKind::Spinner {
            end_time: field(&parts, 5)?,
            hit_sample: text_field(&parts, 6),
        }
    } else if object_type.contains(HitObjectType::SLIDER) {
        parse_slider(&parts)?
    } else if object_type.contains(HitObjectType::MANIA_HOLD) {
        let combined = parts.get(5)?.trim();
        let (end_time, hit_sample) = combined.split_once(':').unwrap_or((combined, ""));
        HitObjectKind::ManiaHold {
            end_time: end_time.trim().parse().ok()?,
            hit_sample: hit_sample.to_string(),
        }
    } else {
        return None;
    };

    Some(HitObject {
        x,
        y,
        time,
        object_type,
        hit_sound,
        kind,
    })
}

/// `curveType|px:py|...,slides,length[,edgeSounds,edgeSets,hitSample]`
fn parse_slider(parts: &[&str]) -> Option<HitObjectKind> {
    let mut curve = parts.get(5)?.trim().split('|');
    let curve_type = curve.next()?.trim().chars().next()?;
    let curve_points = curve
        .map(|p| {
            let (px, py) = p.split_once(':')?;
            Some(CurvePoint {
                x: px.trim().parse().ok()?,
                y: py.trim().parse().ok()?,
            })
        })
        .collect::<Option<Vec<_>>>()?;
    let slides: u32 = field(parts, 6).filter(|s| (1..=MAX_SLIDES).contains(s))?;
    let length: f64 = field(parts, 7).filter(|l: &f64| l.is_finite() && *l >= 0.0)?;

    Some(HitObjectKind::Slider {
        curve_type,
        curve_points,
        slides,
        length,
        hit_sample: text_field(parts, 10),
    })
}
