mod input_log;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use glowbeat_chart::{CanonicalNote, ChartDecoder, ChartDocument, NoteKind};
use glowbeat_play::{InputEvent, ManualClock, PlayConfig, PlaySession, autoplay, run_to_end};
use glowbeat_rule::PlayResult;
use serde::Serialize;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "glowbeat", about = "Rhythm chart loader and play simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a chart and list its canonical notes.
    Notes {
        chart: PathBuf,
        /// Print the notes as a JSON array.
        #[arg(long)]
        json: bool,
    },
    /// Play a chart with a simulated perfect player and print the results.
    Autoplay {
        chart: PathBuf,
        #[command(flatten)]
        play: PlayArgs,
        /// Shift every input by this many ms (positive = late).
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        jitter_ms: f64,
    },
    /// Replay a recorded input log against a chart and print the results.
    Replay {
        chart: PathBuf,
        /// Input log with one `positionMs,kind` per line.
        #[arg(long)]
        inputs: PathBuf,
        #[command(flatten)]
        play: PlayArgs,
    },
    /// Write the default play config as JSON.
    InitConfig { path: PathBuf },
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// Path to play config JSON file.
    #[arg(long, env = "GLOWBEAT_CONFIG")]
    config: Option<PathBuf>,
    /// Override the activation lead time.
    #[arg(long)]
    lead_time_ms: Option<f64>,
    /// Override the calibration offset.
    #[arg(long, allow_hyphen_values = true)]
    offset_ms: Option<f64>,
}

impl PlayArgs {
    fn load(&self) -> Result<PlayConfig> {
        let mut config = match &self.config {
            Some(path) => {
                info!("Loading play config from {}", path.display());
                PlayConfig::read(path)?
            }
            None => PlayConfig::default(),
        };
        if let Some(lead) = self.lead_time_ms {
            config.lead_time_ms = lead;
        }
        if let Some(offset) = self.offset_ms {
            config.offset_ms = offset;
        }
        config.validate();
        Ok(config)
    }
}

/// Results record printed after a simulated session.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReport<'a> {
    chart: &'a Path,
    sha256: &'a str,
    title: &'a str,
    version: &'a str,
    note_count: usize,
    #[serde(flatten)]
    result: PlayResult,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Notes { chart, json } => print_notes(&chart, json),
        Command::Autoplay {
            chart,
            play,
            jitter_ms,
        } => {
            let config = play.load()?;
            let doc = ChartDecoder::decode(&chart)?;
            let notes = doc.build_notes();
            let script = autoplay::script(&notes, config.offset_ms, jitter_ms);
            simulate(&chart, &doc, notes, config, &script)
        }
        Command::Replay {
            chart,
            inputs,
            play,
        } => {
            let config = play.load()?;
            let doc = ChartDecoder::decode(&chart)?;
            let script = input_log::read(&inputs)?;
            info!("Replaying {} inputs from {}", script.len(), inputs.display());
            simulate(&chart, &doc, doc.build_notes(), config, &script)
        }
        Command::InitConfig { path } => {
            PlayConfig::default().write(&path)?;
            info!("Wrote default play config to {}", path.display());
            Ok(())
        }
    }
}

fn print_notes(chart: &Path, json: bool) -> Result<()> {
    let notes = ChartDecoder::decode(chart)?.build_notes();
    if json {
        println!("{}", serde_json::to_string_pretty(&notes)?);
        return Ok(());
    }
    for (i, note) in notes.iter().enumerate() {
        println!("{}", format_note(i, note));
    }
    Ok(())
}

fn format_note(index: usize, note: &CanonicalNote) -> String {
    match note.kind {
        NoteKind::Short => format!("{index:>5}  {:>10.1}  short", note.time_ms),
        NoteKind::Long => format!(
            "{index:>5}  {:>10.1}  long   {:.1}ms",
            note.time_ms, note.duration_ms
        ),
    }
}

fn simulate(
    chart: &Path,
    doc: &ChartDocument,
    notes: Vec<CanonicalNote>,
    config: PlayConfig,
    script: &[InputEvent],
) -> Result<()> {
    let note_count = notes.len();
    let end = autoplay::session_end_ms(&notes, config.offset_ms, config.judge.miss_ms)
        .max(script.last().map_or(0.0, |e| e.position_ms + 1.0));
    let (mut session, sender) = PlaySession::new(notes, config);
    let mut clock = ManualClock::new(end);
    run_to_end(&mut session, &mut clock, &sender, script);

    let report = RunReport {
        chart,
        sha256: &doc.sha256,
        title: &doc.metadata.title,
        version: &doc.metadata.version,
        note_count,
        result: session.finish(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
