use std::fmt;
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Discrete input from the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputKind {
    Tap,
    HoldStart,
    HoldEnd,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tap => "tap",
            Self::HoldStart => "hold-start",
            Self::HoldEnd => "hold-end",
        })
    }
}

impl FromStr for InputKind {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "tap" => Ok(Self::Tap),
            "hold-start" => Ok(Self::HoldStart),
            "hold-end" => Ok(Self::HoldEnd),
            other => Err(InputError::UnknownKind(other.to_string())),
        }
    }
}

/// An input stamped with the playback position at which it arrived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputEvent {
    pub kind: InputKind,
    pub position_ms: f64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("input queue full, event dropped")]
    QueueFull,
    #[error("input queue closed")]
    Disconnected,
    #[error("unknown input kind: {0}")]
    UnknownKind(String),
}

/// Producer half of the input queue. Cloneable and usable from any thread.
#[derive(Debug, Clone)]
pub struct InputSender {
    tx: SyncSender<InputEvent>,
}

impl InputSender {
    /// Enqueues without blocking. A full queue drops the event.
    pub fn send(&self, kind: InputKind, position_ms: f64) -> Result<(), InputError> {
        match self.tx.try_send(InputEvent { kind, position_ms }) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(ev)) => {
                warn!("Input queue full, dropping {} at {:.1}ms", ev.kind, ev.position_ms);
                Err(InputError::QueueFull)
            }
            Err(TrySendError::Disconnected(_)) => Err(InputError::Disconnected),
        }
    }
}

/// Consumer half, drained once per simulation tick.
#[derive(Debug)]
pub struct InputReceiver {
    rx: Receiver<InputEvent>,
}

impl InputReceiver {
    /// Every pending event in arrival order.
    pub fn drain(&self) -> Vec<InputEvent> {
        self.rx.try_iter().collect()
    }
}

/// Bounded single-consumer input queue.
pub fn input_channel(capacity: usize) -> (InputSender, InputReceiver) {
    let (tx, rx) = mpsc::sync_channel(capacity.max(1));
    (InputSender { tx }, InputReceiver { rx })
}
