//! Log entries and map surface commands emitted by the operation.

use serde::{Deserialize, Serialize};

use crate::enums::{AlertLevel, MarkerStyle};
use crate::types::Position;

/// One line of the operation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Virtual clock time the entry was recorded at.
    pub at_ms: u64,
    pub level: AlertLevel,
    pub message: String,
}

impl LogEntry {
    /// Clock time rendered as `HH:MM:SS.mmm`.
    pub fn timestamp(&self) -> String {
        let secs = self.at_ms / 1000;
        format!(
            "{:02}:{:02}:{:02}.{:03}",
            secs / 3600,
            (secs / 60) % 60,
            secs % 60,
            self.at_ms % 1000
        )
    }
}

/// Handle of a marker placed on the map surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarkerId(pub u32);

/// A command issued to the map surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MapCommand {
    PlaceMarker {
        id: MarkerId,
        position: Position,
        style: MarkerStyle,
    },
    MoveMarker {
        id: MarkerId,
        position: Position,
    },
    RemoveMarker {
        id: MarkerId,
    },
    DrawBoundaryCircle {
        center: Position,
        radius_m: f64,
    },
    PanTo {
        position: Position,
    },
    SetView {
        center: Position,
        zoom: u8,
    },
}
