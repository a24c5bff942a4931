//! Map surface collaborator.
//!
//! The engine never renders. It issues marker, circle and camera commands to
//! a `MapSurface` and reads distances back from it.

use std::collections::BTreeMap;

use maritime_core::enums::MarkerStyle;
use maritime_core::events::{MapCommand, MarkerId};
use maritime_core::types::Position;

/// Rendering surface the operation draws on.
pub trait MapSurface {
    /// Whether the surface finished initializing.
    fn is_ready(&self) -> bool;

    fn place_marker(&mut self, position: Position, style: MarkerStyle) -> MarkerId;

    fn move_marker(&mut self, id: MarkerId, position: Position);

    fn remove_marker(&mut self, id: MarkerId);

    fn draw_boundary_circle(&mut self, center: Position, radius_m: f64);

    fn pan_to(&mut self, position: Position);

    fn set_view(&mut self, center: Position, zoom: u8);

    /// Distance between two positions in meters.
    fn distance_between(&self, a: Position, b: Position) -> f64;
}

/// In-memory map surface.
///
/// Measures great-circle distance and records every command it accepts.
/// While not ready it drops commands and measures every distance as 0.
#[derive(Debug, Default)]
pub struct HeadlessMap {
    ready: bool,
    next_marker: u32,
    markers: BTreeMap<MarkerId, (Position, MarkerStyle)>,
    center: Option<Position>,
    commands: Vec<MapCommand>,
}

impl HeadlessMap {
    /// A surface that is ready to draw.
    pub fn ready() -> Self {
        Self {
            ready: true,
            ..Default::default()
        }
    }

    /// A surface that failed to initialize.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Every command accepted so far, oldest first.
    pub fn commands(&self) -> &[MapCommand] {
        &self.commands
    }

    /// Drain the recorded commands.
    pub fn take_commands(&mut self) -> Vec<MapCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn marker(&self, id: MarkerId) -> Option<(Position, MarkerStyle)> {
        self.markers.get(&id).copied()
    }

    /// Markers currently on the surface.
    pub fn markers(&self) -> impl Iterator<Item = (MarkerId, Position, MarkerStyle)> + '_ {
        self.markers
            .iter()
            .map(|(&id, &(position, style))| (id, position, style))
    }

    /// Where the camera was last pointed.
    pub fn center(&self) -> Option<Position> {
        self.center
    }

    fn record(&mut self, command: MapCommand) -> bool {
        if !self.ready {
            tracing::trace!(?command, "map not ready, command dropped");
            return false;
        }
        tracing::trace!(?command, "map command");
        self.commands.push(command);
        true
    }
}

impl MapSurface for HeadlessMap {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn place_marker(&mut self, position: Position, style: MarkerStyle) -> MarkerId {
        let id = MarkerId(self.next_marker);
        self.next_marker += 1;
        if self.record(MapCommand::PlaceMarker {
            id,
            position,
            style,
        }) {
            self.markers.insert(id, (position, style));
        }
        id
    }

    fn move_marker(&mut self, id: MarkerId, position: Position) {
        if self.record(MapCommand::MoveMarker { id, position }) {
            if let Some(entry) = self.markers.get_mut(&id) {
                entry.0 = position;
            }
        }
    }

    fn remove_marker(&mut self, id: MarkerId) {
        if self.record(MapCommand::RemoveMarker { id }) {
            self.markers.remove(&id);
        }
    }

    fn draw_boundary_circle(&mut self, center: Position, radius_m: f64) {
        self.record(MapCommand::DrawBoundaryCircle { center, radius_m });
    }

    fn pan_to(&mut self, position: Position) {
        if self.record(MapCommand::PanTo { position }) {
            self.center = Some(position);
        }
    }

    fn set_view(&mut self, center: Position, zoom: u8) {
        if self.record(MapCommand::SetView { center, zoom }) {
            self.center = Some(center);
        }
    }

    fn distance_between(&self, a: Position, b: Position) -> f64 {
        if !self.ready {
            return 0.0;
        }
        a.distance_to(&b)
    }
}
