use geo::Coord;
use thiserror::Error;

use crate::geometry::ring_area_sq_ft;

/// Interaction mode for a measuring session. `Draw` places vertices,
/// `Edit` drags existing vertices, `View` does neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    View,
    Draw,
    Edit,
}

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("switch to draw mode before placing points")]
    NotDrawing,
    #[error("switch to edit mode before moving vertices")]
    NotEditing,
    #[error("click at least 3 points to create an area")]
    TooFewPoints,
    #[error("no vertex {vertex} in polygon {polygon}")]
    NoSuchVertex { polygon: usize, vertex: usize },
}

/// One measuring session: the finished polygons, the polygon currently
/// being traced, and the interaction mode. The owner holds the single
/// mutable value and reads `total_area_sq_ft` after each transition;
/// nothing recomputes behind its back.
#[derive(Debug, Clone, Default)]
pub struct MeasurementSession {
    finished: Vec<Vec<Coord<f64>>>,
    active: Vec<Coord<f64>>,
    mode: Mode,
}

impl MeasurementSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn finished_polygons(&self) -> &[Vec<Coord<f64>>] {
        &self.finished
    }

    pub fn active_polygon(&self) -> &[Coord<f64>] {
        &self.active
    }

    /// Switch interaction mode. An in-progress trace survives mode switches;
    /// only an explicit finish or clear disposes of it.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Place the next vertex of the active trace. Vertices are taken as
    /// clicked: no dedup, no self-intersection checks.
    pub fn append_point(&mut self, point: Coord<f64>) -> Result<(), SessionError> {
        if self.mode != Mode::Draw {
            return Err(SessionError::NotDrawing);
        }
        self.active.push(point);
        Ok(())
    }

    /// Commit the active trace as a finished polygon. With fewer than 3
    /// points this fails and the session is left exactly as it was.
    pub fn finish_polygon(&mut self) -> Result<(), SessionError> {
        if self.active.len() < 3 {
            return Err(SessionError::TooFewPoints);
        }
        self.finished.push(std::mem::take(&mut self.active));
        Ok(())
    }

    /// Drag one vertex of a finished polygon to a new position. The polygon
    /// keeps its place in the sequence.
    pub fn move_vertex(
        &mut self,
        polygon: usize,
        vertex: usize,
        to: Coord<f64>,
    ) -> Result<(), SessionError> {
        if self.mode != Mode::Edit {
            return Err(SessionError::NotEditing);
        }
        let slot = self
            .finished
            .get_mut(polygon)
            .and_then(|ring| ring.get_mut(vertex))
            .ok_or(SessionError::NoSuchVertex { polygon, vertex })?;
        *slot = to;
        Ok(())
    }

    /// Wipe the whole session: polygons gone, trace gone, back to view mode.
    pub fn clear(&mut self) {
        self.finished.clear();
        self.active.clear();
        self.mode = Mode::View;
    }

    /// Total measured area: every finished polygon plus the active trace
    /// once it spans 3 or more points, each ring rounded independently and
    /// then summed.
    pub fn total_area_sq_ft(&self) -> u64 {
        let finished: u64 = self.finished.iter().map(|ring| ring_area_sq_ft(ring)).sum();
        finished + ring_area_sq_ft(&self.active)
    }
}
