// Grid placement engine - positions and drag/drop snapping
use super::widget::WidgetConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Quantization step for widget placement.
pub const GRID_CELL_SIZE: u32 = 100;

const Z_DRAGGING: u32 = 10;
const Z_RESTING: u32 = 1;

/// Grid-aligned widget position in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Raw pointer or container coordinates; may be fractional or negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub id: String,
    pub position: Position,
    pub z_index: u32,
}

#[derive(Debug, Clone)]
pub struct GridLayout {
    cell_size: u32,
    editable: bool,
    positions: HashMap<String, Position>,
    // display order, mirrors the component list
    order: Vec<String>,
    dragging: Option<String>,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::new(GRID_CELL_SIZE)
    }
}

impl GridLayout {
    pub fn new(cell_size: u32) -> Self {
        Self {
            cell_size: cell_size.max(1),
            editable: false,
            positions: HashMap::new(),
            order: Vec::new(),
            dragging: None,
        }
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Leaving edit mode abandons any drag in progress.
    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
        if !editable {
            self.dragging = None;
        }
    }

    pub fn dragging(&self) -> Option<&str> {
        self.dragging.as_deref()
    }

    pub fn position_of(&self, id: &str) -> Option<Position> {
        self.positions.get(id).copied()
    }

    /// Rebuild the position map from the stored (x, y) of each component.
    pub fn initialize_positions(&mut self, components: &[WidgetConfig]) {
        self.positions = components
            .iter()
            .map(|c| (c.id.clone(), c.position()))
            .collect();
        self.order = components.iter().map(|c| c.id.clone()).collect();

        if let Some(id) = &self.dragging {
            if !self.positions.contains_key(id) {
                self.dragging = None;
            }
        }
    }

    /// Returns false when the layout is read-only or the id is not laid out.
    pub fn begin_drag(&mut self, id: &str) -> bool {
        if !self.editable || !self.positions.contains_key(id) {
            return false;
        }
        tracing::debug!("Drag started for component {}", id);
        self.dragging = Some(id.to_string());
        true
    }

    /// Snap a pointer position, relative to the container origin, down to
    /// the nearest cell corner. Never negative.
    pub fn compute_drop_position(&self, pointer: Point, origin: Point) -> Position {
        Position::new(
            self.snap(pointer.x - origin.x),
            self.snap(pointer.y - origin.y),
        )
    }

    fn snap(&self, offset: f64) -> u32 {
        let cell = f64::from(self.cell_size);
        if !offset.is_finite() || offset <= 0.0 {
            return 0;
        }
        let snapped = (offset / cell).floor() * cell;
        if snapped >= f64::from(u32::MAX) {
            // largest cell-aligned value that fits
            return (u32::MAX / self.cell_size) * self.cell_size;
        }
        snapped as u32
    }

    /// Record the new position of `id` and return the component list with
    /// only that widget moved. `None` when read-only or `id` is unknown.
    pub fn commit_drop(
        &mut self,
        id: &str,
        position: Position,
        components: &[WidgetConfig],
    ) -> Option<Vec<WidgetConfig>> {
        if !self.editable || !self.positions.contains_key(id) {
            return None;
        }

        self.positions.insert(id.to_string(), position);

        let updated = components
            .iter()
            .map(|c| {
                if c.id == id {
                    c.clone().with_position(position)
                } else {
                    c.clone()
                }
            })
            .collect();

        tracing::debug!("Component {} dropped at ({}, {})", id, position.x, position.y);
        Some(updated)
    }

    pub fn end_drag(&mut self) {
        self.dragging = None;
    }

    /// Complete the active drag at `pointer`. The drag always ends; the
    /// component list is only returned when a drop was committed.
    pub fn drop_at(
        &mut self,
        pointer: Point,
        origin: Point,
        components: &[WidgetConfig],
    ) -> Option<Vec<WidgetConfig>> {
        let result = self.dragging.clone().and_then(|id| {
            let position = self.compute_drop_position(pointer, origin);
            self.commit_drop(&id, position, components)
        });
        self.end_drag();
        result
    }

    /// Current placements in display order; the dragged widget sits above
    /// the others.
    pub fn placements(&self) -> Vec<Placement> {
        self.order
            .iter()
            .filter_map(|id| {
                self.positions.get(id).map(|position| Placement {
                    id: id.clone(),
                    position: *position,
                    z_index: if self.dragging.as_deref() == Some(id.as_str()) {
                        Z_DRAGGING
                    } else {
                        Z_RESTING
                    },
                })
            })
            .collect()
    }
}
