use std::collections::{BTreeMap, HashMap};

use crate::board::cell::{Cell, Layer};
use crate::board::geometry::{BufferView, GeometryBuffer};
use crate::foundation::core::{Point, Rect, Rgb};
use crate::foundation::error::{ReplayError, ReplayResult};

/// Spare slots on top of the initial cell count.
///
/// Detail replay inserts the merged cell before its inputs are removed, so the buffer briefly
/// holds one cell more than the steady state.
pub const CAPACITY_SLACK: usize = 10;

/// Strict overlap test: `true` iff the open interiors of `a` and `b` intersect.
///
/// Rectangles that only share an edge or a corner do not overlap.
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x0 < b.x1 && a.x1 > b.x0 && a.y0 < b.y1 && a.y1 > b.y0
}

/// Live cells keyed by name, together with the geometry buffer mirroring them.
///
/// The store is the only writer of the buffer and of the slot-to-name table, so the three views
/// (name map, slot table, each cell's `slot`) are kept in lock-step here and nowhere else.
#[derive(Clone, Debug)]
pub struct CellStore {
    cells: HashMap<String, Cell>,
    slots: Vec<String>,
    buffer: GeometryBuffer,
}

impl CellStore {
    /// Create an empty store whose buffer holds at most `capacity` cells.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: HashMap::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            buffer: GeometryBuffer::with_capacity(capacity),
        }
    }

    /// Buffer capacity for a layout of `cell_count` cells.
    pub fn capacity_for(cell_count: usize) -> usize {
        cell_count + CAPACITY_SLACK
    }

    /// Number of live cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Return `true` when no cell is live.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Return `true` when a cell named `name` is live.
    pub fn contains(&self, name: &str) -> bool {
        self.cells.contains_key(name)
    }

    /// Add a live cell and push it into the buffer.
    pub fn insert(&mut self, mut cell: Cell) -> ReplayResult<usize> {
        if self.cells.contains_key(&cell.name) {
            return Err(ReplayError::DuplicateName(cell.name));
        }
        let slot = self.buffer.push(&mut cell)?;
        if slot != self.slots.len() {
            return Err(ReplayError::invariant(format!(
                "buffer slot {slot} disagrees with slot table length {}",
                self.slots.len()
            )));
        }
        self.slots.push(cell.name.clone());
        self.cells.insert(cell.name.clone(), cell);
        Ok(slot)
    }

    /// Detach a live cell and free its slot by swapping it with the last live slot.
    pub fn remove(&mut self, name: &str) -> ReplayResult<Cell> {
        let slot = self.get(name)?.slot.ok_or_else(|| {
            ReplayError::invariant(format!("live cell '{name}' has no buffer slot"))
        })?;
        let last = self
            .slots
            .len()
            .checked_sub(1)
            .ok_or_else(|| ReplayError::invariant("slot table empty while removing"))?;
        if self.slots.get(slot).map(String::as_str) != Some(name) {
            return Err(ReplayError::invariant(format!(
                "slot table disagrees with cell '{name}' at slot {slot}"
            )));
        }

        // Nothing is detached until the buffer has accepted the swap.
        self.buffer.swap(slot, last)?;
        self.buffer.pop()?;
        self.slots.swap(slot, last);
        self.slots.pop();

        let mut cell = self
            .cells
            .remove(name)
            .ok_or_else(|| ReplayError::UnknownName(name.to_string()))?;
        cell.slot = None;

        if slot != last {
            let moved = &self.slots[slot];
            let relocated = self.cells.get_mut(moved).ok_or_else(|| {
                ReplayError::invariant(format!("slot table names dead cell '{moved}'"))
            })?;
            relocated.slot = Some(slot);
        }
        Ok(cell)
    }

    /// Borrow a live cell.
    pub fn get(&self, name: &str) -> ReplayResult<&Cell> {
        self.cells
            .get(name)
            .ok_or_else(|| ReplayError::UnknownName(name.to_string()))
    }

    /// Move a live cell so its lower-left corner sits at `origin`; returns the new rectangle.
    pub fn move_to(&mut self, name: &str, origin: Point) -> ReplayResult<Rect> {
        let cell = self
            .cells
            .get_mut(name)
            .ok_or_else(|| ReplayError::UnknownName(name.to_string()))?;
        cell.rect = cell.rect.with_origin(origin);
        self.buffer.set_position(cell, cell.layer.z())?;
        Ok(cell.rect)
    }

    /// Recolor a live cell and move it to another depth layer, in place.
    pub fn restyle(&mut self, name: &str, color: Rgb, layer: Layer) -> ReplayResult<()> {
        let cell = self
            .cells
            .get_mut(name)
            .ok_or_else(|| ReplayError::UnknownName(name.to_string()))?;
        cell.color = color;
        cell.layer = layer;
        self.buffer.set_color(cell)?;
        self.buffer.set_position(cell, layer.z())
    }

    /// Name of the cell occupying `slot`.
    pub fn name_at(&self, slot: usize) -> Option<&str> {
        self.slots.get(slot).map(String::as_str)
    }

    /// Live cells in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.slots.iter().filter_map(|n| self.cells.get(n))
    }

    /// Read access to the geometry buffer.
    pub fn buffer(&self) -> &GeometryBuffer {
        &self.buffer
    }

    /// Set or clear the "active merge" marker.
    pub fn set_highlight(&mut self, rect: Option<Rect>) {
        self.buffer.set_highlight(rect);
    }

    /// Bulk hand-off of the buffer to a renderer; call once per frame.
    pub fn flush(&mut self) -> BufferView<'_> {
        self.buffer.flush()
    }

    /// Buffer-resident cells and their geometry, keyed by name.
    pub fn geometry_snapshot(&self) -> BTreeMap<String, Rect> {
        self.iter().map(|c| (c.name.clone(), c.rect)).collect()
    }

    /// Verify that the name map, the slot table and the buffer contents agree.
    pub fn check_invariants(&self) -> ReplayResult<()> {
        let active = self.buffer.active_count();
        if self.slots.len() != active || self.cells.len() != active {
            return Err(ReplayError::invariant(format!(
                "{} cells, {} slot names, {active} active slots",
                self.cells.len(),
                self.slots.len()
            )));
        }
        for (slot, name) in self.slots.iter().enumerate() {
            let cell = self.get(name)?;
            if cell.slot != Some(slot) {
                return Err(ReplayError::invariant(format!(
                    "cell '{name}' records slot {:?}, table says {slot}",
                    cell.slot
                )));
            }
            if self.buffer.slot_rect(slot)? != as_stored(cell.rect) {
                return Err(ReplayError::invariant(format!(
                    "slot {slot} geometry is stale for '{name}'"
                )));
            }
            if self.buffer.slot_color(slot)? != cell.color {
                return Err(ReplayError::invariant(format!(
                    "slot {slot} color is stale for '{name}'"
                )));
            }
            if self.buffer.slot_z(slot)? != cell.layer.z() {
                return Err(ReplayError::invariant(format!(
                    "slot {slot} depth is stale for '{name}'"
                )));
            }
        }
        Ok(())
    }
}

// The buffer stores `f32`; compare through the same rounding.
fn as_stored(r: Rect) -> Rect {
    let f = |v: f64| f64::from(v as f32);
    Rect::new(f(r.x0), f(r.y0), f(r.x1), f(r.y1))
}

#[cfg(test)]
#[path = "../../tests/unit/board/store.rs"]
mod tests;
