use crate::board::cell::{Cell, Layer};
use crate::foundation::core::{Point, Rect, Rgb};
use crate::foundation::error::{ReplayError, ReplayResult};

/// Outline vertices per slot: four line segments, two endpoints each.
pub const VERTICES_PER_SLOT: usize = 8;
/// Floats per vertex (`x, y, z`) and per vertex color (`r, g, b`).
pub const COMPONENTS: usize = 3;
/// Floats per slot in both the vertex and the color array.
pub const SLOT_STRIDE: usize = VERTICES_PER_SLOT * COMPONENTS;

/// Dense, fixed-capacity array of cell outlines ready for a line-list renderer.
///
/// Slots `< active_count()` are live; everything past it is stale. Removal is O(1): the caller
/// swaps the victim with the last live slot and pops, so slot order carries no meaning.
#[derive(Clone, Debug)]
pub struct GeometryBuffer {
    vertices: Vec<f32>,
    colors: Vec<f32>,
    capacity: usize,
    active: usize,
    highlight: Option<Rect>,
    uploads: u64,
}

impl GeometryBuffer {
    /// Allocate a buffer with room for `capacity` cells.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vertices: vec![0.0; capacity * SLOT_STRIDE],
            colors: vec![0.0; capacity * SLOT_STRIDE],
            capacity,
            active: 0,
            highlight: None,
            uploads: 0,
        }
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live slots.
    pub fn active_count(&self) -> usize {
        self.active
    }

    /// Return `true` when no slot is live.
    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    /// Number of [`GeometryBuffer::flush`] calls so far.
    pub fn uploads(&self) -> u64 {
        self.uploads
    }

    /// Append `cell` at slot `active_count()` and record the slot on the cell.
    ///
    /// The cell is placed on its steady layer, so merged cells recede behind normal ones.
    pub fn push(&mut self, cell: &mut Cell) -> ReplayResult<usize> {
        if self.active == self.capacity {
            return Err(ReplayError::BufferFull {
                capacity: self.capacity,
            });
        }
        let slot = self.active;
        self.active += 1;
        cell.slot = Some(slot);
        cell.layer = Layer::steady(cell.merged);
        self.set_position(cell, cell.layer.z())?;
        self.set_color(cell)?;
        Ok(slot)
    }

    /// Drop the last live slot. Its cell must already have been relocated or detached.
    pub fn pop(&mut self) -> ReplayResult<()> {
        if self.active == 0 {
            return Err(ReplayError::invariant("pop on an empty geometry buffer"));
        }
        self.active -= 1;
        Ok(())
    }

    /// Exchange the vertex and color blocks of two live slots.
    pub fn swap(&mut self, i: usize, j: usize) -> ReplayResult<()> {
        self.check_slot(i)?;
        self.check_slot(j)?;
        if i == j {
            return Ok(());
        }
        let (lo, hi) = (i.min(j), i.max(j));
        for data in [&mut self.vertices, &mut self.colors] {
            let (head, tail) = data.split_at_mut(hi * SLOT_STRIDE);
            let lo_block = &mut head[lo * SLOT_STRIDE..(lo + 1) * SLOT_STRIDE];
            lo_block.swap_with_slice(&mut tail[..SLOT_STRIDE]);
        }
        Ok(())
    }

    /// Rewrite the outline of `cell`'s slot at depth `z`.
    pub fn set_position(&mut self, cell: &Cell, z: f32) -> ReplayResult<()> {
        let slot = self.slot_of(cell)?;
        let r = cell.rect;
        let (x0, y0, x1, y1) = (r.x0 as f32, r.y0 as f32, r.x1 as f32, r.y1 as f32);
        //  5----4
        // 6      3
        // |      |
        // 7      2
        //  0----1
        let outline = [
            x0, y0, z, x1, y0, z, //
            x1, y0, z, x1, y1, z, //
            x1, y1, z, x0, y1, z, //
            x0, y1, z, x0, y0, z,
        ];
        let off = slot * SLOT_STRIDE;
        self.vertices[off..off + SLOT_STRIDE].copy_from_slice(&outline);
        Ok(())
    }

    /// Rewrite the 8 vertex colors of `cell`'s slot.
    pub fn set_color(&mut self, cell: &Cell) -> ReplayResult<()> {
        let slot = self.slot_of(cell)?;
        let rgb = cell.color.to_array();
        let off = slot * SLOT_STRIDE;
        for c in self.colors[off..off + SLOT_STRIDE].chunks_exact_mut(COMPONENTS) {
            c.copy_from_slice(&rgb);
        }
        Ok(())
    }

    /// Set or clear the filled "active merge" marker drawn over all outlines.
    pub fn set_highlight(&mut self, rect: Option<Rect>) {
        self.highlight = rect;
    }

    /// Current "active merge" marker.
    pub fn highlight(&self) -> Option<Rect> {
        self.highlight
    }

    /// Rectangle stored in a live slot.
    pub fn slot_rect(&self, slot: usize) -> ReplayResult<Rect> {
        self.check_slot(slot)?;
        let v = &self.vertices[slot * SLOT_STRIDE..];
        // Vertex 0 is the lower-left corner, vertex 3 the upper-right one.
        Ok(Rect::new(
            f64::from(v[0]),
            f64::from(v[1]),
            f64::from(v[9]),
            f64::from(v[10]),
        ))
    }

    /// Color stored in a live slot.
    pub fn slot_color(&self, slot: usize) -> ReplayResult<Rgb> {
        self.check_slot(slot)?;
        Ok(Rgb::from_slice(&self.colors[slot * SLOT_STRIDE..]))
    }

    /// Depth stored in a live slot.
    pub fn slot_z(&self, slot: usize) -> ReplayResult<f32> {
        self.check_slot(slot)?;
        Ok(self.vertices[slot * SLOT_STRIDE + 2])
    }

    /// Hand the live part of both arrays to a renderer in one piece.
    pub fn flush(&mut self) -> BufferView<'_> {
        self.uploads += 1;
        self.view()
    }

    /// Borrow the live part of both arrays without counting an upload.
    pub fn view(&self) -> BufferView<'_> {
        let len = self.active * SLOT_STRIDE;
        BufferView {
            vertices: &self.vertices[..len],
            colors: &self.colors[..len],
            active: self.active,
            highlight: self.highlight,
        }
    }

    fn slot_of(&self, cell: &Cell) -> ReplayResult<usize> {
        let slot = cell.slot.ok_or_else(|| {
            ReplayError::invariant(format!("cell '{}' is not buffer-resident", cell.name))
        })?;
        self.check_slot(slot)?;
        Ok(slot)
    }

    fn check_slot(&self, slot: usize) -> ReplayResult<()> {
        if slot >= self.active {
            return Err(ReplayError::invariant(format!(
                "slot {slot} out of range (active {})",
                self.active
            )));
        }
        Ok(())
    }
}

/// Read-only snapshot of the live slots, as handed to a renderer by [`GeometryBuffer::flush`].
#[derive(Clone, Copy, Debug)]
pub struct BufferView<'a> {
    /// `active * SLOT_STRIDE` vertex floats.
    pub vertices: &'a [f32],
    /// `active * SLOT_STRIDE` color floats.
    pub colors: &'a [f32],
    /// Number of live slots.
    pub active: usize,
    /// Filled marker drawn over all outlines.
    pub highlight: Option<Rect>,
}

impl BufferView<'_> {
    /// Depth of a slot.
    pub fn z(&self, slot: usize) -> f32 {
        self.vertices[slot * SLOT_STRIDE + 2]
    }

    /// Color of a slot.
    pub fn color(&self, slot: usize) -> Rgb {
        Rgb::from_slice(&self.colors[slot * SLOT_STRIDE..])
    }

    /// The four outline segments of a slot.
    pub fn segments(&self, slot: usize) -> impl Iterator<Item = (Point, Point)> + '_ {
        let v = &self.vertices[slot * SLOT_STRIDE..(slot + 1) * SLOT_STRIDE];
        v.chunks_exact(2 * COMPONENTS).map(|s| {
            (
                Point::new(f64::from(s[0]), f64::from(s[1])),
                Point::new(f64::from(s[3]), f64::from(s[4])),
            )
        })
    }

    /// Slots ordered back to front (largest `z` first, ties by slot index).
    pub fn paint_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.active).collect();
        order.sort_by(|&a, &b| self.z(b).total_cmp(&self.z(a)).then(a.cmp(&b)));
        order
    }
}

#[cfg(test)]
#[path = "../../tests/unit/board/geometry.rs"]
mod tests;
