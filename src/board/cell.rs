use crate::foundation::core::{Rect, Rgb};

/// Render depth of a cell outline.
///
/// Smaller `z` is nearer to the viewer: the rasterizer draws slots from the largest `z` to the
/// smallest, so a cell on [`Layer::Resolved`] is painted over everything else.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Layer {
    /// Input cells of the current step that are about to be removed.
    PendingRemoval,
    /// Steady-state merged (banked) cells.
    Merged,
    /// Steady-state cells of the original layout.
    Cell,
    /// Cells found overlapping a freshly moved cell, waiting for their own move.
    Conflict,
    /// Cells that were moved to their legal position during the current step.
    Resolved,
}

impl Layer {
    /// Depth written into the `z` component of every vertex of the slot.
    pub fn z(self) -> f32 {
        match self {
            Layer::PendingRemoval => 1.0,
            Layer::Merged => 0.9,
            Layer::Cell => 0.0,
            Layer::Conflict => -0.7,
            Layer::Resolved => -1.0,
        }
    }

    /// Layer a cell rests on outside of any step: merged cells recede behind the rest.
    pub fn steady(merged: bool) -> Self {
        if merged { Layer::Merged } else { Layer::Cell }
    }
}

/// A named rectangle on the die.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    /// Unique cell name.
    pub name: String,
    /// Current geometry in die coordinates.
    pub rect: Rect,
    /// Immovable in the original layout.
    pub fixed: bool,
    /// Produced by a banking step.
    pub merged: bool,
    /// Current outline color.
    pub color: Rgb,
    /// Current render depth.
    pub layer: Layer,
    pub(crate) slot: Option<usize>,
}

impl Cell {
    /// Create a cell that is not yet resident in any buffer.
    pub fn new(name: impl Into<String>, rect: Rect, fixed: bool, merged: bool, color: Rgb) -> Self {
        Self {
            name: name.into(),
            rect,
            fixed,
            merged,
            color,
            layer: Layer::steady(merged),
            slot: None,
        }
    }

    /// Buffer slot currently holding this cell, if resident.
    pub fn slot(&self) -> Option<usize> {
        self.slot
    }
}
