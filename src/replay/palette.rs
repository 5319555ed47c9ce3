use crate::foundation::core::Rgb;
use crate::replay::engine::ReplayMode;

/// Outline colors used by the replay. Render-only; nothing in the engine branches on a color.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Palette {
    /// Movable cells of the original layout.
    pub movable: Rgb,
    /// Fixed cells of the original layout.
    pub fixed: Rgb,
    /// Merged (banked) cells at rest.
    pub merged: Rgb,
    /// Input cells of the current step, until the merged cell lands.
    pub pending_removal: Rgb,
    /// Merged cell while it still sits at its nominal position.
    pub unresolved: Rgb,
    /// Cells moved to their final position during the current step.
    pub resolved: Rgb,
    /// Cells overlapping a freshly moved cell.
    pub conflict: Rgb,
    /// Filled marker over the merged cell of the current step.
    pub highlight: Rgb,
}

impl Palette {
    /// Colors for coarse replay.
    pub const COARSE: Palette = Palette {
        movable: Rgb::new(0.0, 1.0, 0.0),
        fixed: Rgb::new(1.0, 0.0, 0.0),
        merged: Rgb::new(0.0, 0.0, 1.0),
        pending_removal: Rgb::new(1.0, 1.0, 0.0),
        unresolved: Rgb::new(1.0, 0.0, 1.0),
        resolved: Rgb::new(0.0, 1.0, 0.0),
        conflict: Rgb::new(1.0, 0.0, 0.0),
        highlight: Rgb::new(0.0, 1.0, 1.0),
    };

    /// Colors for detail replay: resting cells are greyed out so that the step in flight stands out.
    pub const DETAIL: Palette = Palette {
        movable: Rgb::new(0.8, 0.8, 0.8),
        fixed: Rgb::new(0.4, 0.4, 0.4),
        ..Palette::COARSE
    };

    /// Palette matching a replay mode.
    pub fn for_mode(mode: ReplayMode) -> Self {
        match mode {
            ReplayMode::Coarse => Self::COARSE,
            ReplayMode::Detail => Self::DETAIL,
        }
    }

    /// Color of a cell outside of any step.
    pub fn steady(&self, fixed: bool, merged: bool) -> Rgb {
        if merged {
            self.merged
        } else if fixed {
            self.fixed
        } else {
            self.movable
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::COARSE
    }
}
