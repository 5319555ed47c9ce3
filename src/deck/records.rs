use crate::foundation::core::{Point, Rect, rect_at};

/// One cell line of the initial layout.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CellRecord {
    /// Unique cell name.
    pub name: String,
    /// Lower-left x.
    pub x: f64,
    /// Lower-left y.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// `FIX` in the layout file.
    pub fixed: bool,
}

impl CellRecord {
    /// Geometry as a rectangle.
    pub fn rect(&self) -> Rect {
        rect_at(self.x, self.y, self.width, self.height)
    }
}

/// A placement row, used only as a background guide when rendering.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlacementRow {
    /// Row start x.
    pub x: f64,
    /// Row start y.
    pub y: f64,
    /// Width of one site.
    pub site_width: f64,
    /// Height of the row.
    pub site_height: f64,
    /// Number of sites in the row.
    pub sites: u32,
}

impl PlacementRow {
    /// Extent of the whole row.
    pub fn rect(&self) -> Rect {
        rect_at(
            self.x,
            self.y,
            self.site_width * f64::from(self.sites),
            self.site_height,
        )
    }
}

/// The parsed initial layout.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InitialLayout {
    /// Die bounding box.
    pub die: Rect,
    /// Cells in file order.
    pub cells: Vec<CellRecord>,
    /// Placement rows in file order.
    #[serde(default)]
    pub rows: Vec<PlacementRow>,
    /// Cost weight carried by the layout file, unused by the replay.
    #[serde(default)]
    pub alpha: Option<f64>,
    /// Cost weight carried by the layout file, unused by the replay.
    #[serde(default)]
    pub beta: Option<f64>,
}

impl InitialLayout {
    /// A layout with no rows and no cost weights.
    pub fn new(die: Rect, cells: Vec<CellRecord>) -> Self {
        Self {
            die,
            cells,
            rows: Vec::new(),
            alpha: None,
            beta: None,
        }
    }
}

/// One banking operation: `inputs` are replaced by `output` at its nominal geometry.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MergeOp {
    /// Cells consumed by the merge.
    pub inputs: Vec<String>,
    /// Name of the produced cell.
    pub output: String,
    /// Nominal (pre-legalization) lower-left x.
    pub x: f64,
    /// Nominal (pre-legalization) lower-left y.
    pub y: f64,
    /// Width of the produced cell.
    pub width: f64,
    /// Height of the produced cell.
    pub height: f64,
}

/// A cell pushed aside by legalization, with its final position.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Displacement {
    /// Displaced cell.
    pub name: String,
    /// Final lower-left x.
    pub x: f64,
    /// Final lower-left y.
    pub y: f64,
}

impl Displacement {
    /// Final lower-left corner.
    pub fn to(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Post-legalization outcome of one merge operation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PostLegalRecord {
    /// Final lower-left x of the merged cell.
    pub x: f64,
    /// Final lower-left y of the merged cell.
    pub y: f64,
    /// Move count announced by the file; differs from `moves.len()` when the record is truncated.
    pub declared_moves: usize,
    /// Side-effect moves of other cells.
    pub moves: Vec<Displacement>,
}

impl PostLegalRecord {
    /// A complete record.
    pub fn new(x: f64, y: f64, moves: Vec<Displacement>) -> Self {
        Self {
            x,
            y,
            declared_moves: moves.len(),
            moves,
        }
    }
}
