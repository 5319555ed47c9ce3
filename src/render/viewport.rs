use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{ReplayError, ReplayResult};

/// Output height used when none is given.
pub const DEFAULT_HEIGHT: u32 = 1080;

/// Maps die coordinates (y up) onto image pixels (row 0 at the top).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    die: Rect,
    width: u32,
    height: u32,
}

impl Viewport {
    /// Fit `die` into an image `height` pixels tall.
    ///
    /// The width follows the die aspect ratio, rounded up to an even number so that chroma
    /// subsampled encodes accept it.
    pub fn fit(die: Rect, height: u32) -> ReplayResult<Self> {
        if !(die.width() > 0.0 && die.height() > 0.0) {
            return Err(ReplayError::validation(format!(
                "die {die:?} has no area"
            )));
        }
        if height == 0 {
            return Err(ReplayError::validation("frame height must be non-zero"));
        }
        let raw = (f64::from(height) * die.width() / die.height()).ceil();
        let mut width = raw.max(2.0) as u64;
        if width % 2 == 1 {
            width += 1;
        }
        let max = u64::from(u16::MAX);
        if width > max || u64::from(height) > max {
            return Err(ReplayError::validation(format!(
                "frame size {width}x{height} exceeds {max} pixels per side"
            )));
        }
        Ok(Self {
            die,
            width: width as u32,
            height,
        })
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Die box being shown.
    pub fn die(&self) -> Rect {
        self.die
    }

    /// Pixel position of a die point.
    pub fn to_px(&self, p: Point) -> Point {
        let sx = f64::from(self.width) / self.die.width();
        let sy = f64::from(self.height) / self.die.height();
        Point::new((p.x - self.die.x0) * sx, (self.die.y1 - p.y) * sy)
    }

    /// Pixel rectangle covering a die rectangle.
    pub fn rect_to_px(&self, r: Rect) -> Rect {
        Rect::from_points(
            self.to_px(Point::new(r.x0, r.y0)),
            self.to_px(Point::new(r.x1, r.y1)),
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/viewport.rs"]
mod tests;
