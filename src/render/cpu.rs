use crate::board::geometry::BufferView;
use crate::deck::records::PlacementRow;
use crate::foundation::core::{Point, Rect, Rgb};
use crate::foundation::error::ReplayResult;
use crate::render::backend::FrameRGBA;
use crate::render::viewport::Viewport;

/// Options for [`CpuRasterizer`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterOpts {
    /// Outline thickness in pixels.
    pub line_width: f64,
    /// Image background.
    pub background: Rgb,
    /// Fill of the "active merge" marker.
    pub highlight: Rgb,
    /// Draw placement rows behind the cells.
    pub rows: bool,
    /// Outline color of placement rows.
    pub row_color: Rgb,
}

impl Default for RasterOpts {
    fn default() -> Self {
        Self {
            line_width: 1.0,
            background: Rgb::new(1.0, 1.0, 1.0),
            highlight: Rgb::new(0.0, 1.0, 1.0),
            rows: false,
            row_color: Rgb::new(0.9, 0.9, 0.9),
        }
    }
}

/// Draws a flushed [`BufferView`] with `vello_cpu`.
pub struct CpuRasterizer {
    viewport: Viewport,
    opts: RasterOpts,
    rows: Vec<Rect>,
    ctx: Option<vello_cpu::RenderContext>,
}

impl CpuRasterizer {
    /// Create a rasterizer for a fixed viewport.
    pub fn new(viewport: Viewport, opts: RasterOpts) -> Self {
        Self {
            viewport,
            opts,
            rows: Vec::new(),
            ctx: None,
        }
    }

    /// Placement rows to draw when [`RasterOpts::rows`] is set.
    pub fn with_rows(mut self, rows: &[PlacementRow]) -> Self {
        self.rows = rows.iter().map(PlacementRow::rect).collect();
        self
    }

    /// Viewport in use.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Render one frame: background, optional rows, cell outlines back to front, then the
    /// highlight on top.
    pub fn render(&mut self, view: &BufferView<'_>) -> ReplayResult<FrameRGBA> {
        let (w, h) = (self.viewport.width() as u16, self.viewport.height() as u16);
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);

        set_color(&mut ctx, self.opts.background);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));

        if self.opts.rows {
            set_color(&mut ctx, self.opts.row_color);
            for row in &self.rows {
                for (a, b) in outline(*row) {
                    self.stroke(&mut ctx, a, b);
                }
            }
        }

        for slot in view.paint_order() {
            set_color(&mut ctx, view.color(slot));
            for (a, b) in view.segments(slot) {
                self.stroke(&mut ctx, a, b);
            }
        }

        if let Some(marker) = view.highlight {
            set_color(&mut ctx, self.opts.highlight);
            ctx.fill_rect(&to_cpu_rect(self.viewport.rect_to_px(marker)));
        }

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);

        Ok(FrameRGBA {
            width: u32::from(w),
            height: u32::from(h),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    // Outlines are axis aligned, so each segment is a thin filled rectangle.
    fn stroke(&self, ctx: &mut vello_cpu::RenderContext, a: Point, b: Point) {
        let half = self.opts.line_width / 2.0;
        let r = Rect::from_points(self.viewport.to_px(a), self.viewport.to_px(b)).inflate(half, half);
        ctx.fill_rect(&to_cpu_rect(r));
    }
}

fn set_color(ctx: &mut vello_cpu::RenderContext, c: Rgb) {
    let [r, g, b, a] = c.to_rgba8();
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
}

fn to_cpu_rect(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn outline(r: Rect) -> [(Point, Point); 4] {
    let (p0, p1) = (Point::new(r.x0, r.y0), Point::new(r.x1, r.y0));
    let (p2, p3) = (Point::new(r.x1, r.y1), Point::new(r.x0, r.y1));
    [(p0, p1), (p1, p2), (p2, p3), (p3, p0)]
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
