use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};

use crate::encode::ffmpeg::{ensure_parent_dir, flatten_to_opaque_rgba8};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReplayError, ReplayResult};
use crate::render::backend::FrameRGBA;

/// Frame rate used for GIF output when none is requested.
pub const DEFAULT_GIF_FPS: u32 = 5;

/// Options for [`GifSink`].
#[derive(Clone, Debug, PartialEq)]
pub struct GifSinkOpts {
    /// Output GIF path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// NeuQuant speed, 1 (best) to 30 (fastest).
    pub speed: i32,
    /// Loop the animation forever instead of playing it once.
    pub looping: bool,
}

impl GifSinkOpts {
    /// Create options for an endlessly looping GIF at `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [255, 255, 255, 255],
            speed: 10,
            looping: true,
        }
    }

    /// Refuse to replace an existing output file.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Set the quantizer speed.
    pub fn with_speed(mut self, speed: i32) -> Self {
        self.speed = speed;
        self
    }

    /// Play once or loop forever.
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }
}

/// Sink that writes frames into an animated GIF with the `image` crate.
pub struct GifSink {
    opts: GifSinkOpts,
    encoder: Option<GifEncoder<BufWriter<File>>>,
    cfg: Option<SinkConfig>,
    delay: Option<Delay>,
    last_idx: Option<FrameIndex>,
}

impl GifSink {
    /// Create a sink; the file is created in `begin`.
    pub fn new(opts: GifSinkOpts) -> Self {
        Self {
            opts,
            encoder: None,
            cfg: None,
            delay: None,
            last_idx: None,
        }
    }

    fn validate(&self, cfg: &SinkConfig) -> ReplayResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(ReplayError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ReplayError::validation(
                "gif sink width/height must be non-zero",
            ));
        }
        if cfg.width > u32::from(u16::MAX) || cfg.height > u32::from(u16::MAX) {
            return Err(ReplayError::validation(format!(
                "gif frames are limited to 65535x65535, got {}x{}",
                cfg.width, cfg.height
            )));
        }
        if !(1..=30).contains(&self.opts.speed) {
            return Err(ReplayError::validation(format!(
                "gif speed must be within 1..=30, got {}",
                self.opts.speed
            )));
        }
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(ReplayError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }
        Ok(())
    }
}

/// Per-frame display time for `fps`. GIF stores centiseconds, so high rates are rounded.
pub fn frame_delay(fps: Fps) -> Delay {
    Delay::from_numer_denom_ms(1000 * fps.den, fps.num)
}

impl FrameSink for GifSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReplayResult<()> {
        self.validate(&cfg)?;
        ensure_parent_dir(&self.opts.out_path)?;

        let file = File::create(&self.opts.out_path).map_err(|e| {
            ReplayError::encoder_unavailable(format!(
                "failed to create '{}': {e}",
                self.opts.out_path.display()
            ))
        })?;
        let mut encoder = GifEncoder::new_with_speed(BufWriter::new(file), self.opts.speed);
        let repeat = if self.opts.looping {
            Repeat::Infinite
        } else {
            Repeat::Finite(0)
        };
        encoder
            .set_repeat(repeat)
            .map_err(|e| ReplayError::encode(format!("gif header: {e}")))?;

        tracing::debug!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            fps = cfg.fps.as_f64(),
            "writing gif"
        );
        self.encoder = Some(encoder);
        self.delay = Some(frame_delay(cfg.fps));
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReplayResult<()> {
        let (Some(cfg), Some(delay)) = (self.cfg.as_ref(), self.delay) else {
            return Err(ReplayError::encode("gif sink not started"));
        };
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(ReplayError::encode(format!(
                "gif sink received frame {} after frame {}",
                idx.0, last.0
            )));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ReplayError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        let mut opaque = vec![0u8; frame.data.len()];
        flatten_to_opaque_rgba8(
            &mut opaque,
            &frame.data,
            frame.premultiplied,
            self.opts.bg_rgba,
        )?;
        let image = RgbaImage::from_raw(frame.width, frame.height, opaque)
            .ok_or_else(|| ReplayError::validation("frame data does not match width*height*4"))?;

        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| ReplayError::encode("gif sink is already finalized"))?;
        encoder
            .encode_frame(Frame::from_parts(image, 0, 0, delay))
            .map_err(|e| ReplayError::encode(format!("failed to encode gif frame {}: {e}", idx.0)))
    }

    fn end(&mut self) -> ReplayResult<()> {
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| ReplayError::encode("gif sink not started"))?;
        // Dropping the encoder writes the trailer and flushes the file.
        drop(encoder);
        self.cfg = None;
        self.delay = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
