use std::sync::mpsc;

use crate::deck::build::StepDeck;
use crate::deck::records::InitialLayout;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReplayError, ReplayResult};
use crate::render::backend::FrameRGBA;
use crate::render::cpu::{CpuRasterizer, RasterOpts};
use crate::render::viewport::{DEFAULT_HEIGHT, Viewport};
use crate::replay::engine::{ReplayEngine, ReplayMode, StepOutcome};

/// Options controlling a [`ReplaySession`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReplaySessionOpts {
    /// Coarse or detail replay.
    pub mode: ReplayMode,
    /// Output frame rate.
    pub fps: Fps,
    /// Output height in pixels; the width follows the die aspect ratio.
    pub height: u32,
    /// Rasterizer options. The highlight color is taken from the mode's palette.
    pub raster: RasterOpts,
    /// Bounded channel capacity between the replay loop and the encoder thread.
    pub channel_capacity: usize,
}

impl Default for ReplaySessionOpts {
    fn default() -> Self {
        Self {
            mode: ReplayMode::Coarse,
            fps: Fps::default(),
            height: DEFAULT_HEIGHT,
            raster: RasterOpts::default(),
            channel_capacity: 4,
        }
    }
}

impl ReplaySessionOpts {
    /// Default options for `mode`.
    pub fn new(mode: ReplayMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

/// Statistics of a [`ReplaySession::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ReplayStats {
    /// Frames handed to the sink, the initial layout included.
    pub frames: u64,
    /// Optimization steps fully applied.
    pub steps: usize,
    /// Video length implied by `frames` at the session frame rate.
    pub duration_secs: f64,
}

/// Session-oriented replay: owns the engine and the rasterizer and renders one frame per
/// engine call.
pub struct ReplaySession {
    engine: ReplayEngine,
    rasterizer: CpuRasterizer,
    opts: ReplaySessionOpts,
    calls: u64,
}

impl ReplaySession {
    /// Build the engine for `layout` and `deck` and size the frame to the die.
    pub fn new(
        layout: &InitialLayout,
        deck: StepDeck,
        opts: ReplaySessionOpts,
    ) -> ReplayResult<Self> {
        let engine = ReplayEngine::new(layout, deck, opts.mode)?;
        let viewport = Viewport::fit(layout.die, opts.height)?;
        let raster = RasterOpts {
            highlight: engine.palette().highlight,
            ..opts.raster
        };
        let rasterizer = CpuRasterizer::new(viewport, raster).with_rows(&layout.rows);
        Ok(Self {
            engine,
            rasterizer,
            opts,
            calls: 0,
        })
    }

    /// The engine being driven.
    pub fn engine(&self) -> &ReplayEngine {
        &self.engine
    }

    /// Frame size and rate a sink will be configured with.
    pub fn sink_config(&self) -> SinkConfig {
        let vp = self.rasterizer.viewport();
        SinkConfig {
            width: vp.width(),
            height: vp.height(),
            fps: self.opts.fps,
        }
    }

    /// Render the current state of the engine.
    pub fn render_current(&mut self) -> ReplayResult<FrameRGBA> {
        let view = self.engine.flush();
        self.rasterizer.render(&view)
    }

    fn step(&mut self) -> ReplayResult<StepOutcome> {
        let outcome = self.engine.step()?;
        self.calls += 1;
        Ok(outcome)
    }

    /// Frame `n` of the replay: the initial layout is frame 0, and frame `n` shows the state
    /// after `n` engine calls. Frames already passed cannot be revisited.
    pub fn frame_at(&mut self, n: u64) -> ReplayResult<FrameRGBA> {
        if n < self.calls {
            return Err(ReplayError::validation(format!(
                "frame {n} is behind the session (already at frame {})",
                self.calls
            )));
        }
        while self.calls < n {
            if self.engine.is_finished() {
                return Err(ReplayError::validation(format!(
                    "frame {n} is past the end of the replay (last frame is {})",
                    self.calls
                )));
            }
            self.step()?;
        }
        self.render_current()
    }

    /// Replay the remaining deck and stream every frame into `sink`.
    ///
    /// The current state is sent first, then one frame after every engine call. Frames cross to
    /// a scoped encoder thread through a bounded channel; a failing sink stops the replay.
    #[tracing::instrument(skip_all, fields(mode = ?self.opts.mode, steps = self.engine.deck().len()))]
    pub fn run(&mut self, sink: &mut dyn FrameSink) -> ReplayResult<ReplayStats> {
        let cfg = self.sink_config();
        let cap = self.opts.channel_capacity.max(1);

        let stats = std::thread::scope(|scope| -> ReplayResult<ReplayStats> {
            let (tx, rx) = mpsc::sync_channel::<FrameMsg>(cap);
            let sink_ref: &mut dyn FrameSink = sink;

            let enc = scope.spawn(move || -> ReplayResult<()> {
                sink_ref.begin(cfg)?;
                for msg in rx {
                    sink_ref.push_frame(msg.idx, &msg.frame)?;
                }
                sink_ref.end()
            });

            let produce_res = self.produce(&tx);
            drop(tx);
            let enc_res = enc
                .join()
                .map_err(|_| ReplayError::encode("encoder thread panicked"))?;

            // A dead encoder surfaces on the producer side as a send failure; report its cause.
            match (produce_res, enc_res) {
                (_, Err(e)) => Err(e),
                (Err(e), Ok(())) => Err(e),
                (Ok(stats), Ok(())) => Ok(stats),
            }
        })?;

        tracing::info!(
            frames = stats.frames,
            steps = stats.steps,
            duration_secs = stats.duration_secs,
            "replay finished"
        );
        Ok(stats)
    }

    fn produce(&mut self, tx: &mpsc::SyncSender<FrameMsg>) -> ReplayResult<ReplayStats> {
        let mut idx = FrameIndex(0);
        loop {
            let frame = self.render_current()?;
            tx.send(FrameMsg { idx, frame })
                .map_err(|_| ReplayError::encode("encoder thread is not accepting frames"))?;
            idx = idx.next();
            if self.engine.is_finished() {
                break;
            }
            self.step()?;
        }
        Ok(ReplayStats {
            frames: idx.0,
            steps: self.engine.cursor(),
            duration_secs: self.opts.fps.frames_to_secs(idx.0),
        })
    }
}

#[derive(Debug)]
struct FrameMsg {
    idx: FrameIndex,
    frame: FrameRGBA,
}

#[cfg(test)]
#[path = "../../tests/unit/session/replay_session.rs"]
mod tests;
