//! Replay of a placement banking run as a video.
//!
//! A banking optimizer merges groups of cells into larger cells, and a legalizer then pushes the
//! merged cell and its neighbours to legal positions. This crate replays such a run:
//!
//! - Read the layout, the banking log and the legalization log ([`read_lg`], [`read_opt`],
//!   [`read_postlg`]) and join them into a [`StepDeck`] with [`build_deck`]
//! - Drive a [`ReplayEngine`] through the deck, coarse (a step per call) or detailed (a phase
//!   per call, animating every legalization conflict)
//! - Render frames with a [`ReplaySession`] and stream them into a [`FrameSink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod board;
mod deck;
mod encode;
mod foundation;
mod parse;
mod render;
mod replay;
mod session;

pub use crate::foundation::core::{Fps, FrameIndex, Point, Rect, Rgb, rect_at};
pub use crate::foundation::error::{ReplayError, ReplayResult};

pub use crate::board::cell::{Cell, Layer};
pub use crate::board::geometry::{
    BufferView, COMPONENTS, GeometryBuffer, SLOT_STRIDE, VERTICES_PER_SLOT,
};
pub use crate::board::store::{CAPACITY_SLACK, CellStore, overlaps};
pub use crate::deck::build::{OptimizationStep, StepDeck, build_deck};
pub use crate::deck::records::{
    CellRecord, Displacement, InitialLayout, MergeOp, PlacementRow, PostLegalRecord,
};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::gif::{DEFAULT_GIF_FPS, GifSink, GifSinkOpts, frame_delay};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::parse::lg::{parse_lg, read_lg};
pub use crate::parse::opt::{parse_opt, read_opt};
pub use crate::parse::postlg::{parse_postlg, read_postlg};
pub use crate::render::backend::FrameRGBA;
pub use crate::render::cpu::{CpuRasterizer, RasterOpts};
pub use crate::render::viewport::{DEFAULT_HEIGHT, Viewport};
pub use crate::replay::engine::{ReplayEngine, ReplayMode, StepOutcome};
pub use crate::replay::palette::Palette;
pub use crate::replay::phase::Phase;
pub use crate::session::replay_session::{ReplaySession, ReplaySessionOpts, ReplayStats};
