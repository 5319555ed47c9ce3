//! Host loop tying the engine, the rasterizer and a frame sink together.

pub(crate) mod replay_session;
