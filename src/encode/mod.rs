//! Frame sinks.
//!
//! Sinks consume rendered frames in replay order and are driven by `ReplaySession::run`.

/// `ffmpeg`-based sink (video output via system `ffmpeg`).
pub(crate) mod ffmpeg;
/// Animated GIF sink built on the `image` crate.
pub(crate) mod gif;
/// Frame sink trait and the in-memory sink.
pub(crate) mod sink;
