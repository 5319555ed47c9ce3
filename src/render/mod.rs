//! CPU rendering of the geometry buffer into RGBA frames.

pub(crate) mod backend;
pub(crate) mod cpu;
pub(crate) mod viewport;
