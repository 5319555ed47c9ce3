//! Live cells and the dense outline buffer that mirrors them.

pub(crate) mod cell;
pub(crate) mod geometry;
pub(crate) mod store;
