//! Step-by-step replay of a [`crate::StepDeck`] onto a [`crate::CellStore`].

pub(crate) mod engine;
pub(crate) mod palette;
pub(crate) mod phase;
