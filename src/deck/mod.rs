//! Input records and the step deck built from them.

pub(crate) mod build;
pub(crate) mod records;
