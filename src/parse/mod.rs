//! Readers for the three text artifacts of a banking run.
//!
//! - `.lg`: die, placement rows and the initial cells.
//! - `.opt`: one `Banking_Cell:` line per merge operation.
//! - `.postlg`: one block per merge operation with the legalized positions.
//!
//! All readers are line based and report the 1-based line number on failure.

pub(crate) mod lg;
pub(crate) mod opt;
pub(crate) mod postlg;

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{ReplayError, ReplayResult};

pub(crate) fn read_source(path: &Path) -> ReplayResult<String> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("read '{}'", path.display()))?;
    Ok(src)
}

/// Non-empty lines with their 1-based line numbers, split on whitespace.
pub(crate) fn token_lines(src: &str) -> impl Iterator<Item = (usize, Vec<&str>)> + '_ {
    src.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.split_whitespace().collect::<Vec<_>>()))
        .filter(|(_, toks)| !toks.is_empty())
}

pub(crate) fn number(tok: &str, line: usize, what: &str) -> ReplayResult<f64> {
    tok.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ReplayError::malformed(format!("line {line}: bad {what} '{tok}'")))
}

pub(crate) fn count(tok: &str, line: usize, what: &str) -> ReplayResult<usize> {
    tok.parse::<usize>()
        .map_err(|_| ReplayError::malformed(format!("line {line}: bad {what} '{tok}'")))
}
