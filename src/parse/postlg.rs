use std::path::Path;

use crate::deck::records::{Displacement, PostLegalRecord};
use crate::foundation::error::{ReplayError, ReplayResult};
use crate::parse::{count, number, read_source, token_lines};

// Counts come from the file; growth past this is driven by lines actually present.
const MAX_RESERVED_MOVES: usize = 1024;

enum Expect {
    Header,
    Count { x: f64, y: f64 },
    Moves,
}

/// Parse a `.postlg` file: per merge operation, a `x y` line for the merged cell, a move count,
/// then that many `name x y` lines.
///
/// A file that ends inside a block yields a final record with fewer `moves` than
/// `declared_moves`; [`crate::build_deck`] rejects it.
pub fn parse_postlg(src: &str) -> ReplayResult<Vec<PostLegalRecord>> {
    let mut records: Vec<PostLegalRecord> = Vec::new();
    let mut expect = Expect::Header;

    for (line, toks) in token_lines(src) {
        expect = match expect {
            Expect::Header => {
                let [x, y] = toks.as_slice() else {
                    return Err(ReplayError::malformed(format!(
                        "line {line}: expected merged cell position 'x y'"
                    )));
                };
                Expect::Count {
                    x: number(x, line, "x")?,
                    y: number(y, line, "y")?,
                }
            }
            Expect::Count { x, y } => {
                let [n] = toks.as_slice() else {
                    return Err(ReplayError::malformed(format!(
                        "line {line}: expected a move count"
                    )));
                };
                let declared_moves = count(n, line, "move count")?;
                records.push(PostLegalRecord {
                    x,
                    y,
                    declared_moves,
                    moves: Vec::with_capacity(declared_moves.min(MAX_RESERVED_MOVES)),
                });
                if declared_moves == 0 {
                    Expect::Header
                } else {
                    Expect::Moves
                }
            }
            Expect::Moves => {
                let [name, x, y] = toks.as_slice() else {
                    return Err(ReplayError::malformed(format!(
                        "line {line}: expected 'name x y'"
                    )));
                };
                let rec = records
                    .last_mut()
                    .ok_or_else(|| ReplayError::invariant("move line without a record"))?;
                rec.moves.push(Displacement {
                    name: (*name).to_string(),
                    x: number(x, line, "x")?,
                    y: number(y, line, "y")?,
                });
                if rec.moves.len() == rec.declared_moves {
                    Expect::Header
                } else {
                    Expect::Moves
                }
            }
        };
    }

    if let Expect::Count { .. } = expect {
        return Err(ReplayError::malformed(
            "file ends after a position line without a move count",
        ));
    }
    Ok(records)
}

/// Read and parse a `.postlg` file.
pub fn read_postlg(path: impl AsRef<Path>) -> ReplayResult<Vec<PostLegalRecord>> {
    parse_postlg(&read_source(path.as_ref())?)
}

#[cfg(test)]
#[path = "../../tests/unit/parse/postlg.rs"]
mod tests;
