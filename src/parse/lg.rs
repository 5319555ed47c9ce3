use std::path::Path;

use crate::deck::records::{CellRecord, InitialLayout, PlacementRow};
use crate::foundation::core::Rect;
use crate::foundation::error::{ReplayError, ReplayResult};
use crate::parse::{count, number, read_source, token_lines};

/// Parse an `.lg` layout.
///
/// Recognized lines:
///
/// ```text
/// Alpha 1
/// Beta 5
/// DieSize 0 0 100 50
/// PlacementRows 0 0 1 10 100
/// C1 10 20 2 10 NOTFIX
/// ```
///
/// A line whose last token is `FIX` or `NOTFIX` is a cell. Any other line is ignored unless it
/// starts with one of the keywords above.
pub fn parse_lg(src: &str) -> ReplayResult<InitialLayout> {
    let mut die = None;
    let mut alpha = None;
    let mut beta = None;
    let mut cells = Vec::new();
    let mut rows = Vec::new();

    for (line, toks) in token_lines(src) {
        match toks.as_slice() {
            ["Alpha", v] => alpha = Some(number(v, line, "Alpha")?),
            ["Beta", v] => beta = Some(number(v, line, "Beta")?),
            ["DieSize", x0, y0, x1, y1] => {
                let die_rect = Rect::new(
                    number(x0, line, "die x0")?,
                    number(y0, line, "die y0")?,
                    number(x1, line, "die x1")?,
                    number(y1, line, "die y1")?,
                );
                if die_rect.width() <= 0.0 || die_rect.height() <= 0.0 {
                    return Err(ReplayError::malformed(format!(
                        "line {line}: empty die {x0} {y0} {x1} {y1}"
                    )));
                }
                die = Some(die_rect);
            }
            ["DieSize", ..] => {
                return Err(ReplayError::malformed(format!(
                    "line {line}: DieSize needs 4 coordinates"
                )));
            }
            ["PlacementRows", x, y, sw, sh, n] => rows.push(PlacementRow {
                x: number(x, line, "row x")?,
                y: number(y, line, "row y")?,
                site_width: number(sw, line, "site width")?,
                site_height: number(sh, line, "site height")?,
                sites: u32::try_from(count(n, line, "site count")?).map_err(|_| {
                    ReplayError::malformed(format!("line {line}: site count '{n}' too large"))
                })?,
            }),
            [name, x, y, w, h, fix @ ("FIX" | "NOTFIX")] => cells.push(CellRecord {
                name: (*name).to_string(),
                x: number(x, line, "cell x")?,
                y: number(y, line, "cell y")?,
                width: number(w, line, "cell width")?,
                height: number(h, line, "cell height")?,
                fixed: *fix == "FIX",
            }),
            [.., "FIX" | "NOTFIX"] => {
                return Err(ReplayError::malformed(format!(
                    "line {line}: cell line needs 'name x y width height FIX|NOTFIX'"
                )));
            }
            _ => {}
        }
    }

    let die = die.ok_or_else(|| ReplayError::malformed("layout has no DieSize line"))?;
    Ok(InitialLayout {
        die,
        cells,
        rows,
        alpha,
        beta,
    })
}

/// Read and parse an `.lg` file.
pub fn read_lg(path: impl AsRef<Path>) -> ReplayResult<InitialLayout> {
    parse_lg(&read_source(path.as_ref())?)
}

#[cfg(test)]
#[path = "../../tests/unit/parse/lg.rs"]
mod tests;
