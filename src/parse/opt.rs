use std::path::Path;

use crate::deck::records::MergeOp;
use crate::foundation::error::{ReplayError, ReplayResult};
use crate::parse::{number, read_source};

const BANKING_TAG: &str = "Banking_Cell:";
const ARROW: &str = "-->";

/// Parse an `.opt` banking log: `Banking_Cell: in1 in2 ... --> out x y width height`.
///
/// Lines without the `Banking_Cell:` tag are ignored.
pub fn parse_opt(src: &str) -> ReplayResult<Vec<MergeOp>> {
    let mut ops = Vec::new();
    for (i, raw) in src.lines().enumerate() {
        let line = i + 1;
        let Some(body) = raw.trim().strip_prefix(BANKING_TAG) else {
            continue;
        };
        let (lhs, rhs) = body.split_once(ARROW).ok_or_else(|| {
            ReplayError::malformed(format!("line {line}: missing '{ARROW}'"))
        })?;
        let out: Vec<&str> = rhs.split_whitespace().collect();
        let [name, x, y, w, h] = out.as_slice() else {
            return Err(ReplayError::malformed(format!(
                "line {line}: expected 'name x y width height' after '{ARROW}'"
            )));
        };
        ops.push(MergeOp {
            inputs: lhs.split_whitespace().map(str::to_string).collect(),
            output: (*name).to_string(),
            x: number(x, line, "merged x")?,
            y: number(y, line, "merged y")?,
            width: number(w, line, "merged width")?,
            height: number(h, line, "merged height")?,
        });
    }
    Ok(ops)
}

/// Read and parse an `.opt` file.
pub fn read_opt(path: impl AsRef<Path>) -> ReplayResult<Vec<MergeOp>> {
    parse_opt(&read_source(path.as_ref())?)
}

#[cfg(test)]
#[path = "../../tests/unit/parse/opt.rs"]
mod tests;
