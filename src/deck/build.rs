use std::collections::HashSet;

use smallvec::SmallVec;

use crate::deck::records::{CellRecord, Displacement, InitialLayout, MergeOp, PostLegalRecord};
use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{ReplayError, ReplayResult};

/// One banking step joined with its legalization outcome.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OptimizationStep {
    /// Position of the step in the deck.
    pub index: usize,
    /// Cells removed by the merge.
    pub removed: SmallVec<[String; 4]>,
    /// The merged cell at its nominal (pre-legalization) geometry.
    pub merged: CellRecord,
    /// Final lower-left corner of the merged cell.
    pub merged_final: Point,
    /// Other cells moved by legalization, with their final positions.
    pub displaced: Vec<Displacement>,
}

impl OptimizationStep {
    /// Name of the merged cell.
    pub fn merged_name(&self) -> &str {
        &self.merged.name
    }

    /// Merged cell geometry where the optimizer first put it.
    pub fn nominal_rect(&self) -> Rect {
        self.merged.rect()
    }

    /// Merged cell geometry after legalization.
    pub fn final_rect(&self) -> Rect {
        self.nominal_rect().with_origin(self.merged_final)
    }
}

/// Immutable, ordered sequence of optimization steps.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StepDeck {
    steps: Vec<OptimizationStep>,
}

impl StepDeck {
    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Return `true` when there is nothing to replay.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step at `index`.
    pub fn get(&self, index: usize) -> Option<&OptimizationStep> {
        self.steps.get(index)
    }

    /// All steps in replay order.
    pub fn steps(&self) -> &[OptimizationStep] {
        &self.steps
    }

    /// Iterate steps in replay order.
    pub fn iter(&self) -> std::slice::Iter<'_, OptimizationStep> {
        self.steps.iter()
    }

    /// Total number of side-effect moves across all steps.
    pub fn total_displacements(&self) -> usize {
        self.steps.iter().map(|s| s.displaced.len()).sum()
    }

    /// Pretty-printed JSON dump of the deck.
    pub fn to_json_pretty(&self) -> ReplayResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ReplayError::serde(e.to_string()))
    }
}

/// Join merge operations with post-legalization records, positionally.
///
/// Cell liveness is simulated from `initial` in file order, so a step that refers to a cell that
/// does not exist at that point, or reuses a name, is rejected here instead of derailing the
/// replay halfway through.
#[tracing::instrument(skip_all, fields(cells = initial.cells.len(), merges = merges.len()))]
pub fn build_deck(
    initial: &InitialLayout,
    merges: &[MergeOp],
    post: &[PostLegalRecord],
) -> ReplayResult<StepDeck> {
    if merges.len() != post.len() {
        return Err(ReplayError::malformed(format!(
            "{} merge operations but {} post-legalization records",
            merges.len(),
            post.len()
        )));
    }

    let mut live: HashSet<&str> = HashSet::with_capacity(initial.cells.len() + merges.len());
    for c in &initial.cells {
        if !live.insert(c.name.as_str()) {
            return Err(ReplayError::malformed(format!(
                "initial layout lists cell '{}' twice",
                c.name
            )));
        }
    }
    let mut seen = live.clone();

    let mut steps = Vec::with_capacity(merges.len());
    for (index, (op, rec)) in merges.iter().zip(post).enumerate() {
        if rec.declared_moves != rec.moves.len() {
            return Err(ReplayError::malformed(format!(
                "post-legalization record {index} is truncated: {} of {} moves present",
                rec.moves.len(),
                rec.declared_moves
            )));
        }
        if !(op.width.is_finite() && op.height.is_finite() && op.width > 0.0 && op.height > 0.0) {
            return Err(ReplayError::malformed(format!(
                "step {index}: merged cell '{}' has invalid size {}x{}",
                op.output, op.width, op.height
            )));
        }

        for input in &op.inputs {
            if !live.remove(input.as_str()) {
                return Err(ReplayError::malformed(format!(
                    "step {index}: input cell '{input}' is not live"
                )));
            }
        }

        if !seen.insert(op.output.as_str()) {
            return Err(ReplayError::malformed(format!(
                "step {index}: merged cell '{}' reuses an existing name",
                op.output
            )));
        }
        live.insert(op.output.as_str());

        let mut displaced: HashSet<&str> = HashSet::with_capacity(rec.moves.len());
        for mv in &rec.moves {
            if mv.name == op.output || !live.contains(mv.name.as_str()) {
                return Err(ReplayError::malformed(format!(
                    "step {index}: displaced cell '{}' is not a live bystander",
                    mv.name
                )));
            }
            if !displaced.insert(mv.name.as_str()) {
                return Err(ReplayError::malformed(format!(
                    "step {index}: cell '{}' displaced twice",
                    mv.name
                )));
            }
        }

        tracing::debug!(
            index,
            merged = %op.output,
            removed = op.inputs.len(),
            displaced = rec.moves.len(),
            "step"
        );
        steps.push(OptimizationStep {
            index,
            removed: op.inputs.iter().cloned().collect(),
            merged: CellRecord {
                name: op.output.clone(),
                x: op.x,
                y: op.y,
                width: op.width,
                height: op.height,
                fixed: false,
            },
            merged_final: Point::new(rec.x, rec.y),
            displaced: rec.moves.clone(),
        });
    }

    Ok(StepDeck { steps })
}

#[cfg(test)]
#[path = "../../tests/unit/deck/build.rs"]
mod tests;
