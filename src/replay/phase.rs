/// Sub-step of a detail-mode step. Each call to `step()` runs exactly one phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Phase {
    /// Mark the input cells for removal.
    #[default]
    Remove,
    /// Insert the merged cell at its nominal position.
    Merge,
    /// Resolve one worklist entry.
    Move,
    /// Snap leftovers and return every touched cell to rest.
    ShowResult,
}

impl Phase {
    /// Phase that follows `self`. Only `Move` looks at the worklist: it repeats until it drains.
    pub fn next(self, worklist_empty: bool) -> Phase {
        match self {
            Phase::Remove => Phase::Merge,
            Phase::Merge => Phase::Move,
            Phase::Move if worklist_empty => Phase::ShowResult,
            Phase::Move => Phase::Move,
            Phase::ShowResult => Phase::Remove,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/replay/phase.rs"]
mod tests;
