use crate::board::cell::{Cell, Layer};
use crate::board::geometry::BufferView;
use crate::board::store::{CellStore, overlaps};
use crate::deck::build::{OptimizationStep, StepDeck};
use crate::deck::records::{Displacement, InitialLayout, PlacementRow};
use crate::foundation::core::Rect;
use crate::foundation::error::{ReplayError, ReplayResult};
use crate::replay::palette::Palette;
use crate::replay::phase::Phase;

/// How much of each optimization step one call to [`ReplayEngine::step`] shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ReplayMode {
    /// One call applies a whole step.
    #[default]
    Coarse,
    /// One call runs one phase of a step, animating legalization conflicts.
    Detail,
}

/// Result of a successful [`ReplayEngine::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// More work remains.
    Continues,
    /// The last step of the deck has been fully applied.
    Finished,
}

/// Per-step bookkeeping for detail mode.
#[derive(Clone, Debug, Default)]
struct DetailState {
    phase: Phase,
    // LIFO: the most recently discovered conflict is resolved first.
    worklist: Vec<Displacement>,
    pending: Vec<Displacement>,
    moved: Vec<String>,
}

/// Drives a [`CellStore`] through a [`StepDeck`].
///
/// The engine is single-threaded and synchronous: each [`step`](Self::step) runs to completion
/// and leaves the geometry buffer ready for one [`flush`](Self::flush).
#[derive(Clone, Debug)]
pub struct ReplayEngine {
    deck: StepDeck,
    mode: ReplayMode,
    palette: Palette,
    store: CellStore,
    die: Rect,
    rows: Vec<PlacementRow>,
    cursor: usize,
    detail: DetailState,
}

impl ReplayEngine {
    /// Load the initial layout into a fresh store sized `cells + 10`.
    pub fn new(initial: &InitialLayout, deck: StepDeck, mode: ReplayMode) -> ReplayResult<Self> {
        let palette = Palette::for_mode(mode);
        let mut store = CellStore::with_capacity(CellStore::capacity_for(initial.cells.len()));
        for rec in &initial.cells {
            let color = palette.steady(rec.fixed, false);
            store.insert(Cell::new(
                rec.name.clone(),
                rec.rect(),
                rec.fixed,
                false,
                color,
            ))?;
        }
        tracing::debug!(
            cells = store.len(),
            steps = deck.len(),
            ?mode,
            "replay engine loaded"
        );
        Ok(Self {
            deck,
            mode,
            palette,
            store,
            die: initial.die,
            rows: initial.rows.clone(),
            cursor: 0,
            detail: DetailState::default(),
        })
    }

    /// Advance the replay by one unit of work: a whole step in coarse mode, one phase in detail
    /// mode.
    pub fn step(&mut self) -> ReplayResult<StepOutcome> {
        if self.is_finished() {
            return Err(ReplayError::DeckExhausted);
        }
        match self.mode {
            ReplayMode::Coarse => self.advance_coarse()?,
            ReplayMode::Detail => self.advance_detail()?,
        }
        Ok(if self.is_finished() {
            StepOutcome::Finished
        } else {
            StepOutcome::Continues
        })
    }

    fn current_step(&self) -> ReplayResult<OptimizationStep> {
        self.deck
            .get(self.cursor)
            .cloned()
            .ok_or(ReplayError::DeckExhausted)
    }

    fn advance_coarse(&mut self) -> ReplayResult<()> {
        let step = self.current_step()?;
        for name in &step.removed {
            self.store.remove(name)?;
        }
        let merged = Cell::new(
            step.merged_name(),
            step.final_rect(),
            false,
            true,
            self.palette.merged,
        );
        self.store.insert(merged)?;
        for mv in &step.displaced {
            self.store.move_to(&mv.name, mv.to())?;
        }
        self.store.set_highlight(Some(step.final_rect()));

        tracing::debug!(
            step = step.index,
            merged = step.merged_name(),
            active = self.store.len(),
            "coarse step applied"
        );
        self.cursor += 1;
        Ok(())
    }

    fn advance_detail(&mut self) -> ReplayResult<()> {
        let step = self.current_step()?;
        let phase = self.detail.phase;
        match phase {
            Phase::Remove => self.phase_remove(&step)?,
            Phase::Merge => self.phase_merge(&step)?,
            Phase::Move => self.phase_move(&step)?,
            Phase::ShowResult => self.phase_show_result(&step)?,
        }
        self.detail.phase = phase.next(self.detail.worklist.is_empty());
        tracing::trace!(
            step = step.index,
            ?phase,
            worklist = self.detail.worklist.len(),
            pending = self.detail.pending.len(),
            "detail phase done"
        );
        Ok(())
    }

    fn phase_remove(&mut self, step: &OptimizationStep) -> ReplayResult<()> {
        if !self.detail.worklist.is_empty() {
            return Err(ReplayError::invariant(format!(
                "worklist not empty at the start of step {}",
                step.index
            )));
        }
        for name in &step.removed {
            self.store
                .restyle(name, self.palette.pending_removal, Layer::PendingRemoval)?;
        }
        self.detail.pending = step.displaced.clone();
        self.detail.moved.clear();
        Ok(())
    }

    fn phase_merge(&mut self, step: &OptimizationStep) -> ReplayResult<()> {
        let merged = Cell::new(
            step.merged_name(),
            step.nominal_rect(),
            false,
            true,
            self.palette.unresolved,
        );
        self.store.insert(merged)?;
        self.detail.worklist.push(Displacement {
            name: step.merged_name().to_string(),
            x: step.merged_final.x,
            y: step.merged_final.y,
        });
        Ok(())
    }

    fn phase_move(&mut self, step: &OptimizationStep) -> ReplayResult<()> {
        let entry = self.detail.worklist.pop().ok_or_else(|| {
            ReplayError::invariant(format!("MOVE with an empty worklist in step {}", step.index))
        })?;
        let landed = self.store.move_to(&entry.name, entry.to())?;

        if entry.name == step.merged_name() {
            for name in &step.removed {
                self.store.remove(name)?;
            }
            self.store.set_highlight(Some(landed));
        } else {
            self.store
                .restyle(&entry.name, self.palette.resolved, Layer::Resolved)?;
        }
        self.detail.moved.push(entry.name);

        let mut i = 0;
        while i < self.detail.pending.len() {
            let name = &self.detail.pending[i].name;
            if overlaps(&self.store.get(name)?.rect, &landed) {
                self.store
                    .restyle(name, self.palette.conflict, Layer::Conflict)?;
                let conflict = self.detail.pending.swap_remove(i);
                self.detail.worklist.push(conflict);
            } else {
                i += 1;
            }
        }
        Ok(())
    }

    fn phase_show_result(&mut self, step: &OptimizationStep) -> ReplayResult<()> {
        for rest in std::mem::take(&mut self.detail.pending) {
            self.store.move_to(&rest.name, rest.to())?;
            self.detail.moved.push(rest.name);
        }
        self.store.set_highlight(None);

        for name in std::mem::take(&mut self.detail.moved) {
            let cell = self.store.get(&name)?;
            let color = self.palette.steady(cell.fixed, cell.merged);
            let layer = Layer::steady(cell.merged);
            self.store.restyle(&name, color, layer)?;
        }

        tracing::debug!(
            step = step.index,
            merged = step.merged_name(),
            active = self.store.len(),
            "detail step applied"
        );
        self.cursor += 1;
        Ok(())
    }

    /// Phase the next detail-mode call will run. Always [`Phase::Remove`] in coarse mode.
    pub fn phase(&self) -> Phase {
        self.detail.phase
    }

    /// Index of the step the next call works on.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Return `true` once every step has been applied.
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.deck.len()
    }

    /// Replay mode chosen at construction.
    pub fn mode(&self) -> ReplayMode {
        self.mode
    }

    /// Colors in use.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// The deck being replayed.
    pub fn deck(&self) -> &StepDeck {
        &self.deck
    }

    /// Live cells and their geometry buffer.
    pub fn store(&self) -> &CellStore {
        &self.store
    }

    /// Number of entries waiting in the detail-mode worklist.
    pub fn worklist_len(&self) -> usize {
        self.detail.worklist.len()
    }

    /// Hand the geometry buffer to a renderer; call once per frame.
    pub fn flush(&mut self) -> BufferView<'_> {
        self.store.flush()
    }

    /// Die bounding box of the layout.
    pub fn die(&self) -> Rect {
        self.die
    }

    /// Placement rows of the layout.
    pub fn rows(&self) -> &[PlacementRow] {
        &self.rows
    }
}

#[cfg(test)]
#[path = "../../tests/unit/replay/engine.rs"]
mod tests;
