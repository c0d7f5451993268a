use super::{Bracket, Rung, RungLadder, SlotInRung};
use crate::error::Result;
use crate::types::{Direction, Promotion, TrialId};

/// Bracket of Differential Evolution Hyperband (DEHB).
///
/// Differences to [`HyperbandBracket`](super::HyperbandBracket):
///
/// - With `init_trial_ids`, the slots of all rungs are numbered 0, 1, 2, ...
///   from the base rung up; this is done for the first bracket of a sweep.
///   Otherwise every slot starts without a trial.
/// - A result overwrites the trial id of its slot even if one is already set,
///   since which configuration lands in a slot is only known once the
///   evolutionary operator has produced and evaluated it.
/// - Completing a rung does not promote anything. The caller calls
///   [`advance`](Bracket::advance) and seeds the next rung from
///   [`top_list_for_previous_rung`](Bracket::top_list_for_previous_rung).
#[derive(Clone, Debug)]
pub struct DehbBracket {
    ladder: RungLadder,
}

impl DehbBracket {
    /// Create a bracket from `(size, level)` pairs, coarsest rung first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyRungs`](crate::Error::EmptyRungs),
    /// [`Error::InvalidRungSize`](crate::Error::InvalidRungSize), or
    /// [`Error::InvalidRungLevel`](crate::Error::InvalidRungLevel) for an
    /// invalid rung specification.
    pub fn new(rungs: &[(usize, u64)], direction: Direction, init_trial_ids: bool) -> Result<Self> {
        RungLadder::check_rungs(rungs)?;
        let mut next_trial_id: TrialId = 0;
        let mut ladder = Vec::with_capacity(rungs.len());
        for &(size, level) in rungs {
            let trial_ids = if init_trial_ids {
                let first = next_trial_id;
                next_trial_id += size as TrialId;
                (first..next_trial_id).map(Some).collect()
            } else {
                vec![None; size]
            };
            ladder.push(Rung::new(trial_ids, level));
        }
        trace_debug!(num_rungs = ladder.len(), init_trial_ids, "dehb bracket created");
        Ok(Self {
            ladder: RungLadder::new(ladder, direction),
        })
    }
}

impl Bracket for DehbBracket {
    fn ladder(&self) -> &RungLadder {
        &self.ladder
    }

    fn promotion(&self) -> Promotion {
        Promotion::External
    }

    /// Record a result, overwriting the slot's trial id and metric.
    ///
    /// # Errors
    ///
    /// See [`Bracket::on_result`].
    fn on_result(&mut self, result: &SlotInRung) -> Result<bool> {
        let (slot_index, trial_id, metric) = self.ladder.check_result(result)?;
        self.ladder.record(slot_index, trial_id, metric);
        let is_complete = self.ladder.is_rung_complete();
        if is_complete {
            trace_info!(rung_index = self.ladder.current_rung(), "rung complete");
        }
        Ok(is_complete)
    }

    fn next_free_slot(&mut self) -> Option<SlotInRung> {
        self.ladder.next_free_slot()
    }

    fn advance(&mut self) -> Result<()> {
        self.ladder.advance()?;
        trace_debug!(rung_index = self.ladder.current_rung(), "bracket advanced");
        Ok(())
    }
}
