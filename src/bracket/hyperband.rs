use super::{Bracket, Rung, RungLadder, SlotInRung};
use crate::error::{Error, Result};
use crate::ranking::top_list;
use crate::types::{Direction, Promotion};

/// Bracket of standard synchronous Hyperband.
///
/// All slots start without a trial. A result claims an empty slot for its
/// trial; after that the slot belongs to that trial and accepts exactly one
/// metric. When the active rung completes, its top list is written into the
/// next rung and the bracket advances by itself.
///
/// # Examples
///
/// ```
/// use sync_hyperband::Direction;
/// use sync_hyperband::bracket::{Bracket, HyperbandBracket};
///
/// let mut bracket = HyperbandBracket::new(&[(2, 1), (1, 2)], Direction::Maximize).unwrap();
/// for (trial_id, metric) in [(10, 0.3), (11, 0.7)] {
///     let slot = bracket.next_free_slot().unwrap();
///     bracket.on_result(&slot.with_result(trial_id, metric)).unwrap();
/// }
/// // Trial 11 was promoted and now occupies the single slot of rung 1.
/// assert_eq!(bracket.current_rung(), 1);
/// assert_eq!(bracket.trial_id_for_slot(1, 0).unwrap(), Some(11));
/// ```
#[derive(Clone, Debug)]
pub struct HyperbandBracket {
    ladder: RungLadder,
}

impl HyperbandBracket {
    /// Create a bracket from `(size, level)` pairs, coarsest rung first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyRungs`], [`Error::InvalidRungSize`], or
    /// [`Error::InvalidRungLevel`] for an invalid rung specification, and
    /// [`Error::IncreasingRungSize`] if a rung is larger than the one below
    /// it, since promotion could not fill it.
    pub fn new(rungs: &[(usize, u64)], direction: Direction) -> Result<Self> {
        RungLadder::check_rungs(rungs)?;
        if let Some(rung_index) = rungs.windows(2).position(|w| w[1].0 > w[0].0) {
            return Err(Error::IncreasingRungSize {
                rung_index: rung_index + 1,
                size: rungs[rung_index + 1].0,
                previous: rungs[rung_index].0,
            });
        }
        let rungs: Vec<Rung> = rungs
            .iter()
            .map(|&(size, level)| Rung::new(vec![None; size], level))
            .collect();
        trace_debug!(num_rungs = rungs.len(), "hyperband bracket created");
        Ok(Self {
            ladder: RungLadder::new(rungs, direction),
        })
    }

    fn promote_trials_at_rung_complete(&mut self) -> Result<()> {
        let rung_index = self.ladder.current_rung();
        let next_index = rung_index + 1;
        if let Ok(next) = self.ladder.rung(next_index) {
            let completed = self.ladder.rung(rung_index)?;
            let promoted = top_list(completed.slots(), next.size(), self.ladder.direction())?;
            trace_debug!(rung_index, promoted = promoted.len(), "trials promoted");
            self.ladder.assign_trial_ids(next_index, &promoted);
        }
        self.ladder.advance()
    }
}

impl Bracket for HyperbandBracket {
    fn ladder(&self) -> &RungLadder {
        &self.ladder
    }

    fn promotion(&self) -> Promotion {
        Promotion::Automatic
    }

    /// Record a result and promote automatically if the rung completes.
    ///
    /// # Errors
    ///
    /// In addition to the checks of [`Bracket::on_result`], fails with
    /// [`Error::TrialIdMismatch`] if the slot belongs to another trial and
    /// with [`Error::SlotAlreadyScored`] if the slot already has a metric.
    fn on_result(&mut self, result: &SlotInRung) -> Result<bool> {
        let (slot_index, trial_id, metric) = self.ladder.check_result(result)?;
        let (current_trial, current_metric) = self.ladder.current_slot(slot_index);
        if current_trial.is_some_and(|id| id != trial_id) {
            return Err(Error::TrialIdMismatch {
                slot_index,
                expected: current_trial,
                got: trial_id,
            });
        }
        if current_metric.is_some() {
            return Err(Error::SlotAlreadyScored {
                rung_index: self.ladder.current_rung(),
                slot_index,
            });
        }
        self.ladder.record(slot_index, trial_id, metric);

        let is_complete = self.ladder.is_rung_complete();
        if is_complete {
            trace_info!(rung_index = self.ladder.current_rung(), "rung complete");
            self.promote_trials_at_rung_complete()?;
        }
        Ok(is_complete)
    }

    fn next_free_slot(&mut self) -> Option<SlotInRung> {
        self.ladder.next_free_slot()
    }

    fn advance(&mut self) -> Result<()> {
        Err(Error::AutomaticPromotion)
    }
}
