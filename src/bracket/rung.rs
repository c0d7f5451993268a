//! Rungs, slots, and the rung ladder shared by every bracket variant.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ranking::top_list;
use crate::types::{Direction, TrialId};

/// A slot: the trial occupying it (if known) and its metric (if observed).
pub type Slot = (Option<TrialId>, Option<f64>);

/// One resource level of a bracket with a fixed number of slots.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rung {
    level: u64,
    slots: Vec<Slot>,
}

impl Rung {
    pub(crate) fn new(trial_ids: Vec<Option<TrialId>>, level: u64) -> Self {
        Self {
            level,
            slots: trial_ids.into_iter().map(|id| (id, None)).collect(),
        }
    }

    /// Resource level (e.g. number of epochs) evaluations at this rung run for.
    #[must_use]
    pub fn level(&self) -> u64 {
        self.level
    }

    /// Number of slots. Fixed for the lifetime of the rung.
    #[must_use]
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// All slots in slot order.
    #[must_use]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Number of slots holding a metric.
    #[must_use]
    pub fn num_scored(&self) -> usize {
        self.slots.iter().filter(|(_, m)| m.is_some()).count()
    }

    /// Whether every slot holds a metric.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|(_, m)| m.is_some())
    }
}

/// A slot handed out as a job, or reported back as a result.
///
/// [`next_free_slot`](super::Bracket::next_free_slot) returns one with
/// `metric == None`. The caller fills in `trial_id` if the slot had none,
/// sets `metric` once the evaluation at `level` finishes, and passes it to
/// [`on_result`](super::Bracket::on_result).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SlotInRung {
    /// Index of the rung within its bracket.
    pub rung_index: usize,
    /// Resource level of the rung.
    pub level: u64,
    /// Index of the slot within the rung.
    pub slot_index: usize,
    /// Trial evaluated in this slot.
    pub trial_id: Option<TrialId>,
    /// Observed metric value.
    pub metric: Option<f64>,
}

impl SlotInRung {
    /// Return a copy of this slot carrying the given trial and metric.
    #[must_use]
    pub fn with_result(&self, trial_id: TrialId, metric: f64) -> Self {
        Self {
            trial_id: Some(trial_id),
            metric: Some(metric),
            ..self.clone()
        }
    }
}

/// The ordered rungs of a bracket plus the position of the active rung.
///
/// Read access is public; mutation goes through the bracket variants, which
/// decide how results and promotions are applied.
#[derive(Clone, Debug)]
pub struct RungLadder {
    rungs: Vec<Rung>,
    direction: Direction,
    current_rung: usize,
    first_free_slot: usize,
}

impl RungLadder {
    /// Check a `(size, level)` rung specification.
    ///
    /// Sizes must be positive, levels positive and strictly increasing.
    pub(crate) fn check_rungs(rungs: &[(usize, u64)]) -> Result<()> {
        if rungs.is_empty() {
            return Err(Error::EmptyRungs);
        }
        let mut previous_level = 0;
        for (rung_index, &(size, level)) in rungs.iter().enumerate() {
            if size == 0 {
                return Err(Error::InvalidRungSize { rung_index });
            }
            if level <= previous_level {
                return Err(Error::InvalidRungLevel { rung_index, level });
            }
            previous_level = level;
        }
        Ok(())
    }

    pub(crate) fn new(rungs: Vec<Rung>, direction: Direction) -> Self {
        Self {
            rungs,
            direction,
            current_rung: 0,
            first_free_slot: 0,
        }
    }

    /// Optimization direction used for ranking.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Number of rungs.
    #[must_use]
    pub fn num_rungs(&self) -> usize {
        self.rungs.len()
    }

    /// Index of the active rung. Equals [`num_rungs`](Self::num_rungs) once the bracket is complete.
    #[must_use]
    pub fn current_rung(&self) -> usize {
        self.current_rung
    }

    /// All rungs, coarsest first.
    #[must_use]
    pub fn rungs(&self) -> &[Rung] {
        &self.rungs
    }

    /// The rung at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RungIndexOutOfRange`] if `index` is not a rung.
    pub fn rung(&self, index: usize) -> Result<&Rung> {
        self.rungs.get(index).ok_or(Error::RungIndexOutOfRange {
            index,
            num_rungs: self.rungs.len(),
        })
    }

    fn active(&self) -> Option<&Rung> {
        self.rungs.get(self.current_rung)
    }

    /// Whether every rung has been completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current_rung >= self.rungs.len()
    }

    /// Slot count of the active rung, 0 once the bracket is complete.
    #[must_use]
    pub fn size_of_current_rung(&self) -> usize {
        self.active().map_or(0, Rung::size)
    }

    /// Level of the active rung, `None` once the bracket is complete.
    #[must_use]
    pub fn level_of_current_rung(&self) -> Option<u64> {
        self.active().map(Rung::level)
    }

    /// Whether every slot of the active rung holds a metric.
    #[must_use]
    pub fn is_rung_complete(&self) -> bool {
        self.active().is_some_and(Rung::is_complete)
    }

    /// Slots of the active rung still waiting for a metric.
    #[must_use]
    pub fn num_pending_slots(&self) -> usize {
        self.active().map_or(0, |r| r.size() - r.num_scored())
    }

    /// Trial stored at a slot, `None` if not yet known.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RungIndexOutOfRange`] or [`Error::SlotIndexOutOfRange`].
    pub fn trial_id_for_slot(&self, rung_index: usize, slot_index: usize) -> Result<Option<TrialId>> {
        let rung = self.rung(rung_index)?;
        rung.slots
            .get(slot_index)
            .map(|&(trial_id, _)| trial_id)
            .ok_or(Error::SlotIndexOutOfRange {
                rung_index,
                index: slot_index,
                size: rung.size(),
            })
    }

    /// Best trials of the rung below the active one, as many as the active rung has slots.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoPreviousRung`] on the base rung,
    /// [`Error::BracketComplete`] once all rungs are done, and any error of
    /// [`top_list`].
    pub fn top_list_for_previous_rung(&self) -> Result<Vec<TrialId>> {
        if self.current_rung == 0 {
            return Err(Error::NoPreviousRung);
        }
        if self.is_complete() {
            return Err(Error::BracketComplete {
                num_rungs: self.rungs.len(),
            });
        }
        let previous = &self.rungs[self.current_rung - 1];
        top_list(&previous.slots, self.size_of_current_rung(), self.direction)
    }

    /// Hand out the next slot of the active rung that has not been handed out yet.
    pub(crate) fn next_free_slot(&mut self) -> Option<SlotInRung> {
        let rung_index = self.current_rung;
        let slot_index = self.first_free_slot;
        let rung = self.rungs.get(rung_index)?;
        let &(trial_id, _) = rung.slots.get(slot_index)?;
        let level = rung.level;
        self.first_free_slot += 1;
        Some(SlotInRung {
            rung_index,
            level,
            slot_index,
            trial_id,
            metric: None,
        })
    }

    /// Validate a result against the active rung.
    ///
    /// Returns the slot index, trial id, and metric to record.
    pub(crate) fn check_result(&self, result: &SlotInRung) -> Result<(usize, TrialId, f64)> {
        let Some(rung) = self.active() else {
            return Err(Error::BracketComplete {
                num_rungs: self.rungs.len(),
            });
        };
        if result.rung_index != self.current_rung {
            return Err(Error::ResultForWrongRung {
                expected: self.current_rung,
                got: result.rung_index,
            });
        }
        let slot_index = result.slot_index;
        if slot_index >= rung.size() {
            return Err(Error::SlotIndexOutOfRange {
                rung_index: self.current_rung,
                index: slot_index,
                size: rung.size(),
            });
        }
        let metric = result.metric.ok_or(Error::MissingMetric { slot_index })?;
        if metric.is_nan() {
            return Err(Error::InvalidMetric { slot_index });
        }
        let trial_id = result
            .trial_id
            .ok_or(Error::MissingResultTrialId { slot_index })?;
        Ok((slot_index, trial_id, metric))
    }

    /// Slot of the active rung. `slot_index` must have passed [`check_result`](Self::check_result).
    pub(crate) fn current_slot(&self, slot_index: usize) -> Slot {
        self.rungs[self.current_rung].slots[slot_index]
    }

    pub(crate) fn record(&mut self, slot_index: usize, trial_id: TrialId, metric: f64) {
        self.rungs[self.current_rung].slots[slot_index] = (Some(trial_id), Some(metric));
    }

    /// Overwrite the trial ids of a rung that has not been started yet.
    pub(crate) fn assign_trial_ids(&mut self, rung_index: usize, trial_ids: &[TrialId]) {
        for (slot, &trial_id) in self.rungs[rung_index].slots.iter_mut().zip(trial_ids) {
            *slot = (Some(trial_id), None);
        }
    }

    /// Move on to the next rung once the active one is complete.
    pub(crate) fn advance(&mut self) -> Result<()> {
        let Some(rung) = self.active() else {
            return Err(Error::BracketComplete {
                num_rungs: self.rungs.len(),
            });
        };
        if !rung.is_complete() {
            return Err(Error::RungIncomplete {
                rung_index: self.current_rung,
                pending: rung.size() - rung.num_scored(),
            });
        }
        self.current_rung += 1;
        self.first_free_slot = 0;
        Ok(())
    }
}
