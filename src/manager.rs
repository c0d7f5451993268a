//! The scheduling loop around brackets: hand out jobs, route results.
//!
//! A [`BracketManager`] owns the brackets of a sweep. [`next_job`](BracketManager::next_job)
//! returns a free slot of the oldest bracket that has one, opening a new
//! bracket (next schedule of the [`RungSystem`]) when none has. Slots
//! without a trial get a fresh trial id. Results are routed back with
//! [`on_result`](BracketManager::on_result); externally promoted brackets
//! are advanced as soon as their rung completes, and finished brackets are
//! retired.
//!
//! For DEHB the caller decides which configuration a fresh trial of rung
//! `k > 0` evaluates, typically from
//! [`top_list_for_previous_rung`](crate::bracket::Bracket::top_list_for_previous_rung)
//! of the job's bracket.
//!
//! # Example
//!
//! ```
//! use sync_hyperband::manager::{BracketKind, BracketManager};
//! use sync_hyperband::rung_system::RungSystem;
//!
//! let system = RungSystem::builder().max_resource(9).build().unwrap();
//! let mut manager = BracketManager::builder(system).kind(BracketKind::Hyperband).build();
//!
//! let job = manager.next_job().unwrap();
//! assert_eq!((job.bracket_id, job.slot.level), (0, 1));
//! let trial_id = job.trial_id;
//! manager.on_result(job.bracket_id, &job.slot.with_result(trial_id, 0.5)).unwrap();
//! ```

use std::collections::BTreeMap;

use crate::blackbox::{Blackbox, Configuration};
use crate::bracket::{Bracket, DehbBracket, HyperbandBracket, SlotInRung};
use crate::error::{Error, Result};
use crate::rung_system::RungSystem;
use crate::types::{Direction, Promotion, TrialId};

/// Which bracket variant the manager opens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BracketKind {
    /// [`HyperbandBracket`]: promotion by the bracket itself.
    #[default]
    Hyperband,
    /// [`DehbBracket`]: promotion by the caller.
    Dehb,
}

/// A slot to evaluate, tagged with the bracket it belongs to.
#[derive(Clone, Debug, PartialEq)]
pub struct Job {
    /// Id of the bracket within the manager.
    pub bracket_id: usize,
    /// Trial to evaluate.
    pub trial_id: TrialId,
    /// The slot; its `trial_id` is `Some(trial_id)`.
    pub slot: SlotInRung,
}

impl Job {
    /// Evaluate the job's configuration at the slot's level and return the
    /// slot carrying the `metric` objective.
    ///
    /// # Errors
    ///
    /// Propagates blackbox errors and returns [`Error::Evaluation`] if the
    /// blackbox did not report `metric`.
    pub fn evaluate<B: Blackbox + ?Sized>(
        &self,
        blackbox: &B,
        configuration: &Configuration,
        metric: &str,
    ) -> Result<SlotInRung> {
        let objectives = blackbox.objective_function(configuration, Some(self.slot.level), None)?;
        let value = objectives
            .get(metric)
            .copied()
            .ok_or_else(|| Error::Evaluation(format!("objective '{metric}' missing from result")))?;
        Ok(self.slot.with_result(self.trial_id, value))
    }
}

/// Owns the brackets of a synchronous Hyperband or DEHB sweep.
pub struct BracketManager {
    rung_system: RungSystem,
    direction: Direction,
    kind: BracketKind,
    brackets: BTreeMap<usize, Box<dyn Bracket>>,
    next_bracket_id: usize,
    next_trial_id: TrialId,
    num_retired: usize,
}

impl BracketManager {
    /// Create a builder for the given rung system.
    #[must_use]
    pub fn builder(rung_system: RungSystem) -> BracketManagerBuilder {
        BracketManagerBuilder::new(rung_system)
    }

    /// Optimization direction of every bracket.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Bracket variant opened by this manager.
    #[must_use]
    pub fn kind(&self) -> BracketKind {
        self.kind
    }

    /// The rung system schedules come from.
    #[must_use]
    pub fn rung_system(&self) -> &RungSystem {
        &self.rung_system
    }

    /// An active bracket, `None` if unknown or retired.
    #[must_use]
    pub fn bracket(&self, bracket_id: usize) -> Option<&dyn Bracket> {
        self.brackets.get(&bracket_id).map(|bracket| bracket.as_ref())
    }

    /// Ids of the active brackets, oldest first.
    pub fn active_bracket_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.brackets.keys().copied()
    }

    /// Number of brackets that ran to completion.
    #[must_use]
    pub fn num_retired(&self) -> usize {
        self.num_retired
    }

    /// Id the next fresh trial will get.
    #[must_use]
    pub fn next_trial_id(&self) -> TrialId {
        self.next_trial_id
    }

    /// Next slot to evaluate.
    ///
    /// Active brackets are asked oldest first; if none has a free slot, a new
    /// bracket is opened.
    ///
    /// # Errors
    ///
    /// Propagates bracket construction errors.
    pub fn next_job(&mut self) -> Result<Job> {
        let free = self
            .brackets
            .iter_mut()
            .find_map(|(&id, bracket)| bracket.next_free_slot().map(|slot| (id, slot)));
        let (bracket_id, mut slot) = match free {
            Some(found) => found,
            None => {
                let id = self.open_bracket()?;
                let slot = self
                    .brackets
                    .get_mut(&id)
                    .and_then(|bracket| bracket.next_free_slot())
                    .ok_or(Error::UnknownBracket(id))?;
                (id, slot)
            }
        };
        let trial_id = match slot.trial_id {
            Some(trial_id) => trial_id,
            None => {
                let trial_id = self.next_trial_id;
                self.next_trial_id += 1;
                slot.trial_id = Some(trial_id);
                trial_id
            }
        };
        Ok(Job {
            bracket_id,
            trial_id,
            slot,
        })
    }

    /// Route a result to its bracket.
    ///
    /// Returns `true` if the result completed the bracket's active rung.
    /// Externally promoted brackets are advanced right away; finished
    /// brackets are retired.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBracket`] for an unknown or retired bracket
    /// and propagates errors of [`Bracket::on_result`].
    pub fn on_result(&mut self, bracket_id: usize, result: &SlotInRung) -> Result<bool> {
        let bracket = self
            .brackets
            .get_mut(&bracket_id)
            .ok_or(Error::UnknownBracket(bracket_id))?;
        let rung_complete = bracket.on_result(result)?;
        if rung_complete && bracket.promotion() == Promotion::External {
            bracket.advance()?;
        }
        if bracket.is_bracket_complete() {
            self.brackets.remove(&bracket_id);
            self.num_retired += 1;
            trace_info!(bracket_id, "bracket retired");
        }
        Ok(rung_complete)
    }

    fn open_bracket(&mut self) -> Result<usize> {
        let id = self.next_bracket_id;
        let schedule = self.rung_system.schedule(id);
        let bracket: Box<dyn Bracket> = match self.kind {
            BracketKind::Hyperband => Box::new(HyperbandBracket::new(&schedule.rungs, self.direction)?),
            BracketKind::Dehb => {
                // The first bracket numbers its slots up front; fresh ids continue after them.
                let init_trial_ids = id == 0;
                if init_trial_ids {
                    self.next_trial_id = self.next_trial_id.max(schedule.total_slots() as TrialId);
                }
                Box::new(DehbBracket::new(&schedule.rungs, self.direction, init_trial_ids)?)
            }
        };
        self.brackets.insert(id, bracket);
        self.next_bracket_id += 1;
        trace_info!(bracket_id = id, bracket_type = schedule.bracket, "bracket opened");
        Ok(id)
    }
}

/// Builder for [`BracketManager`].
///
/// Defaults: [`Direction::Minimize`], [`BracketKind::Hyperband`].
pub struct BracketManagerBuilder {
    rung_system: RungSystem,
    direction: Direction,
    kind: BracketKind,
}

impl BracketManagerBuilder {
    fn new(rung_system: RungSystem) -> Self {
        Self {
            rung_system,
            direction: Direction::Minimize,
            kind: BracketKind::Hyperband,
        }
    }

    /// Set the optimization direction.
    #[must_use]
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the bracket variant.
    #[must_use]
    pub fn kind(mut self, kind: BracketKind) -> Self {
        self.kind = kind;
        self
    }

    /// Build the manager. No bracket is opened until the first job.
    #[must_use]
    pub fn build(self) -> BracketManager {
        BracketManager {
            rung_system: self.rung_system,
            direction: self.direction,
            kind: self.kind,
            brackets: BTreeMap::new(),
            next_bracket_id: 0,
            next_trial_id: 0,
            num_retired: 0,
        }
    }
}
