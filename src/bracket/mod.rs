//! Synchronous brackets: a ladder of rungs with ranked promotion.
//!
//! A bracket holds rungs from the coarsest resource level to the finest.
//! Each rung has a fixed number of slots; a slot pairs a trial id with the
//! metric observed for it at that rung's level. Results may arrive in any
//! slot order. Once every slot of the active rung has a metric, the rung is
//! complete and the bracket moves on to the next rung.
//!
//! Two variants differ in how the next rung gets its trials, selected by the
//! [`Promotion`] strategy each variant reports:
//!
//! | Variant | Promotion | Trial identity of a slot |
//! |---------|-----------|--------------------------|
//! | [`HyperbandBracket`] | [`Automatic`](Promotion::Automatic): top list of a completed rung fills the next rung | fixed once set |
//! | [`DehbBracket`] | [`External`](Promotion::External): caller calls [`advance`](Bracket::advance) and picks the trials | overwritten by every result |
//!
//! # Example
//!
//! ```
//! use sync_hyperband::Direction;
//! use sync_hyperband::bracket::{Bracket, DehbBracket};
//!
//! let mut bracket = DehbBracket::new(&[(3, 1), (1, 3)], Direction::Minimize, true).unwrap();
//! while let Some(slot) = bracket.next_free_slot() {
//!     let trial_id = slot.trial_id.unwrap();
//!     bracket.on_result(&slot.with_result(trial_id, trial_id as f64)).unwrap();
//! }
//! assert!(bracket.is_rung_complete());
//! bracket.advance().unwrap();
//! assert_eq!(bracket.top_list_for_previous_rung().unwrap(), vec![0]);
//! ```

mod dehb;
mod hyperband;
mod rung;

pub use dehb::DehbBracket;
pub use hyperband::HyperbandBracket;
pub use rung::{Rung, RungLadder, Slot, SlotInRung};

use crate::error::Result;
use crate::types::{Direction, Promotion, TrialId};

/// Capabilities shared by every synchronous bracket variant.
///
/// Variants provide the rung ladder, the promotion strategy, and how a
/// result is applied. Read-only queries are answered from the ladder.
///
/// Brackets are not internally synchronized. Callers serialize access to
/// [`on_result`](Self::on_result) and the promotion queries.
pub trait Bracket: Send {
    /// The rungs and the active position.
    fn ladder(&self) -> &RungLadder;

    /// How the rung above a completed rung is filled.
    fn promotion(&self) -> Promotion;

    /// Record a result for a slot of the active rung.
    ///
    /// Returns `true` if the active rung is complete after recording.
    ///
    /// # Errors
    ///
    /// Fails if the bracket is complete, the result targets another rung or a
    /// missing slot, or lacks a trial id or a (non-NaN) metric. Variants may
    /// reject further results, see their documentation.
    fn on_result(&mut self, result: &SlotInRung) -> Result<bool>;

    /// Hand out the next slot of the active rung to evaluate.
    ///
    /// Returns `None` once all slots of the active rung have been handed out
    /// or the bracket is complete. The slot's `trial_id` is `None` if no trial
    /// occupies it yet.
    fn next_free_slot(&mut self) -> Option<SlotInRung>;

    /// Move to the next rung after the active one completed.
    ///
    /// # Errors
    ///
    /// Fails for brackets with [`Promotion::Automatic`], when the active
    /// rung is not complete, or when the bracket is already complete.
    fn advance(&mut self) -> Result<()>;

    /// Optimization direction used for ranking.
    fn direction(&self) -> Direction {
        self.ladder().direction()
    }

    /// Number of rungs, constant over the bracket's life.
    fn num_rungs(&self) -> usize {
        self.ladder().num_rungs()
    }

    /// Index of the active rung.
    fn current_rung(&self) -> usize {
        self.ladder().current_rung()
    }

    /// Slot count of the active rung.
    fn size_of_current_rung(&self) -> usize {
        self.ladder().size_of_current_rung()
    }

    /// Resource level of the active rung.
    fn level_of_current_rung(&self) -> Option<u64> {
        self.ladder().level_of_current_rung()
    }

    /// The rung at `index`.
    ///
    /// # Errors
    ///
    /// See [`RungLadder::rung`].
    fn rung(&self, index: usize) -> Result<&Rung> {
        self.ladder().rung(index)
    }

    /// Trial stored at a slot, `None` if not yet known.
    ///
    /// # Errors
    ///
    /// See [`RungLadder::trial_id_for_slot`].
    fn trial_id_for_slot(&self, rung_index: usize, slot_index: usize) -> Result<Option<TrialId>> {
        self.ladder().trial_id_for_slot(rung_index, slot_index)
    }

    /// Best trials of the rung below the active one, best first, as many as
    /// the active rung has slots.
    ///
    /// # Errors
    ///
    /// See [`RungLadder::top_list_for_previous_rung`].
    fn top_list_for_previous_rung(&self) -> Result<Vec<TrialId>> {
        self.ladder().top_list_for_previous_rung()
    }

    /// Whether every slot of the active rung has a metric.
    fn is_rung_complete(&self) -> bool {
        self.ladder().is_rung_complete()
    }

    /// Slots of the active rung still waiting for a metric.
    fn num_pending_slots(&self) -> usize {
        self.ladder().num_pending_slots()
    }

    /// Whether all rungs are done.
    fn is_bracket_complete(&self) -> bool {
        self.ladder().is_complete()
    }
}
