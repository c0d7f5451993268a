//! Top-list selection: which trials of a rung advance to the next one.

use crate::error::{Error, Result};
use crate::types::{Direction, TrialId};

/// Return the ids of the best `new_len` entries of a rung, best first.
///
/// `entries` are the rung's slots as `(trial_id, metric)` pairs. Entries are
/// ordered by metric according to `direction`; entries with equal metrics
/// keep their slot order. NaN metrics rank behind every number, infinities
/// rank like any other value. Unscored entries never rank: if fewer than
/// `new_len` entries carry a metric the call fails instead of guessing.
///
/// # Errors
///
/// - [`Error::NotEnoughEntries`] if `new_len > entries.len()`.
/// - [`Error::UnscoredEntries`] if fewer than `new_len` entries are scored.
/// - [`Error::MissingTrialId`] if a selected entry has no trial id.
///
/// # Examples
///
/// ```
/// use sync_hyperband::Direction;
/// use sync_hyperband::ranking::top_list;
///
/// let rung = [(Some(0), Some(3.0)), (Some(1), Some(1.0)), (Some(2), Some(2.0))];
/// assert_eq!(top_list(&rung, 2, Direction::Minimize).unwrap(), vec![1, 2]);
/// ```
pub fn top_list(
    entries: &[(Option<TrialId>, Option<f64>)],
    new_len: usize,
    direction: Direction,
) -> Result<Vec<TrialId>> {
    if new_len > entries.len() {
        return Err(Error::NotEnoughEntries {
            requested: new_len,
            available: entries.len(),
        });
    }

    let mut scored: Vec<(usize, Option<TrialId>, f64)> = entries
        .iter()
        .enumerate()
        .filter_map(|(slot, &(trial_id, metric))| metric.map(|m| (slot, trial_id, m)))
        .collect();
    if scored.len() < new_len {
        return Err(Error::UnscoredEntries {
            requested: new_len,
            scored: scored.len(),
        });
    }

    // `sort_by` is stable, so ties stay in slot order.
    scored.sort_by(|a, b| direction.compare(a.2, b.2));

    scored
        .into_iter()
        .take(new_len)
        .map(|(slot_index, trial_id, _)| trial_id.ok_or(Error::MissingTrialId { slot_index }))
        .collect()
}
