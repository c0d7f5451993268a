//! Core types shared by brackets, ranking, and the manager.

use core::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a trial (one configuration evaluation instance).
pub type TrialId = u64;

/// The direction of optimization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Lower metric values are better.
    #[default]
    Minimize,
    /// Higher metric values are better.
    Maximize,
}

impl Direction {
    /// Order two metric values so that the better one compares as `Less`.
    ///
    /// This is a total order: NaN ranks behind every number in both
    /// directions and compares equal to another NaN.
    #[must_use]
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
                match self {
                    Direction::Minimize => ord,
                    Direction::Maximize => ord.reverse(),
                }
            }
        }
    }
}

/// How a bracket fills the rung above a completed one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Promotion {
    /// The bracket promotes the top list of a completed rung into the next
    /// rung and advances by itself (standard synchronous Hyperband).
    Automatic,
    /// The bracket only records results. The caller detects completion,
    /// calls [`Bracket::advance`](crate::bracket::Bracket::advance), and
    /// decides which trials occupy the next rung (DEHB).
    External,
}
