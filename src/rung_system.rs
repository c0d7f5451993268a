//! Geometric rung schedules for the brackets of a Hyperband sweep.
//!
//! Rung levels are placed at `min_resource * eta^k` below `max_resource`,
//! with `max_resource` itself as the final level. A sweep cycles through
//! brackets: bracket 0 starts at the lowest level with the most trials,
//! the last bracket runs few trials at the full budget only.
//!
//! With `min_resource=1`, `max_resource=27`, `reduction_factor=3`:
//!
//! | Bracket | Levels | Sizes |
//! |---------|--------|-------|
//! | 0 | 1, 3, 9, 27 | 27, 9, 3, 1 |
//! | 1 | 3, 9, 27 | 12, 4, 1 |
//! | 2 | 9, 27 | 6, 2 |
//! | 3 | 27 | 4 |
//!
//! # Example
//!
//! ```
//! use sync_hyperband::rung_system::RungSystem;
//!
//! let system = RungSystem::builder()
//!     .min_resource(1)
//!     .max_resource(27)
//!     .reduction_factor(3)
//!     .build()
//!     .unwrap();
//! assert_eq!(system.levels(), &[1, 3, 9, 27]);
//! assert_eq!(system.schedule(0).rungs, vec![(27, 1), (9, 3), (3, 9), (1, 27)]);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The `(size, level)` rungs one bracket runs with.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RungSchedule {
    /// Index of the bracket type within the rung system.
    pub bracket: usize,
    /// `(size, level)` pairs, coarsest rung first.
    pub rungs: Vec<(usize, u64)>,
}

impl RungSchedule {
    /// Total number of evaluations the bracket runs across all rungs.
    #[must_use]
    pub fn total_slots(&self) -> usize {
        self.rungs.iter().map(|&(size, _)| size).sum()
    }
}

/// Rung levels and per-bracket sizes of a geometric Hyperband sweep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RungSystem {
    levels: Vec<u64>,
    reduction_factor: u64,
    num_brackets: usize,
}

impl RungSystem {
    /// Create a builder with defaults `min_resource=1`, `max_resource=81`,
    /// `reduction_factor=3`, and as many brackets as there are levels.
    #[must_use]
    pub fn builder() -> RungSystemBuilder {
        RungSystemBuilder::new()
    }

    /// All rung levels, ascending.
    #[must_use]
    pub fn levels(&self) -> &[u64] {
        &self.levels
    }

    /// The reduction factor (eta).
    #[must_use]
    pub fn reduction_factor(&self) -> u64 {
        self.reduction_factor
    }

    /// Number of bracket types the sweep cycles through.
    #[must_use]
    pub fn num_brackets(&self) -> usize {
        self.num_brackets
    }

    /// Schedule of the bracket at position `bracket_offset` of the sweep.
    ///
    /// Offsets wrap around, so consecutive brackets cycle through all
    /// bracket types.
    #[must_use]
    pub fn schedule(&self, bracket_offset: usize) -> RungSchedule {
        let bracket = bracket_offset % self.num_brackets;
        let s_max = self.levels.len() - 1;
        let s = s_max - bracket;
        let eta = self.reduction_factor;

        // n = ceil((s_max + 1) * eta^s / (s + 1))
        let s_max_plus_one = s_max as u64 + 1;
        let s_plus_one = s as u64 + 1;
        let numerator = s_max_plus_one.saturating_mul(pow(eta, s));
        let base_size = numerator.div_ceil(s_plus_one);

        let rungs = self.levels[bracket..]
            .iter()
            .enumerate()
            .map(|(k, &level)| {
                let size = (base_size / pow(eta, k)).max(1);
                (usize::try_from(size).unwrap_or(usize::MAX), level)
            })
            .collect();
        RungSchedule { bracket, rungs }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn pow(base: u64, exp: usize) -> u64 {
    base.saturating_pow(exp as u32)
}

/// Builder for [`RungSystem`].
///
/// # Examples
///
/// ```
/// use sync_hyperband::rung_system::RungSystem;
///
/// let system = RungSystem::builder()
///     .min_resource(2)
///     .max_resource(50)
///     .reduction_factor(2)
///     .num_brackets(2)
///     .build()
///     .unwrap();
/// assert_eq!(system.levels(), &[2, 4, 8, 16, 32, 50]);
/// assert_eq!(system.num_brackets(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct RungSystemBuilder {
    min_resource: u64,
    max_resource: u64,
    reduction_factor: u64,
    num_brackets: Option<usize>,
}

impl RungSystemBuilder {
    fn new() -> Self {
        Self {
            min_resource: 1,
            max_resource: 81,
            reduction_factor: 3,
            num_brackets: None,
        }
    }

    /// Level of the lowest rung (grace period).
    #[must_use]
    pub fn min_resource(mut self, r: u64) -> Self {
        self.min_resource = r;
        self
    }

    /// Level of the highest rung (full budget).
    #[must_use]
    pub fn max_resource(mut self, r: u64) -> Self {
        self.max_resource = r;
        self
    }

    /// Reduction factor (eta) between consecutive rung levels and sizes.
    #[must_use]
    pub fn reduction_factor(mut self, eta: u64) -> Self {
        self.reduction_factor = eta;
        self
    }

    /// Number of bracket types to cycle through. Capped at the number of
    /// levels; 0 is treated as 1.
    #[must_use]
    pub fn num_brackets(mut self, n: usize) -> Self {
        self.num_brackets = Some(n);
        self
    }

    /// Validate the settings and compute the rung levels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidReductionFactor`] if `reduction_factor < 2`
    /// and [`Error::InvalidResourceRange`] unless `0 < min_resource <= max_resource`.
    pub fn build(self) -> Result<RungSystem> {
        if self.reduction_factor < 2 {
            return Err(Error::InvalidReductionFactor(self.reduction_factor));
        }
        if self.min_resource == 0 || self.min_resource > self.max_resource {
            return Err(Error::InvalidResourceRange {
                min: self.min_resource,
                max: self.max_resource,
            });
        }

        let mut levels = Vec::new();
        let mut level = self.min_resource;
        while level < self.max_resource {
            levels.push(level);
            match level.checked_mul(self.reduction_factor) {
                Some(next) => level = next,
                None => break,
            }
        }
        levels.push(self.max_resource);

        let num_brackets = self
            .num_brackets
            .map_or(levels.len(), |n| n.clamp(1, levels.len()));
        trace_debug!(num_levels = levels.len(), num_brackets, "rung system built");
        Ok(RungSystem {
            levels,
            reduction_factor: self.reduction_factor,
            num_brackets,
        })
    }
}

impl Default for RungSystemBuilder {
    fn default() -> Self {
        Self::new()
    }
}
