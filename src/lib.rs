#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Synchronous Hyperband and Differential Evolution Hyperband (DEHB)
//! bracket scheduling.
//!
//! Multi-fidelity optimization evaluates many configurations at a small
//! resource level (epochs, iterations) and spends more on the promising
//! ones. A bracket organizes this as a ladder of rungs: each rung has a
//! fixed number of slots at one resource level, and the best trials of a
//! completed rung seed the next one.
//!
//! # Getting Started
//!
//! ```
//! use sync_hyperband::prelude::*;
//!
//! let mut bracket = HyperbandBracket::new(&[(4, 1), (2, 3), (1, 9)], Direction::Minimize).unwrap();
//! let mut next_trial = 0;
//! while let Some(slot) = bracket.next_free_slot() {
//!     let trial_id = slot.trial_id.unwrap_or_else(|| {
//!         next_trial += 1;
//!         next_trial - 1
//!     });
//!     let loss = (trial_id as f64 - 1.5).abs() / slot.level as f64;
//!     bracket.on_result(&slot.with_result(trial_id, loss)).unwrap();
//! }
//! assert!(bracket.is_bracket_complete());
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`Bracket`](bracket::Bracket) | Capabilities of a bracket: free slots, results, top lists, completion. |
//! | [`HyperbandBracket`](bracket::HyperbandBracket) | Standard synchronous Hyperband: promotes automatically. |
//! | [`DehbBracket`](bracket::DehbBracket) | DEHB: results overwrite trial ids, promotion is up to the caller. |
//! | [`top_list`](ranking::top_list) | Rank a rung's entries and pick the best. |
//! | [`RungSystem`](rung_system::RungSystem) | Geometric `(size, level)` schedules for every bracket of a sweep. |
//! | [`BracketManager`](manager::BracketManager) | Scheduling loop over the brackets of a sweep. |
//! | [`Blackbox`](blackbox::Blackbox) | The function being optimized, evaluated at a fidelity. |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `serde` | `Serialize`/`Deserialize` on [`Direction`], [`Promotion`], rungs, slots, and schedules | off |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) when rungs complete and brackets open or retire | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

pub mod blackbox;
pub mod bracket;
mod error;
pub mod manager;
pub mod ranking;
pub mod rung_system;
mod types;

pub use error::{Error, Result};
pub use types::{Direction, Promotion, TrialId};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use sync_hyperband::prelude::*;
/// ```
pub mod prelude {
    pub use crate::blackbox::{Blackbox, Configuration, Objectives, from_function};
    pub use crate::bracket::{Bracket, DehbBracket, HyperbandBracket, Rung, SlotInRung};
    pub use crate::error::{Error, Result};
    pub use crate::manager::{BracketKind, BracketManager, Job};
    pub use crate::ranking::top_list;
    pub use crate::rung_system::{RungSchedule, RungSystem};
    pub use crate::types::{Direction, Promotion, TrialId};
}
