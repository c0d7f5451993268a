use crate::types::TrialId;

/// Errors returned by bracket construction, bracket operations, ranking,
/// and blackbox evaluation.
///
/// Every error is local to the call that produced it. Nothing in this crate
/// retries; the scheduling loop decides whether to abort or carry on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Returned when a bracket is constructed from an empty rung list.
    #[error("a bracket needs at least one rung")]
    EmptyRungs,

    /// Returned when a rung is declared with zero slots.
    #[error("invalid rung size at rung {rung_index}: size must be positive")]
    InvalidRungSize {
        /// Index of the offending rung.
        rung_index: usize,
    },

    /// Returned when a rung level is zero or not larger than the level below it.
    #[error("invalid rung level {level} at rung {rung_index}: levels must be positive and strictly increasing")]
    InvalidRungLevel {
        /// Index of the offending rung.
        rung_index: usize,
        /// The rejected level.
        level: u64,
    },

    /// Returned when a self-promoting bracket has a rung with more slots than
    /// the rung below it, which the top list of that rung could never fill.
    #[error("rung {rung_index} has {size} slots but the rung below it only {previous}")]
    IncreasingRungSize {
        /// Index of the offending rung.
        rung_index: usize,
        /// Size of the offending rung.
        size: usize,
        /// Size of the rung below it.
        previous: usize,
    },

    /// Returned when the reduction factor of a rung system is below 2.
    #[error("invalid reduction factor: {0} must be >= 2")]
    InvalidReductionFactor(u64),

    /// Returned when the resource range of a rung system is empty.
    #[error("invalid resource range: min ({min}) must be positive and <= max ({max})")]
    InvalidResourceRange {
        /// Smallest resource level.
        min: u64,
        /// Largest resource level.
        max: u64,
    },

    /// Returned when the top list of the previous rung is requested on the base rung.
    #[error("no previous rung: the current rung is the base rung")]
    NoPreviousRung,

    /// Returned when an externally promoted bracket is advanced before its rung is fully scored.
    #[error("rung {rung_index} is incomplete: {pending} slots have no metric")]
    RungIncomplete {
        /// Index of the current rung.
        rung_index: usize,
        /// Number of slots still without a metric.
        pending: usize,
    },

    /// Returned when an operation needs an active rung but the bracket is done.
    #[error("bracket is complete: all {num_rungs} rungs are finished")]
    BracketComplete {
        /// Number of rungs in the bracket.
        num_rungs: usize,
    },

    /// Returned when `advance` is called on a bracket that promotes by itself.
    #[error("bracket promotes automatically and cannot be advanced by the caller")]
    AutomaticPromotion,

    /// Returned when a rung index does not exist.
    #[error("rung index {index} out of range: bracket has {num_rungs} rungs")]
    RungIndexOutOfRange {
        /// The requested rung index.
        index: usize,
        /// Number of rungs in the bracket.
        num_rungs: usize,
    },

    /// Returned when a slot index does not exist in the addressed rung.
    #[error("slot index {index} out of range: rung {rung_index} has {size} slots")]
    SlotIndexOutOfRange {
        /// Index of the addressed rung.
        rung_index: usize,
        /// The requested slot index.
        index: usize,
        /// Number of slots in the rung.
        size: usize,
    },

    /// Returned when a result targets a rung other than the current one.
    #[error("result for rung {got} but the current rung is {expected}")]
    ResultForWrongRung {
        /// The bracket's current rung.
        expected: usize,
        /// The rung named in the result.
        got: usize,
    },

    /// Returned when a result arrives without a metric value.
    #[error("result for slot {slot_index} carries no metric")]
    MissingMetric {
        /// The slot the result was meant for.
        slot_index: usize,
    },

    /// Returned when a result carries a NaN metric.
    #[error("result for slot {slot_index} carries a NaN metric")]
    InvalidMetric {
        /// The slot the result was meant for.
        slot_index: usize,
    },

    /// Returned when a result arrives without a trial id.
    #[error("result for slot {slot_index} carries no trial id")]
    MissingResultTrialId {
        /// The slot the result was meant for.
        slot_index: usize,
    },

    /// Returned when a standard Hyperband result names a different trial than its slot holds.
    #[error("slot {slot_index} holds trial {expected:?} but the result is for trial {got}")]
    TrialIdMismatch {
        /// The slot the result was meant for.
        slot_index: usize,
        /// Trial id currently stored at the slot.
        expected: Option<TrialId>,
        /// Trial id carried by the result.
        got: TrialId,
    },

    /// Returned when a standard Hyperband slot already has a metric.
    #[error("slot {slot_index} of rung {rung_index} already has a metric")]
    SlotAlreadyScored {
        /// Index of the rung.
        rung_index: usize,
        /// Index of the slot.
        slot_index: usize,
    },

    /// Returned when a result is routed to a bracket the manager does not know.
    #[error("unknown bracket id {0}")]
    UnknownBracket(usize),

    /// Returned when more top entries are requested than a rung holds.
    #[error("requested top-{requested} from a rung with only {available} entries")]
    NotEnoughEntries {
        /// Requested length of the top list.
        requested: usize,
        /// Number of entries in the rung.
        available: usize,
    },

    /// Returned when a rung has fewer scored entries than the requested top list.
    #[error("requested top-{requested} from a rung with only {scored} scored entries")]
    UnscoredEntries {
        /// Requested length of the top list.
        requested: usize,
        /// Number of entries with a metric.
        scored: usize,
    },

    /// Returned when an entry selected for the top list has no trial id.
    #[error("entry at slot {slot_index} was selected for the top list but has no trial id")]
    MissingTrialId {
        /// Slot of the offending entry.
        slot_index: usize,
    },

    /// Returned when a blackbox with several fidelities is evaluated without one.
    #[error("blackbox has {available} fidelities; a fidelity must be given")]
    MissingFidelity {
        /// Number of fidelities the blackbox supports.
        available: usize,
    },

    /// Returned when a blackbox is evaluated at a fidelity it does not support.
    #[error("fidelity {0} is not supported by this blackbox")]
    UnknownFidelity(u64),

    /// Returned when the blackbox evaluation itself fails.
    #[error("evaluation failed: {0}")]
    Evaluation(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
