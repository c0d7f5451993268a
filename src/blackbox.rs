//! The evaluation collaborator: a black-box function with fidelities.
//!
//! Brackets never evaluate anything themselves. A scheduling loop asks a
//! [`Blackbox`] for the objectives of a configuration at a rung's level and
//! reports one of them back as the slot's metric.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! use sync_hyperband::blackbox::{Blackbox, from_function};
//!
//! let bb = from_function(vec!["loss".into()], Some(vec![1, 3, 9]), |config, fidelity, _seed| {
//!     let x = config.get("x").copied().unwrap_or(0.0);
//!     let epochs = fidelity.unwrap_or(1) as f64;
//!     Ok(BTreeMap::from([("loss".to_string(), x * x + 1.0 / epochs)]))
//! });
//!
//! let config = BTreeMap::from([("x".to_string(), 2.0)]);
//! let objectives = bb.objective_function(&config, Some(1), None).unwrap();
//! assert_eq!(objectives["loss"], 5.0);
//! assert!(bb.objective_function(&config, Some(2), None).is_err());
//! ```

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Hyperparameter values of one configuration, by name.
pub type Configuration = BTreeMap<String, f64>;

/// Objective values of one evaluation, by name.
pub type Objectives = BTreeMap<String, f64>;

/// A benchmark or training function evaluated at a resource level.
///
/// Implementors provide [`evaluate`](Self::evaluate);
/// [`objective_function`](Self::objective_function) checks the fidelity
/// against [`fidelity_values`](Self::fidelity_values) before delegating.
pub trait Blackbox {
    /// Names of the objectives each evaluation returns.
    fn objective_names(&self) -> &[String];

    /// Supported fidelities, `None` if the blackbox has no fidelity.
    fn fidelity_values(&self) -> Option<&[u64]> {
        None
    }

    /// Evaluate without argument checks.
    ///
    /// # Errors
    ///
    /// Implementation-defined; failures are usually reported as
    /// [`Error::Evaluation`].
    fn evaluate(
        &self,
        configuration: &Configuration,
        fidelity: Option<u64>,
        seed: Option<u64>,
    ) -> Result<Objectives>;

    /// Evaluate a configuration at a fidelity.
    ///
    /// A blackbox with a single fidelity evaluates at it when `fidelity` is
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingFidelity`] if the blackbox has several
    /// fidelities but none was given, [`Error::UnknownFidelity`] if the given
    /// fidelity is not supported, and any error of [`evaluate`](Self::evaluate).
    fn objective_function(
        &self,
        configuration: &Configuration,
        fidelity: Option<u64>,
        seed: Option<u64>,
    ) -> Result<Objectives> {
        let fidelity = match (self.fidelity_values(), fidelity) {
            (Some(&[only]), None) => Some(only),
            (Some(values), None) => {
                return Err(Error::MissingFidelity {
                    available: values.len(),
                });
            }
            (Some(values), Some(f)) if !values.contains(&f) => return Err(Error::UnknownFidelity(f)),
            (None, Some(f)) => return Err(Error::UnknownFidelity(f)),
            (_, fidelity) => fidelity,
        };
        self.evaluate(configuration, fidelity, seed)
    }
}

/// A [`Blackbox`] backed by a closure. Created by [`from_function`].
pub struct FunctionBlackbox<F> {
    objective_names: Vec<String>,
    fidelity_values: Option<Vec<u64>>,
    eval_fn: F,
}

impl<F> Blackbox for FunctionBlackbox<F>
where
    F: Fn(&Configuration, Option<u64>, Option<u64>) -> Result<Objectives>,
{
    fn objective_names(&self) -> &[String] {
        &self.objective_names
    }

    fn fidelity_values(&self) -> Option<&[u64]> {
        self.fidelity_values.as_deref()
    }

    fn evaluate(
        &self,
        configuration: &Configuration,
        fidelity: Option<u64>,
        seed: Option<u64>,
    ) -> Result<Objectives> {
        (self.eval_fn)(configuration, fidelity, seed)
    }
}

/// Wrap a closure `(configuration, fidelity, seed) -> objectives` as a blackbox.
///
/// Useful in tests and for adapting existing benchmark functions.
#[must_use]
pub fn from_function<F>(
    objective_names: Vec<String>,
    fidelity_values: Option<Vec<u64>>,
    eval_fn: F,
) -> FunctionBlackbox<F>
where
    F: Fn(&Configuration, Option<u64>, Option<u64>) -> Result<Objectives>,
{
    FunctionBlackbox {
        objective_names,
        fidelity_values,
        eval_fn,
    }
}
