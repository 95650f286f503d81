//! Guard predicates for controlling transitions.
//!
//! A guard decides whether a candidate transition may fire, looking only at
//! the event argument. Guards may fail; a failing guard counts as a
//! non-match and the failure is reported through the exception hooks.

use crate::core::error::ActionError;
use std::fmt;
use std::sync::Arc;

type Predicate<A> = dyn Fn(Option<&A>) -> Result<bool, ActionError> + Send + Sync;

/// Predicate that determines if a transition can fire.
///
/// # Example
///
/// ```rust
/// use statetree::core::Guard;
///
/// let is_large = Guard::with_argument(|amount: &u32| *amount > 100);
///
/// assert!(is_large.check(Some(&500)).unwrap());
/// assert!(!is_large.check(Some(&5)).unwrap());
/// assert!(is_large.check(None).is_err());
/// ```
pub struct Guard<A> {
    predicate: Arc<Predicate<A>>,
    description: Option<String>,
}

impl<A> Guard<A> {
    /// Create a guard from an infallible predicate over the optional argument.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(Option<&A>) -> bool + Send + Sync + 'static,
    {
        Self::fallible(move |argument| Ok(predicate(argument)))
    }

    /// Create a guard that may fail.
    pub fn fallible<F>(predicate: F) -> Self
    where
        F: Fn(Option<&A>) -> Result<bool, ActionError> + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
            description: None,
        }
    }

    /// Create a guard that requires an argument.
    ///
    /// Firing without an argument makes the guard fail with
    /// [`ActionError::MissingArgument`].
    pub fn with_argument<F>(predicate: F) -> Self
    where
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        Self::fallible(move |argument| {
            argument
                .map(&predicate)
                .ok_or(ActionError::MissingArgument)
        })
    }

    /// Attach a human readable description used in logs and reports.
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Evaluate the guard against an event argument.
    pub fn check(&self, argument: Option<&A>) -> Result<bool, ActionError> {
        (self.predicate)(argument)
    }
}

impl<A> Clone for Guard<A> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
            description: self.description.clone(),
        }
    }
}

impl<A> fmt::Debug for Guard<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard")
            .field("description", &self.description)
            .finish()
    }
}
