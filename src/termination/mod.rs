//! Termination module - when a run must stop
//!
//! Conditions are evaluated against the transcript after every appended
//! message. They are pure functions of the transcript, so checking the same
//! transcript twice always gives the same answer.

pub mod conditions;

pub use conditions::{MaxMessages, TextMention};

use std::ops::BitOr;

use crate::agent::Transcript;
use crate::core::Result;

/// A predicate over the transcript that ends the run when satisfied
pub trait TerminationCondition: Send + Sync {
    /// Return the stop reason if the transcript is terminal
    fn check(&self, transcript: &Transcript) -> Option<String>;

    /// Whether the transcript is terminal
    fn is_terminal(&self, transcript: &Transcript) -> bool {
        self.check(transcript).is_some()
    }

    /// Reject settings that could never work, at team construction time
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl<T: TerminationCondition + ?Sized> TerminationCondition for Box<T> {
    fn check(&self, transcript: &Transcript) -> Option<String> {
        (**self).check(transcript)
    }

    fn validate(&self) -> Result<()> {
        (**self).validate()
    }
}

/// Logical OR of several conditions; the first one that fires gives the
/// reason
#[derive(Default)]
pub struct AnyOf {
    conditions: Vec<Box<dyn TerminationCondition>>,
}

impl AnyOf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add another alternative
    pub fn or(mut self, condition: impl TerminationCondition + 'static) -> Self {
        self.conditions.push(Box::new(condition));
        self
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl TerminationCondition for AnyOf {
    fn check(&self, transcript: &Transcript) -> Option<String> {
        self.conditions.iter().find_map(|c| c.check(transcript))
    }

    fn validate(&self) -> Result<()> {
        self.conditions.iter().try_for_each(|c| c.validate())
    }
}

impl<R: TerminationCondition + 'static> BitOr<R> for AnyOf {
    type Output = AnyOf;

    fn bitor(self, rhs: R) -> AnyOf {
        self.or(rhs)
    }
}

impl<R: TerminationCondition + 'static> BitOr<R> for TextMention {
    type Output = AnyOf;

    fn bitor(self, rhs: R) -> AnyOf {
        AnyOf::new().or(self).or(rhs)
    }
}

impl<R: TerminationCondition + 'static> BitOr<R> for MaxMessages {
    type Output = AnyOf;

    fn bitor(self, rhs: R) -> AnyOf {
        AnyOf::new().or(self).or(rhs)
    }
}
