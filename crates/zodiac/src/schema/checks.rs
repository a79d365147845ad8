use crate::error::SchemaError;
use std::fmt::Display;

/// A check plus an optional message override.
#[derive(Debug, Clone)]
pub(crate) struct Refinement<C> {
    pub(crate) check: C,
    pub(crate) message: Option<String>,
}

impl<C> Refinement<C> {
    pub(crate) fn new(check: C) -> Self {
        Self {
            check,
            message: None,
        }
    }

    pub(crate) fn message_or_else(&self, default: impl FnOnce() -> String) -> String {
        self.message.clone().unwrap_or_else(default)
    }
}

/// Sets the message of the most recently added refinement, or returns the
/// message back when there is none yet.
pub(crate) fn set_last_message<C>(
    checks: &mut [Refinement<C>],
    message: String,
) -> Option<String> {
    match checks.last_mut() {
        Some(last) => {
            last.message = Some(message);
            None
        }
        None => Some(message),
    }
}

/// The tightest lower and upper bound declared so far. Each bound is
/// `(value, inclusive)`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Bounds<T> {
    lower: Option<(T, bool)>,
    upper: Option<(T, bool)>,
}

impl<T> Default for Bounds<T> {
    fn default() -> Self {
        Self {
            lower: None,
            upper: None,
        }
    }
}

impl<T: PartialOrd + Copy + Display> Bounds<T> {
    pub(crate) fn with_lower(
        self,
        value: T,
        inclusive: bool,
        subject: &'static str,
    ) -> Result<Self, SchemaError> {
        comparable(value, subject)?;
        let lower = match self.lower {
            Some((current, inc)) if current > value => (current, inc),
            Some((current, inc)) if current == value => (current, inc && inclusive),
            _ => (value, inclusive),
        };
        Self {
            lower: Some(lower),
            ..self
        }
        .consistent(subject)
    }

    pub(crate) fn with_upper(
        self,
        value: T,
        inclusive: bool,
        subject: &'static str,
    ) -> Result<Self, SchemaError> {
        comparable(value, subject)?;
        let upper = match self.upper {
            Some((current, inc)) if current < value => (current, inc),
            Some((current, inc)) if current == value => (current, inc && inclusive),
            _ => (value, inclusive),
        };
        Self {
            upper: Some(upper),
            ..self
        }
        .consistent(subject)
    }

    fn consistent(self, subject: &'static str) -> Result<Self, SchemaError> {
        match (self.lower, self.upper) {
            (Some((lo, lo_inc)), Some((hi, hi_inc)))
                if lo > hi || (lo == hi && !(lo_inc && hi_inc)) =>
            {
                Err(SchemaError::InvertedBounds {
                    subject,
                    min: lo.to_string(),
                    max: hi.to_string(),
                })
            }
            _ => Ok(self),
        }
    }
}

fn comparable<T: PartialOrd>(value: T, subject: &'static str) -> Result<(), SchemaError> {
    match value.partial_cmp(&value) {
        Some(_) => Ok(()),
        None => Err(SchemaError::IncomparableBound(subject)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tightest_bound_wins() {
        let bounds = Bounds::default()
            .with_lower(3usize, true, "length")
            .and_then(|b| b.with_lower(1, true, "length"))
            .and_then(|b| b.with_upper(3, true, "length"));
        assert!(bounds.is_ok());
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let err = Bounds::default()
            .with_lower(10.0, true, "number")
            .and_then(|b| b.with_upper(5.0, true, "number"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvertedBounds { .. }));
    }

    #[test]
    fn touching_exclusive_bounds_are_rejected() {
        let err = Bounds::default()
            .with_lower(0.0, false, "number")
            .and_then(|b| b.with_upper(0.0, true, "number"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvertedBounds { .. }));
    }

    #[test]
    fn nan_bound_is_rejected() {
        let err = Bounds::default().with_lower(f64::NAN, true, "number").unwrap_err();
        assert_eq!(err, SchemaError::IncomparableBound("number"));
    }
}
