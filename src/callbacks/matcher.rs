//! Matching callbacks against `(event, from, to)`.

use crate::core::TransitionContext;
use serde::{Deserialize, Serialize};

/// Filter over one dimension of a transition (event, from-state or to-state).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameFilter {
    /// Every name matches.
    #[default]
    All,
    /// Only the listed names match.
    Only(Vec<String>),
    /// Every name except the listed ones matches.
    Except(Vec<String>),
}

impl NameFilter {
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(names.into_iter().map(Into::into).collect())
    }

    pub fn except<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Except(names.into_iter().map(Into::into).collect())
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(names) => names.iter().any(|n| n == name),
            Self::Except(names) => !names.iter().any(|n| n == name),
        }
    }

    /// Names referenced by this filter, used to validate a definition.
    pub fn names(&self) -> &[String] {
        match self {
            Self::All => &[],
            Self::Only(names) | Self::Except(names) => names,
        }
    }
}

/// Predicate over the closed `(event, from, to)` tuple of a transition.
///
/// # Example
///
/// ```rust
/// use waypoint::callbacks::{Matcher, NameFilter};
/// use waypoint::core::TransitionContext;
///
/// let matcher = Matcher {
///     event: NameFilter::only(["ignite"]),
///     from: NameFilter::All,
///     to: NameFilter::except(["stalled"]),
///     loopback: None,
/// };
///
/// assert!(matcher.matches(&TransitionContext::new("ignite", "parked", "idling")));
/// assert!(!matcher.matches(&TransitionContext::new("park", "idling", "parked")));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matcher {
    pub event: NameFilter,
    pub from: NameFilter,
    pub to: NameFilter,
    /// `Some(true)` restricts to loopbacks, `Some(false)` excludes them.
    pub loopback: Option<bool>,
}

impl Matcher {
    pub fn matches(&self, context: &TransitionContext) -> bool {
        self.event.matches(&context.event)
            && self.from.matches(&context.from)
            && self.to.matches(&context.to)
            && self.loopback.is_none_or(|l| l == context.is_loopback())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matcher_accepts_everything() {
        let matcher = Matcher::default();
        assert!(matcher.matches(&TransitionContext::new("ignite", "parked", "idling")));
        assert!(matcher.matches(&TransitionContext::new("park", "parked", "parked")));
    }

    #[test]
    fn only_and_except_filters() {
        let only = NameFilter::only(["parked", "stalled"]);
        assert!(only.matches("parked"));
        assert!(!only.matches("idling"));

        let except = NameFilter::except(["parked"]);
        assert!(!except.matches("parked"));
        assert!(except.matches("idling"));
    }

    #[test]
    fn loopback_restriction() {
        let loopbacks = Matcher {
            loopback: Some(true),
            ..Matcher::default()
        };
        assert!(loopbacks.matches(&TransitionContext::new("park", "parked", "parked")));
        assert!(!loopbacks.matches(&TransitionContext::new("ignite", "parked", "idling")));

        let changes = Matcher {
            loopback: Some(false),
            ..Matcher::default()
        };
        assert!(changes.matches(&TransitionContext::new("ignite", "parked", "idling")));
    }

    #[test]
    fn every_dimension_must_match() {
        let matcher = Matcher {
            event: NameFilter::only(["ignite"]),
            from: NameFilter::only(["parked"]),
            to: NameFilter::only(["idling"]),
            loopback: None,
        };
        assert!(matcher.matches(&TransitionContext::new("ignite", "parked", "idling")));
        assert!(!matcher.matches(&TransitionContext::new("ignite", "stalled", "idling")));
        assert!(!matcher.matches(&TransitionContext::new("shift_up", "parked", "idling")));
    }

    #[test]
    fn names_lists_referenced_names() {
        assert!(NameFilter::All.names().is_empty());
        assert_eq!(NameFilter::only(["a", "b"]).names().len(), 2);
    }
}
