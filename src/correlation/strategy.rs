//! Skip strategies.

use std::collections::{HashMap, HashSet};

use crate::events::Action;

/// Subject entry that matches every subject.
pub const WILDCARD: &str = "*";

/// Subjects an action applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectSet {
    Any,
    Only(HashSet<String>),
}

impl SubjectSet {
    pub fn contains(&self, subject: &str) -> bool {
        match self {
            SubjectSet::Any => true,
            SubjectSet::Only(subjects) => subjects.contains(subject),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for SubjectSet {
    /// A `"*"` anywhere in the input yields [`SubjectSet::Any`].
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut subjects = HashSet::new();
        for subject in iter {
            let subject = subject.into();
            if subject == WILDCARD {
                return SubjectSet::Any;
            }
            subjects.insert(subject);
        }
        SubjectSet::Only(subjects)
    }
}

/// Which (action, subject) pairs are skipped once their correlation ID has
/// been seen before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipStrategy {
    rules: HashMap<Action, SubjectSet>,
}

impl SkipStrategy {
    /// Skip repeated updates on any subject. This is the default.
    pub fn update_only() -> Self {
        Self::custom([(Action::Update, SubjectSet::Any)])
    }

    /// Skip every repeated action on any subject.
    pub fn skip_all() -> Self {
        Self::custom(Action::ALL.map(|a| (a, SubjectSet::Any)))
    }

    pub fn custom(rules: impl IntoIterator<Item = (Action, SubjectSet)>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    pub fn skips(&self, action: Action, subject: &str) -> bool {
        self.rules
            .get(&action)
            .is_some_and(|subjects| subjects.contains(subject))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for SkipStrategy {
    fn default() -> Self {
        Self::update_only()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_only() {
        let strategy = SkipStrategy::default();
        assert!(strategy.skips(Action::Update, "groups"));
        assert!(strategy.skips(Action::Update, "users"));
        assert!(!strategy.skips(Action::Create, "groups"));
        assert!(!strategy.skips(Action::Delete, "groups"));
    }

    #[test]
    fn test_skip_all() {
        let strategy = SkipStrategy::skip_all();
        for action in Action::ALL {
            assert!(strategy.skips(action, "anything"));
        }
    }

    #[test]
    fn test_custom_subjects() {
        let strategy = SkipStrategy::custom([
            (Action::Create, ["groups", "users"].into_iter().collect()),
            (Action::Delete, ["*"].into_iter().collect()),
        ]);
        assert!(strategy.skips(Action::Create, "groups"));
        assert!(!strategy.skips(Action::Create, "roles"));
        assert!(strategy.skips(Action::Delete, "roles"));
        assert!(!strategy.skips(Action::Update, "groups"));
    }

    #[test]
    fn test_wildcard_collapses_set() {
        let set: SubjectSet = ["groups", "*"].into_iter().collect();
        assert_eq!(set, SubjectSet::Any);
    }
}
