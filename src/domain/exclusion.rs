use crate::domain::model::{BreedProperty, Candidate, ExclusionRule};

/// Ordered set of exclusion rules. Insertion order is the display order and
/// the order `remove` positions refer to; no two rules are equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    rules: Vec<ExclusionRule>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the rule unless an equal one is already present.
    /// Returns whether the set grew.
    pub fn add(&mut self, property: BreedProperty, value: impl Into<String>) -> bool {
        self.insert(ExclusionRule::new(property, value))
    }

    pub fn insert(&mut self, rule: ExclusionRule) -> bool {
        if self.rules.contains(&rule) {
            tracing::debug!("Exclusion '{}' already present", rule);
            return false;
        }
        tracing::debug!("Excluding {}", rule);
        self.rules.push(rule);
        true
    }

    /// Removes the rule at `position` (0-based). Out of range leaves the set untouched.
    pub fn remove(&mut self, position: usize) -> Option<ExclusionRule> {
        if position >= self.rules.len() {
            tracing::debug!(
                "Ignoring removal at {} from {} exclusions",
                position,
                self.rules.len()
            );
            return None;
        }
        Some(self.rules.remove(position))
    }

    pub fn is_banned(&self, candidate: &Candidate) -> bool {
        self.matching_rule(candidate).is_some()
    }

    /// First rule that bans the candidate, if any.
    pub fn matching_rule(&self, candidate: &Candidate) -> Option<&ExclusionRule> {
        let breed = candidate.breed.as_ref()?;
        self.rules.iter().find(|rule| rule.matches(breed))
    }

    pub fn rules(&self) -> &[ExclusionRule] {
        &self.rules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExclusionRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<ExclusionRule> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = ExclusionRule>>(iter: I) -> Self {
        let mut set = ExclusionSet::new();
        for rule in iter {
            set.insert(rule);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ExclusionSet {
    type Item = &'a ExclusionRule;
    type IntoIter = std::slice::Iter<'a, ExclusionRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
