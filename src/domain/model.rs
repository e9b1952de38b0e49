use crate::utils::error::{FinderError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Breed attribute a user can exclude by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreedProperty {
    Breed,
    Weight,
    Origin,
    LifeSpan,
}

impl BreedProperty {
    pub const ALL: [BreedProperty; 4] = [
        BreedProperty::Breed,
        BreedProperty::Weight,
        BreedProperty::Origin,
        BreedProperty::LifeSpan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BreedProperty::Breed => "breed",
            BreedProperty::Weight => "weight",
            BreedProperty::Origin => "origin",
            BreedProperty::LifeSpan => "life_span",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BreedProperty::Breed => "Breed",
            BreedProperty::Weight => "Weight",
            BreedProperty::Origin => "Origin",
            BreedProperty::LifeSpan => "Life Span",
        }
    }
}

impl fmt::Display for BreedProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BreedProperty {
    type Err = FinderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "breed" | "name" => Ok(BreedProperty::Breed),
            "weight" => Ok(BreedProperty::Weight),
            "origin" => Ok(BreedProperty::Origin),
            "life_span" | "lifespan" | "life-span" => Ok(BreedProperty::LifeSpan),
            _ => Err(FinderError::InvalidCommandError {
                input: s.to_string(),
                reason: "property must be one of breed, weight, origin, life_span".to_string(),
            }),
        }
    }
}

/// One `(property, value)` exclusion. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExclusionRule {
    property: BreedProperty,
    value: String,
}

impl ExclusionRule {
    pub fn new(property: BreedProperty, value: impl Into<String>) -> Self {
        Self {
            property,
            value: value.into(),
        }
    }

    pub fn property(&self) -> BreedProperty {
        self.property
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Exact, case-sensitive comparison. A missing attribute never matches.
    pub fn matches(&self, breed: &Breed) -> bool {
        breed.attribute(self.property) == Some(self.value.as_str())
    }
}

impl fmt::Display for ExclusionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.value)
    }
}

/// Parses the `property=value` form used by `--ban`.
impl FromStr for ExclusionRule {
    type Err = FinderError;

    fn from_str(s: &str) -> Result<Self> {
        let (property, value) = s.split_once('=').ok_or_else(|| FinderError::InvalidCommandError {
            input: s.to_string(),
            reason: "expected property=value".to_string(),
        })?;

        if value.is_empty() {
            return Err(FinderError::InvalidCommandError {
                input: s.to_string(),
                reason: "value cannot be empty".to_string(),
            });
        }

        Ok(ExclusionRule::new(property.parse()?, value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breed {
    pub name: String,
    pub weight_imperial: Option<String>,
    pub weight_metric: Option<String>,
    pub origin: Option<String>,
    pub life_span: Option<String>,
    pub temperament: Option<String>,
}

impl Breed {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight_imperial: None,
            weight_metric: None,
            origin: None,
            life_span: None,
            temperament: None,
        }
    }

    pub fn attribute(&self, property: BreedProperty) -> Option<&str> {
        match property {
            BreedProperty::Breed => Some(self.name.as_str()),
            BreedProperty::Weight => self.weight_imperial.as_deref(),
            BreedProperty::Origin => self.origin.as_deref(),
            BreedProperty::LifeSpan => self.life_span.as_deref(),
        }
    }
}

/// A fully fetched image record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub image_url: String,
    pub breed: Option<Breed>,
    pub fetched_at: DateTime<Utc>,
}

impl Candidate {
    pub fn new(id: impl Into<String>, image_url: impl Into<String>, breed: Option<Breed>) -> Self {
        Self {
            id: id.into(),
            image_url: image_url.into(),
            breed,
            fetched_at: Utc::now(),
        }
    }

    pub fn breed_name(&self) -> Option<&str> {
        self.breed.as_ref().map(|b| b.name.as_str())
    }

    pub fn attribute(&self, property: BreedProperty) -> Option<&str> {
        self.breed.as_ref().and_then(|b| b.attribute(property))
    }
}

/// Element of the search endpoint's array. Too thin for filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub url: String,
}

/// Terminal state of one acquisition run.
#[derive(Debug)]
pub enum AcquisitionOutcome {
    Accepted { candidate: Candidate, attempts: usize },
    Exhausted { attempts: usize },
    Failed { error: FinderError, attempts: usize },
    /// A newer run was started before this one finished.
    Superseded { attempts: usize },
}

impl AcquisitionOutcome {
    pub fn attempts(&self) -> usize {
        match self {
            AcquisitionOutcome::Accepted { attempts, .. }
            | AcquisitionOutcome::Exhausted { attempts }
            | AcquisitionOutcome::Failed { attempts, .. }
            | AcquisitionOutcome::Superseded { attempts } => *attempts,
        }
    }

    pub fn candidate(&self) -> Option<&Candidate> {
        match self {
            AcquisitionOutcome::Accepted { candidate, .. } => Some(candidate),
            _ => None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, AcquisitionOutcome::Accepted { .. })
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, AcquisitionOutcome::Exhausted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_round_trips_through_text() {
        for property in BreedProperty::ALL {
            assert_eq!(property.as_str().parse::<BreedProperty>().unwrap(), property);
        }
        assert_eq!("Life-Span".parse::<BreedProperty>().unwrap(), BreedProperty::LifeSpan);
        assert!("colour".parse::<BreedProperty>().is_err());
    }

    #[test]
    fn test_rule_from_flag() {
        let rule: ExclusionRule = "origin=United States".parse().unwrap();
        assert_eq!(rule.property(), BreedProperty::Origin);
        assert_eq!(rule.value(), "United States");

        assert!("origin".parse::<ExclusionRule>().is_err());
        assert!("origin=".parse::<ExclusionRule>().is_err());
        assert!("fur=long".parse::<ExclusionRule>().is_err());
    }

    #[test]
    fn test_rule_matches_exact_value_only() {
        let mut breed = Breed::named("Siamese");
        breed.weight_imperial = Some("8 - 15".to_string());

        assert!(ExclusionRule::new(BreedProperty::Breed, "Siamese").matches(&breed));
        assert!(!ExclusionRule::new(BreedProperty::Breed, "siamese").matches(&breed));
        assert!(ExclusionRule::new(BreedProperty::Weight, "8 - 15").matches(&breed));
        // 缺少的屬性永遠不符合
        assert!(!ExclusionRule::new(BreedProperty::Origin, "N/A").matches(&breed));
    }

    #[test]
    fn test_outcome_accessors() {
        let outcome = AcquisitionOutcome::Exhausted { attempts: 7 };
        assert_eq!(outcome.attempts(), 7);
        assert!(outcome.is_exhausted());
        assert!(outcome.candidate().is_none());
    }
}
