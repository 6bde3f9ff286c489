//! @ai:module:intent Label classification rules: include/exclude patterns and prefix multipliers
//! @ai:module:layer domain
//! @ai:module:public_api ClassificationConfig, Classification, PatternSet, MultiplierTable, MultiplierRule
//! @ai:module:stateless true

use crate::error::{Error, Result};
use regex::{Regex, RegexSet};
use serde::{Deserialize, Serialize};

/// @ai:intent Bucket a task label falls into
/// @ai:effects pure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Excluded,
    Included,
    Unknown,
}

impl Classification {
    /// @ai:intent Tag used in per-task diagnostics
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Excluded => "EXCLUDE",
            Classification::Included => "INCLUDE",
            Classification::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// @ai:intent Regular expressions matched against the start of a label
#[derive(Debug, Clone)]
pub struct PatternSet {
    set: RegexSet,
}

impl PatternSet {
    /// @ai:intent Compile patterns as prefix-anchored expressions
    /// @ai:pre every pattern is a valid regular expression
    /// @ai:effects pure
    pub fn new(patterns: &[String]) -> Result<Self> {
        let anchored: Vec<String> = patterns.iter().map(|p| format!("^(?:{})", p)).collect();

        // Compile one by one first so the error names the offending pattern
        for (pattern, expr) in patterns.iter().zip(&anchored) {
            Regex::new(expr).map_err(|source| Error::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        }

        let set = RegexSet::new(&anchored).map_err(|source| Error::InvalidPattern {
            pattern: patterns.join(", "),
            source,
        })?;

        Ok(Self { set })
    }

    /// @ai:intent True when any pattern matches at the start of the label
    /// @ai:effects pure
    pub fn matches(&self, label: &str) -> bool {
        self.set.is_match(label)
    }
}

/// @ai:intent Label prefix and the factor applied to matching tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiplierRule {
    pub prefix: String,
    pub factor: f64,
}

impl MultiplierRule {
    pub fn new(prefix: impl Into<String>, factor: f64) -> Self {
        Self {
            prefix: prefix.into(),
            factor,
        }
    }
}

/// @ai:intent Ordered prefix table; the first matching prefix wins
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiplierTable {
    rules: Vec<MultiplierRule>,
}

impl MultiplierTable {
    /// @ai:intent Build a table, rejecting non-positive or non-finite factors
    /// @ai:effects pure
    pub fn new(rules: Vec<MultiplierRule>) -> Result<Self> {
        if let Some(bad) = rules
            .iter()
            .find(|r| !r.factor.is_finite() || r.factor <= 0.0)
        {
            return Err(Error::Configuration(format!(
                "multiplier for prefix {:?} must be a positive number, got {}",
                bad.prefix, bad.factor
            )));
        }

        Ok(Self { rules })
    }

    /// @ai:intent Factor of the first rule whose prefix starts the label, else 1
    /// @ai:effects pure
    pub fn resolve(&self, label: &str) -> f64 {
        self.rules
            .iter()
            .find(|r| label.starts_with(r.prefix.as_str()))
            .map(|r| r.factor)
            .unwrap_or(1.0)
    }
}

/// @ai:intent Rules deciding which tasks count and how they are weighted
/// @ai:effects pure
#[derive(Debug, Clone)]
pub struct ClassificationConfig {
    include: Option<PatternSet>,
    exclude: Option<PatternSet>,
    multipliers: MultiplierTable,
}

impl ClassificationConfig {
    /// @ai:intent Validate and compile a classification configuration
    /// @ai:pre at least one of include/exclude is non-empty
    /// @ai:effects pure
    pub fn new(
        include: Option<Vec<String>>,
        exclude: Option<Vec<String>>,
        multipliers: Vec<MultiplierRule>,
    ) -> Result<Self> {
        let include = include.filter(|p| !p.is_empty());
        let exclude = exclude.filter(|p| !p.is_empty());

        if include.is_none() && exclude.is_none() {
            return Err(Error::Configuration(
                "Please specify at least one of include and exclude".to_string(),
            ));
        }

        Ok(Self {
            include: include.as_deref().map(PatternSet::new).transpose()?,
            exclude: exclude.as_deref().map(PatternSet::new).transpose()?,
            multipliers: MultiplierTable::new(multipliers)?,
        })
    }

    /// @ai:intent Place a label in exactly one bucket; exclude is checked first
    /// @ai:effects pure
    pub fn classify(&self, label: &str) -> Classification {
        let excluded = self.exclude.as_ref().is_some_and(|p| p.matches(label));

        if excluded {
            Classification::Excluded
        } else if self.counts_unexcluded(label) {
            Classification::Included
        } else {
            Classification::Unknown
        }
    }

    /// @ai:intent Include hit, or exclude-only config catching everything else
    /// @ai:effects pure
    fn counts_unexcluded(&self, label: &str) -> bool {
        match &self.include {
            Some(include) => include.matches(label),
            None => self.exclude.is_some(),
        }
    }

    /// @ai:intent Multiplier for a label
    /// @ai:effects pure
    pub fn multiplier(&self, label: &str) -> f64 {
        self.multipliers.resolve(label)
    }
}
