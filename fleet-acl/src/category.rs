//! Device categories and name-based classification.

use std::fmt;
use std::str::FromStr;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of device categories. The key is opaque to the analyses;
/// only the configured rule table gives it meaning.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DeviceCategory {
    Cat1,
    Cat2,
    Cat3,
    Cat4,
    Cat5,
    Cat6,
}

impl DeviceCategory {
    pub const ALL: [DeviceCategory; 6] = [
        DeviceCategory::Cat1,
        DeviceCategory::Cat2,
        DeviceCategory::Cat3,
        DeviceCategory::Cat4,
        DeviceCategory::Cat5,
        DeviceCategory::Cat6,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceCategory::Cat1 => "cat1",
            DeviceCategory::Cat2 => "cat2",
            DeviceCategory::Cat3 => "cat3",
            DeviceCategory::Cat4 => "cat4",
            DeviceCategory::Cat5 => "cat5",
            DeviceCategory::Cat6 => "cat6",
        }
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown device category '{0}' (expected cat1..cat6)")]
pub struct UnknownCategory(pub String);

impl FromStr for DeviceCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        DeviceCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == key)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// One `[[category]]` entry with its compiled patterns.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub category: DeviceCategory,
    pub name: String,
    patterns: Vec<Regex>,
}

impl CategoryRule {
    pub fn new<S: AsRef<str>>(
        category: DeviceCategory,
        name: impl Into<String>,
        patterns: &[S],
    ) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| RegexBuilder::new(p.as_ref()).case_insensitive(true).build())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            category,
            name: name.into(),
            patterns,
        })
    }

    pub fn matches(&self, device: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(device))
    }
}

/// Ordered device classification table; the first matching rule wins.
#[derive(Debug, Clone, Default)]
pub struct CategoryRules {
    rules: Vec<CategoryRule>,
}

impl CategoryRules {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    pub fn classify(&self, device: &str) -> Option<DeviceCategory> {
        self.rules
            .iter()
            .find(|r| r.matches(device))
            .map(|r| r.category)
    }

    pub fn display_name(&self, category: DeviceCategory) -> Option<&str> {
        self.rules
            .iter()
            .find(|r| r.category == category)
            .map(|r| r.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
