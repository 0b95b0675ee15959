use std::fmt;

use acl_core::{AclRule, Location};
use serde::Serialize;

use crate::category::DeviceCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FindingKind {
    Duplicate,
    Conflict,
    AnyRuleAnomaly,
    ParseError,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FindingKind::Duplicate => "Duplicate",
            FindingKind::Conflict => "Conflict",
            FindingKind::AnyRuleAnomaly => "AnyRuleAnomaly",
            FindingKind::ParseError => "ParseError",
        })
    }
}

/// Snapshot of a rule line a finding points at. Malformed lines never
/// become an [`AclRule`], so findings carry this instead of the rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleRef {
    pub device: String,
    pub category: Option<DeviceCategory>,
    pub raw: String,
    pub location: Location,
}

impl RuleRef {
    pub fn new(
        device: &str,
        category: Option<DeviceCategory>,
        raw: &str,
        location: Location,
    ) -> Self {
        Self {
            device: device.to_string(),
            category,
            raw: raw.to_string(),
            location,
        }
    }

    pub fn of(device: &str, category: Option<DeviceCategory>, rule: &AclRule) -> Self {
        Self::new(device, category, &rule.raw, rule.location)
    }
}

impl fmt::Display for RuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} '{}'", self.device, self.location, self.raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub kind: FindingKind,
    pub code: String,
    pub rule_a: RuleRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_b: Option<RuleRef>,
    pub message: String,
}

impl Finding {
    pub fn new(
        severity: Severity,
        kind: FindingKind,
        code: &str,
        rule_a: RuleRef,
        rule_b: Option<RuleRef>,
        message: String,
    ) -> Self {
        Self {
            severity,
            kind,
            code: code.to_string(),
            rule_a,
            rule_b,
            message,
        }
    }

    pub fn parse_error(rule: RuleRef, code: &str, message: String) -> Self {
        Self::new(
            Severity::Warning,
            FindingKind::ParseError,
            code,
            rule,
            None,
            message,
        )
    }
}
