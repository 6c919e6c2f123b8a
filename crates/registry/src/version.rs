//! Semantic version matching
//!
//! Wraps the `semver` crate with the lenient syntax manifests are written in:
//! `"latest"` as a version sentinel, partial versions such as `"1.2"`, and
//! constraint ranges written as `">=1.0.0 <2.0.0"`, `">= 1.0, < 2.0"`,
//! `"1.0.0 - 2.0.0"` or `"^1.0 || ^2.0"`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use semver::VersionReq;

use crate::error::{RegistryError, Result};
use crate::naming::LATEST;

/// A framework or model version.
///
/// `Latest` is a sentinel rather than a parseable version. It orders above
/// every exact version and never satisfies a [`Constraint`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Version {
    Latest,
    Exact(semver::Version),
}

impl Version {
    /// Parse `"latest"` or a semantic version.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case(LATEST) {
            return Ok(Self::Latest);
        }
        parse_lenient(trimmed)
            .map(Self::Exact)
            .map_err(|reason| RegistryError::InvalidVersion {
                version: input.to_string(),
                reason,
            })
    }

    pub fn is_latest(&self) -> bool {
        matches!(self, Self::Latest)
    }

    pub fn as_semver(&self) -> Option<&semver::Version> {
        match self {
            Self::Latest => None,
            Self::Exact(version) => Some(version),
        }
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Latest, Self::Latest) => Ordering::Equal,
            (Self::Latest, Self::Exact(_)) => Ordering::Greater,
            (Self::Exact(_), Self::Latest) => Ordering::Less,
            (Self::Exact(a), Self::Exact(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str(LATEST),
            Self::Exact(version) => write!(f, "{}", version),
        }
    }
}

impl FromStr for Version {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Accepts `v1.2.3`, `1.2` and `1` in addition to strict semver.
fn parse_lenient(input: &str) -> std::result::Result<semver::Version, String> {
    let unprefixed = input
        .strip_prefix(|c: char| c == 'v' || c == 'V')
        .unwrap_or(input);
    let strict_error = match semver::Version::parse(unprefixed) {
        Ok(version) => return Ok(version),
        Err(e) => e.to_string(),
    };

    let split = unprefixed
        .find(|c: char| c == '-' || c == '+')
        .unwrap_or(unprefixed.len());
    let (core, suffix) = unprefixed.split_at(split);
    let parts: Vec<&str> = core.split('.').collect();
    let numeric = parts
        .iter()
        .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()));
    if parts.len() >= 3 || !numeric {
        return Err(strict_error);
    }

    let mut padded = parts.join(".");
    for _ in parts.len()..3 {
        padded.push_str(".0");
    }
    padded.push_str(suffix);
    semver::Version::parse(&padded).map_err(|_| strict_error)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Comparator {
    Req(VersionReq),
    NotEqual(VersionReq),
}

impl Comparator {
    fn matches(&self, version: &semver::Version) -> bool {
        match self {
            Self::Req(req) => req.matches(version),
            Self::NotEqual(req) => !req.matches(version),
        }
    }
}

/// A version range: a disjunction of conjunctions of comparators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    raw: String,
    alternatives: Vec<Vec<Comparator>>,
}

impl Constraint {
    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(invalid_constraint(input, "constraint is empty"));
        }

        let alternatives = raw
            .split("||")
            .map(|alternative| parse_alternative(input, alternative))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            raw: raw.to_string(),
            alternatives,
        })
    }

    /// Whether `version` falls inside the range. [`Version::Latest`] never does.
    pub fn matches(&self, version: &Version) -> bool {
        let Some(version) = version.as_semver() else {
            return false;
        };
        self.alternatives
            .iter()
            .any(|comparators| comparators.iter().all(|c| c.matches(version)))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Constraint {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn invalid_constraint(constraint: &str, reason: impl Into<String>) -> RegistryError {
    RegistryError::InvalidConstraint {
        constraint: constraint.to_string(),
        reason: reason.into(),
    }
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '!' | '~' | '^')
}

fn has_wildcard(version: &str) -> bool {
    version
        .split('.')
        .any(|part| part == "*" || part == "x" || part == "X")
}

fn parse_alternative(constraint: &str, alternative: &str) -> Result<Vec<Comparator>> {
    let alternative = alternative.trim();
    if alternative.is_empty() {
        return Err(invalid_constraint(constraint, "empty alternative"));
    }

    if let Some((lower, upper)) = alternative.split_once(" - ") {
        return Ok(vec![
            parse_comparator(constraint, &format!(">={}", lower.trim()))?,
            parse_comparator(constraint, &format!("<={}", upper.trim()))?,
        ]);
    }

    let mut comparators = Vec::new();
    let mut pending_operator: Option<&str> = None;
    let tokens = alternative
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty());

    for token in tokens {
        if token.chars().all(is_operator_char) {
            if pending_operator.is_some() {
                return Err(invalid_constraint(constraint, "operator without a version"));
            }
            pending_operator = Some(token);
            continue;
        }
        let expression = match pending_operator.take() {
            Some(operator) => format!("{}{}", operator, token),
            None => token.to_string(),
        };
        comparators.push(parse_comparator(constraint, &expression)?);
    }

    if pending_operator.is_some() {
        return Err(invalid_constraint(constraint, "operator without a version"));
    }
    Ok(comparators)
}

fn parse_comparator(constraint: &str, expression: &str) -> Result<Comparator> {
    let operator_len = expression
        .find(|c: char| !is_operator_char(c))
        .unwrap_or(expression.len());
    let (operator, version) = expression.split_at(operator_len);
    let version = version
        .strip_prefix(|c: char| c == 'v' || c == 'V')
        .unwrap_or(version);
    if version.is_empty() {
        return Err(invalid_constraint(
            constraint,
            format!("missing version after '{}'", operator),
        ));
    }

    let operator = match operator {
        "" if has_wildcard(version) => "",
        "" | "==" => "=",
        other => other,
    };

    let parse = |text: String| {
        VersionReq::parse(&text).map_err(|e| invalid_constraint(constraint, e.to_string()))
    };

    if operator == "!=" {
        return parse(format!("={}", version)).map(Comparator::NotEqual);
    }
    parse(format!("{}{}", operator, version)).map(Comparator::Req)
}

/// What a model declares about the framework version it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRequirement {
    /// Any version; resolution picks the highest registered one.
    Latest,
    Range(Constraint),
}

impl VersionRequirement {
    /// Empty input and `"latest"` (any ASCII case) mean [`VersionRequirement::Latest`].
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(LATEST) {
            return Ok(Self::Latest);
        }
        Constraint::parse(trimmed).map(Self::Range)
    }

    pub fn is_satisfied_by(&self, version: &Version) -> bool {
        match self {
            Self::Latest => true,
            Self::Range(constraint) => constraint.matches(version),
        }
    }
}

impl fmt::Display for VersionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str(LATEST),
            Self::Range(constraint) => constraint.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn satisfies(constraint: &str, version: &str) -> bool {
        Constraint::parse(constraint).unwrap().matches(&v(version))
    }

    #[test]
    fn test_parse_latest_sentinel() {
        assert_eq!(v("latest"), Version::Latest);
        assert_eq!(v("Latest"), Version::Latest);
        assert!(v("latest").is_latest());
        assert_eq!(v("latest").to_string(), "latest");
    }

    #[test]
    fn test_parse_lenient_versions() {
        assert_eq!(v("1.2"), v("1.2.0"));
        assert_eq!(v("v1.2.3"), v("1.2.3"));
        assert_eq!(v("5"), v("5.0.0"));
        assert_eq!(v("1.2-beta").to_string(), "1.2.0-beta");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["not-a-version", "", "1.2.3.4", "1..2", "lastest"] {
            let err = Version::parse(input).unwrap_err();
            assert!(
                matches!(err, RegistryError::InvalidVersion { .. }),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_version_ordering() {
        assert!(v("1.0.0") < v("1.5.0"));
        assert!(v("1.9.0") < v("1.10.0"));
        assert!(v("2.0.0-rc1") < v("2.0.0"));
        assert!(v("99.0.0") < Version::Latest);
    }

    #[test]
    fn test_space_separated_range() {
        assert!(satisfies(">=1.0.0 <2.0.0", "1.0.0"));
        assert!(satisfies(">=1.0.0 <2.0.0", "1.9.9"));
        assert!(!satisfies(">=1.0.0 <2.0.0", "2.0.0"));
        assert!(!satisfies(">=1.0.0 <2.0.0", "0.9.0"));
    }

    #[test]
    fn test_comma_and_spaced_operators() {
        assert!(satisfies(">= 1.0, < 2.0", "1.4.2"));
        assert!(!satisfies(">= 1.0, < 2.0", "2.1.0"));
    }

    #[test]
    fn test_bare_version_is_exact() {
        assert!(satisfies("1.2.3", "1.2.3"));
        assert!(!satisfies("1.2.3", "1.2.4"));
        assert!(satisfies("1.2.x", "1.2.9"));
        assert!(!satisfies("1.2.x", "1.3.0"));
    }

    #[test]
    fn test_alternatives_and_hyphen_ranges() {
        assert!(satisfies("^1.0 || ^3.0", "3.2.0"));
        assert!(!satisfies("^1.0 || ^3.0", "2.0.0"));
        assert!(satisfies("1.0.0 - 2.0.0", "2.0.0"));
        assert!(!satisfies("1.0.0 - 2.0.0", "2.0.1"));
    }

    #[test]
    fn test_not_equal() {
        assert!(satisfies(">=1.0.0, !=1.5.0", "1.4.0"));
        assert!(!satisfies(">=1.0.0, !=1.5.0", "1.5.0"));
    }

    #[test]
    fn test_latest_never_satisfies_range() {
        let constraint = Constraint::parse(">=0.0.0").unwrap();
        assert!(!constraint.matches(&Version::Latest));
    }

    #[test]
    fn test_malformed_constraints() {
        for input in ["", ">=", ">= >= 1.0", "1.0.0 <", "1.0 ||", "banana"] {
            let err = Constraint::parse(input).unwrap_err();
            assert!(
                matches!(err, RegistryError::InvalidConstraint { .. }),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_requirement_sentinel() {
        assert_eq!(VersionRequirement::parse("latest").unwrap(), VersionRequirement::Latest);
        assert_eq!(VersionRequirement::parse("").unwrap(), VersionRequirement::Latest);
        assert!(VersionRequirement::Latest.is_satisfied_by(&v("0.1.0")));

        // The misspelling is an ordinary (malformed) constraint, not a sentinel.
        assert!(matches!(
            VersionRequirement::parse("lastest"),
            Err(RegistryError::InvalidConstraint { .. })
        ));
    }
}
