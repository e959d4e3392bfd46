//! Version normalization and the constraint grammar.
//!
//! Vendor version strings in release feeds use `r` and `_` as segment
//! separators (`1.0r5`, `6_1_2`). Normalization maps both to `.` in exactly
//! one place, [`Version::parse`], so every comparison sees the same shape.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Errors produced while parsing a constraint string.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConstraintError {
    /// The constraint had an operator but no version after it.
    #[error("constraint '{0}' has no version")]
    EmptyVersion(String),
}

/// A normalized version string, compared segment-wise.
///
/// Equality follows the segment comparison, not the underlying string:
/// `1.2` and `1.2.0` are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    /// Parse a version, normalizing vendor separators (`r`, `_`) to `.`.
    pub fn parse(raw: &str) -> Self {
        Self(normalize(raw))
    }

    /// The normalized version string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty version, which every requirement treats as
    /// "not detected".
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn segments(&self) -> impl Iterator<Item = Segment<'_>> {
        self.0.split('.').map(Segment::of)
    }
}

/// One dot-separated version segment. Numeric segments compare as numbers,
/// anything else falls back to a string compare.
enum Segment<'a> {
    Num(u64),
    Text(&'a str),
}

impl<'a> Segment<'a> {
    fn of(s: &'a str) -> Self {
        s.parse::<u64>().map_or(Segment::Text(s), Segment::Num)
    }
}

fn normalize(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c == 'r' || c == '_' { '.' } else { c })
        .collect()
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut a = self.segments();
        let mut b = other.segments();

        loop {
            match (a.next(), b.next()) {
                (None, None) => return Ordering::Equal,
                // Missing segments count as zero: 1.2 == 1.2.0.
                (Some(Segment::Num(x)), None) | (None, Some(Segment::Num(x))) if x == 0 => {}
                (Some(_), None) => return Ordering::Greater,
                (None, Some(_)) => return Ordering::Less,
                (Some(Segment::Num(x)), Some(Segment::Num(y))) => match x.cmp(&y) {
                    Ordering::Equal => {}
                    ord => return ord,
                },
                (Some(Segment::Num(_)), Some(Segment::Text(_))) => return Ordering::Greater,
                (Some(Segment::Text(_)), Some(Segment::Num(_))) => return Ordering::Less,
                (Some(Segment::Text(x)), Some(Segment::Text(y))) => match x.cmp(y) {
                    Ordering::Equal => {}
                    ord => return ord,
                },
            }
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Defined through `cmp` so `==` agrees with the ordering; a derived
// string compare would make `>=1.2` match `1.2.0` while `=1.2` does not.
impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// Comparison operator in a constraint string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// `=`
    Exact,
    /// `>=` (also the default when no operator is present)
    AtLeast,
    /// `<=`
    AtMost,
    /// `>`
    Greater,
    /// `<`
    Less,
}

impl fmt::Display for ConstraintOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Exact => "=",
            Self::AtLeast => ">=",
            Self::AtMost => "<=",
            Self::Greater => ">",
            Self::Less => "<",
        };
        write!(f, "{s}")
    }
}

/// A parsed version constraint, e.g. `>=2.0` or `=1.8.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    /// The comparison operator.
    pub op: ConstraintOp,
    /// The bare version the operator compares against.
    pub version: Version,
}

impl Constraint {
    /// Parse a constraint string. A bare version defaults to `>=`.
    pub fn parse(raw: &str) -> Result<Self, ConstraintError> {
        let raw = raw.trim();
        let (op, rest) = if let Some(rest) = raw.strip_prefix(">=") {
            (ConstraintOp::AtLeast, rest)
        } else if let Some(rest) = raw.strip_prefix("<=") {
            (ConstraintOp::AtMost, rest)
        } else if let Some(rest) = raw.strip_prefix('>') {
            (ConstraintOp::Greater, rest)
        } else if let Some(rest) = raw.strip_prefix('<') {
            (ConstraintOp::Less, rest)
        } else if let Some(rest) = raw.strip_prefix('=') {
            (ConstraintOp::Exact, rest)
        } else {
            (ConstraintOp::AtLeast, raw)
        };

        let rest = rest.trim();
        if rest.is_empty() {
            return Err(ConstraintError::EmptyVersion(raw.to_string()));
        }

        Ok(Self {
            op,
            version: Version::parse(rest),
        })
    }

    /// Whether `candidate` satisfies this constraint. The empty version
    /// never satisfies anything.
    pub fn matches(&self, candidate: &Version) -> bool {
        if candidate.is_empty() {
            return false;
        }
        match self.op {
            ConstraintOp::Exact => candidate == &self.version,
            ConstraintOp::AtLeast => candidate >= &self.version,
            ConstraintOp::AtMost => candidate <= &self.version,
            ConstraintOp::Greater => candidate > &self.version,
            ConstraintOp::Less => candidate < &self.version,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_vendor_separators() {
        assert_eq!(Version::parse("1.0r5").as_str(), "1.0.5");
        assert_eq!(Version::parse("6_1_2").as_str(), "6.1.2");
        assert_eq!(Version::parse(" 2.3 ").as_str(), "2.3");
    }

    #[test]
    fn compares_segment_wise() {
        assert!(Version::parse("1.10") > Version::parse("1.9"));
        assert!(Version::parse("2.0") > Version::parse("1.99.9"));
        assert_eq!(Version::parse("1.2"), Version::parse("1.2"));
        // Trailing zero segments are insignificant.
        assert_eq!(
            Version::parse("1.2").cmp(&Version::parse("1.2.0")),
            std::cmp::Ordering::Equal
        );
    }

    #[test]
    fn equality_agrees_with_ordering() {
        assert_eq!(Version::parse("1.2"), Version::parse("1.2.0"));
        assert_ne!(Version::parse("1.2"), Version::parse("1.2.1"));

        // All three operators must agree on the trailing-zero form.
        assert!(Constraint::parse("=1.2").unwrap().matches(&Version::parse("1.2.0")));
        assert!(Constraint::parse(">=1.2").unwrap().matches(&Version::parse("1.2.0")));
        assert!(Constraint::parse("<=1.2").unwrap().matches(&Version::parse("1.2.0")));
    }

    #[test]
    fn vendor_forms_compare_equal_to_dotted() {
        assert_eq!(Version::parse("6_1_2"), Version::parse("6.1.2"));
        assert!(Version::parse("1.0r10") > Version::parse("1.0r9"));
    }

    #[test]
    fn parses_all_operators() {
        for (raw, op) in [
            (">=1.0", ConstraintOp::AtLeast),
            ("<=1.0", ConstraintOp::AtMost),
            (">1.0", ConstraintOp::Greater),
            ("<1.0", ConstraintOp::Less),
            ("=1.0", ConstraintOp::Exact),
            ("1.0", ConstraintOp::AtLeast),
        ] {
            let c = Constraint::parse(raw).unwrap();
            assert_eq!(c.op, op, "operator for {raw}");
            assert_eq!(c.version, Version::parse("1.0"));
        }
    }

    #[test]
    fn rejects_operator_without_version() {
        assert!(Constraint::parse(">=").is_err());
    }

    #[test]
    fn matches_respects_operator() {
        let c = Constraint::parse(">=2.0").unwrap();
        assert!(c.matches(&Version::parse("2.0")));
        assert!(c.matches(&Version::parse("2.1")));
        assert!(!c.matches(&Version::parse("1.5")));

        let exact = Constraint::parse("=1.8.0").unwrap();
        assert!(exact.matches(&Version::parse("1.8.0")));
        assert!(!exact.matches(&Version::parse("1.8.1")));
    }

    #[test]
    fn empty_detected_version_never_satisfies() {
        let c = Constraint::parse(">=0").unwrap();
        assert!(!c.matches(&Version::parse("")));
    }
}
