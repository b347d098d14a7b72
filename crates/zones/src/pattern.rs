//! Postal-code patterns: a closed set of variants evaluated by one dispatch.

use serde::{Deserialize, Serialize};

use shiplane_core::{DomainError, DomainResult};

/// A postal-code pattern.
///
/// Wire forms: `"75001"` (exact), `"75*"` (prefix), `"10000-19999"`
/// (inclusive range, lexicographic on the literal strings). Serialized as
/// the wire string and round-trips back to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PostalPattern {
    Exact(String),
    Prefix(String),
    Range { lo: String, hi: String },
}

impl PostalPattern {
    /// Parse a pattern from its wire form.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(DomainError::validation("postal pattern must not be empty"));
        }

        if let Some(prefix) = raw.strip_suffix('*') {
            if prefix.contains('*') || prefix.contains('-') {
                return Err(DomainError::validation(format!(
                    "invalid postal pattern '{raw}': '*' is only allowed as a trailing wildcard"
                )));
            }
            return Ok(Self::Prefix(prefix.to_string()));
        }

        if raw.contains('*') {
            return Err(DomainError::validation(format!(
                "invalid postal pattern '{raw}': '*' is only allowed as a trailing wildcard"
            )));
        }

        if let Some((lo, hi)) = raw.split_once('-') {
            if lo.is_empty() || hi.is_empty() {
                return Err(DomainError::validation(format!(
                    "invalid postal range '{raw}': both bounds are required"
                )));
            }
            if lo > hi {
                return Err(DomainError::validation(format!(
                    "invalid postal range '{raw}': lower bound sorts after upper bound"
                )));
            }
            return Ok(Self::Range {
                lo: lo.to_string(),
                hi: hi.to_string(),
            });
        }

        Ok(Self::Exact(raw.to_string()))
    }

    /// Whether `postal` matches this pattern.
    ///
    /// Range bounds compare lexicographically on the literal strings; no
    /// numeric interpretation is attempted.
    pub fn matches(&self, postal: &str) -> bool {
        match self {
            Self::Exact(code) => postal == code,
            Self::Prefix(prefix) => postal.starts_with(prefix.as_str()),
            Self::Range { lo, hi } => postal >= lo.as_str() && postal <= hi.as_str(),
        }
    }

    /// The wire form this pattern was parsed from.
    pub fn to_wire(&self) -> String {
        match self {
            Self::Exact(code) => code.clone(),
            Self::Prefix(prefix) => format!("{prefix}*"),
            Self::Range { lo, hi } => format!("{lo}-{hi}"),
        }
    }
}

impl TryFrom<String> for PostalPattern {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PostalPattern> for String {
    fn from(value: PostalPattern) -> Self {
        value.to_wire()
    }
}

impl core::fmt::Display for PostalPattern {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.to_wire())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_pattern_matches_only_itself() {
        let p = PostalPattern::parse("75001").unwrap();
        assert_eq!(p, PostalPattern::Exact("75001".to_string()));
        assert!(p.matches("75001"));
        assert!(!p.matches("75002"));
        assert!(!p.matches("7500"));
    }

    #[test]
    fn prefix_pattern_matches_any_code_starting_with_it() {
        let p = PostalPattern::parse("75*").unwrap();
        assert_eq!(p, PostalPattern::Prefix("75".to_string()));
        assert!(p.matches("75001"));
        assert!(p.matches("75"));
        assert!(!p.matches("76001"));
    }

    #[test]
    fn range_pattern_is_inclusive_and_lexicographic() {
        let p = PostalPattern::parse("10000-19999").unwrap();
        assert!(p.matches("10000"));
        assert!(p.matches("15000"));
        assert!(p.matches("19999"));
        assert!(!p.matches("20000"));
        assert!(!p.matches("09999"));

        // Lexicographic, not numeric: "2" sorts after "19999".
        assert!(!p.matches("2"));
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        assert!(PostalPattern::parse("").is_err());
        assert!(PostalPattern::parse("  ").is_err());
        assert!(PostalPattern::parse("7*5").is_err());
        assert!(PostalPattern::parse("75**").is_err());
        assert!(PostalPattern::parse("-19999").is_err());
        assert!(PostalPattern::parse("10000-").is_err());
        assert!(PostalPattern::parse("19999-10000").is_err());
    }

    #[test]
    fn wire_form_round_trips() {
        for raw in ["75001", "75*", "10000-19999", "*"] {
            let p = PostalPattern::parse(raw).unwrap();
            assert_eq!(p.to_wire(), raw.trim());
        }
    }
}
