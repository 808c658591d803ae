use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const WILDCARD: &str = "*";

/// Two-part classification label (`type/subtype`) attached to an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Flavor {
    kind: String,
    subtype: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlavorParseError(String);

impl fmt::Display for FlavorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid flavor (expected type/subtype)", self.0)
    }
}

impl std::error::Error for FlavorParseError {}

impl Flavor {
    pub fn new(kind: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            subtype: subtype.into(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// Match against a pattern flavor where either half may be `*`.
    pub fn matches(&self, pattern: &Flavor) -> bool {
        let kind_ok = pattern.kind == WILDCARD || pattern.kind == self.kind;
        let subtype_ok = pattern.subtype == WILDCARD || pattern.subtype == self.subtype;
        kind_ok && subtype_ok
    }
}

impl FromStr for Flavor {
    type Err = FlavorParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (kind, subtype) = value
            .split_once('/')
            .ok_or_else(|| FlavorParseError(value.to_string()))?;
        let kind = kind.trim();
        let subtype = subtype.trim();
        if kind.is_empty() || subtype.is_empty() || subtype.contains('/') {
            return Err(FlavorParseError(value.to_string()));
        }
        Ok(Flavor::new(kind, subtype))
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.subtype)
    }
}

impl Serialize for Flavor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Flavor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_trims_both_halves() {
        let flavor: Flavor = " presenter / delivery ".parse().expect("parse flavor");
        assert_eq!(flavor.kind(), "presenter");
        assert_eq!(flavor.subtype(), "delivery");
        assert_eq!(flavor.to_string(), "presenter/delivery");
    }

    #[test]
    fn rejects_missing_or_empty_parts() {
        for bad in ["presenter", "/delivery", "presenter/", "a/b/c"] {
            assert!(bad.parse::<Flavor>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn wildcard_matches_either_half() {
        let flavor = Flavor::new("presenter", "source");
        assert!(flavor.matches(&"*/source".parse().expect("pattern")));
        assert!(flavor.matches(&"presenter/*".parse().expect("pattern")));
        assert!(!flavor.matches(&"presentation/source".parse().expect("pattern")));
    }
}
