use super::Flavor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Closed set of element types a package can hold.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Manifest,
    Timeline,
    Track,
    Catalog,
    Attachment,
    Other,
}

impl ElementType {
    pub const ALL: [ElementType; 6] = [
        ElementType::Manifest,
        ElementType::Timeline,
        ElementType::Track,
        ElementType::Catalog,
        ElementType::Attachment,
        ElementType::Other,
    ];

    /// Return the stable string identifier used in JSON and options.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Manifest => "manifest",
            ElementType::Timeline => "timeline",
            ElementType::Track => "track",
            ElementType::Catalog => "catalog",
            ElementType::Attachment => "attachment",
            ElementType::Other => "other",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownElementType(pub String);

impl fmt::Display for UnknownElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid element type", self.0)
    }
}

impl std::error::Error for UnknownElementType {}

impl FromStr for ElementType {
    type Err = UnknownElementType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        ElementType::ALL
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownElementType(value.to_string()))
    }
}

/// A single entry of a media package: track, catalog, attachment, ...
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor: Option<Flavor>,
    /// Storage location of the backing file.
    #[serde(rename = "uri", default)]
    pub location: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Duration in milliseconds, tracks only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

impl Element {
    pub fn new(id: impl Into<String>, element_type: ElementType, location: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            element_type,
            flavor: None,
            location: location.into(),
            tags: BTreeSet::new(),
            mimetype: None,
            checksum: None,
            size: None,
            duration: None,
        }
    }

    pub fn with_flavor(mut self, flavor: Flavor) -> Self {
        self.flavor = Some(flavor);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn is_track(&self) -> bool {
        self.element_type == ElementType::Track
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_type_parse_is_case_insensitive() {
        assert_eq!("TRACK".parse::<ElementType>(), Ok(ElementType::Track));
        assert_eq!(" Catalog ".parse::<ElementType>(), Ok(ElementType::Catalog));
        for kind in ElementType::ALL {
            assert_eq!(kind.as_str().parse::<ElementType>(), Ok(kind));
        }
    }

    #[test]
    fn element_type_parse_reports_unknown_value() {
        let err = "bogus".parse::<ElementType>().expect_err("bogus is not a type");
        assert_eq!(err.to_string(), "'bogus' is not a valid element type");
    }

    #[test]
    fn element_json_uses_stable_keys() {
        let element = Element::new("t1", ElementType::Track, "/tmp/t1.mp4")
            .with_flavor(Flavor::new("presenter", "work"))
            .with_tags(["draft"]);
        let value = serde_json::to_value(&element).expect("serialize element");
        assert_eq!(value["type"], "track");
        assert_eq!(value["uri"], "/tmp/t1.mp4");
        assert_eq!(value["flavor"], "presenter/work");
        assert_eq!(value["tags"], serde_json::json!(["draft"]));
        assert!(value.get("checksum").is_none());
    }
}
