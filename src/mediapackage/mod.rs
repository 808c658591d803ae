//! Media package model: the mutable work item a workflow step operates on.
//!
//! A package owns an ordered list of elements. Element identifiers are unique
//! within a package; the package identifier namespaces element storage.
mod element;
mod flavor;

pub use element::{Element, ElementType, UnknownElementType};
pub use flavor::{Flavor, FlavorParseError};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaPackage {
    pub id: String,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl MediaPackage {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            elements: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, element_id: &str) -> bool {
        self.get(element_id).is_some()
    }

    pub fn get(&self, element_id: &str) -> Option<&Element> {
        self.elements.iter().find(|element| element.id == element_id)
    }

    pub fn get_mut(&mut self, element_id: &str) -> Option<&mut Element> {
        self.elements
            .iter_mut()
            .find(|element| element.id == element_id)
    }

    /// Append an element. Callers are responsible for id uniqueness.
    pub fn add(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn remove(&mut self, element_id: &str) -> Option<Element> {
        let index = self
            .elements
            .iter()
            .position(|element| element.id == element_id)?;
        Some(self.elements.remove(index))
    }

    pub fn elements_with_flavor<'a>(
        &'a self,
        pattern: &'a Flavor,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements.iter().filter(move |element| {
            element
                .flavor
                .as_ref()
                .is_some_and(|flavor| flavor.matches(pattern))
        })
    }

    /// Elements carrying every tag in `tags`; an empty list matches all.
    pub fn elements_with_tags<'a>(
        &'a self,
        tags: &'a [String],
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements
            .iter()
            .filter(move |element| tags.iter().all(|tag| element.has_tag(tag)))
    }
}

/// Load a media package from a JSON file.
pub fn load_package(path: &Path) -> Result<MediaPackage> {
    let bytes = fs::read(path).with_context(|| format!("read package {}", path.display()))?;
    let package: MediaPackage =
        serde_json::from_slice(&bytes).context("parse media package JSON")?;
    Ok(package)
}

/// Persist a media package in a stable JSON format.
pub fn write_package(path: &Path, package: &MediaPackage) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(package).context("serialize media package")?;
    fs::write(path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MediaPackage {
        let mut package = MediaPackage::new("mp-1");
        package.add(
            Element::new("a", ElementType::Track, "/in/a.mp4")
                .with_flavor(Flavor::new("presenter", "source"))
                .with_tags(["engage"]),
        );
        package.add(
            Element::new("b", ElementType::Catalog, "/in/b.xml")
                .with_flavor(Flavor::new("dublincore", "episode")),
        );
        package
    }

    #[test]
    fn lookup_and_remove_by_id() {
        let mut package = sample();
        assert!(package.contains("a"));
        assert_eq!(package.len(), 2);
        let removed = package.remove("a").expect("element a");
        assert_eq!(removed.location, "/in/a.mp4");
        assert!(!package.contains("a"));
        assert!(package.remove("a").is_none());
    }

    #[test]
    fn selects_by_flavor_pattern_and_tags() {
        let package = sample();
        let pattern: Flavor = "*/source".parse().expect("pattern");
        let ids: Vec<_> = package
            .elements_with_flavor(&pattern)
            .map(|element| element.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a"]);

        let tags = vec!["engage".to_string()];
        assert_eq!(package.elements_with_tags(&tags).count(), 1);
        assert_eq!(package.elements_with_tags(&[]).count(), 2);
    }

    #[test]
    fn package_file_round_trip_keeps_elements() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/mp.json");
        let package = sample();
        write_package(&path, &package).expect("write package");
        assert_eq!(load_package(&path).expect("load package"), package);
    }
}
