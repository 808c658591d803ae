//! Step option parsing.
//!
//! Options arrive as a flat string map (from a workflow definition or a JSON
//! file). They are resolved once per invocation and validated eagerly so an
//! invalid value is reported before any job is submitted.
use crate::error::{StepError, StepResult};
use crate::mediapackage::{ElementType, Flavor};
use crate::tags::TagPatch;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path};

pub const EXEC_PROPERTY: &str = "exec";
pub const PARAMS_PROPERTY: &str = "params";
pub const SOURCE_FLAVOR_PROPERTY: &str = "source-flavor";
pub const SOURCE_TAGS_PROPERTY: &str = "source-tags";
pub const OUTPUT_FILENAME_PROPERTY: &str = "output-filename";
pub const EXPECTED_TYPE_PROPERTY: &str = "expected-type";
pub const TARGET_FLAVOR_PROPERTY: &str = "target-flavor";
pub const TARGET_TAGS_PROPERTY: &str = "target-tags";

/// Documented option keys and their descriptions.
pub fn configuration_options() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([
        (EXEC_PROPERTY, "The full path the executable to run"),
        (
            PARAMS_PROPERTY,
            "Space separated list of command line parameters to pass to the executable",
        ),
        (
            SOURCE_FLAVOR_PROPERTY,
            "The flavor an element must have to be used as an input argument",
        ),
        (
            SOURCE_TAGS_PROPERTY,
            "The tags an element must have to be used as an input argument",
        ),
        (
            OUTPUT_FILENAME_PROPERTY,
            "The name of the elements created by this operation",
        ),
        (
            EXPECTED_TYPE_PROPERTY,
            "The type of the element returned by this operation. Accepted values are: manifest, timeline, track, catalog, attachment, other",
        ),
        (
            TARGET_FLAVOR_PROPERTY,
            "The flavor that the resulting mediapackage elements will be assigned",
        ),
        (
            TARGET_TAGS_PROPERTY,
            "The tags that the resulting mediapackage elements will be assigned",
        ),
    ])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepConfig {
    pub exec: String,
    pub params: Option<String>,
    pub source_flavor: Option<Flavor>,
    pub source_tags: Vec<String>,
    pub output_filename: Option<String>,
    pub expected_type: Option<ElementType>,
    pub target_flavor: Option<Flavor>,
    pub target_tags: Option<TagPatch>,
}

impl StepConfig {
    pub fn new(exec: impl Into<String>) -> Self {
        Self {
            exec: exec.into(),
            params: None,
            source_flavor: None,
            source_tags: Vec::new(),
            output_filename: None,
            expected_type: None,
            target_flavor: None,
            target_tags: None,
        }
    }

    pub fn from_options(options: &BTreeMap<String, String>) -> StepResult<Self> {
        let exec = option(options, EXEC_PROPERTY)
            .ok_or_else(|| StepError::configuration(EXEC_PROPERTY, "an executable is required"))?;

        let expected_type = option(options, EXPECTED_TYPE_PROPERTY)
            .map(|value| {
                value
                    .parse::<ElementType>()
                    .map_err(|err| StepError::configuration(EXPECTED_TYPE_PROPERTY, err.to_string()))
            })
            .transpose()?;

        let target_flavor = parse_flavor(options, TARGET_FLAVOR_PROPERTY)?;
        let source_flavor = parse_flavor(options, SOURCE_FLAVOR_PROPERTY)?;

        let source_tags = option(options, SOURCE_TAGS_PROPERTY)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let output_filename = option(options, OUTPUT_FILENAME_PROPERTY)
            .map(|value| {
                if is_path_segment(value) {
                    Ok(value.to_string())
                } else {
                    Err(StepError::configuration(
                        OUTPUT_FILENAME_PROPERTY,
                        format!("{value:?} must be a single path segment"),
                    ))
                }
            })
            .transpose()?;

        let config = StepConfig {
            exec: exec.to_string(),
            params: option(options, PARAMS_PROPERTY).map(str::to_string),
            source_flavor,
            source_tags,
            output_filename,
            expected_type,
            target_flavor,
            target_tags: option(options, TARGET_TAGS_PROPERTY).map(TagPatch::parse),
        };
        config.argv()?;
        Ok(config)
    }

    /// Split `params` into arguments using shell quoting rules.
    pub fn argv(&self) -> StepResult<Vec<String>> {
        match self.params.as_deref() {
            Some(params) => split_params(params)
                .map_err(|err| StepError::configuration(PARAMS_PROPERTY, err.to_string())),
            None => Ok(Vec::new()),
        }
    }
}

/// Split a parameter string with shell quoting rules.
///
/// An unquoted word starting with `#{` is a placeholder, not a comment; any
/// other unquoted word starting with `#` still comments out the rest.
pub fn split_params(params: &str) -> Result<Vec<String>, shell_words::ParseError> {
    shell_words::split(&escape_placeholders(params))
}

fn escape_placeholders(params: &str) -> String {
    let mut escaped = String::with_capacity(params.len());
    let mut quote: Option<char> = None;
    let mut word_start = true;
    let mut chars = params.chars().peekable();
    while let Some(c) = chars.next() {
        match (quote, c) {
            (None, '#') if word_start && chars.peek() == Some(&'{') => escaped.push('\\'),
            (None | Some('"'), '\\') => {
                escaped.push(c);
                if let Some(next) = chars.next() {
                    escaped.push(next);
                }
                word_start = false;
                continue;
            }
            (None, '\'' | '"') => quote = Some(c),
            (Some(open), _) if c == open => quote = None,
            _ => {}
        }
        word_start = quote.is_none() && c.is_whitespace();
        escaped.push(c);
    }
    escaped
}

/// A single, non-empty path segment without `..` or separators.
pub fn is_path_segment(value: &str) -> bool {
    let mut components = Path::new(value).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Trimmed option value; blank values count as absent.
fn option<'a>(options: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    options
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn parse_flavor(options: &BTreeMap<String, String>, key: &str) -> StepResult<Option<Flavor>> {
    option(options, key)
        .map(|value| {
            value
                .parse::<Flavor>()
                .map_err(|err| StepError::configuration(key, err.to_string()))
        })
        .transpose()
}

/// Load step options from a JSON object of string values.
pub fn load_options(path: &Path) -> Result<BTreeMap<String, String>> {
    let bytes = fs::read(path).with_context(|| format!("read options {}", path.display()))?;
    let options: BTreeMap<String, String> =
        serde_json::from_slice(&bytes).context("parse step options JSON")?;
    Ok(options)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
